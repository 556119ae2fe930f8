//! Console command parsing. One command per input line.

use catalog_core::{CategoryField, CategoryId, ProductField, ProductId};

pub const HELP: &str = "\
Commands:
  list                      reload categories and product counts
  select <id>               select a category
  view <id>                 show a category's products
  back                      return to the categories table
  add-category              open the Add Category dialog
  edit-category <id>        open the Edit Category dialog
  delete-category <id>      ask to delete an empty category
  add-product               open the Add Product dialog
  edit-product <id>         open the Edit Product dialog
  delete-product <id>       ask to delete a product
  set <field> <value...>    type into the open form
  blur <field>              leave a product field (validates it)
  save | cancel | confirm   act on the open dialog
  help | quit
Fields: name, description (category); name, price, stock (product)";

/// A form field name as typed. Which form it applies to is decided when the
/// command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Description,
    Price,
    Stock,
}

impl Field {
    pub fn category(self) -> Option<CategoryField> {
        match self {
            Field::Name => Some(CategoryField::Name),
            Field::Description => Some(CategoryField::Description),
            Field::Price | Field::Stock => None,
        }
    }

    pub fn product(self) -> Option<ProductField> {
        match self {
            Field::Name => Some(ProductField::Name),
            Field::Price => Some(ProductField::UnitPrice),
            Field::Stock => Some(ProductField::UnitsInStock),
            Field::Description => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Select(CategoryId),
    View(CategoryId),
    Back,
    AddCategory,
    EditCategory(CategoryId),
    DeleteCategory(CategoryId),
    AddProduct,
    EditProduct(ProductId),
    DeleteProduct(ProductId),
    Set(Field, String),
    Blur(Field),
    Save,
    Cancel,
    Confirm,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a valid id")]
    InvalidId(String),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("`{0}` takes no arguments")]
    UnexpectedArgument(&'static str),
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" => Err(ParseError::Empty),
        "help" | "?" => no_args("help", rest, Command::Help),
        "list" => no_args("list", rest, Command::List),
        "select" => id("select", rest).map(Command::Select),
        "view" => id("view", rest).map(Command::View),
        "back" => no_args("back", rest, Command::Back),
        "add-category" => no_args("add-category", rest, Command::AddCategory),
        "edit-category" => id("edit-category", rest).map(Command::EditCategory),
        "delete-category" => id("delete-category", rest).map(Command::DeleteCategory),
        "add-product" => no_args("add-product", rest, Command::AddProduct),
        "edit-product" => id("edit-product", rest).map(Command::EditProduct),
        "delete-product" => id("delete-product", rest).map(Command::DeleteProduct),
        "set" => {
            let (name, value) = match rest.split_once(char::is_whitespace) {
                Some((name, value)) => (name, value.trim()),
                None => (rest, ""),
            };
            if name.is_empty() {
                return Err(ParseError::MissingArgument("set"));
            }
            Ok(Command::Set(field(name)?, value.to_string()))
        }
        "blur" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("blur"));
            }
            field(rest).map(Command::Blur)
        }
        "save" => no_args("save", rest, Command::Save),
        "cancel" => no_args("cancel", rest, Command::Cancel),
        "confirm" => no_args("confirm", rest, Command::Confirm),
        "quit" | "exit" => no_args("quit", rest, Command::Quit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn no_args(name: &'static str, rest: &str, command: Command) -> Result<Command, ParseError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::UnexpectedArgument(name))
    }
}

fn id(name: &'static str, rest: &str) -> Result<i64, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::MissingArgument(name));
    }
    rest.parse()
        .map_err(|_| ParseError::InvalidId(rest.to_string()))
}

fn field(name: &str) -> Result<Field, ParseError> {
    match name {
        "name" => Ok(Field::Name),
        "description" => Ok(Field::Description),
        "price" => Ok(Field::Price),
        "stock" => Ok(Field::Stock),
        other => Err(ParseError::UnknownField(other.to_string())),
    }
}
