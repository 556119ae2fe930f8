//! Apply parsed commands to the page.

use catalog_core::{CatalogService, CategoriesPage, PageError};
use tracing::debug;

use crate::commands::{Command, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    ShowHelp,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error(transparent)]
    Page(#[from] PageError),
    #[error("field `{0:?}` is not on this form")]
    WrongField(Field),
    #[error("`blur` only applies to product fields")]
    NothingToBlur,
}

pub fn apply<S: CatalogService>(
    page: &mut CategoriesPage<S>,
    command: Command,
) -> Result<Flow, ConsoleError> {
    debug!(?command, "applying command");
    match command {
        Command::Help => return Ok(Flow::ShowHelp),
        Command::Quit => return Ok(Flow::Quit),
        Command::List => page.mount(),
        Command::Select(id) => page.select_category(id)?,
        Command::View(id) => page.view_products(id)?,
        Command::Back => page.back()?,
        Command::AddCategory => page.open_add_category()?,
        Command::EditCategory(id) => page.open_edit_category(id)?,
        Command::DeleteCategory(id) => page.request_delete_category(id)?,
        Command::AddProduct => page.open_add_product()?,
        Command::EditProduct(id) => page.open_edit_product(id)?,
        Command::DeleteProduct(id) => page.request_delete_product(id)?,
        Command::Set(field, value) => set(page, field, &value)?,
        Command::Blur(field) => {
            let field = field.product().ok_or(ConsoleError::WrongField(field))?;
            page.product_form_mut()
                .ok_or(ConsoleError::NothingToBlur)?
                .blur(field);
        }
        Command::Save => page.save_dialog()?,
        Command::Cancel => page.cancel_dialog()?,
        Command::Confirm => page.confirm_delete()?,
    }
    Ok(Flow::Continue)
}

fn set<S: CatalogService>(
    page: &mut CategoriesPage<S>,
    field: Field,
    value: &str,
) -> Result<(), ConsoleError> {
    if let Some(form) = page.category_form_mut() {
        let field = field.category().ok_or(ConsoleError::WrongField(field))?;
        form.set(field, value);
        return Ok(());
    }
    if let Some(form) = page.product_form_mut() {
        let field = field.product().ok_or(ConsoleError::WrongField(field))?;
        form.set(field, value);
        return Ok(());
    }
    Err(PageError::NoForm.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::parse;
    use crate::testing::fixed_page;
    use assert_matches::assert_matches;
    use catalog_core::View;

    fn run<S: CatalogService>(
        page: &mut CategoriesPage<S>,
        line: &str,
    ) -> Result<Flow, ConsoleError> {
        apply(page, parse(line).unwrap())
    }

    #[test]
    fn set_routes_to_the_open_form() {
        let mut page = fixed_page();
        run(&mut page, "add-category").unwrap();
        run(&mut page, "set name Seafood").unwrap();
        assert_eq!(page.category_form().unwrap().name, "Seafood");
        assert_eq!(
            run(&mut page, "set price 3"),
            Err(ConsoleError::WrongField(Field::Price))
        );
    }

    #[test]
    fn set_without_form_fails() {
        let mut page = fixed_page();
        assert_eq!(
            run(&mut page, "set name x"),
            Err(ConsoleError::Page(PageError::NoForm))
        );
    }

    #[test]
    fn blur_validates_product_field() {
        let mut page = fixed_page();
        run(&mut page, "select 1").unwrap();
        run(&mut page, "add-product").unwrap();
        run(&mut page, "set stock 1.5").unwrap();
        run(&mut page, "blur stock").unwrap();
        assert_eq!(
            page.product_form().unwrap().error.map(|e| e.to_string()),
            Some("Units in Stock must be a whole number".to_string())
        );
        assert_eq!(
            run(&mut page, "blur description"),
            Err(ConsoleError::WrongField(Field::Description))
        );
    }

    #[test]
    fn failed_save_closes_dialog_with_banner() {
        let mut page = fixed_page();
        run(&mut page, "add-category").unwrap();
        run(&mut page, "set name Seafood").unwrap();
        run(&mut page, "save").unwrap();
        assert!(page.category_form().is_none());
        assert_eq!(page.error(), Some("Failed to save category"));
    }

    #[test]
    fn navigation_and_flow() {
        let mut page = fixed_page();
        assert_eq!(run(&mut page, "help"), Ok(Flow::ShowHelp));
        assert_eq!(run(&mut page, "view 1"), Ok(Flow::Continue));
        assert_matches!(page.view(), View::Products(_));
        assert_eq!(
            run(&mut page, "select 1"),
            Err(ConsoleError::Page(PageError::NotOnCategories))
        );
        run(&mut page, "back").unwrap();
        assert_matches!(page.view(), View::Categories(_));
        assert_eq!(run(&mut page, "quit"), Ok(Flow::Quit));
    }
}
