//! Category and product dialog forms.
//!
//! Forms hold raw text exactly as typed. Category forms validate on submit;
//! product forms also validate a field when it loses focus and on every edit
//! of a field that has already been touched.

use crate::types::{Category, CategoryId, NewCategory, Product, ProductFields, ProductId};

/// Validation failures. The `Display` strings are shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Category Name is required")]
    CategoryNameRequired,
    #[error("Product Name is required")]
    ProductNameRequired,
    #[error("Unit Price must be a valid number")]
    PriceNotNumber,
    #[error("Unit Price cannot be negative")]
    PriceNegative,
    #[error("Units in Stock must be a valid number")]
    StockNotNumber,
    #[error("Units in Stock cannot be negative")]
    StockNegative,
    #[error("Units in Stock must be a whole number")]
    StockNotWhole,
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Name,
    Description,
}

/// Trimmed output of a valid category form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryInput {
    pub fn into_new(self) -> NewCategory {
        NewCategory {
            name: self.name,
            description: self.description,
            picture: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForm {
    /// Category being edited; `None` when adding.
    pub target: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub error: Option<FieldError>,
}

impl CategoryForm {
    pub fn add() -> Self {
        Self {
            target: None,
            name: String::new(),
            description: String::new(),
            error: None,
        }
    }

    pub fn edit(category: &Category) -> Self {
        Self {
            target: Some(category.id),
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.target.is_some() {
            "Edit Category"
        } else {
            "Add Category"
        }
    }

    pub fn set(&mut self, field: CategoryField, value: &str) {
        match field {
            CategoryField::Name => self.name = value.to_string(),
            CategoryField::Description => self.description = value.to_string(),
        }
    }

    /// Validate and produce the trimmed input, recording the failure on the
    /// form when there is one.
    pub fn submit(&mut self) -> Result<CategoryInput, FieldError> {
        let name = self.name.trim();
        if name.is_empty() {
            self.error = Some(FieldError::CategoryNameRequired);
            return Err(FieldError::CategoryNameRequired);
        }
        self.error = None;
        let description = self.description.trim();
        Ok(CategoryInput {
            name: name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    UnitPrice,
    UnitsInStock,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Touched {
    name: bool,
    unit_price: bool,
    units_in_stock: bool,
}

impl Touched {
    fn get(&self, field: ProductField) -> bool {
        match field {
            ProductField::Name => self.name,
            ProductField::UnitPrice => self.unit_price,
            ProductField::UnitsInStock => self.units_in_stock,
        }
    }

    fn mark(&mut self, field: ProductField) {
        match field {
            ProductField::Name => self.name = true,
            ProductField::UnitPrice => self.unit_price = true,
            ProductField::UnitsInStock => self.units_in_stock = true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    /// Product being edited; `None` when adding.
    pub target: Option<ProductId>,
    pub name: String,
    pub unit_price: String,
    pub units_in_stock: String,
    pub error: Option<FieldError>,
    touched: Touched,
}

impl ProductForm {
    pub fn add() -> Self {
        Self {
            target: None,
            name: String::new(),
            unit_price: "0.00".to_string(),
            units_in_stock: "0".to_string(),
            error: None,
            touched: Touched::default(),
        }
    }

    pub fn edit(product: &Product) -> Self {
        Self {
            target: Some(product.id),
            name: product.name.clone(),
            unit_price: product.unit_price.to_string(),
            units_in_stock: product.units_in_stock.to_string(),
            error: None,
            touched: Touched::default(),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.target.is_some() {
            "Edit Product"
        } else {
            "Add Product"
        }
    }

    pub fn value(&self, field: ProductField) -> &str {
        match field {
            ProductField::Name => &self.name,
            ProductField::UnitPrice => &self.unit_price,
            ProductField::UnitsInStock => &self.units_in_stock,
        }
    }

    pub fn is_touched(&self, field: ProductField) -> bool {
        self.touched.get(field)
    }

    /// Message for `field` if it has been touched and is invalid.
    pub fn field_error(&self, field: ProductField) -> Option<FieldError> {
        if !self.touched.get(field) {
            return None;
        }
        self.check(field).err()
    }

    pub fn set(&mut self, field: ProductField, value: &str) {
        match field {
            ProductField::Name => self.name = value.to_string(),
            ProductField::UnitPrice => self.unit_price = value.to_string(),
            ProductField::UnitsInStock => self.units_in_stock = value.to_string(),
        }
        if self.touched.get(field) {
            self.error = self.check(field).err();
        }
    }

    pub fn blur(&mut self, field: ProductField) {
        self.touched.mark(field);
        self.error = self.check(field).err();
    }

    /// Validate every field, in name, price, stock order. The first failure
    /// is recorded on the form and returned.
    pub fn submit(&mut self) -> Result<ProductFields, FieldError> {
        self.touched = Touched {
            name: true,
            unit_price: true,
            units_in_stock: true,
        };

        let result = self.validate_all();
        self.error = result.as_ref().err().copied();
        result
    }

    fn validate_all(&self) -> Result<ProductFields, FieldError> {
        Ok(ProductFields {
            name: validate_product_name(&self.name)?,
            unit_price: validate_unit_price(&self.unit_price)?,
            units_in_stock: validate_units_in_stock(&self.units_in_stock)?,
        })
    }

    fn check(&self, field: ProductField) -> Result<(), FieldError> {
        match field {
            ProductField::Name => validate_product_name(&self.name).map(|_| ()),
            ProductField::UnitPrice => validate_unit_price(&self.unit_price).map(|_| ()),
            ProductField::UnitsInStock => validate_units_in_stock(&self.units_in_stock).map(|_| ()),
        }
    }
}

fn validate_product_name(raw: &str) -> Result<String, FieldError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(FieldError::ProductNameRequired);
    }
    Ok(name.to_string())
}

fn validate_unit_price(raw: &str) -> Result<f64, FieldError> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| FieldError::PriceNotNumber)?;
    if !price.is_finite() {
        return Err(FieldError::PriceNotNumber);
    }
    if price < 0.0 {
        return Err(FieldError::PriceNegative);
    }
    Ok(price)
}

fn validate_units_in_stock(raw: &str) -> Result<u32, FieldError> {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(stock) if stock < 0 => Err(FieldError::StockNegative),
        Ok(stock) => u32::try_from(stock).map_err(|_| FieldError::StockNotNumber),
        Err(_) => match raw.parse::<f64>() {
            Ok(value) if !value.is_finite() => Err(FieldError::StockNotNumber),
            Ok(value) if value < 0.0 => Err(FieldError::StockNegative),
            Ok(value) if value.fract() != 0.0 => Err(FieldError::StockNotWhole),
            Ok(value) if value <= f64::from(u32::MAX) => Ok(value as u32),
            Ok(_) => Err(FieldError::StockNotNumber),
            Err(_) => Err(FieldError::StockNotNumber),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chai() -> Product {
        Product {
            id: 1,
            name: "Chai".to_string(),
            category_id: 1,
            unit_price: 18.5,
            units_in_stock: 39,
        }
    }

    #[test]
    fn category_name_required_after_trim() {
        let mut form = CategoryForm::add();
        form.set(CategoryField::Name, "   ");
        assert_eq!(form.submit(), Err(FieldError::CategoryNameRequired));
        assert_eq!(form.error, Some(FieldError::CategoryNameRequired));
    }

    #[test]
    fn category_submit_trims_and_drops_empty_description() {
        let mut form = CategoryForm::add();
        form.set(CategoryField::Name, "  Produce ");
        form.set(CategoryField::Description, "   ");
        let input = form.submit().unwrap();
        assert_eq!(input.name, "Produce");
        assert_eq!(input.description, None);
        assert_eq!(form.error, None);
    }

    #[test]
    fn category_edit_prefills() {
        let category = Category {
            id: 4,
            name: "Dairy".to_string(),
            description: Some("Cheeses".to_string()),
            picture: None,
        };
        let form = CategoryForm::edit(&category);
        assert_eq!(form.title(), "Edit Category");
        assert_eq!(form.description, "Cheeses");
    }

    #[test]
    fn product_add_defaults() {
        let form = ProductForm::add();
        assert_eq!(form.title(), "Add Product");
        assert_eq!(form.unit_price, "0.00");
        assert_eq!(form.units_in_stock, "0");
    }

    #[test]
    fn product_edit_round_trips_values() {
        let mut form = ProductForm::edit(&chai());
        let fields = form.submit().unwrap();
        assert_eq!(fields.name, "Chai");
        assert_eq!(fields.unit_price, 18.5);
        assert_eq!(fields.units_in_stock, 39);
    }

    #[test]
    fn blur_validates_that_field() {
        let mut form = ProductForm::add();
        form.set(ProductField::UnitPrice, "-1");
        assert_eq!(form.error, None, "untouched field is not validated on edit");
        form.blur(ProductField::UnitPrice);
        assert_eq!(form.error, Some(FieldError::PriceNegative));
        assert_eq!(
            form.field_error(ProductField::UnitPrice),
            Some(FieldError::PriceNegative)
        );
    }

    #[test]
    fn edit_of_touched_field_revalidates() {
        let mut form = ProductForm::add();
        form.blur(ProductField::UnitsInStock);
        form.set(ProductField::UnitsInStock, "2.5");
        assert_eq!(form.error, Some(FieldError::StockNotWhole));
        form.set(ProductField::UnitsInStock, "3");
        assert_eq!(form.error, None);
    }

    #[test]
    fn submit_reports_first_failing_field() {
        let mut form = ProductForm::add();
        form.set(ProductField::UnitPrice, "abc");
        form.set(ProductField::UnitsInStock, "-2");
        assert_eq!(form.submit(), Err(FieldError::ProductNameRequired));

        form.set(ProductField::Name, "Tofu");
        assert_eq!(form.submit(), Err(FieldError::PriceNotNumber));

        form.set(ProductField::UnitPrice, "23.25");
        assert_eq!(form.submit(), Err(FieldError::StockNegative));
        assert!(form.is_touched(ProductField::UnitsInStock));
    }

    #[test]
    fn price_rejects_non_finite() {
        assert_eq!(validate_unit_price("NaN"), Err(FieldError::PriceNotNumber));
        assert_eq!(validate_unit_price("inf"), Err(FieldError::PriceNotNumber));
        assert_eq!(validate_unit_price("0"), Ok(0.0));
    }

    #[test]
    fn stock_messages() {
        assert_eq!(validate_units_in_stock(""), Err(FieldError::StockNotNumber));
        assert_eq!(validate_units_in_stock("ten"), Err(FieldError::StockNotNumber));
        assert_eq!(validate_units_in_stock("-1"), Err(FieldError::StockNegative));
        assert_eq!(validate_units_in_stock("1.5"), Err(FieldError::StockNotWhole));
        assert_eq!(validate_units_in_stock("1e2"), Ok(100));
        assert_eq!(
            validate_units_in_stock("5000000000"),
            Err(FieldError::StockNotNumber)
        );
        assert_eq!(
            validate_units_in_stock("99999999999999999999"),
            Err(FieldError::StockNotNumber)
        );
        assert_eq!(validate_units_in_stock(" 12 "), Ok(12));
    }
}
