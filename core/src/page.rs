//! Categories page controller.
//!
//! # Design
//! All UI state lives in one tagged [`View`]; each view owns the dialog that
//! can be open on top of it, so "a product dialog on the categories table
//! with no category selected" cannot be represented. The page only mutates
//! its lists after a successful round-trip. Dialogs close as soon as a
//! validated save or a confirmation is attempted, whatever the outcome.
//!
//! API failures become the single banner message (`error()`). Commands that
//! do not apply to the current state (wrong view, unknown id, no dialog)
//! return [`PageError`] and leave the state untouched.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::api::CatalogService;
use crate::error::ApiError;
use crate::forms::{CategoryForm, CategoryInput, ProductForm};
use crate::types::{
    Category, CategoryId, CategoryPatch, NewProduct, Product, ProductFields, ProductId, ProductPatch,
};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    Categories(CategoriesView),
    Products(ProductsView),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoriesView {
    pub selected: Option<CategoryId>,
    pub dialog: Option<CategoriesDialog>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoriesDialog {
    Category(CategoryForm),
    /// Add a product to the selected category.
    Product(ProductForm),
    ConfirmDelete(Category),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductsView {
    pub category: Category,
    pub products: Vec<Product>,
    pub dialog: Option<ProductsDialog>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductsDialog {
    Product(ProductForm),
    ConfirmDelete(Product),
}

/// What a category row offers besides "edit".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    ViewProducts(usize),
    Delete,
    /// The product count could not be loaded, so neither is offered.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow<'a> {
    pub category: &'a Category,
    pub product_count: Option<usize>,
    pub selected: bool,
    pub action: RowAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("only available on the categories view")]
    NotOnCategories,
    #[error("only available on the products view")]
    NotOnProducts,
    #[error("close the open dialog first")]
    DialogOpen,
    #[error("no dialog is open")]
    NoDialog,
    #[error("no form is open")]
    NoForm,
    #[error("no delete is awaiting confirmation")]
    NoConfirmation,
    #[error("unknown category {0}")]
    UnknownCategory(CategoryId),
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
}

/// A validated save, taken out of the view before any request is made.
enum Save {
    Category {
        target: Option<CategoryId>,
        input: CategoryInput,
    },
    Product {
        category_id: CategoryId,
        current: Option<Product>,
        fields: ProductFields,
    },
}

enum Delete {
    Category(Category),
    Product(Product),
}

pub struct CategoriesPage<S> {
    service: S,
    categories: Vec<Category>,
    product_counts: HashMap<CategoryId, usize>,
    view: View,
    error: Option<String>,
}

impl<S: CatalogService> CategoriesPage<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            categories: Vec::new(),
            product_counts: HashMap::new(),
            view: View::Loading,
            error: None,
        }
    }

    /// Initial load: categories plus one product fetch per category to
    /// compute its count.
    pub fn mount(&mut self) {
        self.view = View::Loading;
        self.error = None;
        self.reload_categories();
        self.view = View::Categories(CategoriesView::default());
    }

    // ---- read access ----

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.view, View::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn product_count(&self, id: CategoryId) -> Option<usize> {
        self.product_counts.get(&id).copied()
    }

    pub fn selected_category(&self) -> Option<&Category> {
        match &self.view {
            View::Categories(view) => view.selected.and_then(|id| self.find_category(id)),
            View::Products(view) => Some(&view.category),
            View::Loading => None,
        }
    }

    pub fn category_rows(&self) -> Vec<CategoryRow<'_>> {
        let selected = match &self.view {
            View::Categories(view) => view.selected,
            _ => None,
        };
        self.categories
            .iter()
            .map(|category| {
                let product_count = self.product_count(category.id);
                let action = match product_count {
                    Some(0) => RowAction::Delete,
                    Some(n) => RowAction::ViewProducts(n),
                    None => RowAction::Unknown,
                };
                CategoryRow {
                    category,
                    product_count,
                    selected: selected == Some(category.id),
                    action,
                }
            })
            .collect()
    }

    /// Whether the categories header offers "Add Product".
    pub fn show_add_product(&self) -> bool {
        matches!(&self.view, View::Categories(view) if view.selected.is_some())
    }

    pub fn category_form(&self) -> Option<&CategoryForm> {
        match &self.view {
            View::Categories(CategoriesView {
                dialog: Some(CategoriesDialog::Category(form)),
                ..
            }) => Some(form),
            _ => None,
        }
    }

    pub fn category_form_mut(&mut self) -> Option<&mut CategoryForm> {
        match &mut self.view {
            View::Categories(CategoriesView {
                dialog: Some(CategoriesDialog::Category(form)),
                ..
            }) => Some(form),
            _ => None,
        }
    }

    pub fn product_form(&self) -> Option<&ProductForm> {
        match &self.view {
            View::Categories(CategoriesView {
                dialog: Some(CategoriesDialog::Product(form)),
                ..
            })
            | View::Products(ProductsView {
                dialog: Some(ProductsDialog::Product(form)),
                ..
            }) => Some(form),
            _ => None,
        }
    }

    pub fn product_form_mut(&mut self) -> Option<&mut ProductForm> {
        match &mut self.view {
            View::Categories(CategoriesView {
                dialog: Some(CategoriesDialog::Product(form)),
                ..
            })
            | View::Products(ProductsView {
                dialog: Some(ProductsDialog::Product(form)),
                ..
            }) => Some(form),
            _ => None,
        }
    }

    pub fn confirm_prompt(&self) -> Option<ConfirmPrompt> {
        match &self.view {
            View::Categories(CategoriesView {
                dialog: Some(CategoriesDialog::ConfirmDelete(category)),
                ..
            }) => Some(ConfirmPrompt {
                title: "Delete Category",
                message: format!(
                    "Are you sure you want to delete the category \"{}\"?",
                    category.name
                ),
            }),
            View::Products(ProductsView {
                dialog: Some(ProductsDialog::ConfirmDelete(product)),
                ..
            }) => Some(ConfirmPrompt {
                title: "Delete Product",
                message: format!(
                    "Are you sure you want to delete the product \"{}\"?",
                    product.name
                ),
            }),
            _ => None,
        }
    }

    // ---- navigation ----

    pub fn select_category(&mut self, id: CategoryId) -> Result<(), PageError> {
        self.require_category(id)?;
        let view = self.idle_categories_view()?;
        view.selected = Some(id);
        self.error = None;
        Ok(())
    }

    pub fn view_products(&mut self, id: CategoryId) -> Result<(), PageError> {
        let category = self.require_category(id)?.clone();
        self.idle_categories_view()?;

        match self.service.list_products(id) {
            Ok(products) => {
                self.product_counts.insert(id, products.len());
                self.view = View::Products(ProductsView {
                    category,
                    products,
                    dialog: None,
                });
                self.error = None;
            }
            Err(err) => self.fail("Failed to fetch products", &err),
        }
        Ok(())
    }

    /// Return to the categories table without refetching it.
    pub fn back(&mut self) -> Result<(), PageError> {
        let category_id = match &self.view {
            View::Products(view) if view.dialog.is_some() => return Err(PageError::DialogOpen),
            View::Products(view) => view.category.id,
            _ => return Err(PageError::NotOnProducts),
        };
        self.view = View::Categories(CategoriesView {
            selected: Some(category_id),
            dialog: None,
        });
        Ok(())
    }

    // ---- dialogs ----

    pub fn open_add_category(&mut self) -> Result<(), PageError> {
        let view = self.idle_categories_view()?;
        view.dialog = Some(CategoriesDialog::Category(CategoryForm::add()));
        Ok(())
    }

    pub fn open_edit_category(&mut self, id: CategoryId) -> Result<(), PageError> {
        let form = CategoryForm::edit(self.require_category(id)?);
        let view = self.idle_categories_view()?;
        view.dialog = Some(CategoriesDialog::Category(form));
        Ok(())
    }

    pub fn open_add_product(&mut self) -> Result<(), PageError> {
        match &mut self.view {
            View::Categories(view) => {
                if view.dialog.is_some() {
                    return Err(PageError::DialogOpen);
                }
                if view.selected.is_none() {
                    self.error = Some("Please select a category first".to_string());
                    return Ok(());
                }
                view.dialog = Some(CategoriesDialog::Product(ProductForm::add()));
            }
            View::Products(view) => {
                if view.dialog.is_some() {
                    return Err(PageError::DialogOpen);
                }
                view.dialog = Some(ProductsDialog::Product(ProductForm::add()));
            }
            View::Loading => return Err(PageError::NotOnCategories),
        }
        Ok(())
    }

    pub fn open_edit_product(&mut self, id: ProductId) -> Result<(), PageError> {
        let view = self.idle_products_view()?;
        let product = view
            .products
            .iter()
            .find(|p| p.id == id)
            .ok_or(PageError::UnknownProduct(id))?;
        view.dialog = Some(ProductsDialog::Product(ProductForm::edit(product)));
        Ok(())
    }

    pub fn request_delete_category(&mut self, id: CategoryId) -> Result<(), PageError> {
        let category = self.require_category(id)?.clone();
        self.idle_categories_view()?;
        match self.product_count(id) {
            Some(0) => {
                self.idle_categories_view()?.dialog =
                    Some(CategoriesDialog::ConfirmDelete(category))
            }
            Some(_) => {
                self.error = Some(format!(
                    "Category \"{}\" still has products and cannot be deleted",
                    category.name
                ))
            }
            None => {
                self.error = Some(format!(
                    "Product count for \"{}\" is unknown; refresh before deleting",
                    category.name
                ))
            }
        }
        Ok(())
    }

    pub fn request_delete_product(&mut self, id: ProductId) -> Result<(), PageError> {
        let view = self.idle_products_view()?;
        let product = view
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(PageError::UnknownProduct(id))?;
        view.dialog = Some(ProductsDialog::ConfirmDelete(product));
        Ok(())
    }

    /// Close the open dialog, discarding form input or the pending delete.
    pub fn cancel_dialog(&mut self) -> Result<(), PageError> {
        let closed = match &mut self.view {
            View::Categories(view) => view.dialog.take().is_some(),
            View::Products(view) => view.dialog.take().is_some(),
            View::Loading => false,
        };
        if closed {
            Ok(())
        } else {
            Err(PageError::NoDialog)
        }
    }

    /// Validate the open form. An invalid form stays open with its message;
    /// a valid one closes and is sent to the server.
    pub fn save_dialog(&mut self) -> Result<(), PageError> {
        let save = match &mut self.view {
            View::Categories(view) => {
                let selected = view.selected;
                match view.dialog.take() {
                    Some(CategoriesDialog::Category(mut form)) => match form.submit() {
                        Ok(input) => Save::Category {
                            target: form.target,
                            input,
                        },
                        Err(_) => {
                            view.dialog = Some(CategoriesDialog::Category(form));
                            return Ok(());
                        }
                    },
                    Some(CategoriesDialog::Product(mut form)) => {
                        let Some(category_id) = selected else {
                            view.dialog = Some(CategoriesDialog::Product(form));
                            return Err(PageError::NoForm);
                        };
                        match form.submit() {
                            Ok(fields) => Save::Product {
                                category_id,
                                current: None,
                                fields,
                            },
                            Err(_) => {
                                view.dialog = Some(CategoriesDialog::Product(form));
                                return Ok(());
                            }
                        }
                    }
                    other => {
                        view.dialog = other;
                        return Err(PageError::NoForm);
                    }
                }
            }
            View::Products(view) => match view.dialog.take() {
                Some(ProductsDialog::Product(mut form)) => match form.submit() {
                    Ok(fields) => Save::Product {
                        category_id: view.category.id,
                        current: form
                            .target
                            .and_then(|id| view.products.iter().find(|p| p.id == id).cloned()),
                        fields,
                    },
                    Err(_) => {
                        view.dialog = Some(ProductsDialog::Product(form));
                        return Ok(());
                    }
                },
                other => {
                    view.dialog = other;
                    return Err(PageError::NoForm);
                }
            },
            View::Loading => return Err(PageError::NoForm),
        };

        self.error = None;
        match save {
            Save::Category { target, input } => self.save_category(target, input),
            Save::Product {
                category_id,
                current,
                fields,
            } => self.save_product(category_id, current, fields),
        }
        Ok(())
    }

    pub fn confirm_delete(&mut self) -> Result<(), PageError> {
        let delete = match &mut self.view {
            View::Categories(view) => match view.dialog.take() {
                Some(CategoriesDialog::ConfirmDelete(category)) => Delete::Category(category),
                other => {
                    view.dialog = other;
                    return Err(PageError::NoConfirmation);
                }
            },
            View::Products(view) => match view.dialog.take() {
                Some(ProductsDialog::ConfirmDelete(product)) => Delete::Product(product),
                other => {
                    view.dialog = other;
                    return Err(PageError::NoConfirmation);
                }
            },
            View::Loading => return Err(PageError::NoConfirmation),
        };

        self.error = None;
        match delete {
            Delete::Category(category) => match self.service.delete_category(category.id) {
                Ok(()) => {
                    info!(category_id = category.id, "category deleted");
                    if let View::Categories(view) = &mut self.view {
                        if view.selected == Some(category.id) {
                            view.selected = None;
                        }
                    }
                    self.reload_categories();
                }
                Err(err) => self.fail("Failed to delete category", &err),
            },
            Delete::Product(product) => match self.service.delete_product(product.id) {
                Ok(()) => {
                    info!(product_id = product.id, "product deleted");
                    self.refresh_products(product.category_id);
                }
                Err(err @ ApiError::InvalidOrNotFound) => {
                    let message = err.to_string();
                    self.fail(&message, &err)
                }
                Err(err) => self.fail("Failed to delete product. Please try again.", &err),
            },
        }
        Ok(())
    }

    // ---- internals ----

    fn save_category(&mut self, target: Option<CategoryId>, input: CategoryInput) {
        let result = match target {
            Some(id) => {
                let current = self.find_category(id).and_then(|c| c.description.clone());
                // An untouched null description stays null.
                let description = (input.description != current)
                    .then(|| input.description.unwrap_or_default());
                let patch = CategoryPatch {
                    name: Some(input.name),
                    description,
                    picture: None,
                };
                self.service.update_category(id, &patch)
            }
            None => self.service.create_category(&input.into_new()),
        };
        match result {
            Ok(category) => {
                info!(category_id = category.id, "category saved");
                self.reload_categories();
            }
            Err(err) => self.fail("Failed to save category", &err),
        }
    }

    fn save_product(&mut self, category_id: CategoryId, current: Option<Product>, fields: ProductFields) {
        let result = match current {
            Some(product) => {
                let patch = ProductPatch::diff(&product, &fields);
                if patch.is_empty() {
                    Ok(())
                } else {
                    self.service.update_product(product.id, &patch).map(|_| ())
                }
            }
            None => {
                let input = NewProduct {
                    name: fields.name,
                    category_id,
                    unit_price: fields.unit_price,
                    units_in_stock: fields.units_in_stock,
                };
                self.service.create_product(&input).map(|_| ())
            }
        };
        match result {
            Ok(()) => self.refresh_products(category_id),
            Err(err) => self.fail("Failed to save product", &err),
        }
    }

    /// Refetch the category list and every product count. On failure the
    /// previous list is kept.
    fn reload_categories(&mut self) {
        let categories = match self.service.list_categories() {
            Ok(categories) => categories,
            Err(err) => {
                self.fail("Failed to fetch categories", &err);
                return;
            }
        };

        let mut counts = HashMap::with_capacity(categories.len());
        let mut count_failed = false;
        for category in &categories {
            match self.service.list_products(category.id) {
                Ok(products) => {
                    counts.insert(category.id, products.len());
                }
                Err(err) => {
                    warn!(category_id = category.id, error = %err, "product count unavailable");
                    count_failed = true;
                }
            }
        }

        if let View::Categories(view) = &mut self.view {
            if let Some(id) = view.selected {
                if !categories.iter().any(|c| c.id == id) {
                    view.selected = None;
                }
            }
        }
        self.categories = categories;
        self.product_counts = counts;
        if count_failed {
            self.error = Some("Failed to fetch product counts".to_string());
        }
    }

    /// Refetch one category's products; updates its count and, when that
    /// category is on screen, the products table.
    fn refresh_products(&mut self, category_id: CategoryId) {
        match self.service.list_products(category_id) {
            Ok(products) => {
                self.product_counts.insert(category_id, products.len());
                if let View::Products(view) = &mut self.view {
                    if view.category.id == category_id {
                        view.products = products;
                    }
                }
            }
            Err(err) => self.fail("Failed to fetch products", &err),
        }
    }

    fn fail(&mut self, message: &str, err: &ApiError) {
        warn!(error = %err, kind = ?err.kind(), "{}", message);
        self.error = Some(message.to_string());
    }

    fn find_category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn require_category(&self, id: CategoryId) -> Result<&Category, PageError> {
        self.find_category(id).ok_or(PageError::UnknownCategory(id))
    }

    fn idle_categories_view(&mut self) -> Result<&mut CategoriesView, PageError> {
        match &mut self.view {
            View::Categories(view) => {
                if view.dialog.is_some() {
                    return Err(PageError::DialogOpen);
                }
                Ok(view)
            }
            _ => Err(PageError::NotOnCategories),
        }
    }

    fn idle_products_view(&mut self) -> Result<&mut ProductsView, PageError> {
        match &mut self.view {
            View::Products(view) => {
                if view.dialog.is_some() {
                    return Err(PageError::DialogOpen);
                }
                Ok(view)
            }
            _ => Err(PageError::NotOnProducts),
        }
    }
}
