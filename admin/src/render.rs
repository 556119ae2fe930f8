//! Plain-text rendering of the categories page.

use std::fmt::Write;

use catalog_core::page::{CategoriesDialog, ProductsDialog, ProductsView};
use catalog_core::{
    CatalogService, CategoriesPage, CategoryForm, ProductField, ProductForm, RowAction, View,
};

/// Render the whole page: banner, current table, then the open dialog.
pub fn render<S: CatalogService>(page: &CategoriesPage<S>) -> String {
    let mut out = String::new();
    if let Some(message) = page.error() {
        let _ = writeln!(out, "! {message}");
    }

    match page.view() {
        View::Loading => out.push_str("Loading...\n"),
        View::Categories(view) => {
            categories_table(&mut out, page);
            match &view.dialog {
                Some(CategoriesDialog::Category(form)) => category_dialog(&mut out, form),
                Some(CategoriesDialog::Product(form)) => product_dialog(&mut out, form),
                Some(CategoriesDialog::ConfirmDelete(_)) => confirm(&mut out, page),
                None => {}
            }
        }
        View::Products(view) => {
            products_table(&mut out, view);
            match &view.dialog {
                Some(ProductsDialog::Product(form)) => product_dialog(&mut out, form),
                Some(ProductsDialog::ConfirmDelete(_)) => confirm(&mut out, page),
                None => {}
            }
        }
    }
    out
}

fn categories_table<S: CatalogService>(out: &mut String, page: &CategoriesPage<S>) {
    out.push_str("Categories  [Add Category]");
    if page.show_add_product() {
        out.push_str(" [Add Product]");
    }
    out.push('\n');

    let rows = page.category_rows();
    if rows.is_empty() {
        out.push_str("  (no categories)\n");
        return;
    }
    let _ = writeln!(out, "  {:<5} {:<20} {:<40} Actions", "ID", "Name", "Description");
    for row in rows {
        let marker = if row.selected { '>' } else { ' ' };
        let action = match row.action {
            RowAction::ViewProducts(n) => format!("[View Products ({n})]"),
            RowAction::Delete => "[Delete Category]".to_string(),
            RowAction::Unknown => "[?]".to_string(),
        };
        let _ = writeln!(
            out,
            "{marker} {:<5} {:<20} {:<40} [Edit] {action}",
            row.category.id,
            row.category.name,
            row.category.description.as_deref().unwrap_or(""),
        );
    }
}

fn products_table(out: &mut String, view: &ProductsView) {
    let _ = writeln!(out, "Products in {}  [Back] [Add Product]", view.category.name);
    if view.products.is_empty() {
        out.push_str("  No products found in this category\n");
        return;
    }
    let _ = writeln!(out, "  {:<5} {:<30} {:>10} {:>8}", "ID", "Name", "Price", "Stock");
    for product in &view.products {
        let _ = writeln!(
            out,
            "  {:<5} {:<30} {:>10.2} {:>8}  [Edit] [Delete]",
            product.id, product.name, product.unit_price, product.units_in_stock
        );
    }
}

fn category_dialog(out: &mut String, form: &CategoryForm) {
    let _ = writeln!(out, "\n--- {} ---", form.title());
    let _ = writeln!(out, "  name:        {}", form.name);
    let _ = writeln!(out, "  description: {}", form.description);
    if let Some(err) = form.error {
        let _ = writeln!(out, "  ! {err}");
    }
    out.push_str("  [save] [cancel]\n");
}

fn product_dialog(out: &mut String, form: &ProductForm) {
    let _ = writeln!(out, "\n--- {} ---", form.title());
    for (label, field) in [
        ("name: ", ProductField::Name),
        ("price:", ProductField::UnitPrice),
        ("stock:", ProductField::UnitsInStock),
    ] {
        let _ = write!(out, "  {label} {}", form.value(field));
        if let Some(err) = form.field_error(field) {
            let _ = write!(out, "  ! {err}");
        }
        out.push('\n');
    }
    out.push_str("  [save] [cancel]\n");
}

fn confirm<S: CatalogService>(out: &mut String, page: &CategoriesPage<S>) {
    if let Some(prompt) = page.confirm_prompt() {
        let _ = writeln!(out, "\n--- {} ---", prompt.title);
        let _ = writeln!(out, "  {}", prompt.message);
        out.push_str("  [confirm] [cancel]\n");
    }
}
