//! Read-only catalog for console tests.

use catalog_core::{
    ApiError, CatalogService, CategoriesPage, Category, CategoryId, CategoryPatch, NewCategory,
    NewProduct, Product, ProductId, ProductPatch,
};

/// Serves fixed lists; every write fails with a transport error.
#[derive(Default)]
pub struct Fixed {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

fn read_only<T>() -> Result<T, ApiError> {
    Err(ApiError::Transport("read-only catalog".to_string()))
}

impl CatalogService for Fixed {
    fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.categories.clone())
    }

    fn create_category(&self, _: &NewCategory) -> Result<Category, ApiError> {
        read_only()
    }

    fn update_category(&self, _: CategoryId, _: &CategoryPatch) -> Result<Category, ApiError> {
        read_only()
    }

    fn delete_category(&self, _: CategoryId) -> Result<(), ApiError> {
        read_only()
    }

    fn list_products(&self, category_id: CategoryId) -> Result<Vec<Product>, ApiError> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .cloned()
            .collect())
    }

    fn create_product(&self, _: &NewProduct) -> Result<Product, ApiError> {
        read_only()
    }

    fn update_product(&self, _: ProductId, _: &ProductPatch) -> Result<Product, ApiError> {
        read_only()
    }

    fn delete_product(&self, _: ProductId) -> Result<(), ApiError> {
        read_only()
    }
}

/// Mounted page over "Beverages" (one product) and "Empty" (none).
pub fn fixed_page() -> CategoriesPage<Fixed> {
    let mut page = CategoriesPage::new(Fixed {
        categories: vec![
            Category {
                id: 1,
                name: "Beverages".to_string(),
                description: Some("Soft drinks".to_string()),
                picture: None,
            },
            Category {
                id: 2,
                name: "Empty".to_string(),
                description: None,
                picture: None,
            },
        ],
        products: vec![Product {
            id: 1,
            name: "Chai".to_string(),
            category_id: 1,
            unit_price: 18.0,
            units_in_stock: 39,
        }],
    });
    page.mount();
    page
}
