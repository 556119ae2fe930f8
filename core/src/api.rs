//! The catalog API: request building, execution and parsing in one call.
//!
//! # Design
//! `CatalogApi` pairs the stateless `CatalogClient` with a `Transport`.
//! Every operation funnels through `CatalogApi::send`, the one place that
//! logs requests and failures. Reads and writes share the same error policy:
//! any failure is returned to the caller, which decides the fallback.

use tracing::{debug, warn};

use crate::client::{CatalogClient, CATEGORY_SUMMARY_FIELDS};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    Category, CategoryId, CategoryPatch, NewCategory, NewProduct, Product, ProductId,
    ProductPatch,
};

/// The eight catalog operations the page controller depends on.
pub trait CatalogService {
    fn list_categories(&self) -> Result<Vec<Category>, ApiError>;
    fn create_category(&self, input: &NewCategory) -> Result<Category, ApiError>;
    fn update_category(&self, id: CategoryId, patch: &CategoryPatch) -> Result<Category, ApiError>;
    fn delete_category(&self, id: CategoryId) -> Result<(), ApiError>;

    fn list_products(&self, category_id: CategoryId) -> Result<Vec<Product>, ApiError>;
    fn create_product(&self, input: &NewProduct) -> Result<Product, ApiError>;
    fn update_product(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, ApiError>;
    fn delete_product(&self, id: ProductId) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct CatalogApi<T = UreqTransport> {
    client: CatalogClient,
    transport: T,
}

impl CatalogApi<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            CatalogClient::new(&config.base_url),
            UreqTransport::new(config.timeout),
        )
    }
}

impl<T: Transport> CatalogApi<T> {
    pub fn new(client: CatalogClient, transport: T) -> Self {
        Self { client, transport }
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        match self.transport.execute(&request) {
            Ok(response) => {
                if !response.is_success() {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        status = response.status,
                        body = %response.body,
                        "request failed"
                    );
                }
                Ok(response)
            }
            Err(err) => {
                warn!(method = %request.method, url = %request.url, error = %err, "request failed");
                Err(err)
            }
        }
    }
}

/// Log a parse failure that happened after a successful status.
fn logged<R>(operation: &str, result: Result<R, ApiError>) -> Result<R, ApiError> {
    if let Err(err) = &result {
        debug!(operation, error = %err, "operation failed");
    }
    result
}

impl<T: Transport> CatalogService for CatalogApi<T> {
    fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self.send(self.client.build_list_categories(CATEGORY_SUMMARY_FIELDS))?;
        logged("list_categories", self.client.parse_list_categories(response))
    }

    fn create_category(&self, input: &NewCategory) -> Result<Category, ApiError> {
        let response = self.send(self.client.build_create_category(input)?)?;
        logged("create_category", self.client.parse_create_category(response))
    }

    fn update_category(&self, id: CategoryId, patch: &CategoryPatch) -> Result<Category, ApiError> {
        let response = self.send(self.client.build_update_category(id, patch)?)?;
        logged("update_category", self.client.parse_update_category(response))
    }

    fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_category(id))?;
        logged("delete_category", self.client.parse_delete_category(response))
    }

    fn list_products(&self, category_id: CategoryId) -> Result<Vec<Product>, ApiError> {
        let response = self.send(self.client.build_list_products(category_id))?;
        logged("list_products", self.client.parse_list_products(response))
    }

    fn create_product(&self, input: &NewProduct) -> Result<Product, ApiError> {
        let response = self.send(self.client.build_create_product(input)?)?;
        logged("create_product", self.client.parse_create_product(response))
    }

    fn update_product(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, ApiError> {
        let response = self.send(self.client.build_update_product(id, patch)?)?;
        logged("update_product", self.client.parse_update_product(response))
    }

    fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_product(id))?;
        logged("delete_product", self.client.parse_delete_product(response))
    }
}
