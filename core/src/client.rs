//! Stateless HTTP request builder and response parser for the catalog API.
//!
//! # Design
//! `CatalogClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. `CatalogApi` pairs the two with a `Transport`; hosts that
//! do their own I/O can use this type directly.
//!
//! List, create and update responses must use the `{ "value": [...] }`
//! envelope. Create and update return the first record of the envelope.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Category, CategoryId, CategoryPatch, Envelope, NewCategory, NewProduct, Product, ProductId,
    ProductPatch,
};

/// Columns requested when listing categories for the table view. Leaves out
/// `Picture`, which the console never shows.
pub const CATEGORY_SUMMARY_FIELDS: &[&str] = &["CategoryID", "CategoryName", "Description"];

/// Synchronous, stateless request builder and response parser.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    // ---- categories ----

    /// `GET /categories`, with `$select` when `select` is non-empty.
    pub fn build_list_categories(&self, select: &[&str]) -> HttpRequest {
        let mut url = format!("{}/categories", self.base_url);
        if !select.is_empty() {
            url.push_str(&query(&[("$select", &select.join(","))]));
        }
        self.request(HttpMethod::Get, url, None)
    }

    pub fn build_create_category(&self, input: &NewCategory) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/categories", self.base_url),
            Some(body),
        ))
    }

    pub fn build_update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_json(patch)?;
        Ok(self.request(
            HttpMethod::Patch,
            format!("{}/categories/CategoryID/{id}", self.base_url),
            Some(body),
        ))
    }

    pub fn build_delete_category(&self, id: CategoryId) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            format!("{}/categories/CategoryID/{id}", self.base_url),
            None,
        )
    }

    pub fn parse_list_categories(&self, response: HttpResponse) -> Result<Vec<Category>, ApiError> {
        parse_envelope(&response)
    }

    pub fn parse_create_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        parse_first(&response)
    }

    pub fn parse_update_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        parse_first(&response)
    }

    pub fn parse_delete_category(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // ---- products ----

    /// `GET /products?$filter=CategoryID eq {id}`.
    pub fn build_list_products(&self, category_id: CategoryId) -> HttpRequest {
        let filter = format!("CategoryID eq {category_id}");
        let url = format!("{}/products{}", self.base_url, query(&[("$filter", &filter)]));
        self.request(HttpMethod::Get, url, None)
    }

    pub fn build_create_product(&self, input: &NewProduct) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/products", self.base_url),
            Some(body),
        ))
    }

    pub fn build_update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_json(patch)?;
        Ok(self.request(
            HttpMethod::Patch,
            format!("{}/products/ProductID/{id}", self.base_url),
            Some(body),
        ))
    }

    pub fn build_delete_product(&self, id: ProductId) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            format!("{}/products/ProductID/{id}", self.base_url),
            None,
        )
    }

    pub fn parse_list_products(&self, response: HttpResponse) -> Result<Vec<Product>, ApiError> {
        parse_envelope(&response)
    }

    pub fn parse_create_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        parse_first(&response)
    }

    pub fn parse_update_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        parse_first(&response)
    }

    /// Only `204 No Content` counts as success. 400 and 404 both mean the id
    /// was rejected and map to `InvalidOrNotFound`.
    pub fn parse_delete_product(&self, response: HttpResponse) -> Result<(), ApiError> {
        match response.status {
            204 => Ok(()),
            400 | 404 => Err(ApiError::InvalidOrNotFound),
            status if response.is_success() => Err(ApiError::UnexpectedStatus {
                status,
                expected: 204,
            }),
            status => Err(ApiError::HttpError {
                status,
                body: response.body,
            }),
        }
    }

    /// Every request carries `accept: application/json`; requests with a body
    /// also carry `content-type: application/json`.
    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn parse_envelope<T: DeserializeOwned>(response: &HttpResponse) -> Result<Vec<T>, ApiError> {
    check_status(response)?;
    let envelope: Envelope<T> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    Ok(envelope.value)
}

fn parse_first<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    parse_envelope(response)?
        .into_iter()
        .next()
        .ok_or(ApiError::EmptyEnvelope)
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

/// Render `?k=v&k=v` with values percent-encoded. Keys are emitted as-is so
/// system query options keep their literal `$`.
fn query(pairs: &[(&str, &str)]) -> String {
    let encoded: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", percent_encode(v)))
        .collect();
    format!("?{}", encoded.join("&"))
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b',' | b'$' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
