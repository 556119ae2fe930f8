//! Client core for the catalog admin: categories and their products.
//!
//! # Overview
//! `CatalogClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network. `CatalogApi` pairs it with a
//! `Transport` (blocking `ureq` by default) and is the only place requests
//! are executed and failures logged. `CategoriesPage` is the page
//! controller: it owns the view state and drives the API.
//!
//! # Design
//! - Every list, create and update response uses the `{ "value": [...] }`
//!   envelope; anything else is a decode error.
//! - All operations, reads included, return `Err` on failure. The page
//!   decides what the user sees.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod page;
pub mod transport;
pub mod types;

pub use api::{CatalogApi, CatalogService};
pub use client::CatalogClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind};
pub use forms::{CategoryField, CategoryForm, FieldError, ProductField, ProductForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use page::{CategoriesPage, PageError, RowAction, View};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Category, CategoryId, CategoryPatch, Envelope, NewCategory, NewProduct, Product, ProductFields,
    ProductId, ProductPatch,
};
