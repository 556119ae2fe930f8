use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(rename = "CategoryID")]
    pub id: i64,
    #[serde(rename = "CategoryName")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Picture")]
    pub picture: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "ProductID")]
    pub id: i64,
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "CategoryID")]
    pub category_id: i64,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "UnitsInStock")]
    pub units_in_stock: u32,
}

#[derive(Deserialize)]
pub struct CreateCategory {
    #[serde(rename = "CategoryName")]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Picture", default)]
    pub picture: Option<String>,
}

/// Absent fields are left alone; an explicit `null` clears nullable ones.
#[derive(Deserialize)]
pub struct UpdateCategory {
    #[serde(rename = "CategoryName")]
    pub name: Option<String>,
    #[serde(rename = "Description", default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(rename = "Picture", default, deserialize_with = "present")]
    pub picture: Option<Option<String>>,
}

#[derive(Deserialize)]
pub struct CreateProduct {
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "CategoryID")]
    pub category_id: i64,
    #[serde(rename = "UnitPrice", default)]
    pub unit_price: f64,
    #[serde(rename = "UnitsInStock", default)]
    pub units_in_stock: u32,
}

#[derive(Deserialize)]
pub struct UpdateProduct {
    #[serde(rename = "ProductName")]
    pub name: Option<String>,
    #[serde(rename = "UnitPrice")]
    pub unit_price: Option<f64>,
    #[serde(rename = "UnitsInStock")]
    pub units_in_stock: Option<u32>,
}

/// OData system query options understood by the list endpoints.
#[derive(Deserialize, Default)]
pub struct ListParams {
    #[serde(rename = "$select")]
    pub select: Option<String>,
    #[serde(rename = "$filter")]
    pub filter: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default)]
pub struct Store {
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, Product>,
    last_category_id: i64,
    last_product_id: i64,
}

impl Store {
    /// A handful of Northwind rows for running the console against.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        let beverages = store.insert_category(
            "Beverages",
            Some("Soft drinks, coffees, teas, beers, and ales"),
        );
        let condiments = store.insert_category(
            "Condiments",
            Some("Sweet and savory sauces, relishes, spreads, and seasonings"),
        );
        store.insert_category("Produce", Some("Dried fruit and bean curd"));
        store.insert_product("Chai", beverages, 18.0, 39);
        store.insert_product("Chang", beverages, 19.0, 17);
        store.insert_product("Aniseed Syrup", condiments, 10.0, 13);
        store
    }

    pub fn insert_category(&mut self, name: &str, description: Option<&str>) -> i64 {
        self.last_category_id += 1;
        let id = self.last_category_id;
        self.categories.insert(
            id,
            Category {
                id,
                name: name.to_string(),
                description: description.map(str::to_string),
                picture: None,
            },
        );
        id
    }

    pub fn insert_product(
        &mut self,
        name: &str,
        category_id: i64,
        unit_price: f64,
        units_in_stock: u32,
    ) -> i64 {
        self.last_product_id += 1;
        let id = self.last_product_id;
        self.products.insert(
            id,
            Product {
                id,
                name: name.to_string(),
                category_id,
                unit_price,
                units_in_stock,
            },
        );
        id
    }
}

pub type Db = Arc<RwLock<Store>>;

type HandlerError = (StatusCode, String);

pub fn app() -> Router {
    router(Store::default())
}

pub fn router(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/CategoryID/{id}",
            patch(update_category).delete(delete_category),
        )
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/ProductID/{id}",
            patch(update_product).delete(delete_product),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Wrap rows in the `{ "value": [...] }` envelope, keeping only the
/// `$select` columns when one is given.
fn envelope<T: Serialize>(rows: &[T], select: Option<&str>) -> Result<Json<Value>, HandlerError> {
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let mut value = serde_json::to_value(row)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        if let (Some(select), Some(obj)) = (select, value.as_object_mut()) {
            let columns: Vec<&str> = select.split(',').map(str::trim).collect();
            if let Some(unknown) = columns.iter().find(|c| !obj.contains_key(**c)) {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("unknown column in $select: {unknown}"),
                ));
            }
            obj.retain(|key, _| columns.contains(&key.as_str()));
        }
        values.push(value);
    }
    Ok(Json(json!({ "value": values })))
}

/// Only `CategoryID eq <n>` is supported.
fn parse_category_filter(filter: &str) -> Result<i64, HandlerError> {
    let parts: Vec<&str> = filter.split_whitespace().collect();
    match parts.as_slice() {
        ["CategoryID", "eq", id] => id
            .parse()
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid CategoryID: {id}"))),
        _ => Err((StatusCode::BAD_REQUEST, format!("unsupported $filter: {filter}"))),
    }
}

fn require_name(name: &str) -> Result<String, HandlerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn require_price(price: f64) -> Result<f64, HandlerError> {
    if !price.is_finite() || price < 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "UnitPrice must be non-negative".to_string(),
        ));
    }
    Ok(price)
}

// ---- categories ----

async fn list_categories(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, HandlerError> {
    let store = db.read().await;
    let rows: Vec<Category> = store.categories.values().cloned().collect();
    envelope(&rows, params.select.as_deref())
}

async fn create_category(
    State(db): State<Db>,
    Json(input): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    let name = require_name(&input.name)?;
    let mut store = db.write().await;
    let id = store.insert_category(&name, input.description.as_deref());
    let category = store
        .categories
        .get_mut(&id)
        .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "insert lost".to_string()))?;
    category.picture = input.picture;
    let created = category.clone();
    debug!(category_id = id, "category created");
    Ok((StatusCode::CREATED, envelope(&[created], None)?))
}

async fn update_category(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateCategory>,
) -> Result<Json<Value>, HandlerError> {
    let name = input.name.as_deref().map(require_name).transpose()?;
    let mut store = db.write().await;
    let category = store
        .categories
        .get_mut(&id)
        .ok_or((StatusCode::NOT_FOUND, format!("category {id} not found")))?;
    if let Some(name) = name {
        category.name = name;
    }
    if let Some(description) = input.description {
        category.description = description;
    }
    if let Some(picture) = input.picture {
        category.picture = picture;
    }
    let updated = category.clone();
    envelope(&[updated], None)
}

async fn delete_category(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HandlerError> {
    let mut store = db.write().await;
    if !store.categories.contains_key(&id) {
        return Err((StatusCode::NOT_FOUND, format!("category {id} not found")));
    }
    if store.products.values().any(|p| p.category_id == id) {
        return Err((StatusCode::CONFLICT, format!("category {id} still has products")));
    }
    store.categories.remove(&id);
    debug!(category_id = id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---- products ----

async fn list_products(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, HandlerError> {
    let category_id = params
        .filter
        .as_deref()
        .map(parse_category_filter)
        .transpose()?;
    let store = db.read().await;
    let rows: Vec<Product> = store
        .products
        .values()
        .filter(|p| category_id.map_or(true, |id| p.category_id == id))
        .cloned()
        .collect();
    envelope(&rows, params.select.as_deref())
}

async fn create_product(
    State(db): State<Db>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    let name = require_name(&input.name)?;
    let price = require_price(input.unit_price)?;
    let mut store = db.write().await;
    if !store.categories.contains_key(&input.category_id) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("category {} does not exist", input.category_id),
        ));
    }
    let id = store.insert_product(&name, input.category_id, price, input.units_in_stock);
    debug!(product_id = id, category_id = input.category_id, "product created");
    let created = store.products[&id].clone();
    Ok((StatusCode::CREATED, envelope(&[created], None)?))
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Value>, HandlerError> {
    let name = input.name.as_deref().map(require_name).transpose()?;
    let price = input.unit_price.map(require_price).transpose()?;
    let mut store = db.write().await;
    let product = store
        .products
        .get_mut(&id)
        .ok_or((StatusCode::NOT_FOUND, format!("product {id} not found")))?;
    if let Some(name) = name {
        product.name = name;
    }
    if let Some(price) = price {
        product.unit_price = price;
    }
    if let Some(stock) = input.units_in_stock {
        product.units_in_stock = stock;
    }
    let updated = product.clone();
    envelope(&[updated], None)
}

async fn delete_product(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HandlerError> {
    let mut store = db.write().await;
    store
        .products
        .remove(&id)
        .map(|_| {
            debug!(product_id = id, "product deleted");
            StatusCode::NO_CONTENT
        })
        .ok_or((StatusCode::NOT_FOUND, format!("product {id} not found")))
}
