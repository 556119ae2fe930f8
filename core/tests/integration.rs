//! Catalog API round-trips against the live mock server.
//!
//! Each test starts its own server on a random port, so state never leaks
//! between tests. Requests go through `CatalogApi` and the real ureq
//! transport.

mod common;

use assert_matches::assert_matches;
use catalog_core::{
    ApiError, CatalogService, CategoryPatch, ErrorKind, NewCategory, NewProduct, ProductPatch,
};

fn new_category(name: &str, description: Option<&str>) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        description: description.map(str::to_string),
        picture: None,
    }
}

fn new_product(name: &str, category_id: i64, unit_price: f64, units_in_stock: u32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        category_id,
        unit_price,
        units_in_stock,
    }
}

#[test]
fn category_lifecycle() {
    let api = common::api(&common::spawn_server());

    assert!(api.list_categories().unwrap().is_empty());

    let created = api
        .create_category(&new_category("Test Cat", Some("Test Description")))
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.name, "Test Cat");
    assert_eq!(created.description.as_deref(), Some("Test Description"));

    let listed = api.list_categories().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    // listed with $select, so no picture column
    assert_eq!(listed[0].picture, None);

    let patch = CategoryPatch {
        name: Some("Renamed".to_string()),
        ..CategoryPatch::default()
    };
    let updated = api.update_category(created.id, &patch).unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.description.as_deref(), Some("Test Description"));

    let second = api.create_category(&new_category("Another", None)).unwrap();
    assert_ne!(second.id, created.id);

    api.delete_category(created.id).unwrap();
    let remaining = api.list_categories().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id);
}

#[test]
fn product_lifecycle() {
    let api = common::api(&common::spawn_server());
    let category = api.create_category(&new_category("Test Cat", None)).unwrap();

    let created = api
        .create_product(&new_product("Test Product", category.id, 19.99, 50))
        .unwrap();
    assert_eq!(created.name, "Test Product");
    assert_eq!(created.category_id, category.id);
    assert_eq!(created.unit_price, 19.99);
    assert_eq!(created.units_in_stock, 50);

    let listed = api.list_products(category.id).unwrap();
    assert_eq!(listed, vec![created.clone()]);

    let patch = ProductPatch {
        units_in_stock: Some(7),
        ..ProductPatch::default()
    };
    let updated = api.update_product(created.id, &patch).unwrap();
    assert_eq!(updated.name, "Test Product");
    assert_eq!(updated.unit_price, 19.99);
    assert_eq!(updated.units_in_stock, 7);

    api.delete_product(created.id).unwrap();
    assert!(api.list_products(category.id).unwrap().is_empty());
}

#[test]
fn products_are_listed_only_under_their_category() {
    let api = common::api(&common::spawn_server());
    let drinks = api.create_category(&new_category("Drinks", None)).unwrap();
    let snacks = api.create_category(&new_category("Snacks", None)).unwrap();

    api.create_product(&new_product("Tea", drinks.id, 3.5, 10)).unwrap();
    api.create_product(&new_product("Coffee", drinks.id, 4.0, 8)).unwrap();
    let chips = api.create_product(&new_product("Chips", snacks.id, 1.25, 40)).unwrap();

    let drink_names: Vec<String> = api
        .list_products(drinks.id)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(drink_names, ["Tea", "Coffee"]);
    assert_eq!(api.list_products(snacks.id).unwrap(), vec![chips]);
}

#[test]
fn unknown_category_has_no_products() {
    let api = common::api(&common::spawn_server());
    assert!(api.list_products(999).unwrap().is_empty());
}

#[test]
fn delete_missing_product_is_invalid_or_not_found() {
    let api = common::api(&common::spawn_server());
    let err = api.delete_product(999).unwrap_err();
    assert_matches!(err, ApiError::InvalidOrNotFound);
    assert_eq!(err.to_string(), "Invalid product ID or product not found");
}

#[test]
fn update_missing_category_is_not_found() {
    let api = common::api(&common::spawn_server());
    let patch = CategoryPatch {
        name: Some("Ghost".to_string()),
        ..CategoryPatch::default()
    };
    assert_matches!(api.update_category(42, &patch), Err(ApiError::NotFound));
}

#[test]
fn delete_category_with_products_is_rejected() {
    let api = common::api(&common::spawn_server());
    let category = api.create_category(&new_category("Busy", None)).unwrap();
    api.create_product(&new_product("Thing", category.id, 1.0, 1)).unwrap();

    let err = api.delete_category(category.id).unwrap_err();
    assert_matches!(err, ApiError::HttpError { status: 409, .. });
    assert_eq!(err.kind(), ErrorKind::Client);
    assert_eq!(api.list_categories().unwrap().len(), 1);
}

#[test]
fn server_rejects_blank_category_name() {
    let api = common::api(&common::spawn_server());
    assert_matches!(
        api.create_category(&new_category("  ", None)),
        Err(ApiError::HttpError { status: 400, .. })
    );
}

#[test]
fn connection_refused_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let api = common::api(&format!("http://{addr}"));
    let err = api.list_categories().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[test]
fn concurrent_updates_to_different_products() {
    let base_url = common::spawn_server();
    let api = common::api(&base_url);
    let category = api.create_category(&new_category("Shared", None)).unwrap();
    let first = api.create_product(&new_product("First", category.id, 1.0, 1)).unwrap();
    let second = api.create_product(&new_product("Second", category.id, 2.0, 2)).unwrap();

    let handles: Vec<_> = [(first.id, 10u32), (second.id, 20u32)]
        .into_iter()
        .map(|(id, stock)| {
            let base_url = base_url.clone();
            std::thread::spawn(move || {
                let api = common::api(&base_url);
                for _ in 0..5 {
                    let patch = ProductPatch {
                        units_in_stock: Some(stock),
                        ..ProductPatch::default()
                    };
                    api.update_product(id, &patch).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let products = api.list_products(category.id).unwrap();
    let stock_of = |id| {
        products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.units_in_stock)
            .unwrap()
    };
    assert_eq!(stock_of(first.id), 10);
    assert_eq!(stock_of(second.id), 20);
}

#[test]
fn concurrent_updates_to_same_product_keep_one_write() {
    let base_url = common::spawn_server();
    let api = common::api(&base_url);
    let category = api.create_category(&new_category("Contended", None)).unwrap();
    let product = api.create_product(&new_product("Hot", category.id, 5.0, 1)).unwrap();

    let handles: Vec<_> = [10u32, 20u32]
        .into_iter()
        .map(|stock| {
            let base_url = base_url.clone();
            let id = product.id;
            std::thread::spawn(move || {
                let api = common::api(&base_url);
                for _ in 0..5 {
                    let patch = ProductPatch {
                        units_in_stock: Some(stock),
                        ..ProductPatch::default()
                    };
                    api.update_product(id, &patch).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let products = api.list_products(category.id).unwrap();
    assert_eq!(products.len(), 1);
    let stock = products[0].units_in_stock;
    assert!(stock == 10 || stock == 20, "stock {stock} was never written");
    assert_eq!(products[0].name, "Hot");
    assert_eq!(products[0].unit_price, 5.0);
}
