//! Domain DTOs for the catalog API.
//!
//! # Design
//! Wire names follow the server's PascalCase columns (`CategoryID`,
//! `UnitPrice`, ...); Rust fields are renamed explicitly. These types mirror
//! the mock-server's schema but are defined independently; integration tests
//! catch any drift between the two crates.

use serde::{Deserialize, Deserializer, Serialize};

pub type CategoryId = i64;
pub type ProductId = i64;

/// A category as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(rename = "CategoryID")]
    pub id: CategoryId,
    #[serde(rename = "CategoryName")]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    /// Opaque picture reference. Usually `null`, and absent when the list
    /// was fetched with `$select`.
    #[serde(rename = "Picture", default)]
    pub picture: Option<String>,
}

/// Payload for creating a category. `Picture` is always sent, `null` when
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    #[serde(rename = "CategoryName")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Picture", default)]
    pub picture: Option<String>,
}

/// Partial update for a category. Only the fields present are applied;
/// `Picture` is always sent and therefore reset to `null` unless set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryPatch {
    #[serde(rename = "CategoryName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Picture", default)]
    pub picture: Option<String>,
}

/// A product as returned by the API. Extra columns the server may include
/// (supplier, reorder level, ...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "ProductID")]
    pub id: ProductId,
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "CategoryID")]
    pub category_id: CategoryId,
    #[serde(rename = "UnitPrice", default, deserialize_with = "null_as_default")]
    pub unit_price: f64,
    #[serde(rename = "UnitsInStock", default, deserialize_with = "null_as_default")]
    pub units_in_stock: u32,
}

/// Payload for creating a product under an existing category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "CategoryID")]
    pub category_id: CategoryId,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "UnitsInStock")]
    pub units_in_stock: u32,
}

/// Partial update for a product. `None` fields are omitted from the body so
/// the server leaves them unchanged. The owning category is never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductPatch {
    #[serde(rename = "ProductName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "UnitPrice", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(rename = "UnitsInStock", skip_serializing_if = "Option::is_none")]
    pub units_in_stock: Option<u32>,
}

impl ProductPatch {
    /// Patch carrying only the fields of `edited` that differ from `current`.
    pub fn diff(current: &Product, edited: &ProductFields) -> Self {
        Self {
            name: (edited.name != current.name).then(|| edited.name.clone()),
            unit_price: (edited.unit_price != current.unit_price).then_some(edited.unit_price),
            units_in_stock: (edited.units_in_stock != current.units_in_stock)
                .then_some(edited.units_in_stock),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.unit_price.is_none() && self.units_in_stock.is_none()
    }
}

/// Editable product fields, as produced by a validated product form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub unit_price: f64,
    pub units_in_stock: u32,
}

/// The `{ "value": [...] }` wrapper around list, create and update results.
/// Any other response shape is a decode error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub value: Vec<T>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: 7,
            name: "Chai".to_string(),
            category_id: 1,
            unit_price: 18.0,
            units_in_stock: 39,
        }
    }

    #[test]
    fn product_ignores_extra_columns_and_nulls() {
        let json = r#"{"ProductID":1,"ProductName":"Chai","SupplierID":1,"CategoryID":1,
            "QuantityPerUnit":"10 boxes","UnitPrice":null,"UnitsInStock":null,"Discontinued":false}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.unit_price, 0.0);
        assert_eq!(p.units_in_stock, 0);
    }

    #[test]
    fn negative_stock_is_rejected() {
        let json = r#"{"ProductID":1,"ProductName":"Chai","CategoryID":1,"UnitPrice":1.0,"UnitsInStock":-4}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }

    #[test]
    fn new_category_always_sends_picture() {
        let input = NewCategory {
            name: "Beverages".to_string(),
            description: None,
            picture: None,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json["Picture"].is_null());
        assert!(json.as_object().unwrap().contains_key("Picture"));
    }

    #[test]
    fn category_patch_omits_unset_fields_but_not_picture() {
        let patch = CategoryPatch {
            name: Some("Drinks".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(json["CategoryName"], "Drinks");
        assert!(json["Picture"].is_null());
    }

    #[test]
    fn diff_of_unchanged_product_is_empty() {
        let current = product();
        let edited = ProductFields {
            name: "Chai".to_string(),
            unit_price: 18.0,
            units_in_stock: 39,
        };
        assert!(ProductPatch::diff(&current, &edited).is_empty());
    }

    #[test]
    fn diff_keeps_only_changed_fields() {
        let current = product();
        let edited = ProductFields {
            name: "Chai".to_string(),
            unit_price: 19.5,
            units_in_stock: 39,
        };
        let patch = ProductPatch::diff(&current, &edited);
        assert_eq!(patch.unit_price, Some(19.5));
        assert!(patch.name.is_none());
        assert!(patch.units_in_stock.is_none());

        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({ "UnitPrice": 19.5 }));
    }

    #[test]
    fn bare_array_is_not_an_envelope() {
        let result: Result<Envelope<Product>, _> = serde_json::from_str("[]");
        assert!(result.is_err());
    }
}
