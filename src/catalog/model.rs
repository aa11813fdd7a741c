//! # Catalog Model
//!
//! Rows returned to callers and write payloads accepted from admins.

use serde::{Deserialize, Serialize};

/// Product projection returned by listings
///
/// Field names on the wire match what the storefront frontend reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub available: bool,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// 0 when the product has no category
    #[serde(rename = "categoryID")]
    pub category_id: i64,
    /// Empty when the product has no category or it was deleted
    pub category: String,
    /// Primary image URL, empty when none
    pub url: String,
    #[serde(rename = "buyUrl")]
    pub buy_url: Option<String>,
}

/// One listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    /// Rows matching the filters, irrespective of pagination
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Product fields written on create and update
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    /// 0 or negative means "no category"
    pub category_id: i64,
    pub available: bool,
    pub buy_url: String,
}

impl NewProduct {
    /// Category key to store, `None` for uncategorized
    pub fn category_key(&self) -> Option<i64> {
        Some(self.category_id).filter(|id| *id > 0)
    }

    /// Purchase link to store, `None` when blank
    pub fn buy_url_value(&self) -> Option<String> {
        let trimmed = self.buy_url.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Build the listing projection for this product
    pub fn to_item(&self, id: i64, category: String, url: String) -> CatalogItem {
        CatalogItem {
            id,
            available: self.available,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            category_id: self.category_key().unwrap_or(0),
            category,
            url,
            buy_url: self.buy_url_value(),
        }
    }
}
