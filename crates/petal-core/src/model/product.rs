// ── Product domain types ──

use chrono::{DateTime, FixedOffset};
use petal_api::v2::{ProductKind, ProductQuery};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub kind: Option<ProductKind>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub is_available: bool,
    /// Creation time after reconciliation; `None` if no source had it.
    pub created_at: Option<DateTime<FixedOffset>>,
}

/// Listing filter. The tenant id is filled in by the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub kind: Option<ProductKind>,
    pub is_available: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ProductFilter {
    pub(crate) fn to_query(self, city: &str) -> ProductQuery {
        ProductQuery {
            kind: self.kind,
            is_available: self.is_available,
            limit: self.limit,
            offset: self.offset,
            city: Some(city.to_owned()),
        }
    }
}
