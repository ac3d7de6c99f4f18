// ── Inventory domain types ──

use chrono::{DateTime, FixedOffset};
use petal_api::Pagination;
use serde::Serialize;
use strum::Display;

pub use petal_api::v2::{InventoryOperation, InventoryQuery, SortOrder};

/// Shelf grouping used by the stock screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InventoryCategory {
    Flowers,
    Greenery,
    Accessories,
}

const FLOWER_TYPES: &[&str] = &["roses", "tulips", "lilies", "chrysanthemums", "peonies", "hydrangeas"];
const GREENERY_TYPES: &[&str] = &["eucalyptus", "gypsophila", "fern", "aspidistra"];
const FLOWER_STEMS: &[&str] = &["роз", "тюльпан", "лили", "хризантем", "пион"];
const GREENERY_STEMS: &[&str] = &["эвкалипт", "гипсофила", "зелень"];
const ACCESSORY_STEMS: &[&str] = &["лента", "упаковка", "работа"];

impl InventoryCategory {
    /// Services are accessories; otherwise the flower type decides, then
    /// keywords in the name. Anything unrecognised counts as flowers.
    pub fn classify(name: &str, flower: Option<&str>, service: bool) -> Self {
        if service {
            return Self::Accessories;
        }
        let flower = flower.unwrap_or_default().to_lowercase();
        if FLOWER_TYPES.contains(&flower.as_str()) {
            return Self::Flowers;
        }
        if GREENERY_TYPES.contains(&flower.as_str()) {
            return Self::Greenery;
        }
        let name = name.to_lowercase();
        let mentions = |stems: &[&str]| stems.iter().any(|s| name.contains(s));
        if mentions(FLOWER_STEMS) {
            Self::Flowers
        } else if mentions(GREENERY_STEMS) {
            Self::Greenery
        } else if mentions(ACCESSORY_STEMS) {
            Self::Accessories
        } else {
            Self::Flowers
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItem {
    pub id: u64,
    pub name: String,
    pub cost: Option<f64>,
    pub quantity: Option<f64>,
    pub markup: Option<f64>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub service: bool,
    pub flower: Option<String>,
    pub deactivated: bool,
    pub category: InventoryCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryPage {
    pub items: Vec<InventoryItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementLine {
    pub id: u64,
    pub name: Option<String>,
    pub quantity: Option<f64>,
}

/// One acceptance, write-off, deactivation or consumption.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockMovement {
    pub operation: InventoryOperation,
    pub lines: Vec<MovementLine>,
    pub date: Option<DateTime<FixedOffset>>,
    pub user: Option<String>,
    pub shop_id: Option<String>,
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockHistory {
    pub movements: Vec<StockMovement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}
