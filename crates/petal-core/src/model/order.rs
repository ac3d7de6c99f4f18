// ── Shop order domain types ──
//
// The full order card the florists work from. Distinct from the
// per-customer `Order`, which only carries what statistics need.

use chrono::{DateTime, FixedOffset};
use petal_api::Pagination;
use serde::Serialize;
use strum::Display;

pub use petal_api::v2::OrderStatus;

use crate::fallback::{FallbackQuery, FallbackResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryType {
    #[default]
    Delivery,
    Pickup,
}

/// A basket line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub quantity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition: Option<String>,
}

/// Recipient or sender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Party {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Payment {
    /// Display text with the currency sign, entities decoded.
    pub amount: String,
    /// Numeric amount when the text could be read.
    pub value: Option<f64>,
    pub paid: bool,
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub date: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopOrder {
    pub id: u64,
    pub number: String,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub city: Option<String>,
    pub address: Option<String>,
    /// As sent by the backend; list rows often carry none.
    pub delivery_date: Option<String>,
    pub delivery_time: Option<String>,
    pub main_product: Option<OrderLine>,
    pub additional_items: Vec<OrderLine>,
    pub recipient: Party,
    pub sender: Party,
    pub postcard: Option<String>,
    pub comment: Option<String>,
    pub anonymous: bool,
    pub payment: Payment,
    pub florist: Option<String>,
    pub courier: Option<String>,
    pub photo_before_delivery: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// One window of the order list, optionally narrowed to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub limit: u32,
    pub offset: u32,
}

impl OrderListQuery {
    pub const DEFAULT_LIMIT: u32 = 30;
}

impl Default for OrderListQuery {
    fn default() -> Self {
        Self {
            status: None,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// An empty order list is a real answer, not a reason to fall back.
impl FallbackQuery for OrderListQuery {
    fn expects_results(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderListing {
    pub orders: Vec<ShopOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl FallbackResult for OrderListing {
    fn is_empty_result(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Where an order may move next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusOptions {
    pub id: u64,
    pub current: Option<OrderStatus>,
    pub allowed: Vec<OrderStatus>,
}
