// Legacy wire models
//
// Field names mirror the backend exactly; normalization into domain
// types happens in petal-core.

use serde::{Deserialize, Serialize};

use crate::wire::{
    LegacyDate, flexible_bool, flexible_f64_opt, flexible_string_opt, flexible_u64,
    flexible_u64_opt,
};

/// Customer row from `/api/v2/customers/`.
///
/// Some deployments already attach lower-case statistics to each row;
/// those are kept when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LegacyCustomer {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub personal_phone: Option<String>,
    #[serde(default)]
    pub personal_city: Option<String>,
    #[serde(default)]
    pub date_register: Option<LegacyDate>,
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub personal_notes: Option<String>,
    #[serde(default)]
    pub personal_street: Option<String>,

    #[serde(rename = "total_orders", default, deserialize_with = "flexible_u64_opt")]
    pub total_orders: Option<u64>,
    #[serde(rename = "total_spent", default, deserialize_with = "flexible_f64_opt")]
    pub total_spent: Option<f64>,
    #[serde(rename = "last_order_date", default)]
    pub last_order_date: Option<String>,
    #[serde(rename = "status", default)]
    pub status: Option<String>,
}

/// Order row from `orders.php`. Older scripts send `PRICE` and a
/// structured `DATE_INSERT` instead of `total` and `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyOrder {
    #[serde(deserialize_with = "flexible_u64", alias = "ID")]
    pub id: u64,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub number: Option<String>,
    #[serde(default, alias = "DATE_INSERT")]
    pub date: Option<LegacyDate>,
    #[serde(default, alias = "PRICE", deserialize_with = "flexible_f64_opt")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub status_id: Option<String>,
}

/// `orders.php` body: `{orders, total}`, no `data` wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrders {
    #[serde(default)]
    pub orders: Vec<LegacyOrder>,
    #[serde(default, deserialize_with = "flexible_u64_opt")]
    pub total: Option<u64>,
}

/// Product row from `/api/v2/product/list/`. Dates use
/// `DD.MM.YYYY HH:mm:ss` in the shop's local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyProductItem {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyProductList {
    #[serde(default)]
    pub items: Vec<LegacyProductItem>,
}

// ── Shop orders ──────────────────────────────────────────────────────

/// Basket line of a legacy order. The first line is the main product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyBasketItem {
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub id: Option<String>,
    #[serde(default, rename = "productName")]
    pub product_name: Option<String>,
    #[serde(default, rename = "productImageSrc")]
    pub product_image_src: Option<String>,
    #[serde(default, deserialize_with = "flexible_u64_opt")]
    pub amount: Option<u64>,
}

/// Full order row from the old order list. Prices arrive pre-formatted
/// and may contain HTML entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyShopOrder {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub status_id: Option<String>,
    #[serde(default)]
    pub basket: Vec<LegacyBasketItem>,
    #[serde(default, rename = "productName")]
    pub product_name: Option<String>,
    #[serde(default, rename = "productImage")]
    pub product_image: Option<String>,
    #[serde(default, rename = "iWillGet", deserialize_with = "flexible_bool")]
    pub pickup: bool,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "addressRecipient")]
    pub address_recipient: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    /// Delivery date.
    #[serde(default, rename = "data", deserialize_with = "flexible_string_opt")]
    pub delivery_date: Option<String>,
    #[serde(default, rename = "deliveryName")]
    pub delivery_name: Option<String>,
    #[serde(default, rename = "planDeliveryTime")]
    pub plan_delivery_time: Option<String>,
    #[serde(default, rename = "nameRecipient")]
    pub name_recipient: Option<String>,
    #[serde(default, rename = "phoneRecipient")]
    pub phone_recipient: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, rename = "commentCourier")]
    pub comment_courier: Option<String>,
    #[serde(default, rename = "price_formated", deserialize_with = "flexible_string_opt")]
    pub price_formatted: Option<String>,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub full_price_formatted: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub payed: bool,
    #[serde(default, rename = "responsibleName")]
    pub responsible_name: Option<String>,
    #[serde(default, rename = "recipientPhoto")]
    pub recipient_photo: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
}

/// `data` of the old order list: `{orders: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyOrderList {
    #[serde(default)]
    pub orders: Vec<LegacyShopOrder>,
}
