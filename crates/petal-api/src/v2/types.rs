// v2 wire types
//
// camelCase on product, order and inventory endpoints, snake_case on
// customer endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::envelope::Pagination;
use crate::legacy::LegacyShopOrder;
use crate::request::RequestSpec;
use crate::wire::{
    flexible_bool, flexible_f64_opt, flexible_string_opt, flexible_u64, flexible_u64_opt,
};

// ── Customers ────────────────────────────────────────────────────────

/// Row from `/api/v2/customers/with-stats/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerWithStats {
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
    pub phone: Option<String>,
    #[serde(default)]
    pub member_since: Option<String>,
    #[serde(default, deserialize_with = "flexible_u64_opt")]
    pub total_orders: Option<u64>,
    #[serde(default, deserialize_with = "flexible_f64_opt")]
    pub total_spent: Option<f64>,
    #[serde(default)]
    pub last_order_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64_opt")]
    pub average_check: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomersWithStatsPage {
    #[serde(default)]
    pub customers: Vec<CustomerWithStats>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Order embedded in a customer detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetailOrder {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_name: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64_opt")]
    pub total: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_paid: Option<bool>,
}

/// `/api/v2/customers/{id}/?include_orders=true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetail {
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
    pub phone: Option<String>,
    #[serde(default)]
    pub member_since: Option<String>,
    #[serde(default, deserialize_with = "flexible_u64_opt")]
    pub total_orders: Option<u64>,
    #[serde(default, deserialize_with = "flexible_f64_opt")]
    pub total_spent: Option<f64>,
    #[serde(default)]
    pub last_order_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub orders: Vec<CustomerDetailOrder>,
}

// ── Products ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductKind {
    /// Ready bouquets on display.
    Vitrina,
    /// Made to order.
    Catalog,
}

/// Product as returned by `/api/v2/products` and `/products/detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub price: Option<String>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<ProductKind>,
    /// Detail-only and rarely used fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters shared by the v2 listing and the legacy product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub kind: Option<ProductKind>,
    pub is_available: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub city: Option<String>,
}

impl ProductQuery {
    pub(crate) fn apply(&self, spec: RequestSpec) -> RequestSpec {
        spec.query("type", self.kind.map(|k| k.to_string()))
            .query("isAvailable", self.is_available)
            .query("limit", self.limit)
            .query("offset", self.offset)
            .query("city", self.city.clone())
    }
}

/// Body for `/api/v2/product/update-status`. Unset flags are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    pub active: Option<bool>,
    pub in_stock: Option<bool>,
    pub is_ready: Option<bool>,
}

impl StatusFlags {
    pub(crate) fn to_body(self, id: u64) -> Value {
        let mut body = Map::new();
        body.insert("id".into(), Value::from(id));
        if let Some(active) = self.active {
            body.insert("active".into(), Value::from(if active { "Y" } else { "N" }));
        }
        if let Some(in_stock) = self.in_stock {
            body.insert("in_stock".into(), Value::from(if in_stock { "1" } else { "0" }));
        }
        if let Some(is_ready) = self.is_ready {
            body.insert("is_ready".into(), Value::from(if is_ready { "1" } else { "0" }));
        }
        Value::Object(body)
    }
}

/// `{success, urls}` from `/api/v2/uploads/images`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImages {
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Body for `/api/v2/product/create`. Unset fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(rename = "type")]
    pub kind: ProductKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<u64>,
    /// Owner's external (`XML_ID`) code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl NewProduct {
    pub fn new(kind: ProductKind) -> Self {
        Self {
            kind,
            title: None,
            price: None,
            percent: None,
            images: Vec::new(),
            video: None,
            width: None,
            height: None,
            owner_id: None,
            owner: None,
        }
    }
}

/// Price write: an absolute price, a markup percent, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceChange {
    pub price: Option<f64>,
    pub percent: Option<f64>,
}

impl PriceChange {
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.percent.is_none()
    }

    pub(crate) fn to_body(self, id: u64) -> Value {
        let mut body = Map::new();
        body.insert("id".into(), Value::from(id));
        if let Some(price) = self.price {
            body.insert("price".into(), Value::from(price));
        }
        if let Some(percent) = self.percent {
            body.insert("percent".into(), Value::from(percent));
        }
        Value::Object(body)
    }
}

/// Size write. The backend wants both dimensions as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductProperties {
    pub width: Option<String>,
    pub height: Option<String>,
}

impl ProductProperties {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }

    pub(crate) fn to_body(&self, id: u64) -> Value {
        let mut body = Map::new();
        body.insert("id".into(), Value::from(id));
        if let Some(width) = &self.width {
            body.insert("width".into(), Value::from(width.as_str()));
        }
        if let Some(height) = &self.height {
            body.insert("height".into(), Value::from(height.as_str()));
        }
        Value::Object(body)
    }
}

/// `{success, url}` from `/api/v2/uploads/videos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedVideo {
    #[serde(default)]
    pub url: Option<String>,
}

// ── Orders ───────────────────────────────────────────────────────────

/// Order workflow stage. Serialized with the front-end names; the
/// backend's own codes are reached through [`OrderStatus::code`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    New,
    Paid,
    Accepted,
    Assembled,
    InTransit,
    Completed,
}

impl OrderStatus {
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::Paid,
        Self::Accepted,
        Self::Assembled,
        Self::InTransit,
        Self::Completed,
    ];

    /// Backend status code (`N`, `PD`, `AP`, `CO`, `DE`, `F`).
    pub fn code(self) -> &'static str {
        match self {
            Self::New => "N",
            Self::Paid => "PD",
            Self::Accepted => "AP",
            Self::Assembled => "CO",
            Self::InTransit => "DE",
            Self::Completed => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Accepts either spelling: a backend code or a front-end name.
    pub fn parse_any(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::from_code(raw).or_else(|| raw.parse().ok())
    }
}

/// Row of the normalized `/api/v2/orders` listing. Personal data is
/// masked server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryDto {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub number: Option<String>,
    /// Front-end status name.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "status_id")]
    pub status_id: Option<String>,
    #[serde(default)]
    pub delivery_city: Option<String>,
    #[serde(default)]
    pub delivery_address_short: Option<String>,
    #[serde(default)]
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub recipient_masked: Option<String>,
    #[serde(default)]
    pub recipient_phone_masked: Option<String>,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub payment_amount: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub executors: Vec<OrderExecutorDto>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderExecutorDto {
    #[serde(default)]
    pub name: Option<String>,
}

/// `data` of `/api/v2/orders`. Deployments that have not switched to the
/// normalized rows still answer with the legacy `{orders}` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderListBody {
    Normalized(Vec<OrderSummaryDto>),
    Legacy { orders: Vec<LegacyShopOrder> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProductDto {
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub composition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub product_title: Option<String>,
    #[serde(default, deserialize_with = "flexible_u64_opt")]
    pub quantity: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPartyDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaymentDto {
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub amount: Option<String>,
    /// `paid` or `unpaid`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStaffDto {
    #[serde(default)]
    pub florist: Option<String>,
    #[serde(default)]
    pub courier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHistoryDto {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `/api/v2/orders/detail/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailDto {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// `delivery` or `pickup`.
    #[serde(default)]
    pub delivery_type: Option<String>,
    #[serde(default)]
    pub delivery_city: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub selected_product: Option<OrderProductDto>,
    #[serde(default)]
    pub additional_items: Vec<OrderItemDto>,
    #[serde(default)]
    pub recipient: Option<OrderPartyDto>,
    #[serde(default)]
    pub sender: Option<OrderPartyDto>,
    #[serde(default)]
    pub postcard: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub anonymous: bool,
    #[serde(default)]
    pub payment: Option<OrderPaymentDto>,
    #[serde(default)]
    pub executor: Option<OrderStaffDto>,
    #[serde(default)]
    pub photo_before_delivery: Option<String>,
    #[serde(default)]
    pub history: Vec<OrderHistoryDto>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// `/api/v2/order/allowed-statuses`. Values are backend codes or
/// front-end names depending on the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedStatusesDto {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub allowed: Vec<String>,
}

// ── Inventory ────────────────────────────────────────────────────────

pub const DEFAULT_INVENTORY_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filters for `/api/v2/inventory/`. `limit` defaults to 20.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub search: Option<String>,
    pub flower: Option<String>,
    pub service: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub min_quantity: Option<u32>,
}

impl InventoryQuery {
    pub(crate) fn apply(&self, spec: RequestSpec) -> RequestSpec {
        spec.query("limit", self.limit.unwrap_or(DEFAULT_INVENTORY_LIMIT))
            .query("offset", self.offset)
            .query("search", self.search.clone())
            .query("flower", self.flower.clone())
            .query("service", self.service)
            .query("sort_by", self.sort_by.clone())
            .query("sort_order", self.sort_order.map(|o| o.to_string()))
            .query("min_quantity", self.min_quantity)
    }
}

/// Stock position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItemDto {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "flexible_f64_opt")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64_opt")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64_opt")]
    pub markup: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub service: bool,
    #[serde(default)]
    pub flower: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub deactivate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum InventoryOperation {
    Acceptance,
    WriteOff,
    Deactivate,
    Consumption,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMovementDto {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64_opt")]
    pub quantity: Option<f64>,
}

/// One stock movement touching an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryHistoryDto {
    pub operation: InventoryOperation,
    #[serde(default)]
    pub data: Vec<InventoryMovementDto>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub shop_id: Option<String>,
    /// A string id, or `false` when the movement has no order.
    #[serde(default, deserialize_with = "flexible_string_opt")]
    pub order_id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn product_keeps_unknown_fields() {
        let product: ProductDto = serde_json::from_value(json!({
            "id": 7,
            "title": "Пионы",
            "price": 25000,
            "isAvailable": true,
            "createdAt": "-0001-11-30T00:00:00+00:00",
            "type": "vitrina",
            "width": "40"
        }))
        .unwrap();

        assert_eq!(product.price.as_deref(), Some("25000"));
        assert_eq!(product.kind, Some(ProductKind::Vitrina));
        assert_eq!(product.extra.get("width"), Some(&json!("40")));
    }

    #[test]
    fn status_flags_omit_unset_fields() {
        let flags = StatusFlags {
            active: Some(false),
            in_stock: None,
            is_ready: Some(true),
        };
        assert_eq!(
            flags.to_body(12),
            json!({"id": 12, "active": "N", "is_ready": "1"})
        );
    }

    #[test]
    fn product_kind_parses_from_cli_text() {
        assert_eq!("catalog".parse::<ProductKind>().unwrap(), ProductKind::Catalog);
        assert_eq!(ProductKind::Vitrina.to_string(), "vitrina");
    }

    #[test]
    fn order_status_codes_and_names() {
        assert_eq!(OrderStatus::InTransit.to_string(), "in-transit");
        assert_eq!(OrderStatus::InTransit.code(), "DE");
        assert_eq!(OrderStatus::parse_any("PD"), Some(OrderStatus::Paid));
        assert_eq!(OrderStatus::parse_any("completed"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse_any("XX"), None);
    }

    #[test]
    fn order_list_body_accepts_both_shapes() {
        let normalized: OrderListBody =
            serde_json::from_value(json!([{"id": 1, "status": "paid"}])).unwrap();
        assert!(matches!(normalized, OrderListBody::Normalized(ref rows) if rows.len() == 1));

        let legacy: OrderListBody =
            serde_json::from_value(json!({"orders": [{"id": "2", "status_id": "N"}]})).unwrap();
        assert!(matches!(legacy, OrderListBody::Legacy { ref orders } if orders[0].id == 2));
    }

    #[test]
    fn history_order_id_false_means_none() {
        let entry: InventoryHistoryDto = serde_json::from_value(json!({
            "operation": "writeOff",
            "data": [{"id": 3, "name": "Роза", "quantity": 5}],
            "date": "2024-03-12 10:00:00",
            "user": null,
            "shopId": "17",
            "orderId": false
        }))
        .unwrap();
        assert_eq!(entry.operation, InventoryOperation::WriteOff);
        assert_eq!(entry.order_id, None);
        assert_eq!(entry.shop_id.as_deref(), Some("17"));
    }

    #[test]
    fn new_product_body_skips_unset_fields() {
        let mut product = NewProduct::new(ProductKind::Catalog);
        product.title = Some("Пионы".into());
        product.owner_id = Some(12);
        assert_eq!(
            serde_json::to_value(&product).unwrap(),
            json!({"type": "catalog", "title": "Пионы", "ownerId": 12})
        );
    }

    #[test]
    fn inventory_query_defaults_limit() {
        let spec = InventoryQuery::default().apply(RequestSpec::get("/x"));
        assert_eq!(
            spec.query_params().get("limit"),
            Some(&crate::request::QueryValue::Int(20))
        );
        assert_eq!(spec.query_params().get("search"), Some(&crate::request::QueryValue::Null));
    }
}
