// Legacy endpoint family
//
// Bitrix-era endpoints: UPPER_CASE customer fields, `{status, data}`
// envelopes, the per-customer `orders.php` script, the product list
// whose `created_at` values are authoritative, and the old order list.

pub mod client;
pub mod models;
mod orders;

pub use client::{LegacyApi, LegacyPage};
pub use models::{
    CustomerOrders, LegacyBasketItem, LegacyCustomer, LegacyOrder, LegacyOrderList,
    LegacyProductItem, LegacyProductList, LegacyShopOrder,
};
