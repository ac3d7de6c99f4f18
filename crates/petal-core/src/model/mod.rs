// ── Domain model ──
//
// Canonical types handed to consumers. Wire shapes from both endpoint
// families are normalized into these in `convert`.

pub mod customer;
pub mod inventory;
pub mod order;
pub mod product;

pub use customer::{
    Customer, CustomerListing, CustomerQuery, CustomerStats, CustomerStatus, CustomerSummary, Order,
};
pub use product::{Product, ProductFilter};
pub use inventory::{
    InventoryCategory, InventoryItem, InventoryOperation, InventoryPage, MovementLine,
    SortOrder, StockHistory, StockMovement,
};
pub use order::{
    DeliveryType, HistoryEntry, OrderLine, OrderListQuery, OrderListing, OrderStatus, Party,
    Payment, ShopOrder, StatusOptions,
};
