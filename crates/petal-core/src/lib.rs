//! Resilient data access for the flower-shop back office.
//!
//! Sits between `petal-api` and its consumers (the `petal` CLI) and turns
//! an inconsistent two-family backend into complete, typed results:
//!
//! - **[`Backoffice`]**: Facade built from a [`BackendConfig`]. Owns the
//!   shared `RequestExecutor` (retries, circuit breaker, GET de-duplication),
//!   the per-customer orders cache, and the services below. Cheaply
//!   cloneable.
//!
//! - **[`CustomerDirectory`]**: Customers with statistics through a
//!   [`FallbackChain`]: the aggregated v2 endpoint, then the legacy list
//!   plus per-customer orders fetched by the [`BatchAggregator`], then a
//!   small static table for detail lookups. Customers whose orders could
//!   not be loaded come back zeroed and flagged `degraded`.
//!
//! - **[`ProductCatalog`]**: v2 product listing with `created_at` healed by
//!   the [`Reconciler`] from the legacy list and the detail endpoint, plus
//!   product writes (create, delete, price, dimensions, media uploads).
//!
//! - **[`OrderBook`]**: Shop orders from the v2 list with the old order
//!   list as fallback, the order card, and the status workflow.
//!
//! - **[`Inventory`]**: Stock positions, name search and movement history.
//!
//! - **Building blocks**: [`EntityCache`] (lazy-expiry TTL cache),
//!   [`BatchAggregator`] (chunked bounded concurrency), [`FallbackChain`]
//!   (first-success-wins strategies), [`Reconciler`] (bulk-then-point
//!   field patching), and [`TimestampCheck`] (pluggable validity predicate).

pub mod backoffice;
pub mod batch;
pub mod cache;
pub mod config;
pub mod convert;
pub mod customers;
pub mod error;
pub mod fallback;
pub mod inventory;
pub mod model;
pub mod orders;
pub mod products;
pub mod reconcile;
pub mod timestamp;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backoffice::Backoffice;
pub use batch::{BatchAggregator, BatchFailure, BatchItemResult, Outcome};
pub use cache::{CacheStats, EntityCache};
pub use config::BackendConfig;
pub use customers::{CustomerDirectory, DEFAULT_SUMMARY_SAMPLE, OrdersCache, StaticDirectory};
pub use error::CoreError;
pub use fallback::{FallbackChain, FallbackQuery, FallbackResult, Resolution, Strategy};
pub use inventory::Inventory;
pub use model::{
    Customer, CustomerListing, CustomerQuery, CustomerStats, CustomerStatus, CustomerSummary,
    DeliveryType, InventoryCategory, InventoryItem, InventoryOperation, InventoryPage, Order,
    OrderLine, OrderListQuery, OrderListing, OrderStatus, Party, Payment, Product,
    ProductFilter, ShopOrder, SortOrder, StatusOptions, StockHistory, StockMovement,
};
pub use orders::OrderBook;
pub use products::{ProductCatalog, ProductPage};
pub use reconcile::{PatchSource, PatchTarget, Provenance, Reconciled, Reconciler};
pub use timestamp::TimestampCheck;

// Wire-level types consumers need to build requests.
pub use petal_api::v2::{
    InventoryQuery, NewProduct, PriceChange, ProductKind, ProductProperties, StatusFlags,
};
pub use petal_api::{MultipartPart, Pagination};
