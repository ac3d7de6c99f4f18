// v2 endpoint family
//
// Aggregated endpoints that return server-computed statistics, product
// reads and writes with camelCase fields, orders, inventory, and media
// uploads.

pub mod client;
mod inventory;
mod orders;
pub mod types;

pub use client::V2Api;
pub use types::{
    AllowedStatusesDto, CustomerDetail, CustomerDetailOrder, CustomerWithStats,
    CustomersWithStatsPage, DEFAULT_INVENTORY_LIMIT, InventoryHistoryDto, InventoryItemDto,
    InventoryMovementDto, InventoryOperation, InventoryQuery, NewProduct, OrderDetailDto,
    OrderExecutorDto, OrderHistoryDto, OrderItemDto, OrderListBody, OrderPartyDto,
    OrderPaymentDto, OrderProductDto, OrderStaffDto, OrderStatus, OrderSummaryDto, PriceChange,
    ProductDto, ProductKind, ProductProperties, ProductQuery, SortOrder, StatusFlags,
    UploadedImages, UploadedVideo,
};
