// ── Order book ──
//
// The order list comes from `/api/v2/orders`, which answers with either
// normalized rows or the legacy `{orders}` object, and falls back to the
// old `/order/order-list` endpoint. Neither source reliably honours the
// status filter, so rows are filtered again here.

use futures_util::future::BoxFuture;
use tracing::{debug, info};

use petal_api::v2::OrderListBody;
use petal_api::{LegacyApi, Pagination, V2Api};

use crate::convert::{shop_order_from_detail, shop_order_from_legacy, shop_order_from_summary};
use crate::error::CoreError;
use crate::fallback::{FallbackChain, Resolution, Strategy};
use crate::model::{OrderListQuery, OrderListing, OrderStatus, ShopOrder, StatusOptions};

fn keep_status(orders: &mut Vec<ShopOrder>, status: Option<OrderStatus>) {
    if let Some(status) = status {
        orders.retain(|o| o.status == status);
    }
}

// ── v2 listing ─────────────────────────────────────────────────────

pub struct V2Orders {
    api: V2Api,
}

impl V2Orders {
    pub const NAME: &str = "v2";

    pub fn new(api: V2Api) -> Self {
        Self { api }
    }

    async fn run(&self, query: OrderListQuery) -> Result<OrderListing, CoreError> {
        let (body, pagination) = self
            .api
            .list_orders(query.limit, query.offset, query.status)
            .await?;
        let mut orders: Vec<ShopOrder> = match &body {
            OrderListBody::Normalized(rows) => rows.iter().map(shop_order_from_summary).collect(),
            OrderListBody::Legacy { orders } => orders.iter().map(shop_order_from_legacy).collect(),
        };
        let received = orders.len();
        keep_status(&mut orders, query.status);
        let pagination = pagination.unwrap_or_else(|| Pagination {
            total: Some(u64::try_from(received).unwrap_or(u64::MAX)),
            limit: Some(u64::from(query.limit)),
            offset: Some(u64::from(query.offset)),
            ..Pagination::default()
        });
        Ok(OrderListing {
            orders,
            pagination: Some(pagination),
        })
    }
}

impl Strategy<OrderListQuery, OrderListing> for V2Orders {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn fetch<'a>(&'a self, query: &'a OrderListQuery) -> BoxFuture<'a, Result<OrderListing, CoreError>> {
        Box::pin(self.run(*query))
    }
}

// ── Legacy listing ─────────────────────────────────────────────────

pub struct LegacyOrders {
    api: LegacyApi,
}

impl LegacyOrders {
    pub const NAME: &str = "legacy";

    pub fn new(api: LegacyApi) -> Self {
        Self { api }
    }

    /// The old endpoint has no pagination block; the window is all there is.
    async fn run(&self, query: OrderListQuery) -> Result<OrderListing, CoreError> {
        let rows = self.api.order_list(query.limit, query.offset).await?;
        let mut orders: Vec<ShopOrder> = rows.iter().map(shop_order_from_legacy).collect();
        keep_status(&mut orders, query.status);
        let pagination = Pagination {
            total: Some(u64::try_from(orders.len()).unwrap_or(u64::MAX)),
            limit: Some(u64::from(query.limit)),
            offset: Some(u64::from(query.offset)),
            has_more: Some(false),
            ..Pagination::default()
        };
        Ok(OrderListing {
            orders,
            pagination: Some(pagination),
        })
    }
}

impl Strategy<OrderListQuery, OrderListing> for LegacyOrders {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn fetch<'a>(&'a self, query: &'a OrderListQuery) -> BoxFuture<'a, Result<OrderListing, CoreError>> {
        Box::pin(self.run(*query))
    }
}

// ── Book ───────────────────────────────────────────────────────────

/// Order reads and the status workflow.
pub struct OrderBook {
    chain: FallbackChain<OrderListQuery, OrderListing>,
    v2: V2Api,
}

impl OrderBook {
    /// Standard v2 → legacy chain.
    pub fn new(v2: V2Api, legacy: LegacyApi) -> Self {
        let chain = FallbackChain::new()
            .then(V2Orders::new(v2.clone()))
            .then(LegacyOrders::new(legacy));
        Self { chain, v2 }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.chain.strategy_names()
    }

    pub async fn list(&self, query: OrderListQuery) -> Result<Resolution<OrderListing>, CoreError> {
        let resolved = self.chain.resolve(&query).await?;
        debug!(
            strategy = resolved.strategy,
            rows = resolved.value.orders.len(),
            "orders resolved"
        );
        Ok(resolved)
    }

    pub async fn get(&self, id: u64) -> Result<ShopOrder, CoreError> {
        self.v2
            .order_detail(id)
            .await
            .map(|detail| shop_order_from_detail(&detail))
            .map_err(|e| CoreError::from(e).or_not_found("order", id))
    }

    /// Statuses the order may move to. Unknown names are dropped.
    pub async fn allowed_statuses(&self, id: u64) -> Result<StatusOptions, CoreError> {
        let dto = self
            .v2
            .allowed_statuses(id)
            .await
            .map_err(|e| CoreError::from(e).or_not_found("order", id))?;
        Ok(StatusOptions {
            id: dto.id,
            current: dto.current.as_deref().and_then(OrderStatus::parse_any),
            allowed: dto
                .allowed
                .iter()
                .filter_map(|s| OrderStatus::parse_any(s))
                .collect(),
        })
    }

    /// Move an order along the workflow. A blank comment is not sent.
    pub async fn change_status(
        &self,
        id: u64,
        status: OrderStatus,
        comment: Option<&str>,
    ) -> Result<(), CoreError> {
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        self.v2
            .change_order_status(id, status, comment)
            .await
            .map_err(|e| CoreError::from(e).or_not_found("order", id))?;
        info!(order = id, %status, "order status changed");
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<(), CoreError> {
        self.v2
            .delete_order(id)
            .await
            .map_err(|e| CoreError::from(e).or_not_found("order", id))?;
        info!(order = id, "order deleted");
        Ok(())
    }
}
