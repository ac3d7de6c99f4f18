// ── Backoffice facade ──
//
// Wires one `RequestExecutor` into both endpoint families and builds the
// customer directory, product catalog, order book and inventory on top. The orders cache is
// created here once and lives as long as the facade.

use std::sync::Arc;

use tracing::info;

use petal_api::{LegacyApi, MetricsSink, RequestExecutor, V2Api};

use crate::batch::BatchAggregator;
use crate::cache::{CacheStats, EntityCache};
use crate::config::BackendConfig;
use crate::customers::{CustomerDirectory, OrdersCache};
use crate::error::CoreError;
use crate::inventory::Inventory;
use crate::orders::OrderBook;
use crate::products::ProductCatalog;
use crate::reconcile::Reconciler;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<BackofficeInner>`.
#[derive(Clone)]
pub struct Backoffice {
    inner: Arc<BackofficeInner>,
}

struct BackofficeInner {
    config: BackendConfig,
    executor: Arc<RequestExecutor>,
    customers: CustomerDirectory,
    products: ProductCatalog,
    orders: OrderBook,
    inventory: Inventory,
    orders_cache: Arc<OrdersCache>,
}

impl Backoffice {
    /// Validate `config` and build the HTTP client.
    pub fn new(config: BackendConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let executor = RequestExecutor::new(
            config.base_url.clone(),
            config.access_token.clone(),
            &config.transport(),
        )?
        .with_policy(config.retry_policy())
        .with_breaker(config.circuit_breaker());
        Ok(Self::from_executor(config, executor))
    }

    /// Build on a prepared executor (custom client, sleeper, or metrics).
    pub fn from_executor(config: BackendConfig, executor: RequestExecutor) -> Self {
        let executor = Arc::new(executor);
        let v2 = V2Api::new(executor.clone());
        let legacy = LegacyApi::new(executor.clone());
        let batch = BatchAggregator::new(config.batch_size, config.item_timeout);
        let orders_cache: Arc<OrdersCache> = Arc::new(EntityCache::new(config.cache_ttl));

        let customers = CustomerDirectory::new(
            v2.clone(),
            legacy.clone(),
            batch,
            orders_cache.clone(),
            config.orders_per_customer,
        );
        let products = ProductCatalog::new(
            v2.clone(),
            legacy.clone(),
            Reconciler::new(batch),
            config.city_id.clone(),
        );
        let orders = OrderBook::new(v2.clone(), legacy);
        let inventory = Inventory::new(v2);

        info!(
            base_url = %config.base_url,
            city = %config.city_id,
            strategies = ?customers.strategy_names(),
            order_strategies = ?orders.strategy_names(),
            breaker_threshold = executor.breaker().threshold(),
            "backoffice ready"
        );

        Self {
            inner: Arc::new(BackofficeInner {
                config,
                executor,
                customers,
                products,
                orders,
                inventory,
                orders_cache,
            }),
        }
    }

    /// Same as [`Backoffice::new`] with a custom metrics sink.
    pub fn with_metrics(
        config: BackendConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let executor = RequestExecutor::new(
            config.base_url.clone(),
            config.access_token.clone(),
            &config.transport(),
        )?
        .with_policy(config.retry_policy())
        .with_breaker(config.circuit_breaker())
        .with_metrics(metrics);
        Ok(Self::from_executor(config, executor))
    }

    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.inner.executor
    }

    pub fn customers(&self) -> &CustomerDirectory {
        &self.inner.customers
    }

    pub fn products(&self) -> &ProductCatalog {
        &self.inner.products
    }

    pub fn orders(&self) -> &OrderBook {
        &self.inner.orders
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inner.inventory
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.orders_cache.stats()
    }

    pub fn clear_cache(&self) {
        self.inner.orders_cache.clear();
    }
}
