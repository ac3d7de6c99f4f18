// ── Customer directory ──
//
// Customers with statistics, resolved through a three-step fallback:
//
//   aggregated   → `/customers/with-stats/` or `/customers/{id}/`, one call
//   legacy       → bare list, then each customer's orders via the batch
//                  aggregator and the shared orders cache (a detail
//                  lookup tries the REST orders alias first)
//   static       → fixed detail records, never used for pages
//
// Phone search and the tier summary sit beside the chain.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use petal_api::legacy::LegacyPage;
use petal_api::{LegacyApi, Pagination, V2Api};

use crate::batch::{BatchAggregator, BatchItemResult};
use crate::cache::EntityCache;
use crate::convert::{customer_from_detail, customer_from_legacy, customer_from_stats};
use crate::error::CoreError;
use crate::fallback::{FallbackChain, Resolution, Strategy};
use crate::model::{
    Customer, CustomerListing, CustomerQuery, CustomerStats, CustomerStatus, CustomerSummary, Order,
};
use crate::timestamp::parse_timestamp;

/// Per-customer orders, shared between list and detail lookups.
pub type OrdersCache = EntityCache<u64, Arc<Vec<Order>>>;

/// Rows scanned when the legacy path looks up a single customer.
const LEGACY_DETAIL_SCAN: u32 = 100;
/// Customers sampled for [`CustomerDirectory::summary`].
pub const DEFAULT_SUMMARY_SAMPLE: u32 = 500;

/// Orders for every id through the batch aggregator and the shared
/// cache; `None` where the fetch failed or timed out.
async fn batched_orders(
    api: &LegacyApi,
    batch: &BatchAggregator,
    cache: &OrdersCache,
    limit: u32,
    ids: &[u64],
) -> Vec<Option<Arc<Vec<Order>>>> {
    batch
        .run_batched(
            ids,
            |id| async move {
                let body = api.customer_orders(id, limit).await?;
                Ok::<_, CoreError>(Arc::new(body.orders.iter().map(Order::from).collect()))
            },
            Some(cache),
        )
        .await
        .into_iter()
        .map(BatchItemResult::into_value)
        .collect()
}

// ── Aggregated endpoint ────────────────────────────────────────────

pub struct AggregatedStats {
    api: V2Api,
}

impl AggregatedStats {
    pub fn new(api: V2Api) -> Self {
        Self { api }
    }

    async fn run(&self, query: CustomerQuery) -> Result<CustomerListing, CoreError> {
        let now = Utc::now();
        match query {
            CustomerQuery::Page {
                page,
                limit,
                only_with_orders,
            } => {
                let page = self
                    .api
                    .customers_with_stats(page.max(1), limit, only_with_orders)
                    .await?;
                Ok(CustomerListing {
                    customers: page
                        .customers
                        .iter()
                        .map(|c| customer_from_stats(c, now))
                        .collect(),
                    pagination: Some(page.pagination),
                })
            }
            CustomerQuery::Detail { id } => {
                let detail = self.api.customer_detail(id).await?;
                Ok(CustomerListing {
                    customers: vec![customer_from_detail(&detail, now)],
                    pagination: None,
                })
            }
        }
    }
}

impl Strategy<CustomerQuery, CustomerListing> for AggregatedStats {
    fn name(&self) -> &'static str {
        "aggregated"
    }

    fn fetch<'a>(
        &'a self,
        query: &'a CustomerQuery,
    ) -> BoxFuture<'a, Result<CustomerListing, CoreError>> {
        Box::pin(self.run(*query))
    }
}

// ── Legacy list + batched orders ───────────────────────────────────

pub struct LegacyBatched {
    api: LegacyApi,
    v2: V2Api,
    batch: BatchAggregator,
    cache: Arc<OrdersCache>,
    orders_limit: u32,
}

impl LegacyBatched {
    pub fn new(
        api: LegacyApi,
        v2: V2Api,
        batch: BatchAggregator,
        cache: Arc<OrdersCache>,
        orders_limit: u32,
    ) -> Self {
        Self {
            api,
            v2,
            batch,
            cache,
            orders_limit,
        }
    }

    async fn load_orders(&self, ids: &[u64]) -> Vec<Option<Arc<Vec<Order>>>> {
        batched_orders(&self.api, &self.batch, &self.cache, self.orders_limit, ids).await
    }

    /// One customer's orders: the REST alias, then the legacy script.
    async fn detail_orders(&self, id: u64) -> Option<Arc<Vec<Order>>> {
        match self.v2.customer_orders(id, 1, self.orders_limit).await {
            Ok((rows, _)) => Some(Arc::new(rows.iter().map(Order::from).collect())),
            Err(e) => {
                debug!(customer = id, error = %e, "orders alias failed, using legacy script");
                self.load_orders(&[id]).await.pop().flatten()
            }
        }
    }

    async fn run(&self, query: CustomerQuery) -> Result<CustomerListing, CoreError> {
        let (window, wanted, only_with_orders) = match query {
            CustomerQuery::Page {
                page,
                limit,
                only_with_orders,
            } => (
                LegacyPage {
                    limit: Some(limit),
                    offset: Some(page.max(1).saturating_sub(1).saturating_mul(limit)),
                },
                None,
                only_with_orders,
            ),
            CustomerQuery::Detail { id } => (
                LegacyPage {
                    limit: Some(LEGACY_DETAIL_SCAN),
                    offset: None,
                },
                Some(id),
                false,
            ),
        };

        let mut rows = self.api.list_customers(window).await?;
        if let Some(id) = wanted {
            rows.retain(|c| c.id == id);
            if rows.is_empty() {
                return Err(CoreError::NotFound {
                    entity: "customer",
                    identifier: id.to_string(),
                });
            }
            rows.truncate(1);
        }

        let orders = match wanted {
            Some(id) => vec![self.detail_orders(id).await],
            None => {
                let ids: Vec<u64> = rows.iter().map(|c| c.id).collect();
                self.load_orders(&ids).await
            }
        };
        let now = Utc::now();

        let mut customers: Vec<Customer> = rows
            .iter()
            .zip(orders)
            .map(|(row, orders)| customer_from_legacy(row, orders.as_deref().map(Vec::as_slice), now))
            .collect();

        let degraded = customers.iter().filter(|c| c.degraded).count();
        if degraded > 0 {
            warn!(degraded, total = customers.len(), "customers returned without statistics");
        }
        if only_with_orders {
            customers.retain(|c| c.degraded || c.stats.total_orders > 0);
        }
        if wanted.is_none() {
            // Detail rows keep their orders; list rows only need the totals.
            for customer in &mut customers {
                customer.orders.clear();
            }
        }
        Ok(CustomerListing {
            customers,
            pagination: None,
        })
    }
}

impl Strategy<CustomerQuery, CustomerListing> for LegacyBatched {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn fetch<'a>(
        &'a self,
        query: &'a CustomerQuery,
    ) -> BoxFuture<'a, Result<CustomerListing, CoreError>> {
        Box::pin(self.run(*query))
    }
}

// ── Static detail records ──────────────────────────────────────────

struct StaticRecord {
    id: u64,
    name: &'static str,
    phone: &'static str,
    email: &'static str,
    member_since: &'static str,
    total_orders: u64,
    total_spent: f64,
    last_order: &'static str,
    notes: Option<&'static str>,
}

const STATIC_RECORDS: &[StaticRecord] = &[
    StaticRecord {
        id: 1,
        name: "Анна Петрова",
        phone: "+7 (777) 123-45-67",
        email: "anna.petrova@gmail.com",
        member_since: "2023-03-15",
        total_orders: 12,
        total_spent: 156_000.0,
        last_order: "2024-08-20",
        notes: None,
    },
    StaticRecord {
        id: 469,
        name: "Чингис Алекенов",
        phone: "+77015211545",
        email: "alekenov@gmail.com",
        member_since: "2023-01-01",
        total_orders: 8,
        total_spent: 125_000.0,
        last_order: "2024-09-01",
        notes: Some("Test customer - данные из mock fallback"),
    },
];

/// Fixed records that keep a detail view usable when the backend is down.
#[derive(Debug, Default)]
pub struct StaticDirectory;

impl StaticDirectory {
    /// Strategy name reported in [`Resolution::strategy`].
    pub const NAME: &str = "static";

    pub fn lookup(id: u64) -> Option<Customer> {
        STATIC_RECORDS.iter().find(|r| r.id == id).map(|r| Customer {
            id: r.id,
            name: r.name.to_owned(),
            phone: Some(r.phone.to_owned()),
            email: Some(r.email.to_owned()),
            login: None,
            member_since: parse_timestamp(r.member_since),
            notes: r.notes.map(str::to_owned),
            address: None,
            stats: CustomerStats {
                total_orders: r.total_orders,
                total_spent: r.total_spent,
                last_order_date: parse_timestamp(r.last_order),
            },
            status: CustomerStatus::Vip,
            degraded: false,
            orders: Vec::new(),
        })
    }

    pub fn ids() -> impl Iterator<Item = u64> {
        STATIC_RECORDS.iter().map(|r| r.id)
    }
}

impl Strategy<CustomerQuery, CustomerListing> for StaticDirectory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn applies_to(&self, query: &CustomerQuery) -> bool {
        query.is_detail()
    }

    fn fetch<'a>(
        &'a self,
        query: &'a CustomerQuery,
    ) -> BoxFuture<'a, Result<CustomerListing, CoreError>> {
        let result = match *query {
            CustomerQuery::Detail { id } => {
                Self::lookup(id).ok_or_else(|| CoreError::NotFound {
                    entity: "customer",
                    identifier: id.to_string(),
                })
            }
            CustomerQuery::Page { .. } => Err(CoreError::Unsupported {
                query: format!("{query:?}"),
            }),
        };
        Box::pin(async move {
            result.map(|customer| CustomerListing {
                customers: vec![customer],
                pagination: None,
            })
        })
    }
}

// ── Directory ──────────────────────────────────────────────────────

/// Entry point for customer reads.
pub struct CustomerDirectory {
    chain: FallbackChain<CustomerQuery, CustomerListing>,
    v2: V2Api,
    legacy: LegacyApi,
    batch: BatchAggregator,
    cache: Arc<OrdersCache>,
    orders_limit: u32,
}

impl CustomerDirectory {
    /// Standard aggregated → legacy → static chain.
    pub fn new(
        v2: V2Api,
        legacy: LegacyApi,
        batch: BatchAggregator,
        cache: Arc<OrdersCache>,
        orders_limit: u32,
    ) -> Self {
        let chain = FallbackChain::new()
            .then(AggregatedStats::new(v2.clone()))
            .then(LegacyBatched::new(
                legacy.clone(),
                v2.clone(),
                batch,
                cache.clone(),
                orders_limit,
            ))
            .then(StaticDirectory);
        Self {
            chain,
            v2,
            legacy,
            batch,
            cache,
            orders_limit,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.chain.strategy_names()
    }

    /// One page of customers with statistics.
    pub async fn list(
        &self,
        page: u32,
        limit: u32,
        only_with_orders: bool,
    ) -> Result<Resolution<CustomerListing>, CoreError> {
        self.chain
            .resolve(&CustomerQuery::Page {
                page,
                limit,
                only_with_orders,
            })
            .await
    }

    /// A single customer, orders included when the source has them.
    pub async fn get(&self, id: u64) -> Result<Resolution<Customer>, CoreError> {
        let resolution = self.chain.resolve(&CustomerQuery::Detail { id }).await?;
        let customer = resolution
            .value
            .customers
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "customer",
                identifier: id.to_string(),
            })?;
        Ok(Resolution {
            value: customer,
            strategy: resolution.strategy,
        })
    }

    /// A customer's orders: the REST alias first, then the cached legacy
    /// script. The legacy path reports no pagination.
    pub async fn orders(
        &self,
        id: u64,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, Option<Pagination>), CoreError> {
        match self.v2.customer_orders(id, page.max(1), limit).await {
            Ok((rows, pagination)) => Ok((rows.iter().map(Order::from).collect(), pagination)),
            Err(e) => {
                warn!(customer = id, error = %e, "orders alias failed, using legacy script");
                self.legacy_orders(id).await.map(|orders| (orders, None))
            }
        }
    }

    async fn legacy_orders(&self, id: u64) -> Result<Vec<Order>, CoreError> {
        if let Some(hit) = self.cache.get(&id) {
            debug!(customer = id, "orders served from cache");
            return Ok(Vec::clone(&hit));
        }
        let body = self.legacy.customer_orders(id, self.orders_limit).await?;
        let orders: Vec<Order> = body.orders.iter().map(Order::from).collect();
        self.cache.put(id, Arc::new(orders.clone()));
        Ok(orders)
    }

    /// Customers whose phone matches, with statistics from their orders.
    /// A blank phone matches nobody and sends nothing.
    pub async fn search_by_phone(&self, phone: &str) -> Result<Vec<Customer>, CoreError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.legacy.search_customers_by_phone(phone).await?;
        let ids: Vec<u64> = rows.iter().map(|c| c.id).collect();
        let orders =
            batched_orders(&self.legacy, &self.batch, &self.cache, self.orders_limit, &ids).await;
        let now = Utc::now();
        debug!(matches = rows.len(), "phone search");
        Ok(rows
            .iter()
            .zip(orders)
            .map(|(row, orders)| {
                let mut customer =
                    customer_from_legacy(row, orders.as_deref().map(Vec::as_slice), now);
                customer.orders.clear();
                customer
            })
            .collect())
    }

    /// Tier counts over the first `sample` customers.
    pub async fn summary(&self, sample: u32) -> Result<Resolution<CustomerSummary>, CoreError> {
        let resolution = self.list(1, sample.max(1), false).await?;
        Ok(Resolution {
            value: CustomerSummary::from_customers(&resolution.value.customers),
            strategy: resolution.strategy,
        })
    }

    /// Forget cached orders for one customer, e.g. after an order change.
    pub fn invalidate_orders(&self, id: u64) -> bool {
        self.cache.invalidate(&id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn static_table_has_the_two_demo_customers() {
        assert_eq!(StaticDirectory::ids().collect::<Vec<_>>(), vec![1, 469]);

        let anna = StaticDirectory::lookup(1).unwrap();
        assert_eq!(anna.name, "Анна Петрова");
        assert_eq!(anna.stats.total_orders, 12);
        assert_eq!(
            anna.member_since.map(|d| d.to_rfc3339()).as_deref(),
            Some("2023-03-15T00:00:00+05:00")
        );

        let chingis = StaticDirectory::lookup(469).unwrap();
        assert_eq!(chingis.status, CustomerStatus::Vip);
        assert!(chingis.notes.unwrap().contains("mock fallback"));

        assert!(StaticDirectory::lookup(2).is_none());
    }

    #[tokio::test]
    async fn static_strategy_serves_details_only() {
        let strategy = StaticDirectory;
        let page = CustomerQuery::Page {
            page: 1,
            limit: 20,
            only_with_orders: false,
        };
        assert!(!strategy.applies_to(&page));

        let detail = CustomerQuery::Detail { id: 469 };
        let listing = strategy.fetch(&detail).await.unwrap();
        assert_eq!(listing.customers[0].id, 469);

        let missing = strategy.fetch(&CustomerQuery::Detail { id: 7 }).await;
        assert!(missing.unwrap_err().is_not_found());
    }
}
