// ── Inventory ──
//
// Stock positions and their movement history. Single-item lookups try
// the detail endpoint and then scan the first list window, since some
// deployments only expose the list.

use futures_util::future::BoxFuture;
use tracing::debug;

use petal_api::V2Api;
use petal_api::v2::{DEFAULT_INVENTORY_LIMIT, InventoryQuery};

use crate::error::CoreError;
use crate::fallback::{FallbackChain, FallbackQuery, Resolution, Strategy};
use crate::model::{InventoryItem, InventoryPage, StockHistory, StockMovement};

/// Rows the list scan looks through for one id.
pub const SCAN_WINDOW: u32 = 100;

/// Lookup of one stock position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLookup {
    pub id: u64,
}

impl FallbackQuery for ItemLookup {}

pub struct ItemDetail {
    api: V2Api,
}

impl Strategy<ItemLookup, Vec<InventoryItem>> for ItemDetail {
    fn name(&self) -> &'static str {
        "detail"
    }

    fn fetch<'a>(
        &'a self,
        query: &'a ItemLookup,
    ) -> BoxFuture<'a, Result<Vec<InventoryItem>, CoreError>> {
        Box::pin(async move {
            let item = self.api.inventory_item(query.id).await?;
            Ok(vec![InventoryItem::from(item)])
        })
    }
}

pub struct ListScan {
    api: V2Api,
}

impl Strategy<ItemLookup, Vec<InventoryItem>> for ListScan {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn fetch<'a>(
        &'a self,
        query: &'a ItemLookup,
    ) -> BoxFuture<'a, Result<Vec<InventoryItem>, CoreError>> {
        Box::pin(async move {
            let window = InventoryQuery {
                limit: Some(SCAN_WINDOW),
                ..InventoryQuery::default()
            };
            let (rows, _) = self.api.list_inventory(&window).await?;
            debug!(id = query.id, scanned = rows.len(), "inventory list scan");
            Ok(rows
                .into_iter()
                .filter(|row| row.id == query.id)
                .map(InventoryItem::from)
                .collect())
        })
    }
}

/// Inventory reads.
pub struct Inventory {
    api: V2Api,
    lookup: FallbackChain<ItemLookup, Vec<InventoryItem>>,
}

impl Inventory {
    pub fn new(api: V2Api) -> Self {
        let lookup = FallbackChain::new()
            .then(ItemDetail { api: api.clone() })
            .then(ListScan { api: api.clone() });
        Self { api, lookup }
    }

    pub async fn list(&self, query: &InventoryQuery) -> Result<InventoryPage, CoreError> {
        let (rows, pagination) = self.api.list_inventory(query).await?;
        Ok(InventoryPage {
            items: rows.into_iter().map(InventoryItem::from).collect(),
            pagination,
        })
    }

    pub async fn get(&self, id: u64) -> Result<Resolution<InventoryItem>, CoreError> {
        let resolution = self.lookup.resolve(&ItemLookup { id }).await?;
        let item = resolution
            .value
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound {
                entity: "inventory item",
                identifier: id.to_string(),
            })?;
        Ok(Resolution {
            value: item,
            strategy: resolution.strategy,
        })
    }

    /// Name search. Blank text matches nothing and sends nothing.
    pub async fn search(&self, text: &str, limit: Option<u32>) -> Result<Vec<InventoryItem>, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let query = InventoryQuery {
            search: Some(text.to_owned()),
            limit: Some(limit.unwrap_or(DEFAULT_INVENTORY_LIMIT)),
            ..InventoryQuery::default()
        };
        Ok(self.list(&query).await?.items)
    }

    pub async fn history(&self, id: u64, limit: u32, offset: u32) -> Result<StockHistory, CoreError> {
        let (rows, pagination) = self
            .api
            .inventory_history(id, limit, offset)
            .await
            .map_err(|e| CoreError::from(e).or_not_found("inventory item", id))?;
        Ok(StockHistory {
            movements: rows.into_iter().map(StockMovement::from).collect(),
            pagination,
        })
    }
}
