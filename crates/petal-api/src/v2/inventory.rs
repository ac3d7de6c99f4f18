// v2 inventory endpoints

use crate::envelope::Pagination;
use crate::error::Error;
use crate::request::RequestSpec;
use crate::v2::client::V2Api;
use crate::v2::types::{InventoryHistoryDto, InventoryItemDto, InventoryQuery};

const INVENTORY_PATH: &str = "/api/v2/inventory/";
const INVENTORY_HISTORY_PATH: &str = "/api/v2/inventory/history/";

impl V2Api {
    pub async fn list_inventory(
        &self,
        query: &InventoryQuery,
    ) -> Result<(Vec<InventoryItemDto>, Option<Pagination>), Error> {
        let spec = query.apply(RequestSpec::get(INVENTORY_PATH));
        let payload = self.executor().send(&spec).await?;
        let pagination = payload.pagination.clone();
        Ok((payload.decode()?, pagination))
    }

    pub async fn inventory_item(&self, id: u64) -> Result<InventoryItemDto, Error> {
        let spec = RequestSpec::get(format!("{INVENTORY_PATH}{id}/"));
        self.executor().fetch(&spec).await
    }

    /// Movements touching one item, newest first.
    pub async fn inventory_history(
        &self,
        id: u64,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<InventoryHistoryDto>, Option<Pagination>), Error> {
        let spec = RequestSpec::get(INVENTORY_HISTORY_PATH)
            .query("id", id)
            .query("limit", limit)
            .query("offset", offset);
        let payload = self.executor().send(&spec).await?;
        let pagination = payload.pagination.clone();
        Ok((payload.decode()?, pagination))
    }
}
