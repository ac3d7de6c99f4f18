// Legacy order list

use crate::error::Error;
use crate::legacy::client::LegacyApi;
use crate::legacy::models::{LegacyOrderList, LegacyShopOrder};
use crate::request::RequestSpec;

const ORDER_LIST_PATH: &str = "/api/v2/order/order-list";

impl LegacyApi {
    /// `GET /api/v2/order/order-list` -- `{status, data: {orders}}`, no
    /// pagination and no server-side status filter.
    pub async fn order_list(&self, limit: u32, offset: u32) -> Result<Vec<LegacyShopOrder>, Error> {
        let spec = RequestSpec::get(ORDER_LIST_PATH)
            .query("limit", limit)
            .query("offset", offset);
        let list: LegacyOrderList = self.executor().fetch(&spec).await?;
        Ok(list.orders)
    }
}
