// v2 order endpoints

use tracing::debug;

use crate::envelope::Pagination;
use crate::error::Error;
use crate::request::RequestSpec;
use crate::v2::client::V2Api;
use crate::v2::types::{AllowedStatusesDto, OrderDetailDto, OrderListBody, OrderStatus};

const ORDERS_PATH: &str = "/api/v2/orders";
const ORDER_DETAIL_PATH: &str = "/api/v2/orders/detail/";
const ORDER_DELETE_PATH: &str = "/api/v2/orders/delete";
const ALLOWED_STATUSES_PATH: &str = "/api/v2/order/allowed-statuses";
const CHANGE_STATUS_PATH: &str = "/api/v2/order/change-status";

impl V2Api {
    /// One window of the order listing. `status` is sent as the backend
    /// code; some deployments ignore it, so callers filter again.
    pub async fn list_orders(
        &self,
        limit: u32,
        offset: u32,
        status: Option<OrderStatus>,
    ) -> Result<(OrderListBody, Option<Pagination>), Error> {
        let spec = RequestSpec::get(ORDERS_PATH)
            .query("limit", limit)
            .query("offset", offset)
            .query("status", status.map(OrderStatus::code));
        let payload = self.executor().send(&spec).await?;
        let pagination = payload.pagination.clone();
        let body: OrderListBody = payload.decode()?;
        debug!(
            normalized = matches!(body, OrderListBody::Normalized(_)),
            "order listing"
        );
        Ok((body, pagination))
    }

    /// Full order card. Works with and without the `{success, data}` wrapper.
    pub async fn order_detail(&self, id: u64) -> Result<OrderDetailDto, Error> {
        let spec = RequestSpec::get(ORDER_DETAIL_PATH).query("id", id);
        self.executor().fetch(&spec).await
    }

    pub async fn allowed_statuses(&self, id: u64) -> Result<AllowedStatusesDto, Error> {
        let spec = RequestSpec::get(ALLOWED_STATUSES_PATH).query("id", id);
        self.executor().fetch(&spec).await
    }

    /// Move an order to `status`. Writes are never retried.
    pub async fn change_order_status(
        &self,
        id: u64,
        status: OrderStatus,
        comment: Option<&str>,
    ) -> Result<(), Error> {
        let mut body = serde_json::json!({ "id": id, "statusId": status.code() });
        if let Some(comment) = comment {
            body["comment"] = comment.into();
        }
        let spec = RequestSpec::post(CHANGE_STATUS_PATH).json(body);
        self.executor().send(&spec).await.map(|_| ())
    }

    pub async fn delete_order(&self, id: u64) -> Result<(), Error> {
        let spec = RequestSpec::delete(ORDER_DELETE_PATH).query("id", id);
        self.executor().send(&spec).await.map(|_| ())
    }
}
