// Legacy endpoint methods
//
// Thin typed wrappers over `RequestExecutor`: each method builds a
// `RequestSpec`, runs it, and decodes the payload into wire models.

use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::executor::RequestExecutor;
use crate::legacy::models::{CustomerOrders, LegacyCustomer, LegacyProductItem, LegacyProductList};
use crate::request::RequestSpec;
use crate::v2::types::ProductQuery;

const CUSTOMERS_PATH: &str = "/api/v2/customers/";
const CUSTOMER_ORDERS_PATH: &str = "/api/v2/customers/orders.php";
const PRODUCT_LIST_PATH: &str = "/api/v2/product/list/";

/// Optional window for the customer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyPage {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Client for the legacy endpoint family.
#[derive(Debug, Clone)]
pub struct LegacyApi {
    exec: Arc<RequestExecutor>,
}

impl LegacyApi {
    pub fn new(exec: Arc<RequestExecutor>) -> Self {
        Self { exec }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.exec
    }

    /// `GET /api/v2/customers/` -- raw customer rows, no order data.
    pub async fn list_customers(&self, page: LegacyPage) -> Result<Vec<LegacyCustomer>, Error> {
        let spec = RequestSpec::get(CUSTOMERS_PATH)
            .query("limit", page.limit)
            .query("offset", page.offset);
        let customers: Vec<LegacyCustomer> = self.exec.fetch(&spec).await?;
        debug!(count = customers.len(), "legacy customer list");
        Ok(customers)
    }

    /// `GET /api/v2/customers/?phone=..` -- rows whose phone matches.
    pub async fn search_customers_by_phone(&self, phone: &str) -> Result<Vec<LegacyCustomer>, Error> {
        let spec = RequestSpec::get(CUSTOMERS_PATH).query("phone", phone);
        let customers: Vec<LegacyCustomer> = self.exec.fetch(&spec).await?;
        debug!(count = customers.len(), "legacy customer phone search");
        Ok(customers)
    }

    /// `GET /api/v2/customers/orders.php?CUSTOMER_ID=..&limit=..`
    ///
    /// Dropping the returned future aborts the request, which is how the
    /// batch aggregator's per-item deadline takes effect.
    pub async fn customer_orders(
        &self,
        customer_id: u64,
        limit: u32,
    ) -> Result<CustomerOrders, Error> {
        let spec = RequestSpec::get(CUSTOMER_ORDERS_PATH)
            .query("CUSTOMER_ID", customer_id)
            .query("limit", limit);
        self.exec.fetch(&spec).await
    }

    /// `GET /api/v2/product/list/` -- the body nests rows under
    /// `data.items`.
    pub async fn product_list(&self, query: &ProductQuery) -> Result<Vec<LegacyProductItem>, Error> {
        let spec = query.apply(RequestSpec::get(PRODUCT_LIST_PATH));
        let list: LegacyProductList = self.exec.fetch(&spec).await?;
        Ok(list.items)
    }
}
