// v2 endpoint methods

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::envelope::Pagination;
use crate::error::Error;
use crate::executor::RequestExecutor;
use crate::legacy::LegacyOrder;
use crate::request::{MultipartPart, RequestSpec};
use crate::v2::types::{
    CustomerDetail, CustomersWithStatsPage, NewProduct, PriceChange, ProductDto,
    ProductProperties, ProductQuery, StatusFlags, UploadedImages, UploadedVideo,
};

const CUSTOMERS_WITH_STATS_PATH: &str = "/api/v2/customers/with-stats/";
const PRODUCTS_PATH: &str = "/api/v2/products";
const PRODUCT_DETAIL_PATH: &str = "/api/v2/products/detail";
const PRODUCT_STATUS_PATH: &str = "/api/v2/product/update-status";
const PRODUCT_CREATE_PATH: &str = "/api/v2/product/create";
const PRODUCT_DELETE_PATH: &str = "/api/v2/products/delete";
const PRODUCT_PRICE_PATH: &str = "/api/v2/product/price";
const PRODUCT_PROPERTIES_PATH: &str = "/api/v2/product/properties";
const UPLOAD_IMAGES_PATH: &str = "/api/v2/uploads/images";
const UPLOAD_VIDEOS_PATH: &str = "/api/v2/uploads/videos";

/// Client for the v2 endpoint family.
#[derive(Debug, Clone)]
pub struct V2Api {
    exec: Arc<RequestExecutor>,
}

impl V2Api {
    pub fn new(exec: Arc<RequestExecutor>) -> Self {
        Self { exec }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.exec
    }

    // ── Customers ────────────────────────────────────────────────────

    /// One aggregated page of customers with server-computed stats.
    pub async fn customers_with_stats(
        &self,
        page: u32,
        limit: u32,
        only_with_orders: bool,
    ) -> Result<CustomersWithStatsPage, Error> {
        let spec = RequestSpec::get(CUSTOMERS_WITH_STATS_PATH)
            .query("page", page)
            .query("limit", limit)
            .query("only_with_orders", only_with_orders);
        let page: CustomersWithStatsPage = self.exec.fetch(&spec).await?;
        debug!(count = page.customers.len(), "customers with stats");
        Ok(page)
    }

    /// Customer detail with embedded orders.
    pub async fn customer_detail(&self, id: u64) -> Result<CustomerDetail, Error> {
        let spec = RequestSpec::get(format!("/api/v2/customers/{id}/"))
            .query("include_orders", true);
        self.exec.fetch(&spec).await
    }

    /// One page of a customer's orders via the REST alias. Rows carry
    /// `id`, `date`, `total` and `status_id` only.
    pub async fn customer_orders(
        &self,
        id: u64,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<LegacyOrder>, Option<Pagination>), Error> {
        let spec = RequestSpec::get(format!("/api/v2/customers/{id}/orders"))
            .query("page", page)
            .query("limit", limit);
        let payload = self.exec.send(&spec).await?;
        let pagination = payload.pagination.clone();
        Ok((payload.decode()?, pagination))
    }

    // ── Products ─────────────────────────────────────────────────────

    /// Product listing. Pagination comes back alongside the rows.
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> Result<(Vec<ProductDto>, Option<Pagination>), Error> {
        let spec = query.apply(RequestSpec::get(PRODUCTS_PATH));
        let payload = self.exec.send(&spec).await?;
        let pagination = payload.pagination.clone();
        Ok((payload.decode()?, pagination))
    }

    pub async fn product_detail(&self, id: u64) -> Result<ProductDto, Error> {
        let spec = RequestSpec::get(PRODUCT_DETAIL_PATH).query("id", id);
        self.exec.fetch(&spec).await
    }

    /// Toggle availability flags. Writes are never retried.
    pub async fn update_product_status(&self, id: u64, flags: StatusFlags) -> Result<(), Error> {
        let spec = RequestSpec::post(PRODUCT_STATUS_PATH).json(flags.to_body(id));
        self.exec.send(&spec).await.map(|_| ())
    }

    /// Create a product. Returns the new id when the backend reports one.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Option<u64>, Error> {
        let body = serde_json::to_value(product)
            .map_err(|e| Error::UnexpectedShape(e.to_string()))?;
        let spec = RequestSpec::post(PRODUCT_CREATE_PATH).json(body);
        let payload = self.exec.send(&spec).await?;
        Ok(created_id(&payload.data))
    }

    pub async fn delete_product(&self, id: u64) -> Result<(), Error> {
        let spec = RequestSpec::delete(PRODUCT_DELETE_PATH).query("id", id);
        self.exec.send(&spec).await.map(|_| ())
    }

    pub async fn set_product_price(&self, id: u64, change: PriceChange) -> Result<(), Error> {
        let spec = RequestSpec::post(PRODUCT_PRICE_PATH).json(change.to_body(id));
        self.exec.send(&spec).await.map(|_| ())
    }

    pub async fn update_product_properties(
        &self,
        id: u64,
        props: &ProductProperties,
    ) -> Result<(), Error> {
        let spec = RequestSpec::post(PRODUCT_PROPERTIES_PATH).json(props.to_body(id));
        self.exec.send(&spec).await.map(|_| ())
    }

    /// Upload images as `files[]` multipart fields.
    pub async fn upload_images(&self, files: Vec<MultipartPart>) -> Result<UploadedImages, Error> {
        let parts = files
            .into_iter()
            .map(|mut part| {
                part.name = "files[]".into();
                part
            })
            .collect();
        let spec = RequestSpec::post(UPLOAD_IMAGES_PATH).multipart(parts);
        self.exec.fetch(&spec).await
    }

    /// Upload one video as the `file` multipart field.
    pub async fn upload_video(&self, mut file: MultipartPart) -> Result<UploadedVideo, Error> {
        file.name = "file".into();
        let spec = RequestSpec::post(UPLOAD_VIDEOS_PATH).multipart(vec![file]);
        self.exec.fetch(&spec).await
    }
}

/// The create endpoint answers with a bare id, `{id}`, or `{productId}`.
fn created_id(data: &Value) -> Option<u64> {
    let as_id = |v: &Value| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    as_id(data).or_else(|| {
        ["id", "productId", "ID"]
            .iter()
            .find_map(|key| data.get(key).and_then(as_id))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn created_id_in_any_shape() {
        assert_eq!(created_id(&json!(901)), Some(901));
        assert_eq!(created_id(&json!({"id": "902"})), Some(902));
        assert_eq!(created_id(&json!({"productId": 903})), Some(903));
        assert_eq!(created_id(&json!({"success": true})), None);
    }
}
