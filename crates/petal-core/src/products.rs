// ── Product catalog ──
//
// The v2 listing is the primary source. Its `createdAt` is often a
// placeholder or a bare date, so each page is reconciled against the
// legacy product list (bulk, same filter) and then the detail endpoint
// (one call per product the bulk list did not fix).

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use serde::Serialize;
use tracing::debug;

use petal_api::v2::{NewProduct, PriceChange, ProductDto, ProductProperties, ProductQuery, StatusFlags};
use petal_api::{LegacyApi, MultipartPart, Pagination, V2Api};

use crate::error::CoreError;
use crate::model::{Product, ProductFilter};
use crate::reconcile::{PatchSource, PatchTarget, Reconciler};
use crate::timestamp::{TimestampCheck, normalize};

/// One reconciled page of products.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl PatchTarget for ProductDto {
    type Id = u64;
    type Field = String;

    fn patch_id(&self) -> u64 {
        self.id
    }

    fn apply_patch(&mut self, field: String) {
        self.created_at = Some(field);
    }
}

/// `created_at` values from the legacy list (bulk) and detail (point).
struct CreatedAtSource<'a> {
    v2: &'a V2Api,
    legacy: &'a LegacyApi,
    check: TimestampCheck,
}

impl CreatedAtSource<'_> {
    /// First usable stamp, normalized to RFC 3339.
    fn pick(&self, candidates: [Option<&str>; 2]) -> Option<String> {
        candidates
            .into_iter()
            .flatten()
            .filter(|raw| !self.check.is_invalid(Some(*raw)))
            .find_map(normalize)
    }
}

impl PatchSource<ProductDto> for CreatedAtSource<'_> {
    type Filter = ProductQuery;

    fn bulk<'b>(
        &'b self,
        filter: &'b ProductQuery,
    ) -> BoxFuture<'b, Result<HashMap<u64, String>, CoreError>> {
        Box::pin(async move {
            let items = self.legacy.product_list(filter).await?;
            let stamps: HashMap<u64, String> = items
                .iter()
                .filter_map(|item| {
                    self.pick([item.created_at.as_deref(), item.updated_at.as_deref()])
                        .map(|stamp| (item.id, stamp))
                })
                .collect();
            debug!(rows = items.len(), usable = stamps.len(), "legacy created_at list");
            Ok(stamps)
        })
    }

    fn point<'b>(&'b self, id: u64) -> BoxFuture<'b, Result<Option<String>, CoreError>> {
        Box::pin(async move {
            let detail = self.v2.product_detail(id).await?;
            Ok(self.pick([detail.created_at.as_deref(), None]))
        })
    }
}

/// Product reads and writes for one tenant.
pub struct ProductCatalog {
    v2: V2Api,
    legacy: LegacyApi,
    reconciler: Reconciler,
    check: TimestampCheck,
    city: String,
}

impl ProductCatalog {
    pub fn new(v2: V2Api, legacy: LegacyApi, reconciler: Reconciler, city: impl Into<String>) -> Self {
        Self {
            v2,
            legacy,
            reconciler,
            check: TimestampCheck::products(),
            city: city.into(),
        }
    }

    /// Replace the `created_at` validity check.
    #[must_use]
    pub fn with_check(mut self, check: TimestampCheck) -> Self {
        self.check = check;
        self
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// One page of products with `created_at` healed where possible.
    pub async fn list(&self, filter: ProductFilter) -> Result<ProductPage, CoreError> {
        let query = filter.to_query(&self.city);
        let (rows, pagination) = self.v2.list_products(&query).await?;

        let source = CreatedAtSource {
            v2: &self.v2,
            legacy: &self.legacy,
            check: self.check,
        };
        let check = self.check;
        let rows = self
            .reconciler
            .reconcile(
                rows,
                |p: &ProductDto| check.is_invalid(p.created_at.as_deref()),
                &source,
                &query,
            )
            .await;

        Ok(ProductPage {
            products: rows.into_iter().map(Product::from).collect(),
            pagination,
        })
    }

    pub async fn get(&self, id: u64) -> Result<Product, CoreError> {
        self.v2
            .product_detail(id)
            .await
            .map(Product::from)
            .map_err(|e| CoreError::from(e).or_not_found("product", id))
    }

    /// Toggle availability flags. Never retried.
    pub async fn set_status(&self, id: u64, flags: StatusFlags) -> Result<(), CoreError> {
        self.v2.update_product_status(id, flags).await?;
        Ok(())
    }

    /// Upload product images, returning their public URLs.
    pub async fn upload_images(&self, files: Vec<MultipartPart>) -> Result<Vec<String>, CoreError> {
        Ok(self.v2.upload_images(files).await?.urls)
    }

    /// Upload one video, returning its public URL.
    pub async fn upload_video(&self, file: MultipartPart) -> Result<String, CoreError> {
        self.v2
            .upload_video(file)
            .await?
            .url
            .ok_or_else(|| CoreError::InvalidResponse {
                message: "video upload returned no url".into(),
            })
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Create a product. Returns the new id when the backend reports one.
    pub async fn create(&self, product: &NewProduct) -> Result<Option<u64>, CoreError> {
        if product.price.is_some_and(|p| p < 0.0) {
            return Err(CoreError::InvalidInput {
                field: "price",
                reason: "must not be negative".into(),
            });
        }
        let id = self.v2.create_product(product).await?;
        debug!(?id, kind = %product.kind, "product created");
        Ok(id)
    }

    pub async fn delete(&self, id: u64) -> Result<(), CoreError> {
        self.v2
            .delete_product(id)
            .await
            .map_err(|e| CoreError::from(e).or_not_found("product", id))
    }

    /// Set an absolute price or a percentage markup.
    pub async fn set_price(&self, id: u64, change: PriceChange) -> Result<(), CoreError> {
        if change.is_empty() {
            return Err(CoreError::InvalidInput {
                field: "price",
                reason: "give a price or a percent".into(),
            });
        }
        if change.price.is_some_and(|p| p < 0.0) {
            return Err(CoreError::InvalidInput {
                field: "price",
                reason: "must not be negative".into(),
            });
        }
        self.v2
            .set_product_price(id, change)
            .await
            .map_err(|e| CoreError::from(e).or_not_found("product", id))
    }

    /// Update bouquet dimensions.
    pub async fn update_properties(
        &self,
        id: u64,
        props: &ProductProperties,
    ) -> Result<(), CoreError> {
        if props.is_empty() {
            return Err(CoreError::InvalidInput {
                field: "properties",
                reason: "give a width or a height".into(),
            });
        }
        self.v2
            .update_product_properties(id, props)
            .await
            .map_err(|e| CoreError::from(e).or_not_found("product", id))
    }
}
