// ── Field reconciliation ──
//
// Heals invalid fields in a primary result set from a secondary source:
//
//   1. no invalid record        → return as-is, zero extra calls
//   2. one bulk call            → id → value map for the same filter
//   3. still-invalid records    → one point lookup each, batched
//
// A patch is only kept if the record is valid afterwards. Patch-source
// failures leave the original value in place.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::batch::BatchAggregator;
use crate::error::CoreError;

/// A record with one patchable field.
pub trait PatchTarget: Clone {
    type Id: Clone + Eq + Hash + Debug + Send + Sync;
    type Field: Clone + Send;

    fn patch_id(&self) -> Self::Id;
    fn apply_patch(&mut self, field: Self::Field);
}

/// Secondary source of field values for `R`.
pub trait PatchSource<R: PatchTarget>: Send + Sync {
    /// Logical filter the bulk call is scoped to.
    type Filter: Sync;

    fn bulk<'a>(
        &'a self,
        filter: &'a Self::Filter,
    ) -> BoxFuture<'a, Result<HashMap<R::Id, R::Field>, CoreError>>;

    fn point<'a>(&'a self, id: R::Id) -> BoxFuture<'a, Result<Option<R::Field>, CoreError>>;
}

/// Where a record's final value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Untouched primary value (valid, or unpatchable).
    Primary,
    /// Healed from the bulk source.
    Bulk,
    /// Healed from a point lookup.
    Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<R> {
    pub record: R,
    pub provenance: Provenance,
}

/// Runs the bulk-then-point healing pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    points: BatchAggregator,
}

impl Reconciler {
    /// `points` bounds the concurrency of step 3.
    pub fn new(points: BatchAggregator) -> Self {
        Self { points }
    }

    /// Heal invalid records; callers see only the resulting records.
    pub async fn reconcile<R, S, P>(
        &self,
        records: Vec<R>,
        is_invalid: P,
        source: &S,
        filter: &S::Filter,
    ) -> Vec<R>
    where
        R: PatchTarget,
        S: PatchSource<R>,
        P: Fn(&R) -> bool,
    {
        self.reconcile_with_provenance(records, is_invalid, source, filter)
            .await
            .into_iter()
            .map(|r| r.record)
            .collect()
    }

    pub async fn reconcile_with_provenance<R, S, P>(
        &self,
        records: Vec<R>,
        is_invalid: P,
        source: &S,
        filter: &S::Filter,
    ) -> Vec<Reconciled<R>>
    where
        R: PatchTarget,
        S: PatchSource<R>,
        P: Fn(&R) -> bool,
    {
        let mut out: Vec<Reconciled<R>> = records
            .into_iter()
            .map(|record| Reconciled {
                record,
                provenance: Provenance::Primary,
            })
            .collect();

        let invalid: Vec<usize> = out
            .iter()
            .enumerate()
            .filter(|(_, r)| is_invalid(&r.record))
            .map(|(i, _)| i)
            .collect();
        if invalid.is_empty() {
            return out;
        }
        debug!(invalid = invalid.len(), total = out.len(), "reconciling records");

        // ── Bulk ─────────────────────────────────────────────────────
        let bulk = match source.bulk(filter).await {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "bulk patch source failed");
                HashMap::new()
            }
        };

        let mut unresolved = Vec::new();
        for index in invalid {
            let Some(slot) = out.get_mut(index) else {
                continue;
            };
            let patched = bulk
                .get(&slot.record.patch_id())
                .and_then(|field| try_patch(&slot.record, field.clone(), &is_invalid));
            match patched {
                Some(record) => {
                    slot.record = record;
                    slot.provenance = Provenance::Bulk;
                }
                None => unresolved.push(index),
            }
        }
        if unresolved.is_empty() {
            return out;
        }

        // ── Point lookups for what bulk did not cover ────────────────
        let ids: Vec<R::Id> = unresolved
            .iter()
            .filter_map(|&i| out.get(i).map(|r| r.record.patch_id()))
            .collect();
        debug!(count = ids.len(), "point lookups for uncovered records");

        let results = self
            .points
            .run_batched(
                &ids,
                |id| async move {
                    source
                        .point(id.clone())
                        .await?
                        .ok_or_else(|| CoreError::NotFound {
                            entity: "patch",
                            identifier: format!("{id:?}"),
                        })
                },
                None,
            )
            .await;

        for (index, result) in unresolved.into_iter().zip(results) {
            let Some(slot) = out.get_mut(index) else {
                continue;
            };
            if let Some(record) = result
                .into_value()
                .and_then(|field| try_patch(&slot.record, field, &is_invalid))
            {
                slot.record = record;
                slot.provenance = Provenance::Point;
            }
        }
        out
    }
}

/// Patched copy of `record`, or `None` if the patch leaves it invalid.
fn try_patch<R: PatchTarget>(
    record: &R,
    field: R::Field,
    is_invalid: &impl Fn(&R) -> bool,
) -> Option<R> {
    let mut candidate = record.clone();
    candidate.apply_patch(field);
    (!is_invalid(&candidate)).then_some(candidate)
}
