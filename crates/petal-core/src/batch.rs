// ── Bounded-concurrency batch fetch ──
//
// Runs a per-id fetch over a list of ids in consecutive chunks. Items in
// a chunk run concurrently; chunks run one after another, so at most
// `batch_size` fetches are ever in flight. Every input id yields exactly
// one result, in input order, with failures captured as data.

use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::cache::EntityCache;
use crate::error::CoreError;

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(10);

/// Why an item produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchFailure {
    /// The per-item deadline elapsed.
    TimedOut(Duration),
    /// The fetch returned an error.
    Fetch { message: String, transport: bool },
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimedOut(after) => write!(f, "timed out after {}ms", after.as_millis()),
            Self::Fetch { message, .. } => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failed(BatchFailure),
}

/// Result for one input id.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItemResult<I, T> {
    pub id: I,
    pub outcome: Outcome<T>,
}

impl<I, T> BatchItemResult<I, T> {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(v) => Some(v),
            Outcome::Failed(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self.outcome {
            Outcome::Success(v) => Some(v),
            Outcome::Failed(_) => None,
        }
    }
}

/// Chunked fetch runner with a fixed chunk size and per-item deadline.
#[derive(Debug, Clone, Copy)]
pub struct BatchAggregator {
    batch_size: usize,
    item_timeout: Duration,
}

impl Default for BatchAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_ITEM_TIMEOUT)
    }
}

impl BatchAggregator {
    /// A `batch_size` of zero is treated as one.
    pub fn new(batch_size: usize, item_timeout: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            item_timeout,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn item_timeout(&self) -> Duration {
        self.item_timeout
    }

    /// Fetch every id, `batch_size` at a time.
    ///
    /// With a cache, hits skip `fetch_one` entirely and successes are
    /// stored. The output always has `ids.len()` entries in input order.
    pub async fn run_batched<I, T, F, Fut>(
        &self,
        ids: &[I],
        fetch_one: F,
        cache: Option<&EntityCache<I, T>>,
    ) -> Vec<BatchItemResult<I, T>>
    where
        I: Clone + Eq + Hash + Debug,
        T: Clone,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut results = Vec::with_capacity(ids.len());

        for (index, chunk) in ids.chunks(self.batch_size).enumerate() {
            debug!(chunk = index, size = chunk.len(), "fetching batch chunk");
            let chunk_results = join_all(
                chunk
                    .iter()
                    .map(|id| self.run_one(id.clone(), &fetch_one, cache)),
            )
            .await;
            results.extend(chunk_results);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        if failed > 0 {
            warn!(failed, total = results.len(), "batch finished with failures");
        }
        results
    }

    async fn run_one<I, T, F, Fut>(
        &self,
        id: I,
        fetch_one: &F,
        cache: Option<&EntityCache<I, T>>,
    ) -> BatchItemResult<I, T>
    where
        I: Clone + Eq + Hash + Debug,
        T: Clone,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        if let Some(hit) = cache.and_then(|c| c.get(&id)) {
            return BatchItemResult {
                id,
                outcome: Outcome::Success(hit),
            };
        }

        let outcome = match tokio::time::timeout(self.item_timeout, fetch_one(id.clone())).await {
            Ok(Ok(value)) => {
                if let Some(cache) = cache {
                    cache.put(id.clone(), value.clone());
                }
                Outcome::Success(value)
            }
            Ok(Err(e)) => {
                warn!(?id, error = %e, "batch item failed");
                Outcome::Failed(BatchFailure::Fetch {
                    message: e.to_string(),
                    transport: e.is_transport(),
                })
            }
            Err(_) => {
                warn!(?id, timeout_ms = self.item_timeout.as_millis(), "batch item timed out");
                Outcome::Failed(BatchFailure::TimedOut(self.item_timeout))
            }
        };
        BatchItemResult { id, outcome }
    }
}
