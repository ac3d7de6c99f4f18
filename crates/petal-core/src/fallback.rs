// ── Ordered strategy fallback ──
//
// A `FallbackChain` holds an ordered list of strategies that can all
// answer the same query. They run strictly one after another; the first
// usable result wins. A strategy error is logged and skipped. An empty
// result counts as unusable when the query expects data, but is kept
// as the answer of last resort. The chain errors only when every
// applicable strategy errored.

use futures_util::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// A query the chain can judge results against.
pub trait FallbackQuery: std::fmt::Debug + Sync {
    /// Whether an empty result should be treated as "try the next strategy".
    fn expects_results(&self) -> bool {
        true
    }
}

/// A result whose emptiness the chain can observe.
pub trait FallbackResult {
    fn is_empty_result(&self) -> bool;
}

impl<T> FallbackResult for Vec<T> {
    fn is_empty_result(&self) -> bool {
        self.is_empty()
    }
}

/// One way of answering `Q`.
pub trait Strategy<Q, R>: Send + Sync {
    /// Short name used in logs and in [`Resolution::strategy`].
    fn name(&self) -> &'static str;

    /// Whether this strategy may serve `query` at all.
    fn applies_to(&self, _query: &Q) -> bool {
        true
    }

    fn fetch<'a>(&'a self, query: &'a Q) -> BoxFuture<'a, Result<R, CoreError>>;
}

/// A result plus the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<R> {
    pub value: R,
    pub strategy: &'static str,
}

/// First-success-wins runner over an ordered strategy list.
pub struct FallbackChain<Q, R> {
    strategies: Vec<Box<dyn Strategy<Q, R>>>,
}

impl<Q, R> Default for FallbackChain<Q, R> {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }
}

impl<Q, R> FallbackChain<Q, R>
where
    Q: FallbackQuery,
    R: FallbackResult + Send,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy; order of calls is order of attempts.
    #[must_use]
    pub fn then(mut self, strategy: impl Strategy<Q, R> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, query: &Q) -> Result<Resolution<R>, CoreError> {
        let mut empty: Option<Resolution<R>> = None;
        let mut last_error: Option<CoreError> = None;

        for strategy in self.strategies.iter().filter(|s| s.applies_to(query)) {
            let name = strategy.name();
            debug!(strategy = name, ?query, "trying strategy");

            match strategy.fetch(query).await {
                Ok(value) if query.expects_results() && value.is_empty_result() => {
                    info!(strategy = name, "strategy returned no results, falling back");
                    empty.get_or_insert(Resolution {
                        value,
                        strategy: name,
                    });
                }
                Ok(value) => {
                    return Ok(Resolution {
                        value,
                        strategy: name,
                    });
                }
                Err(e) => {
                    warn!(strategy = name, error = %e, "strategy failed, falling back");
                    last_error = Some(e);
                }
            }
        }

        if let Some(resolution) = empty {
            return Ok(resolution);
        }
        Err(last_error.unwrap_or_else(|| CoreError::Unsupported {
            query: format!("{query:?}"),
        }))
    }
}
