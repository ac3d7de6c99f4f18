// petal-api: async HTTP client for the flower-shop back-office backend.
//
// Two endpoint families share one `RequestExecutor`:
//
// - **Legacy** (`legacy::LegacyApi`): `/api/v2/customers/`, the
//   per-customer `orders.php` script, `/api/v2/product/list/` and the
//   old order list. UPPER_CASE fields, `{status, data}` envelopes.
// - **v2** (`v2::V2Api`): aggregated customer statistics, orders,
//   inventory, product reads and writes, and media uploads.
//
// The executor owns URL construction, access-token injection, timeouts,
// envelope classification, and retry with exponential backoff. It also
// trips a per-request circuit breaker and folds concurrent identical
// GETs into one call.

pub mod breaker;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod legacy;
pub mod metrics;
pub mod request;
pub mod retry;
pub mod transport;
pub mod v2;
mod wire;

pub use breaker::CircuitBreaker;
pub use envelope::{FailureKind, Pagination, Payload, ResponseEnvelope};
pub use error::{Error, TransportKind};
pub use executor::{ACCESS_TOKEN_PARAM, RequestExecutor};
pub use legacy::LegacyApi;
pub use metrics::{CallReport, MetricsSink, TracingMetrics};
pub use request::{MultipartPart, QueryValue, RequestBody, RequestSpec};
pub use retry::{RetryPolicy, RetryState, Sleeper, TokioSleeper};
pub use transport::{TlsMode, TransportConfig};
pub use v2::V2Api;
pub use wire::LegacyDate;
