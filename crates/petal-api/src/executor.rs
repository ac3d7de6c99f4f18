// Request executor
//
// Single chokepoint for every HTTP call to the back-office backend. Owns
// URL construction (base + path + access token + query), per-attempt
// timeout and caller cancellation, response-envelope classification,
// bounded exponential-backoff retry for idempotent reads, a per-request
// circuit breaker, and in-flight deduplication of identical GETs.

use std::sync::{Arc, Once};
use std::time::Instant;

use dashmap::DashMap;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::breaker::CircuitBreaker;
use crate::envelope::{Payload, ResponseEnvelope};
use crate::error::{Error, TransportKind};
use crate::metrics::{CallReport, MetricsSink, TracingMetrics};
use crate::request::{RequestBody, RequestSpec};
use crate::retry::{RetryPolicy, RetryState, Sleeper, TokioSleeper};
use crate::transport::TransportConfig;

/// Query key the backend expects the API token under.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

static MISSING_TOKEN: Once = Once::new();

/// Outcome shared by every caller of one in-flight GET.
type InFlight = Arc<OnceCell<Result<ResponseEnvelope, Error>>>;

/// Executes `RequestSpec`s against one backend.
///
/// Cheap to share behind an `Arc`; endpoint families (`LegacyApi`,
/// `V2Api`) hold one each.
pub struct RequestExecutor {
    http: reqwest::Client,
    base_url: Url,
    access_token: Option<SecretString>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    metrics: Arc<dyn MetricsSink>,
    breaker: CircuitBreaker,
    dedup: bool,
    inflight: DashMap<String, InFlight>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url.as_str())
            .field("has_token", &self.access_token.is_some())
            .field("policy", &self.policy)
            .field("breaker_threshold", &self.breaker.threshold())
            .field("dedup", &self.dedup)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    /// Build an executor with a fresh HTTP client from `transport`.
    pub fn new(
        base_url: Url,
        access_token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, access_token))
    }

    /// Build an executor around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        access_token: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            base_url,
            access_token,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            metrics: Arc::new(TracingMetrics),
            breaker: CircuitBreaker::default(),
            dedup: true,
            inflight: DashMap::new(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn with_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    /// Share one response between concurrent identical GETs. On by default.
    #[must_use]
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    // ── URL ──────────────────────────────────────────────────────────

    /// `base_url + path`, then `access_token` (unless the caller set one),
    /// then the request's query. Null values are skipped.
    pub fn build_url(&self, spec: &RequestSpec) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = spec.path();
        let full = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        let mut url = Url::parse(&full)?;

        let mut pairs: Vec<(String, String)> = Vec::new();
        if !spec.has_query(ACCESS_TOKEN_PARAM) {
            match &self.access_token {
                Some(token) => pairs.push((
                    ACCESS_TOKEN_PARAM.to_owned(),
                    token.expose_secret().to_owned(),
                )),
                None => MISSING_TOKEN.call_once(|| {
                    warn!("no access token configured; requests will be sent unauthenticated");
                }),
            }
        }
        pairs.extend(
            spec.query_params()
                .iter()
                .filter_map(|(k, v)| v.render().map(|v| (k.clone(), v))),
        );

        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Run `spec` to a terminal outcome.
    ///
    /// HTTP, application, and parse failures come back as
    /// `Ok(ResponseEnvelope::Failure)`; `Err` is reserved for transport
    /// failures that outlived the retry budget (or were cancelled), an
    /// open circuit, and URLs that could not be built.
    ///
    /// A GET without a body or cancellation token joins an identical call
    /// already in flight instead of sending its own.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<ResponseEnvelope, Error> {
        let key = request_key(spec);
        if !self.dedups(spec) {
            return self.execute_once(spec, &key).await;
        }

        let cell = self.inflight.entry(key.clone()).or_default().clone();
        let mut led = false;
        let outcome = cell
            .get_or_init(|| {
                led = true;
                self.execute_once(spec, &key)
            })
            .await
            .clone();
        if !led {
            debug!(key, "joined in-flight request");
        }
        self.inflight.remove_if(&key, |_, current| Arc::ptr_eq(current, &cell));
        outcome
    }

    fn dedups(&self, spec: &RequestSpec) -> bool {
        self.dedup
            && *spec.method() == Method::GET
            && spec.body().is_none()
            && spec.cancellation().is_none()
    }

    /// One logical call: URL, breaker check, attempts. Every path out of
    /// here is reported to the metrics sink.
    async fn execute_once(&self, spec: &RequestSpec, key: &str) -> Result<ResponseEnvelope, Error> {
        let started = Instant::now();

        let (outcome, attempts) = match self.build_url(spec) {
            Err(e) => (Err(e), 0),
            Ok(url) => match self.breaker.check(key) {
                Err(retry_in) => {
                    debug!(key, retry_in_ms = retry_in.as_millis(), "circuit open, request skipped");
                    (
                        Err(Error::CircuitOpen {
                            key: key.to_owned(),
                            retry_in,
                        }),
                        0,
                    )
                }
                Ok(()) => {
                    let (outcome, attempts) = self.run_attempts(spec, &url).await;
                    self.breaker.observe(key, &outcome);
                    (outcome, attempts)
                }
            },
        };

        self.metrics.record(&CallReport {
            path: spec.path().to_owned(),
            duration: started.elapsed(),
            succeeded: matches!(outcome, Ok(ResponseEnvelope::Ok(_))),
            attempts,
        });
        outcome
    }

    /// The retry loop. Returns the terminal outcome and attempts made.
    async fn run_attempts(
        &self,
        spec: &RequestSpec,
        url: &Url,
    ) -> (Result<ResponseEnvelope, Error>, u32) {
        let method = spec.method();
        let timeout = spec.timeout_override().unwrap_or(self.policy.timeout);
        let max_retries =
            self.policy
                .max_retries(method, spec.is_mutating(), spec.retries_override());

        let mut attempts = 0_u32;
        let mut state = RetryState::Attempt(0);

        loop {
            state = match state {
                RetryState::Attempt(n) => {
                    attempts = n + 1;
                    debug!(%method, path = spec.path(), attempt = n, "sending request");
                    let raw = self.attempt(spec, url, timeout).await;
                    let caller_cancelled = spec
                        .cancellation()
                        .is_some_and(CancellationToken::is_cancelled);
                    self.policy
                        .after_attempt(method, n, max_retries, raw, caller_cancelled)
                }
                RetryState::Wait { completed, delay } => {
                    warn!(
                        %method,
                        path = spec.path(),
                        attempt = completed,
                        delay_ms = delay.as_millis(),
                        "request failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    RetryState::Attempt(completed + 1)
                }
                RetryState::Done(outcome) => return (outcome, attempts),
            };
        }
    }

    /// Execute and convert any failure into a typed [`Error`].
    pub async fn send(&self, spec: &RequestSpec) -> Result<Payload, Error> {
        self.execute(spec).await?.into_result()
    }

    /// Execute and decode the payload into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, spec: &RequestSpec) -> Result<T, Error> {
        self.send(spec).await?.decode()
    }

    /// One attempt: race the exchange against the timeout and the
    /// caller's cancellation token.
    async fn attempt(
        &self,
        spec: &RequestSpec,
        url: &Url,
        timeout: std::time::Duration,
    ) -> Result<ResponseEnvelope, Error> {
        let abort = spec
            .cancellation()
            .map_or_else(CancellationToken::new, CancellationToken::child_token);
        let request = self.prepare(spec, url)?;

        tokio::select! {
            result = exchange(request) => result,
            () = abort.cancelled() => Err(Error::Transport {
                kind: TransportKind::Aborted,
                message: "request cancelled by caller".into(),
            }),
            () = tokio::time::sleep(timeout) => {
                abort.cancel();
                Err(Error::Transport {
                    kind: TransportKind::Timeout,
                    message: format!("no response within {}ms", timeout.as_millis()),
                })
            }
        }
    }

    fn prepare(&self, spec: &RequestSpec, url: &Url) -> Result<reqwest::RequestBuilder, Error> {
        let mut builder = self.http.request(spec.method().clone(), url.clone());
        for (name, value) in spec.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match spec.body() {
            None => builder,
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Multipart(parts)) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    let mut field = reqwest::multipart::Part::bytes(part.data.to_vec());
                    if let Some(file_name) = &part.file_name {
                        field = field.file_name(file_name.clone());
                    }
                    if let Some(mime) = &part.mime {
                        field = field
                            .mime_str(mime)
                            .map_err(|e| Error::ClientBuild(format!("invalid mime type: {e}")))?;
                    }
                    form = form.part(part.name.clone(), field);
                }
                builder.multipart(form)
            }
            Some(RequestBody::Binary { data, content_type }) => {
                let builder = builder.body(data.clone());
                match content_type {
                    Some(ct) => builder.header(CONTENT_TYPE, ct.as_str()),
                    None => builder,
                }
            }
        };
        Ok(builder)
    }
}

/// Identity of a call for deduplication and the circuit breaker: method,
/// path and the caller's non-null query. The access token is left out.
fn request_key(spec: &RequestSpec) -> String {
    let mut key = format!("{} {}", spec.method(), spec.path());
    let mut sep = '?';
    for (name, value) in spec.query_params() {
        if name == ACCESS_TOKEN_PARAM {
            continue;
        }
        if let Some(value) = value.render() {
            key.push(sep);
            key.push_str(name);
            key.push('=');
            key.push_str(&value);
            sep = '&';
        }
    }
    key
}

/// Send and read the full body; classify once the text is in hand.
async fn exchange(request: reqwest::RequestBuilder) -> Result<ResponseEnvelope, Error> {
    let resp = request.send().await.map_err(|e| Error::from_reqwest(&e))?;
    let status = resp.status();
    let text = resp.text().await.map_err(|e| Error::from_reqwest(&e))?;
    Ok(ResponseEnvelope::decode(status, &text))
}
