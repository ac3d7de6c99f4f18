#![allow(clippy::unwrap_used)]
// Integration tests for `RequestExecutor` using wiremock.
//
// Backoff delays are captured by a recording sleeper that returns
// immediately, so retry schedules are asserted exactly without waiting.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use petal_api::{
    CallReport, CircuitBreaker, Error, FailureKind, MetricsSink, MultipartPart, RequestExecutor,
    RequestSpec, ResponseEnvelope, Sleeper, TransportKind,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        self.delays.lock().unwrap().push(delay);
        Box::pin(async {})
    }
}

#[derive(Default)]
struct RecordingMetrics {
    reports: Mutex<Vec<CallReport>>,
}

impl RecordingMetrics {
    fn last(&self) -> CallReport {
        self.reports.lock().unwrap().last().cloned().unwrap()
    }
}

impl MetricsSink for RecordingMetrics {
    fn record(&self, report: &CallReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

struct Harness {
    server: MockServer,
    exec: RequestExecutor,
    sleeper: Arc<RecordingSleeper>,
    metrics: Arc<RecordingMetrics>,
}

async fn setup() -> Harness {
    setup_with_token(Some("test-token")).await
}

async fn setup_with_token(token: Option<&str>) -> Harness {
    let server = MockServer::start().await;
    let sleeper = Arc::new(RecordingSleeper::default());
    let metrics = Arc::new(RecordingMetrics::default());
    let exec = RequestExecutor::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        token.map(|t| SecretString::from(t.to_owned())),
    )
    .with_sleeper(sleeper.clone())
    .with_metrics(metrics.clone());
    Harness {
        server,
        exec,
        sleeper,
        metrics,
    }
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

// ── Retry tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_retries_5xx_until_success() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "busy"})))
        .up_to_n_times(2)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/customers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true, "data": []})))
        .mount(&h.server)
        .await;

    let spec = RequestSpec::get("/api/v2/customers/");
    let payload = h.exec.send(&spec).await.unwrap();

    assert_eq!(payload.data, json!([]));
    assert_eq!(request_count(&h.server).await, 3);
    assert_eq!(h.metrics.last().attempts, 3);
    assert!(h.metrics.last().succeeded);
}

#[tokio::test]
async fn test_backoff_doubles_between_attempts() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
        .mount(&h.server)
        .await;

    let spec = RequestSpec::get("/orders").retries(2);
    let env = h.exec.execute(&spec).await.unwrap();

    assert!(env.is_ok());
    assert_eq!(request_count(&h.server).await, 3);
    let delays = h.sleeper.delays();
    assert_eq!(
        delays,
        vec![Duration::from_millis(300), Duration::from_millis(600)]
    );
    assert_eq!(delays[1], delays[0] * 2);
}

#[tokio::test]
async fn test_exhausted_retries_return_last_failure() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/products"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"detail": "upstream"})))
        .mount(&h.server)
        .await;

    let env = h.exec.execute(&RequestSpec::get("/api/v2/products")).await.unwrap();

    assert_eq!(
        env,
        ResponseEnvelope::Failure {
            kind: FailureKind::HttpStatus(502),
            message: "upstream".into()
        }
    );
    assert_eq!(request_count(&h.server).await, 3);
    assert!(!h.metrics.last().succeeded);
}

#[tokio::test]
async fn test_post_is_never_retried() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/product/update-status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let spec = RequestSpec::post("/api/v2/product/update-status").json(json!({"id": 1}));
    let err = h.exec.send(&spec).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(request_count(&h.server).await, 1);
    assert!(h.sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/9/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": {"message": "no such customer"}})))
        .mount(&h.server)
        .await;

    let err = h
        .exec
        .send(&RequestSpec::get("/api/v2/customers/9/"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "HTTP 404: no such customer");
    assert_eq!(request_count(&h.server).await, 1);
}

#[tokio::test]
async fn test_application_failure_is_terminal() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/with-stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false, "error": "disabled"})))
        .mount(&h.server)
        .await;

    let err = h
        .exec
        .send(&RequestSpec::get("/api/v2/customers/with-stats/"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Application { ref message } if message == "disabled"));
    assert_eq!(request_count(&h.server).await, 1);
}

#[tokio::test]
async fn test_non_json_body_is_parse_failure() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/products"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>maintenance</html>"))
        .mount(&h.server)
        .await;

    let err = h
        .exec
        .send(&RequestSpec::get("/api/v2/products"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Parse { ref body, .. } if body.contains("maintenance")));
    assert_eq!(request_count(&h.server).await, 1);
}

// ── Timeout and cancellation ────────────────────────────────────────

#[tokio::test]
async fn test_slow_response_times_out_and_retries() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&h.server)
        .await;

    let spec = RequestSpec::get("/slow")
        .timeout(Duration::from_millis(50))
        .retries(1);
    let err = h.exec.execute(&spec).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Transport {
            kind: TransportKind::Timeout,
            ..
        }
    ));
    assert_eq!(h.metrics.last().attempts, 2);
    assert_eq!(h.sleeper.delays(), vec![Duration::from_millis(300)]);
}

#[tokio::test]
async fn test_caller_cancellation_is_not_retried() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/orders.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"orders": [], "total": 0}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&h.server)
        .await;

    let token = CancellationToken::new();
    let spec = RequestSpec::get("/api/v2/customers/orders.php").cancel_on(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });
    let err = h.exec.execute(&spec).await.unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(
        err,
        Error::Transport {
            kind: TransportKind::Aborted,
            ..
        }
    ));
    assert_eq!(h.metrics.last().attempts, 1);
    assert!(h.sleeper.delays().is_empty());
}

// ── URL and body construction ───────────────────────────────────────

#[tokio::test]
async fn test_access_token_is_injected_and_nulls_dropped() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/products"))
        .and(query_param("access_token", "test-token"))
        .and(query_param("type", "vitrina"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
        .mount(&h.server)
        .await;

    let spec = RequestSpec::get("/api/v2/products")
        .query("type", "vitrina")
        .query("offset", None::<u32>);
    h.exec.send(&spec).await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_owned();
    assert!(!query.contains("offset"), "null param leaked: {query}");
    assert!(!query.contains("null"), "null param leaked: {query}");
}

#[tokio::test]
async fn test_missing_token_still_sends_request() {
    let h = setup_with_token(None).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true, "data": []})))
        .mount(&h.server)
        .await;

    h.exec.send(&RequestSpec::get("/api/v2/customers/")).await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_json_body_sets_content_type() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/product/update-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&h.server)
        .await;

    let spec = RequestSpec::post("/api/v2/product/update-status").json(json!({"id": 3, "active": "Y"}));
    h.exec.send(&spec).await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert_eq!(content_type, "application/json");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({"id": 3, "active": "Y"}));
}

#[tokio::test]
async fn test_multipart_body_is_not_json() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/uploads/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "urls": []})))
        .mount(&h.server)
        .await;

    let part = MultipartPart::file("files[]", "rose.jpg", Bytes::from_static(b"\xff\xd8\xff"))
        .with_mime("image/jpeg");
    let spec = RequestSpec::post("/api/v2/uploads/images").multipart(vec![part]);
    h.exec.send(&spec).await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "unexpected content type: {content_type}"
    );
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("filename=\"rose.jpg\""));
}

// ── Metrics ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_url_is_still_reported() {
    let metrics = Arc::new(RecordingMetrics::default());
    // `file:` + `//[` is an unterminated IPv6 host.
    let exec = RequestExecutor::with_client(
        reqwest::Client::new(),
        Url::parse("file:///").unwrap(),
        None,
    )
    .with_metrics(metrics.clone());

    let err = exec.execute(&RequestSpec::get("//[")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)), "got {err:?}");

    let report = metrics.last();
    assert_eq!(report.path, "//[");
    assert_eq!(report.attempts, 0);
    assert!(!report.succeeded);
}

// ── Circuit breaker ─────────────────────────────────────────────────

#[tokio::test]
async fn test_breaker_opens_and_skips_the_backend() {
    let h = setup().await;
    let exec = h
        .exec
        .with_breaker(CircuitBreaker::new(2, Duration::from_secs(60)));

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/orders.php"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&h.server)
        .await;

    let spec = RequestSpec::get("/api/v2/customers/orders.php")
        .query("CUSTOMER_ID", 469_u64)
        .retries(0);
    for _ in 0..2 {
        let err = exec.send(&spec).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    let err = exec.send(&spec).await.unwrap_err();
    assert!(err.is_circuit_open(), "got {err:?}");
    assert_eq!(request_count(&h.server).await, 2);
    assert_eq!(h.metrics.last().attempts, 0);

    // Another customer has its own circuit.
    let other = RequestSpec::get("/api/v2/customers/orders.php")
        .query("CUSTOMER_ID", 470_u64)
        .retries(0);
    assert_eq!(exec.send(&other).await.unwrap_err().status(), Some(502));
    assert_eq!(request_count(&h.server).await, 3);
}

#[tokio::test]
async fn test_client_errors_do_not_trip_the_breaker() {
    let h = setup().await;
    let exec = h
        .exec
        .with_breaker(CircuitBreaker::new(1, Duration::from_secs(60)));

    Mock::given(method("GET"))
        .and(path("/api/v2/products/detail"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "nope"})))
        .mount(&h.server)
        .await;

    let spec = RequestSpec::get("/api/v2/products/detail").query("id", 9_u64);
    for _ in 0..3 {
        assert!(exec.send(&spec).await.unwrap_err().is_not_found());
    }
    assert_eq!(request_count(&h.server).await, 3);
}

// ── In-flight deduplication ─────────────────────────────────────────

fn slow_products() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"success": true, "data": [{"id": 1}]}))
        .set_delay(Duration::from_millis(200))
}

#[tokio::test]
async fn test_concurrent_identical_gets_share_one_request() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/products"))
        .respond_with(slow_products())
        .mount(&h.server)
        .await;

    let spec = RequestSpec::get("/api/v2/products").query("limit", 20_u32);
    let (a, b) = tokio::join!(h.exec.send(&spec), h.exec.send(&spec));
    assert_eq!(a.unwrap().data, json!([{"id": 1}]));
    assert_eq!(b.unwrap().data, json!([{"id": 1}]));
    assert_eq!(request_count(&h.server).await, 1);

    // Finished calls are not cached.
    h.exec.send(&spec).await.unwrap();
    assert_eq!(request_count(&h.server).await, 2);
}

#[tokio::test]
async fn test_writes_and_disabled_dedup_send_every_request() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/products"))
        .respond_with(slow_products())
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/product/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&h.server)
        .await;

    let post = RequestSpec::post("/api/v2/product/price").json(json!({"id": 1, "price": 5000}));
    let (a, b) = tokio::join!(h.exec.send(&post), h.exec.send(&post));
    a.unwrap();
    b.unwrap();
    assert_eq!(request_count(&h.server).await, 2);

    let exec = h.exec.with_dedup(false);
    let get = RequestSpec::get("/api/v2/products");
    let (a, b) = tokio::join!(exec.send(&get), exec.send(&get));
    a.unwrap();
    b.unwrap();
    assert_eq!(request_count(&h.server).await, 4);
}
