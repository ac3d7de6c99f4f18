// Request description handed to the executor.
//
// A `RequestSpec` is assembled with consuming builder calls and is not
// mutated afterwards: the executor borrows it for every attempt, so the
// body has to be replayable (multipart parts are stored as raw bytes and
// re-assembled into a `reqwest` form per attempt).

use std::time::Duration;

use bytes::Bytes;
use indexmap::IndexMap;
use reqwest::Method;
use tokio_util::sync::CancellationToken;

// ── Query values ─────────────────────────────────────────────────────

/// A scalar query-string value. `Null` entries are dropped when the URL
/// is built instead of being rendered as the literal `"null"`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl QueryValue {
    /// Render for the query string, or `None` for null.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&String> for QueryValue {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for QueryValue {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Str(v.to_string()), Self::Int)
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ── Bodies ───────────────────────────────────────────────────────────

/// One field of a multipart upload.
#[derive(Debug, Clone)]
pub struct MultipartPart {
    pub name: String,
    pub data: Bytes,
    pub file_name: Option<String>,
    pub mime: Option<String>,
}

impl MultipartPart {
    pub fn file(name: impl Into<String>, file_name: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            data,
            file_name: Some(file_name.into()),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Request payload. Only `Json` sets a JSON content type; multipart and
/// binary bodies bypass serialization entirely.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(Vec<MultipartPart>),
    Binary {
        data: Bytes,
        content_type: Option<String>,
    },
}

// ── RequestSpec ──────────────────────────────────────────────────────

/// One logical HTTP call: method, path, query, body, and per-call
/// overrides for timeout and retry count.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    path: String,
    query: IndexMap<String, QueryValue>,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
    cancel: Option<CancellationToken>,
    timeout: Option<Duration>,
    retries: Option<u32>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: IndexMap::new(),
            headers: Vec::new(),
            body: None,
            cancel: None,
            timeout: None,
            retries: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    // ── Builder ──────────────────────────────────────────────────────

    /// Add a query parameter. A later call with the same key replaces
    /// the earlier value but keeps its position.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn multipart(mut self, parts: Vec<MultipartPart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }

    pub fn binary(mut self, data: Bytes, content_type: Option<String>) -> Self {
        self.body = Some(RequestBody::Binary { data, content_type });
        self
    }

    /// Abort the request when `token` is cancelled, in addition to the
    /// per-attempt timeout.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &IndexMap<String, QueryValue> {
        &self.query
    }

    pub fn has_query(&self, key: &str) -> bool {
        self.query.contains_key(key)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn retries_override(&self) -> Option<u32> {
        self.retries
    }

    /// Whether the method changes server state (POST/PUT/PATCH/DELETE).
    pub fn is_mutating(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD | Method::OPTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_query_values_render_as_none() {
        assert_eq!(QueryValue::from(None::<i64>).render(), None);
        assert_eq!(QueryValue::from(Some(5_i64)).render().as_deref(), Some("5"));
        assert_eq!(QueryValue::from(true).render().as_deref(), Some("true"));
    }

    #[test]
    fn query_keys_keep_insertion_order() {
        let spec = RequestSpec::get("/api/v2/orders")
            .query("limit", 30_u32)
            .query("offset", 0_u32)
            .query("limit", 50_u32);

        let keys: Vec<&str> = spec.query_params().keys().map(String::as_str).collect();
        assert_eq!(keys, ["limit", "offset"]);
        assert_eq!(spec.query_params()["limit"], QueryValue::Int(50));
    }

    #[test]
    fn mutating_methods() {
        assert!(!RequestSpec::get("/x").is_mutating());
        assert!(RequestSpec::post("/x").is_mutating());
        assert!(RequestSpec::put("/x").is_mutating());
        assert!(RequestSpec::patch("/x").is_mutating());
        assert!(RequestSpec::delete("/x").is_mutating());
    }
}
