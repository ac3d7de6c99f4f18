// Response envelope decoding
//
// The backend signals failure three ways: a non-2xx status, a 2xx body
// carrying `success: false`, or (on older endpoints) a 2xx body carrying
// `status: false`. Everything is folded into `ResponseEnvelope` here so
// nothing above the executor ever inspects raw optional fields.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Pagination block. Endpoint families disagree on which fields they
/// send, so everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default, rename = "hasMore", alias = "has_more")]
    pub has_more: Option<bool>,
}

/// Successful payload with optional pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub data: Value,
    pub pagination: Option<Pagination>,
}

impl Payload {
    /// Deserialize `data` into an endpoint wire model.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, Error> {
        serde_json::from_value(self.data).map_err(|e| Error::UnexpectedShape(e.to_string()))
    }
}

/// Why a response was not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    HttpStatus(u16),
    Application,
    Parse { body: String },
}

/// Discriminated result of one logical call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    Ok(Payload),
    Failure { kind: FailureKind, message: String },
}

impl ResponseEnvelope {
    /// Decode a response body received with `status`.
    ///
    /// The body is parsed before the status is looked at; a body that is
    /// not JSON is a parse failure regardless of status. An empty body
    /// decodes as `{}`.
    pub fn decode(status: StatusCode, text: &str) -> Self {
        let json: Value = if text.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_str(text) {
                Ok(v) => v,
                Err(e) => {
                    return Self::Failure {
                        kind: FailureKind::Parse {
                            body: text.to_owned(),
                        },
                        message: format!("invalid JSON response: {e}"),
                    };
                }
            }
        };

        if !status.is_success() {
            let message = extract_message(&json).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map_or_else(|| status.to_string(), str::to_owned)
            });
            return Self::Failure {
                kind: FailureKind::HttpStatus(status.as_u16()),
                message,
            };
        }

        if declares_failure(&json) {
            return Self::Failure {
                kind: FailureKind::Application,
                message: extract_message(&json).unwrap_or_else(|| "Request failed".into()),
            };
        }

        Self::Ok(split_payload(json))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Convert a failure into the matching typed [`Error`].
    pub fn into_result(self) -> Result<Payload, Error> {
        match self {
            Self::Ok(payload) => Ok(payload),
            Self::Failure { kind, message } => Err(match kind {
                FailureKind::HttpStatus(status) => Error::HttpStatus { status, message },
                FailureKind::Application => Error::Application { message },
                FailureKind::Parse { body } => Error::Parse { message, body },
            }),
        }
    }
}

/// `success === false || status === false`. A string `status` (used by
/// order payloads) is not a failure flag.
fn declares_failure(json: &Value) -> bool {
    let flag_false = |key: &str| matches!(json.get(key), Some(Value::Bool(false)));
    flag_false("success") || flag_false("status")
}

/// Best-effort message: `error.message`, then `error` as a string, then
/// `detail` (FastAPI style).
fn extract_message(json: &Value) -> Option<String> {
    if let Some(msg) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return Some(msg.to_owned());
    }
    if let Some(msg) = json.get("error").and_then(Value::as_str) {
        return Some(msg.to_owned());
    }
    match json.get("detail") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other @ (Value::Array(_) | Value::Object(_))) => Some(other.to_string()),
        _ => None,
    }
}

/// Bodies carrying a `data` member are unwrapped; anything else (legacy
/// `{orders, total}`, bare arrays) is passed through whole.
fn split_payload(json: Value) -> Payload {
    match json {
        Value::Object(mut map) if map.contains_key("data") => {
            let pagination = map
                .remove("pagination")
                .and_then(|p| serde_json::from_value(p).ok());
            let data = map.remove("data").unwrap_or(Value::Null);
            Payload { data, pagination }
        }
        other => Payload {
            data: other,
            pagination: None,
        },
    }
}
