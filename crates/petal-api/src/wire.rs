// Lenient field decoders shared by the endpoint wire models.
//
// The legacy backend emits ids and amounts as numbers on some endpoints
// and as numeric strings on others; dates arrive either as a bare string
// or as a `{value, text}` object.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Numeric id sent as a number or a numeric string.
pub(crate) fn flexible_u64<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(de)?;
    as_u64(&value).ok_or_else(|| serde::de::Error::custom(format!("expected numeric id, got {value}")))
}

/// Optional amount sent as a number, a numeric string, or null.
pub(crate) fn flexible_f64_opt<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.as_ref().and_then(as_f64))
}

/// Optional count sent as a number, a numeric string, or null.
pub(crate) fn flexible_u64_opt<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.as_ref().and_then(as_u64))
}

/// Optional string that may arrive as a number.
pub(crate) fn flexible_string_opt<'de, D: Deserializer<'de>>(
    de: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Flag sent as a bool, `"Y"`/`"N"`, `1`/`0`, or null (false).
pub(crate) fn flexible_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "y" | "yes" | "1" | "true"
        ),
        _ => false,
    })
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// A date field that is either a plain string or `{value, text}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyDate {
    Text(String),
    Structured {
        value: String,
        #[serde(default)]
        text: Option<String>,
    },
}

impl LegacyDate {
    /// The machine-oriented value.
    pub fn value(&self) -> &str {
        match self {
            Self::Text(s) | Self::Structured { value: s, .. } => s,
        }
    }
}
