// ── Backend timestamp parsing and validity ──
//
// The backend mixes RFC 3339, `YYYY-MM-DD HH:MM:SS`, and the legacy
// `DD.MM.YYYY HH:MM:SS` format, the last two in the shop's local offset
// (UTC+5). Unset dates leak through as placeholders such as
// `-0001-11-30T00:00:00` or `00.00.0000 00:00:00`.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike, Utc,
};

/// Shop-local offset applied to zone-less timestamps.
pub const SHOP_OFFSET_SECS: i32 = 5 * 3600;

/// Prefixes that mark an unset date.
pub const PLACEHOLDER_PREFIXES: &[&str] = &["-0001", "0001-11-30", "00.00.0000"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

pub fn shop_offset() -> FixedOffset {
    FixedOffset::east_opt(SHOP_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Parse any timestamp shape the backend is known to emit.
///
/// Placeholders and blanks yield `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() || is_placeholder(raw) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let offset = shop_offset();
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    offset.from_local_datetime(&naive).single()
}

/// Normalize a legacy timestamp to RFC 3339, or `None` if unusable.
pub fn normalize(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.to_rfc3339())
}

fn is_placeholder(raw: &str) -> bool {
    PLACEHOLDER_PREFIXES.iter().any(|p| raw.starts_with(p))
}

/// Pluggable "is this timestamp unusable" predicate.
///
/// Empty values, placeholders, and unparsable text are always invalid.
/// Exact local midnight is optionally treated as invalid too: product
/// rows imported without a time carry `00:00:00`, but a genuine
/// midnight value would be flagged as well, so the check is opt-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampCheck {
    flag_midnight: bool,
}

impl TimestampCheck {
    pub const fn new() -> Self {
        Self {
            flag_midnight: false,
        }
    }

    /// Check used for product `created_at` values.
    pub const fn products() -> Self {
        Self {
            flag_midnight: true,
        }
    }

    #[must_use]
    pub const fn flag_midnight(mut self, on: bool) -> Self {
        self.flag_midnight = on;
        self
    }

    pub fn is_invalid(&self, value: Option<&str>) -> bool {
        let Some(raw) = value else {
            return true;
        };
        match parse_timestamp(raw) {
            None => true,
            Some(dt) => self.flag_midnight && dt.num_seconds_from_midnight() == 0,
        }
    }
}
