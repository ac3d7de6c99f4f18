//! Shared helpers for command handlers.

use chrono::{DateTime, FixedOffset};

use petal_core::Pagination;

use crate::error::CliError;

/// `-` for missing values.
pub fn or_dash(value: Option<&str>) -> String {
    value.filter(|s| !s.is_empty()).unwrap_or("-").to_owned()
}

/// Whole-currency amount with thin grouping: `215000` -> `215 000`.
pub fn money(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    if amount < 0.0 && rounded != "0" {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Ask before a destructive action; `--yes` answers for the user.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Whole units without a trailing `.0`: `12.0` -> `12`, `2.5` -> `2.5`.
pub fn quantity(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |q| q.to_string())
}

pub fn date(value: Option<&DateTime<FixedOffset>>) -> String {
    value.map_or_else(|| "-".into(), |d| d.format("%Y-%m-%d").to_string())
}

pub fn datetime(value: Option<&DateTime<FixedOffset>>) -> String {
    value.map_or_else(|| "-".into(), |d| d.format("%Y-%m-%d %H:%M").to_string())
}

/// `page 2/5, 87 total` footer from whatever the backend reported.
pub fn page_footer(pagination: Option<&Pagination>) -> Option<String> {
    let p = pagination?;
    let mut parts = Vec::new();
    match (p.page, p.pages) {
        (Some(page), Some(pages)) => parts.push(format!("page {page}/{}", pages.max(1))),
        (Some(page), None) => parts.push(format!("page {page}")),
        _ => {}
    }
    if let Some(total) = p.total {
        parts.push(format!("{total} total"));
    }
    if p.has_more == Some(true) {
        parts.push("more available".into());
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}
