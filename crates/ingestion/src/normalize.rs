//! Value normalization shared by the provider adapters
//!
//! Every helper turns malformed text into `None` instead of failing, so one bad
//! cell never aborts a whole scrape.

use crate::errors::IngestionError;
use scraper::{ElementRef, Selector};

/// Compile a CSS selector
pub fn selector(css: &str) -> Result<Selector, IngestionError> {
    Selector::parse(css).map_err(|e| IngestionError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Convert a displayed rate into cents per kWh
///
/// Plain decimals are read as dollars and scaled by 100 unless the text
/// carries a cents marker (`¢` or `c`): `"$0.129/kWh"` is 12.9, `"12.4¢/kWh"` is 12.4.
pub fn normalize_rate(value: &str) -> Option<f64> {
    let lowered = value.to_lowercase();
    let in_cents = value.contains('¢') || lowered.contains('c');

    let cleaned = value
        .replace('$', "")
        .replace('¢', "")
        .replace("/kWh", "");
    let cleaned = cleaned.trim();
    let cleaned = cleaned
        .strip_suffix('c')
        .or_else(|| cleaned.strip_suffix('C'))
        .unwrap_or(cleaned)
        .trim();

    let number = parse_finite(cleaned)?;
    if number < 0.0 {
        return None;
    }

    if in_cents {
        Some(number)
    } else {
        // Dollar values are scaled then rounded to 1/10000 of a cent.
        Some((number * 100.0 * 10_000.0).round() / 10_000.0)
    }
}

/// `"$1,295.00"` -> 1295.0
pub fn parse_money(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    parse_finite(&cleaned)
}

/// `"25%"` -> 25
pub fn parse_percent(value: &str) -> Option<i32> {
    parse_int(value.trim().trim_end_matches('%'))
}

pub fn parse_int(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}

/// Text content of an element with whitespace collapsed; empty text is `None`
pub fn text_or_none(element: Option<ElementRef<'_>>) -> Option<String> {
    collapse_whitespace(&element?.text().collect::<String>())
}

pub fn collapse_whitespace(value: &str) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}
