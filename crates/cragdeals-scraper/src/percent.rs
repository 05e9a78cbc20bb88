//! Discount-percent normalization and derivation.
//!
//! Every percent leaving this module has the shape `-<N>`: a single leading
//! minus, an integer magnitude, no `%`.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid regex"));

/// Normalize a percent label as printed by a retailer.
///
/// Takes the first number in `raw`, drops decoration and sign, and returns
/// `-<N>`. Returns an empty string when `raw` holds no number.
#[must_use]
pub fn normalize_percent(raw: &str) -> String {
    let Some(found) = NUMBER.find(raw) else {
        return String::new();
    };
    let Ok(value) = Decimal::from_str(&found.as_str().replace(',', ".")) else {
        return String::new();
    };
    format_percent(value)
}

/// Parse a display price such as `"1.299,00 €"` or `"12 990 Ft"`.
///
/// The last `,` or `.` is the decimal separator only when one or two digits
/// follow it; every other separator groups thousands.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == ',' || c == '.');
    if cleaned.is_empty() {
        return None;
    }

    let (whole, fraction) = match cleaned.rfind([',', '.']) {
        Some(idx) if (1..=2).contains(&(cleaned.len() - idx - 1)) => {
            (&cleaned[..idx], &cleaned[idx + 1..])
        }
        _ => (cleaned, ""),
    };

    let digits: String = whole.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let normalized = if fraction.is_empty() {
        digits
    } else {
        format!("{digits}.{fraction}")
    };
    Decimal::from_str(&normalized).ok()
}

/// `round(100 * (old - new) / old)` as `-<N>`, or `None` when either price
/// is unparseable or the original price is not positive.
#[must_use]
pub fn compute_percent(old_price: &str, new_price: &str) -> Option<String> {
    let old = parse_price(old_price)?;
    let new = parse_price(new_price)?;
    if old <= Decimal::ZERO {
        return None;
    }
    let ratio = (old - new).checked_mul(Decimal::ONE_HUNDRED)?.checked_div(old)?;
    Some(format_percent(ratio))
}

/// Prefer the retailer's own label; fall back to computing from prices.
#[must_use]
pub fn derive_percent(label: Option<&str>, old_price: &str, new_price: &str) -> Option<String> {
    label
        .map(normalize_percent)
        .filter(|p| !p.is_empty())
        .or_else(|| compute_percent(old_price, new_price))
}

fn format_percent(value: Decimal) -> String {
    let magnitude = value
        .abs()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("-{}", magnitude.normalize())
}

#[cfg(test)]
#[path = "percent_test.rs"]
mod tests;
