//! Best-effort conversion of masked currency text (`R$ 1.500,00`) into an amount.
//!
//! Inputs outside the recognised shapes fall through to a plain float parse; anything
//! that still does not parse is reported as `None` and callers keep the original value.

use std::sync::OnceLock;

use regex::Regex;

use super::domain::Salary;

fn thousands_with_cents() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{1,3}(\.\d{3})*,\d{2}$").expect("valid pattern"))
}

fn comma_decimal() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+,\d+$").expect("valid pattern"))
}

fn thousands_only() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{1,3}(\.\d{3})+$").expect("valid pattern"))
}

/// Remove the currency symbol and surrounding whitespace (including the NBSP the
/// locale formatter emits).
pub fn strip_currency(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix("R$").unwrap_or(trimmed).trim()
}

/// Parse a salary string into a finite amount, or `None` when no pattern applies.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = strip_currency(raw);
    if cleaned.is_empty() {
        return None;
    }

    let numeric = if thousands_with_cents().is_match(cleaned) {
        cleaned.replace('.', "").replace(',', ".")
    } else if comma_decimal().is_match(cleaned) {
        cleaned.replace(',', ".")
    } else if thousands_only().is_match(cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned.to_string()
    };

    numeric.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Convert masked text into a number at the submit boundary.
///
/// Only a successful, strictly positive parse replaces the value.
pub fn normalize(salary: &Salary) -> Salary {
    match salary {
        Salary::Number(_) => salary.clone(),
        Salary::RawText(text) => match parse_amount(text) {
            Some(amount) if amount > 0.0 => Salary::Number(amount),
            _ => salary.clone(),
        },
    }
}
