//! Raw value normalization for amounts and dates.
//!
//! Converts loose table cells (strings with thousands separators, assorted
//! date spellings, plain numbers) into canonical `f64` amounts and `chrono`
//! timestamps. Amount failures are reported to the caller so the row can be
//! dropped; date failures degrade to `None` and the row survives.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Datetime patterns tried, in order, when no input format is configured.
const AUTO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only patterns tried after the datetime patterns. Month-first sits
/// before day-first so ambiguous slashed dates resolve month-first; a date
/// that is impossible month-first (day 13 and up) falls through to the
/// day-first pattern.
const AUTO_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%d %b %Y",
];

/// True when a cell counts as absent: an explicit null or blank text.
pub fn is_missing(cell: &Value) -> bool {
    match cell {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Render a cell as plain text, for identifiers, type values, and
/// diagnostics. Nulls render empty.
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Convert a raw quantity/price cell into a number.
///
/// Strings may carry surrounding whitespace and ASCII thousands separators
/// ("1,234.56"). Only finite values count; the "nan" and "inf" spellings
/// the float grammar accepts do not convert. Returns `None` when the cell
/// does not convert; the caller decides how to report it.
pub fn parse_amount(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Parse a raw date cell into a timestamp.
///
/// With an explicit format the value must match it, tried as a datetime
/// pattern first and as a date-only pattern (midnight) second. Without one,
/// a ladder of common spellings is tried. Failures yield `None`; the row is
/// kept and the date renders as invalid downstream.
pub fn parse_date(cell: &Value, input_format: Option<&str>) -> Option<NaiveDateTime> {
    let text = match cell {
        Value::String(s) => s.trim(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }

    match input_format {
        Some(fmt) => parse_date_with(text, fmt),
        None => parse_date_auto(text),
    }
}

fn parse_date_with(text: &str, fmt: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, fmt)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_date_auto(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for fmt in AUTO_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in AUTO_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Check a strftime-style pattern before it is used for parsing or
/// formatting. chrono surfaces unknown specifiers lazily as error items, so
/// an unchecked pattern would only blow up mid-render.
pub fn is_valid_date_format(fmt: &str) -> bool {
    StrftimeItems::new(fmt).all(|item| !matches!(item, Item::Error))
}
