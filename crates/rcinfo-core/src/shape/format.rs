//! Field formatters: dates, flags and suffixed quantities.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::vehicle::VehicleRecord;

/// Sentinel rendered when no alternative source has a value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Character the upstream uses to redact digits.
pub const MASK_CHAR: char = 'X';

/// How the resolved source value becomes display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Value as text, `N/A` when absent.
    Text,
    /// Value as text, the given literal when absent.
    TextOr(&'static str),
    /// `day Mon year`; unparsable input passes through unchanged.
    Date,
    /// `"{value}{suffix}"`, with `N/A` standing in for a missing value.
    Suffixed(&'static str),
    /// Yes when the value is truthy (non-empty string, non-zero number, `true`).
    Truthy,
    /// Yes only for the string `"true"`; a boolean `true` still reads No.
    StringTrue,
    /// `"{make} {model}"`: sources are `[make, model]`, make falls back to `N/A`.
    MakeModel,
    /// Engine number. A value containing [`MASK_CHAR`] is suppressed or
    /// replaced by the first present `unmasked` source, depending on the mode.
    MaskedEngine { unmasked: &'static [&'static str] },
}

/// Short month names in the Indian English convention (`Sept`, not `Sep`).
const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
];

/// Format a date field. `None` for absent, raw text when it does not parse.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return NOT_AVAILABLE.to_string();
    };
    match parse_date(raw) {
        Some(d) => format!("{} {} {}", d.day(), SHORT_MONTHS[d.month0() as usize], d.year()),
        None => raw.to_string(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%d-%b-%Y", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

pub fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

/// Truthiness of a raw upstream value. Absent counts as false.
pub fn is_truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Only the literal string `"true"` counts.
pub fn is_string_true(v: Option<&Value>) -> bool {
    matches!(v, Some(Value::String(s)) if s == "true")
}

pub fn is_masked(value: &str) -> bool {
    value.contains(MASK_CHAR)
}

pub(super) fn first_value<'a>(record: &'a VehicleRecord, sources: &[&str]) -> Option<&'a Value> {
    sources.iter().find_map(|p| record.value(p))
}
