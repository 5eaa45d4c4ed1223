//! Cell values and their coercions.
//!
//! Grid rows are opaque records, so every value read out of a row is carried
//! as a [`CellValue`]. Filter operators and the sort comparator never look at
//! the variant directly; they go through the coercions defined here:
//!
//! | Coercion              | Null    | Bool      | Number        | String              | Date          |
//! |-----------------------|---------|-----------|---------------|---------------------|---------------|
//! | [`to_display_string`] | `""`    | `"true"`  | shortest form | itself              | ISO-8601 UTC  |
//! | [`to_number`]         | NaN     | 1 / 0     | itself        | parsed, else NaN    | epoch millis  |
//! | [`to_bool`]           | false   | itself    | non-zero      | non-empty           | true          |
//! | [`to_date`]           | None    | None      | epoch millis  | parsed              | itself        |
//!
//! [`to_display_string`]: CellValue::to_display_string
//! [`to_number`]: CellValue::to_number
//! [`to_bool`]: CellValue::to_bool
//! [`to_date`]: CellValue::to_date

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single value read from a row.
///
/// Deserializes from plain JSON (`null`, booleans, numbers, strings, arrays).
/// Dates arrive as strings and are parsed on demand by date-aware code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No value (`null` / missing field).
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    String(String),
    /// Point in time.
    Date(DateTime<Utc>),
    /// List of values (used by multi-value filter operators).
    List(Vec<CellValue>),
}

impl CellValue {
    /// Returns `true` for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns `true` for the empty string (no trimming).
    pub fn is_empty_string(&self) -> bool {
        matches!(self, CellValue::String(s) if s.is_empty())
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// String coercion.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::String(s) => s.clone(),
            CellValue::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
            CellValue::List(items) => items
                .iter()
                .map(CellValue::to_display_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Numeric cast. Malformed input yields NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            CellValue::Null => f64::NAN,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Number(n) => *n,
            CellValue::String(s) => parse_number(s),
            CellValue::Date(d) => d.timestamp_millis() as f64,
            CellValue::List(items) => match items.as_slice() {
                [] => 0.0,
                [single] => single.to_number(),
                _ => f64::NAN,
            },
        }
    }

    /// Boolean coercion (truthiness).
    pub fn to_bool(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::String(s) => !s.is_empty(),
            CellValue::Date(_) | CellValue::List(_) => true,
        }
    }

    /// Date coercion. Returns `None` when the value is not a recognizable date.
    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Number(n) if n.is_finite() => Utc.timestamp_millis_opt(*n as i64).single(),
            CellValue::String(s) => parse_date(s),
            _ => None,
        }
    }

    /// Milliseconds since the epoch, or NaN when the value is not a date.
    pub fn to_timestamp_millis(&self) -> f64 {
        self.to_date()
            .map(|d| d.timestamp_millis() as f64)
            .unwrap_or(f64::NAN)
    }

    /// Calendar day as `YYYY-MM-DD`, used for day-precision comparisons.
    pub fn day_key(&self) -> Option<String> {
        self.to_date().map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Flattens the value into a list of strings.
    ///
    /// Lists yield their elements; strings are split on commas; anything else
    /// yields its string coercion. Empty entries are dropped.
    pub fn to_string_list(&self) -> Vec<String> {
        let raw = match self {
            CellValue::Null => Vec::new(),
            CellValue::List(items) => items.iter().map(CellValue::to_display_string).collect(),
            CellValue::String(s) => s.split(',').map(|part| part.trim().to_string()).collect(),
            other => vec![other.to_display_string()],
        };
        raw.into_iter().filter(|s| !s.is_empty()).collect()
    }
}

/// Formats a number the way a host UI expects to see it typed.
///
/// Integral values print without a fractional part (`42`, not `42.0`).
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        n.to_string()
    }
}

/// Parses a numeric string with the lenient rules hosts rely on.
///
/// Surrounding whitespace is ignored, a blank string is zero, `Infinity` and
/// hexadecimal (`0x1f`) literals are accepted, and anything else that is not
/// a plain decimal literal is NaN.
fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }

    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    let plain = t
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !plain {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// Parses the date formats hosts commonly hand over.
///
/// Naive timestamps and bare dates are interpreted as UTC.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        CellValue::String(value.clone())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<f32> for CellValue {
    fn from(value: f32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl<T: Into<CellValue>> From<Vec<T>> for CellValue {
    fn from(value: Vec<T>) -> Self {
        CellValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::String(s.clone()),
            Value::Array(items) => CellValue::List(items.iter().map(CellValue::from).collect()),
            Value::Object(_) => CellValue::String(value.to_string()),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        CellValue::from(&value)
    }
}
