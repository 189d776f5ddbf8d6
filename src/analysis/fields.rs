//! Field value types for analysis records.
//!
//! The model gives no schema guarantee, so ingestion goes through the
//! lenient deserializers here: a value of the wrong shape is treated as
//! absent instead of failing the whole payload.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Placeholder for any value the model did not provide or that could not be
/// coerced.
pub const NOT_AVAILABLE: &str = "N/A";

/// A scalar the model may send either as a number or as formatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn not_available() -> Self {
        Scalar::Text(NOT_AVAILABLE.to_string())
    }

    pub fn is_not_available(&self) -> bool {
        matches!(self, Scalar::Text(text) if text == NOT_AVAILABLE)
    }

    /// Numeric view of the scalar. Text is parsed after dropping the given
    /// characters and surrounding whitespace.
    pub fn to_f64(&self, strip: &[char]) -> Option<f64> {
        match self {
            Scalar::Integer(value) => Some(*value as f64),
            Scalar::Number(value) => Some(*value),
            Scalar::Text(text) => parse_decimal(text, strip),
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::not_available()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(value) => write!(f, "{}", value),
            Scalar::Number(value) => write!(f, "{}", value),
            Scalar::Text(text) => f.write_str(text),
        }
    }
}

/// A numeric reading that is either known or explicitly unavailable.
///
/// Serializes as the bare number or as `"N/A"`, which keeps "no ratio"
/// distinct from a ratio of zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Reading<T> {
    Value(T),
    #[default]
    NotAvailable,
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reading::NotAvailable, Reading::Value)
    }
}

impl<T: Serialize> Serialize for Reading<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Value(value) => value.serialize(serializer),
            Reading::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// A nested sub-record, or `"N/A"` when the model left it out.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Section<T> {
    Present(T),
    #[default]
    NotAvailable,
}

impl<T> From<Option<T>> for Section<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Section::NotAvailable, Section::Present)
    }
}

impl<T: Serialize> Serialize for Section<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Section::Present(value) => value.serialize(serializer),
            Section::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Exchange {
    Nse,
    Bse,
    Other(String),
    #[default]
    NotAvailable,
}

impl Exchange {
    pub fn from_scalar(value: Option<&Scalar>) -> Self {
        let text = match value {
            Some(Scalar::Text(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => return Exchange::NotAvailable,
        };

        match text.trim().to_ascii_uppercase().as_str() {
            "NSE" => Exchange::Nse,
            "BSE" => Exchange::Bse,
            "" | NOT_AVAILABLE => Exchange::NotAvailable,
            _ => Exchange::Other(text),
        }
    }
}

impl Serialize for Exchange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Exchange::Nse => serializer.serialize_str("NSE"),
            Exchange::Bse => serializer.serialize_str("BSE"),
            Exchange::Other(text) => serializer.serialize_str(text),
            Exchange::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// 52-week trading range, as the model's formatted text or a low/high pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeekRange {
    Formatted(String),
    Bounds { low: Scalar, high: Scalar },
}

impl Default for WeekRange {
    fn default() -> Self {
        WeekRange::Formatted(NOT_AVAILABLE.to_string())
    }
}

/// Parses a loosely formatted decimal, e.g. `"₹3,512.40"` with `strip` set
/// to `['₹', ',']`. Non-finite results are rejected.
pub fn parse_decimal(text: &str, strip: &[char]) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| !strip.contains(c)).collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Renders an INR amount with comma grouping and two decimals, sign first.
pub fn format_inr(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}₹{}", sign, group_thousands(amount.abs()))
}

/// Comma-grouped magnitude with two decimals, e.g. `850,000.00`.
pub fn group_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}.{}", grouped, fraction)
}

/// Field deserializer that yields `None` for a value of the wrong shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], falling back to the type's default.
pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Keeps any present value, including `null`, so callers can tell an explicit
/// null apart from a missing key.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// List field that also accepts a single scalar in place of the list.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        single => serde_json::from_value(single).map(|s| vec![s]).unwrap_or_default(),
    };
    Ok(items)
}
