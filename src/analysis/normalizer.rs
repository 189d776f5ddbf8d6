//! Turns the model's free-text reply into an [`AnalysisResult`].
//!
//! Only locating and parsing the embedded JSON object can fail. Every field
//! after that has a local fallback, so a missing or malformed value never
//! aborts the rest of the record.

use serde_json::Value;

use crate::analysis::fields::{format_inr, group_thousands, Exchange, Reading, Scalar, Section, NOT_AVAILABLE};
use crate::analysis::AnalysisQuery;
use crate::error::NormalizationError;
use crate::types::{AnalysisResult, ExtendedMetrics, PersonalPosition, RawAnalysis, RawStockRating, StockRating};

/// Sub-keys of a structured `analysis` mapping, in output order.
const ANALYSIS_SECTIONS: &[(&str, &str)] = &[
    ("company_overview", "Company Overview"),
    ("business_model", "Business Model"),
    ("recent_performance", "Recent Performance"),
    ("market_trends", "Market Trends"),
    ("key_strengths", "Key Strengths"),
    ("competitive_advantages", "Competitive Advantages"),
    ("potential_risks", "Potential Risks"),
    ("future_growth_prospects", "Future Growth Prospects"),
];

const ANALYSIS_UNAVAILABLE: &str = "Analysis not available";

const PRICE_NOISE: &[char] = &['₹', ','];
const PERCENT_NOISE: &[char] = &['%'];
const RATIO_NOISE: &[char] = &[','];

/// Normalizes a raw model reply for the given query.
pub fn normalize(raw_text: &str, query: &AnalysisQuery) -> Result<AnalysisResult, NormalizationError> {
    let candidate = extract_json(raw_text)?;
    let raw = parse_payload(candidate)?;
    let result = complete(raw, query);

    tracing::debug!(ticker = %query.ticker, "Normalized analysis reply");
    Ok(result)
}

/// Slice from the first `{` to the last `}`, inclusive.
pub fn extract_json(raw_text: &str) -> Result<&str, NormalizationError> {
    let start = raw_text.find('{').ok_or(NormalizationError::NoJsonFound)?;
    let end = raw_text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or(NormalizationError::NoJsonFound)?;

    Ok(&raw_text[start..=end])
}

pub fn parse_payload(candidate: &str) -> Result<RawAnalysis, NormalizationError> {
    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| NormalizationError::MalformedJson(e.to_string()))?;

    if !value.is_object() {
        return Err(NormalizationError::MalformedJson(
            "top-level value is not an object".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| NormalizationError::MalformedJson(e.to_string()))
}

/// Fills defaults and coerces every field of a parsed reply. Total: never
/// fails.
pub fn complete(raw: RawAnalysis, query: &AnalysisQuery) -> AnalysisResult {
    let current_price = coerce_amount(raw.current_price.as_ref(), PRICE_NOISE);

    let extended = query.mode.is_extended().then(|| ExtendedMetrics {
        book_value: raw.book_value.unwrap_or_default(),
        roce: raw.roce.unwrap_or_default(),
        debt_equity: raw.debt_equity.unwrap_or_default(),
        shareholding_pattern: raw.shareholding_pattern.into(),
        technical_indicators: raw.technical_indicators.into(),
        industry_analysis: raw.industry_analysis.into(),
        risk_assessment: raw.risk_assessment.into(),
        stock_rating: raw.stock_rating.map(coerce_rating).into(),
    });

    AnalysisResult {
        company_name: raw.company_name.unwrap_or_default(),
        ticker: ticker_text(raw.ticker),
        exchange: Exchange::from_scalar(raw.exchange.as_ref()),
        current_price,
        day_change: coerce_amount(raw.day_change.as_ref(), PRICE_NOISE),
        day_change_percent: coerce_amount(raw.day_change_percent.as_ref(), PERCENT_NOISE),
        market_cap: market_cap(raw.market_cap),
        pe_ratio: coerce_ratio(raw.pe_ratio.as_ref()),
        dividend_yield: strip_yield(raw.dividend_yield),
        fifty_two_week_range: raw.fifty_two_week_range.unwrap_or_default(),
        volume: raw.volume.unwrap_or_default(),
        extended,
        personal_position: personal_position(raw.personal_position, current_price, query),
        analysis: flatten_analysis(raw.analysis),
        recommendation: clean_recommendation(raw.recommendation),
    }
}

fn ticker_text(value: Option<Scalar>) -> String {
    match value {
        Some(Scalar::Text(text)) if !text.trim().is_empty() => text,
        Some(Scalar::Text(_)) | None => NOT_AVAILABLE.to_string(),
        Some(other) => other.to_string(),
    }
}

fn coerce_amount(value: Option<&Scalar>, noise: &[char]) -> f64 {
    value.and_then(|v| v.to_f64(noise)).unwrap_or(0.0)
}

fn coerce_ratio(value: Option<&Scalar>) -> Reading<f64> {
    match value {
        Some(scalar) if scalar.is_not_available() => Reading::NotAvailable,
        Some(scalar) => scalar.to_f64(RATIO_NOISE).into(),
        None => Reading::NotAvailable,
    }
}

// Yield stays textual; only the percent sign goes.
fn strip_yield(value: Option<Scalar>) -> Scalar {
    match value {
        Some(Scalar::Text(text)) if text != NOT_AVAILABLE => {
            Scalar::Text(text.trim_end_matches('%').to_string())
        }
        Some(other) => other,
        None => Scalar::not_available(),
    }
}

fn market_cap(value: Option<Scalar>) -> String {
    match value {
        Some(Scalar::Text(text)) => text,
        Some(Scalar::Integer(amount)) => format_market_cap(amount as f64),
        Some(Scalar::Number(amount)) => format_market_cap(amount),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Renders a raw market capitalisation with a magnitude suffix.
pub fn format_market_cap(amount: f64) -> String {
    if amount >= 1e12 {
        format!("₹{:.2}T", amount / 1e12)
    } else if amount >= 1e9 {
        format!("₹{:.2}B", amount / 1e9)
    } else if amount >= 1e6 {
        format!("₹{:.2}M", amount / 1e6)
    } else if amount < 0.0 {
        format!("₹-{}", group_thousands(-amount))
    } else {
        format!("₹{}", group_thousands(amount))
    }
}

fn coerce_rating(raw: RawStockRating) -> StockRating {
    StockRating {
        overall_rating: score(raw.overall_rating),
        financial_health: score(raw.financial_health),
        growth_prospects: score(raw.growth_prospects),
        management_quality: score(raw.management_quality),
        valuation: score(raw.valuation),
        technical_strength: score(raw.technical_strength),
    }
}

fn score(value: Option<Scalar>) -> Reading<u8> {
    value
        .and_then(|v| v.to_f64(PERCENT_NOISE))
        .map(|v| v.round().clamp(1.0, 100.0) as u8)
        .into()
}

fn personal_position(
    raw: Option<PersonalPosition>,
    current_price: f64,
    query: &AnalysisQuery,
) -> Option<Section<PersonalPosition>> {
    let Some(avg_price) = query.avg_holding_price else {
        return query.mode.is_extended().then_some(Section::NotAvailable);
    };

    let mut position = raw.unwrap_or_default();
    position.avg_holding_price = Scalar::Number(avg_price);

    if current_price > 0.0 && avg_price > 0.0 {
        let gain = current_price - avg_price;
        if position.current_return.is_not_available() {
            position.current_return = Scalar::Text(format!("{:.2}%", gain / avg_price * 100.0));
        }
        if position.return_amount.is_not_available() {
            position.return_amount = Scalar::Text(format_inr(gain));
        }
    }

    Some(Section::Present(position))
}

fn flatten_analysis(value: Option<Value>) -> String {
    match value {
        None => NOT_AVAILABLE.to_string(),
        Some(Value::String(text)) => text,
        Some(Value::Object(sections)) => ANALYSIS_SECTIONS
            .iter()
            .filter_map(|(key, label)| {
                sections
                    .get(*key)
                    .map(|body| format!("{}:\n{}", label, render_section(body)))
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        Some(_) => ANALYSIS_UNAVAILABLE.to_string(),
    }
}

fn render_section(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(render_section).collect::<Vec<_>>().join("\n"),
        other => other.to_string(),
    }
}

fn clean_recommendation(value: Option<Value>) -> String {
    match value {
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                capitalize_first(trimmed)
            }
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

// Only the first character changes; the rest keeps the model's casing.
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
