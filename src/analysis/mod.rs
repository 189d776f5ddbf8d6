pub mod fields;
pub mod normalizer;

pub use normalizer::normalize;

use std::str::FromStr;

/// How much of the analysis schema is requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Identity, pricing and narrative fields only.
    Basic,
    /// Adds extended metrics, composite sub-records and the stock rating.
    #[default]
    Extended,
}

const BASIC_FIELDS: &[&str] = &[
    "company_name",
    "ticker",
    "exchange",
    "current_price",
    "day_change",
    "day_change_percent",
    "market_cap",
    "pe_ratio",
    "dividend_yield",
    "fifty_two_week_range",
    "volume",
    "analysis",
    "recommendation",
];

const EXTENDED_FIELDS: &[&str] = &[
    "company_name",
    "ticker",
    "exchange",
    "current_price",
    "day_change",
    "day_change_percent",
    "market_cap",
    "pe_ratio",
    "dividend_yield",
    "fifty_two_week_range",
    "volume",
    "book_value",
    "roce",
    "debt_equity",
    "shareholding_pattern",
    "technical_indicators",
    "industry_analysis",
    "risk_assessment",
    "stock_rating",
    "analysis",
    "recommendation",
];

impl AnalysisMode {
    pub fn is_extended(self) -> bool {
        matches!(self, AnalysisMode::Extended)
    }

    /// Top-level keys a normalized record carries in this mode. The record
    /// shape itself enforces this; the list is what tests check against.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            AnalysisMode::Basic => BASIC_FIELDS,
            AnalysisMode::Extended => EXTENDED_FIELDS,
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(AnalysisMode::Basic),
            "extended" => Ok(AnalysisMode::Extended),
            other => Err(format!("unknown analysis mode '{}'", other)),
        }
    }
}

/// What the caller asked for; drives both prompt construction and
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisQuery {
    pub ticker: String,
    pub avg_holding_price: Option<f64>,
    pub mode: AnalysisMode,
}

impl AnalysisQuery {
    pub fn new(ticker: impl Into<String>, avg_holding_price: Option<f64>, mode: AnalysisMode) -> Self {
        Self {
            ticker: ticker.into(),
            avg_holding_price,
            mode,
        }
    }
}
