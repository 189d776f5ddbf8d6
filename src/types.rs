use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::fields::{
    lenient, lenient_or_default, one_or_many, present, Exchange, Reading, Scalar, Section,
    WeekRange,
};

// Request Types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeRequest {
    pub ticker: Option<String>,
    pub avg_holding_price: Option<f64>,
}

/// JSON body of `POST /analyze`. Both fields are read leniently and
/// validated by the handler.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeJsonBody {
    #[serde(default, deserialize_with = "lenient")]
    pub ticker: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub avg_holding_price: Option<Scalar>,
}

// Model Reply Types

/// The model's reply as parsed, before normalization. Every field is
/// optional and a field of the wrong shape reads as absent.
#[derive(Debug, Default, Deserialize)]
pub struct RawAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub ticker: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub company_name: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub exchange: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_price: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub day_change: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub day_change_percent: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub market_cap: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub pe_ratio: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub dividend_yield: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub fifty_two_week_range: Option<WeekRange>,
    #[serde(default, deserialize_with = "lenient")]
    pub volume: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub book_value: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub roce: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub debt_equity: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub shareholding_pattern: Option<ShareholdingPattern>,
    #[serde(default, deserialize_with = "lenient")]
    pub technical_indicators: Option<TechnicalIndicators>,
    #[serde(default, deserialize_with = "lenient")]
    pub industry_analysis: Option<IndustryAnalysis>,
    #[serde(default, deserialize_with = "lenient")]
    pub risk_assessment: Option<RiskAssessment>,
    #[serde(default, deserialize_with = "lenient")]
    pub stock_rating: Option<RawStockRating>,
    #[serde(default, deserialize_with = "lenient")]
    pub personal_position: Option<PersonalPosition>,
    // Kept as raw JSON: may be prose or a mapping of named sections.
    #[serde(default, deserialize_with = "present")]
    pub analysis: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub recommendation: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawStockRating {
    #[serde(default, deserialize_with = "lenient")]
    pub overall_rating: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub financial_health: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub growth_prospects: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub management_quality: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub valuation: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub technical_strength: Option<Scalar>,
}

// Sub-records shared by the reply and the response

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareholdingPattern {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub fii_holding: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub dii_holding: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub promoter_holding: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub public_holding: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub holding_changes: Scalar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub rsi: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub moving_avg_50: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub moving_avg_200: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub volume_trend: Scalar,
    #[serde(default, deserialize_with = "one_or_many")]
    pub support_levels: Vec<Scalar>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub resistance_levels: Vec<Scalar>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub patterns: Vec<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryAnalysis {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub sector_performance: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub peer_comparison: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub market_share: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub competitive_position: Scalar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default, deserialize_with = "one_or_many")]
    pub company_risks: Vec<Scalar>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub industry_risks: Vec<Scalar>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub economic_risks: Vec<Scalar>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub regulatory_risks: Vec<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalPosition {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub avg_holding_price: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub current_return: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub return_amount: Scalar,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub position_advice: Scalar,
    #[serde(default, deserialize_with = "one_or_many")]
    pub action_items: Vec<Scalar>,
}

// Response Types

/// Overall and component scores, each 1..=100.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockRating {
    pub overall_rating: Reading<u8>,
    pub financial_health: Reading<u8>,
    pub growth_prospects: Reading<u8>,
    pub management_quality: Reading<u8>,
    pub valuation: Reading<u8>,
    pub technical_strength: Reading<u8>,
}

/// Fields only produced in extended analysis mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedMetrics {
    pub book_value: Scalar,
    pub roce: Scalar,
    pub debt_equity: Scalar,
    pub shareholding_pattern: Section<ShareholdingPattern>,
    pub technical_indicators: Section<TechnicalIndicators>,
    pub industry_analysis: Section<IndustryAnalysis>,
    pub risk_assessment: Section<RiskAssessment>,
    pub stock_rating: Section<StockRating>,
}

/// Normalized analysis returned by `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub company_name: Scalar,
    pub ticker: String,
    pub exchange: Exchange,
    pub current_price: f64,
    pub day_change: f64,
    pub day_change_percent: f64,
    pub market_cap: String,
    pub pe_ratio: Reading<f64>,
    pub dividend_yield: Scalar,
    pub fifty_two_week_range: WeekRange,
    pub volume: Scalar,
    #[serde(flatten)]
    pub extended: Option<ExtendedMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_position: Option<Section<PersonalPosition>>,
    pub analysis: String,
    pub recommendation: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
