use crate::analysis::AnalysisMode;

/// Numbered instruction sections: title and bullet points.
type PromptSection = (&'static str, &'static [&'static str]);

const BASIC_INFORMATION: PromptSection = (
    "Basic Information",
    &[
        "Full company name",
        "Current stock price (in INR)",
        "Recent price changes",
        "Trading volume",
        "Exchange (NSE/BSE)",
    ],
);

const CORE_METRICS: &[&str] = &[
    "Market capitalization (in Crores/Lakhs)",
    "P/E ratio",
    "Dividend yield",
    "52-week price range",
    "Revenue and earnings trends",
];

const EXTENDED_METRICS: &[&str] = &[
    "Book value",
    "ROCE (Return on Capital Employed)",
    "Debt to Equity ratio",
];

const EXTENDED_SECTIONS: &[PromptSection] = &[
    (
        "Shareholding Pattern",
        &[
            "FII (Foreign Institutional Investors) holdings percentage",
            "DII (Domestic Institutional Investors) holdings percentage",
            "Promoter holdings percentage",
            "Public holdings percentage",
            "Quarter-on-quarter change in institutional holdings",
        ],
    ),
    (
        "Technical Indicators",
        &[
            "RSI (Relative Strength Index)",
            "Moving averages (50-day and 200-day)",
            "Volume trend",
            "Support and resistance levels",
            "Technical patterns identified",
        ],
    ),
    (
        "Industry Analysis",
        &[
            "Sector performance",
            "Peer comparison",
            "Market share",
            "Competitive position",
        ],
    ),
    (
        "Risk Assessment",
        &[
            "Company-specific risks",
            "Industry risks",
            "Economic risks",
            "Regulatory risks",
        ],
    ),
    (
        "Stock Rating",
        &[
            "Overall rating (1-100 scale)",
            "Individual component scores: financial health, growth prospects, management quality, valuation, technical strength (each 1-100)",
        ],
    ),
];

const EXTENDED_SCHEMA: &str = r#"    "book_value": "Book value per share in INR",
    "roce": "Return on Capital Employed in %",
    "debt_equity": "Debt to Equity ratio",
    "shareholding_pattern": {
        "fii_holding": "FII holding %",
        "dii_holding": "DII holding %",
        "promoter_holding": "Promoter holding %",
        "public_holding": "Public holding %",
        "holding_changes": "Quarter-on-quarter changes"
    },
    "technical_indicators": {
        "rsi": "RSI value",
        "moving_avg_50": "50-day MA in INR",
        "moving_avg_200": "200-day MA in INR",
        "volume_trend": "Volume trend analysis",
        "support_levels": ["Support price levels in INR"],
        "resistance_levels": ["Resistance price levels in INR"],
        "patterns": ["Identified technical patterns"]
    },
    "industry_analysis": {
        "sector_performance": "Sector performance analysis",
        "peer_comparison": "Comparison with peers",
        "market_share": "Market share details",
        "competitive_position": "Competitive position analysis"
    },
    "risk_assessment": {
        "company_risks": ["List of company-specific risks"],
        "industry_risks": ["List of industry risks"],
        "economic_risks": ["List of economic risks"],
        "regulatory_risks": ["List of regulatory risks"]
    },
    "stock_rating": {
        "overall_rating": "Rating between 1-100",
        "financial_health": "Score between 1-100",
        "growth_prospects": "Score between 1-100",
        "management_quality": "Score between 1-100",
        "valuation": "Score between 1-100",
        "technical_strength": "Score between 1-100"
    },
"#;

const POSITION_SCHEMA: &str = r#"    "personal_position": {
        "avg_holding_price": "User's average holding price in INR",
        "current_return": "Percentage return on investment",
        "return_amount": "Absolute return amount in INR",
        "position_advice": "Detailed advice based on current position",
        "action_items": ["List of recommended actions"]
    },
"#;

const FORMATTING_RULES: &str = r#"Make sure all numerical values are realistic and current. If exact values aren't available, provide reasonable estimates based on recent market data. Format numbers appropriately:
- Market cap in crores/lakhs (e.g., "₹2,500 Cr" or "₹85 L")
- P/E ratio as a number (e.g., "25.3")
- Dividend yield as percentage (e.g., "2.5%")
- 52-week range as "low - high" (e.g., "₹125.30 - ₹198.45")
- All currency values should be in INR (₹) with comma grouping"#;

const RATING_RULE: &str = "- Ratings should be integers between 1-100";

/// Builds the analysis prompt for a ticker.
///
/// The position block and the `personal_position` schema entry appear only
/// when a holding price is given.
pub fn build_prompt(ticker: &str, avg_holding_price: Option<f64>, mode: AnalysisMode) -> String {
    let extended = mode.is_extended();
    let position_context = avg_holding_price
        .map(position_block)
        .unwrap_or_default();

    let mut metrics = CORE_METRICS.to_vec();
    if extended {
        metrics.extend_from_slice(EXTENDED_METRICS);
    }

    let mut sections: Vec<(&str, &[&str])> =
        vec![BASIC_INFORMATION, ("Key Financial Metrics", metrics.as_slice())];
    if extended {
        sections.extend_from_slice(EXTENDED_SECTIONS);
    }

    let mut rules = FORMATTING_RULES.to_string();
    if extended {
        rules.push('\n');
        rules.push_str(RATING_RULE);
    }

    format!(
        r#"Analyze the Indian stock {ticker} (from NSE/BSE) and provide comprehensive information in JSON format.
{position_context}
Include:

{sections}

Format the response as a JSON object with these fields:
{schema}

{rules}"#,
        ticker = ticker,
        position_context = position_context,
        sections = render_sections(&sections),
        schema = response_schema(ticker, avg_holding_price.is_some(), extended),
        rules = rules,
    )
}

fn position_block(avg_holding_price: f64) -> String {
    format!(
        r#"
The user has an average holding price of ₹{:.2} for this stock.
Based on this information, provide specific recommendations:
- If they are in profit, advise whether to:
  * Book complete profit
  * Book partial profit and hold remaining
  * Hold entire position
  * Add more to position
- If they are in loss, advise whether to:
  * Book the loss
  * Average down by buying more
  * Hold and wait for recovery
Consider factors like:
- Percentage of profit/loss
- Current market conditions
- Stock's future prospects
- Risk factors
"#,
        avg_holding_price
    )
}

fn render_sections(sections: &[(&str, &[&str])]) -> String {
    sections
        .iter()
        .enumerate()
        .map(|(i, (title, items))| {
            let bullets = items
                .iter()
                .map(|item| format!("   - {}", item))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{}. {}:\n{}", i + 1, title, bullets)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn response_schema(ticker: &str, with_position: bool, extended: bool) -> String {
    let mut schema = format!(
        r#"{{
    "company_name": "Full company name",
    "ticker": "{}",
    "exchange": "NSE or BSE",
    "current_price": "Current price in INR",
    "day_change": "Recent price change in INR",
    "day_change_percent": "Percentage change",
    "market_cap": "Market capitalization (use Cr for Crores, L for Lakhs)",
    "pe_ratio": "Price to earnings ratio",
    "dividend_yield": "Current dividend yield with %",
    "fifty_two_week_range": "52-week low - high range in INR",
    "volume": "Trading volume",
"#,
        ticker
    );

    if extended {
        schema.push_str(EXTENDED_SCHEMA);
    }
    if with_position {
        schema.push_str(POSITION_SCHEMA);
    }

    schema.push_str(
        r#"    "analysis": "Detailed analysis including all aspects mentioned above",
    "recommendation": "Buy/Hold/Sell with brief reasoning"
}"#,
    );
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_ticker() {
        let prompt = build_prompt("INFY", None, AnalysisMode::Extended);
        assert!(prompt.starts_with("Analyze the Indian stock INFY (from NSE/BSE)"));
        assert!(prompt.contains(r#""ticker": "INFY""#));
        assert!(prompt.contains("\"₹2,500 Cr\""));
    }

    #[test]
    fn test_no_position_block_without_price() {
        for ticker in ["TCS", "RELIANCE.NS", "500325"] {
            let prompt = build_prompt(ticker, None, AnalysisMode::Extended);
            assert!(!prompt.contains("average holding price"));
            assert!(!prompt.contains("personal_position"));
            assert!(!prompt.contains("Average down"));
        }
    }

    #[test]
    fn test_position_block_with_price() {
        let prompt = build_prompt("TCS", Some(3150.5), AnalysisMode::Extended);
        assert!(prompt.contains("The user has an average holding price of ₹3150.50 for this stock."));
        assert!(prompt.contains("Book partial profit and hold remaining"));
        assert!(prompt.contains("Hold and wait for recovery"));
        assert!(prompt.contains("\"personal_position\": {"));
    }

    #[test]
    fn test_basic_mode_leaves_out_extended_sections() {
        let prompt = build_prompt("TCS", None, AnalysisMode::Basic);
        assert!(prompt.contains("1. Basic Information:"));
        assert!(prompt.contains("2. Key Financial Metrics:"));
        assert!(!prompt.contains("Shareholding Pattern"));
        assert!(!prompt.contains("stock_rating"));
        assert!(!prompt.contains("ROCE"));

        let extended = build_prompt("TCS", None, AnalysisMode::Extended);
        assert!(extended.contains("7. Stock Rating:"));
        assert!(extended.contains("\"stock_rating\": {"));
        assert!(extended.contains(RATING_RULE));
    }

    #[test]
    fn test_schema_ends_with_narrative_fields() {
        let prompt = build_prompt("TCS", Some(10.0), AnalysisMode::Basic);
        let schema_start = prompt.find("Format the response").unwrap();
        let schema = &prompt[schema_start..];
        let position = schema.find("personal_position").unwrap();
        let analysis = schema.find("\"analysis\"").unwrap();
        assert!(position < analysis);
        assert!(schema.contains("\"recommendation\": \"Buy/Hold/Sell with brief reasoning\"\n}"));
    }
}
