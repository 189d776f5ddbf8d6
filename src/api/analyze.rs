use anyhow::anyhow;
use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, State},
    http::{header, HeaderMap, Request},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::analysis::fields::{parse_decimal, Scalar};
use crate::analysis::{normalize, AnalysisQuery};
use crate::api::AppState;
use crate::clients::ai::prompts::build_prompt;
use crate::types::{AnalysisResult, AnalyzeJsonBody, AnalyzeRequest};
use crate::{AppError, Result};

const PRICE_NOISE: &[char] = &['₹', ','];

pub async fn handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnalysisResult>> {
    let start = Instant::now();
    info!("Received analyze request");

    let request = read_request(&headers, body).await?;
    info!(
        "Received request for ticker: {:?} with avg price: {:?}",
        request.ticker, request.avg_holding_price
    );

    let Some(ticker) = request.ticker else {
        warn!("No ticker provided in request");
        return Err(AppError::Validation("Ticker is required".to_string()));
    };

    let query = AnalysisQuery::new(ticker, request.avg_holding_price, state.analysis_mode);
    info!("Analyzing ticker: {}", query.ticker);

    let prompt = build_prompt(&query.ticker, query.avg_holding_price, query.mode);
    debug!("Prompt is {} characters", prompt.len());

    let text = state.ai_client.generate(prompt).await?;
    debug!(
        "{} replied with {} characters",
        state.ai_client.provider_name(),
        text.len()
    );

    let analysis = normalize(&text, &query)?;

    info!(
        "Successfully analyzed {} in {}ms",
        query.ticker,
        start.elapsed().as_millis()
    );
    Ok(Json(analysis))
}

/// Reads the analyze request from a JSON, urlencoded or multipart body.
pub async fn read_request(headers: &HeaderMap, body: Bytes) -> Result<AnalyzeRequest> {
    if is_multipart(headers) && !body.iter().all(u8::is_ascii_whitespace) {
        parse_multipart(headers, body).await
    } else {
        parse_request(headers, &body)
    }
}

/// Reads the analyze request from a JSON or form-encoded body. An empty body
/// yields an empty request.
pub fn parse_request(headers: &HeaderMap, body: &[u8]) -> Result<AnalyzeRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AnalyzeRequest::default());
    }

    if is_json(headers) {
        parse_json(body)
    } else {
        parse_form(body)
    }
}

fn mime_type(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().to_ascii_lowercase())
}

fn is_json(headers: &HeaderMap) -> bool {
    mime_type(headers).is_some_and(|mime| {
        mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
    })
}

fn is_multipart(headers: &HeaderMap) -> bool {
    mime_type(headers).is_some_and(|mime| mime == "multipart/form-data")
}

fn parse_json(body: &[u8]) -> Result<AnalyzeRequest> {
    let parsed: AnalyzeJsonBody = serde_json::from_slice(body)
        .map_err(|e| AppError::Internal(anyhow!("Invalid JSON body: {}", e)))?;

    let avg_holding_price = match parsed.avg_holding_price {
        Some(Scalar::Text(text)) => parse_holding_price(&text)?,
        Some(number) => number.to_f64(&[]),
        None => None,
    };

    Ok(AnalyzeRequest {
        ticker: parsed.ticker.and_then(|t| clean_ticker(&t.to_string())),
        avg_holding_price: avg_holding_price.filter(|price| *price > 0.0),
    })
}

fn parse_form(body: &[u8]) -> Result<AnalyzeRequest> {
    let mut request = AnalyzeRequest::default();

    for (key, value) in url::form_urlencoded::parse(body) {
        apply_form_field(&mut request, &key, &value)?;
    }

    Ok(request)
}

async fn parse_multipart(headers: &HeaderMap, body: Bytes) -> Result<AnalyzeRequest> {
    let mut builder = Request::builder();
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let inner = builder
        .body(Body::from(body))
        .map_err(|e| AppError::Internal(anyhow!("Invalid multipart request: {}", e)))?;

    let mut multipart = Multipart::from_request(inner, &())
        .await
        .map_err(|e| AppError::Internal(anyhow!("Invalid multipart body: {}", e)))?;

    let mut request = AnalyzeRequest::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Internal(anyhow!("Invalid multipart field: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| AppError::Internal(anyhow!("Invalid multipart field '{}': {}", name, e)))?;
        apply_form_field(&mut request, &name, &value)?;
    }

    Ok(request)
}

// First occurrence of each field wins.
fn apply_form_field(request: &mut AnalyzeRequest, key: &str, value: &str) -> Result<()> {
    match key {
        "ticker" if request.ticker.is_none() => request.ticker = clean_ticker(value),
        "avg_holding_price" if request.avg_holding_price.is_none() => {
            request.avg_holding_price = parse_holding_price(value)?.filter(|price| *price > 0.0);
        }
        _ => {}
    }
    Ok(())
}

fn clean_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim();
    (!ticker.is_empty()).then(|| ticker.to_string())
}

// Blank means no holding price; anything else must be a number.
fn parse_holding_price(raw: &str) -> Result<Option<f64>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    parse_decimal(raw, PRICE_NOISE)
        .map(Some)
        .ok_or_else(|| AppError::Internal(anyhow!("could not convert avg_holding_price '{}' to a number", raw)))
}
