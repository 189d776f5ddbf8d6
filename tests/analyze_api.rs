use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use stock_analysis_be::analysis::AnalysisMode;
use stock_analysis_be::api::{self, AppState};
use stock_analysis_be::clients::AiClient;
use stock_analysis_be::config::Config;
use stock_analysis_be::{AppError, Result};

const ORIGIN: &str = "http://localhost:3000";

/// Replays a canned reply and records every prompt it receives.
struct StubClient {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StubClient {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for StubClient {
    async fn generate(&self, prompt: String) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt);
        self.reply.clone().map_err(AppError::ExternalApi)
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

fn app_with(client: Arc<StubClient>, mode: AnalysisMode) -> Router {
    let config = Config::from_lookup(|key| (key == "GEMINI_API_KEY").then(|| "test-key".to_string()))
        .unwrap();
    let state = Arc::new(AppState {
        ai_client: client,
        analysis_mode: mode,
    });
    api::app(state, &config).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const TCS_REPLY: &str = r#"Sure! Here is the analysis you asked for:

```json
{
  "company_name": "Tata Consultancy Services Ltd",
  "ticker": "TCS",
  "exchange": "NSE",
  "current_price": "₹3,512.40",
  "day_change": "₹24.10",
  "day_change_percent": "0.69%",
  "market_cap": "₹12,70,000 Cr",
  "pe_ratio": "29.4",
  "dividend_yield": "1.4%",
  "fifty_two_week_range": "₹3,056.05 - ₹4,592.25",
  "volume": "2.1M",
  "analysis": {
    "company_overview": "India's largest IT services company.",
    "potential_risks": "Slower discretionary spending in the US."
  },
  "recommendation": "  buy because of strong earnings"
}
```

Let me know if you need anything else."#;

#[tokio::test]
async fn root_identifies_service() {
    let app = app_with(StubClient::replying(""), AnalysisMode::Extended);
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Stock Analysis API" }));
}

#[tokio::test]
async fn analyze_returns_normalized_record() {
    let client = StubClient::replying(TCS_REPLY);
    let app = app_with(client.clone(), AnalysisMode::Extended);

    let (status, body) = send(app, post_json(json!({ "ticker": "TCS" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendation"], "Buy because of strong earnings");
    assert_eq!(body["ticker"], "TCS");
    assert_eq!(body["exchange"], "NSE");
    assert_eq!(body["current_price"], json!(3512.4));
    assert_eq!(body["day_change_percent"], json!(0.69));
    assert_eq!(body["pe_ratio"], json!(29.4));
    assert_eq!(body["dividend_yield"], "1.4");
    assert_eq!(body["market_cap"], "₹12,70,000 Cr");
    assert_eq!(body["stock_rating"], "N/A");
    assert_eq!(body["personal_position"], "N/A");
    assert_eq!(
        body["analysis"],
        "Company Overview:\nIndia's largest IT services company.\n\nPotential Risks:\nSlower discretionary spending in the US."
    );

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Analyze the Indian stock TCS"));
    assert!(!prompts[0].contains("average holding price"));
}

#[tokio::test]
async fn analyze_with_holding_price_from_form() {
    let client = StubClient::replying(TCS_REPLY);
    let app = app_with(client.clone(), AnalysisMode::Extended);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("ticker=TCS&avg_holding_price=3200"))
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["personal_position"]["avg_holding_price"], json!(3200.0));
    assert_eq!(body["personal_position"]["return_amount"], "₹312.40");
    assert!(client.prompts()[0].contains("average holding price of ₹3200.00"));
}

#[tokio::test]
async fn analyze_with_holding_price_from_multipart_form() {
    let client = StubClient::replying(TCS_REPLY);
    let app = app_with(client.clone(), AnalysisMode::Extended);
    let body = "--XBOUND\r\n\
Content-Disposition: form-data; name=\"ticker\"\r\n\r\n\
TCS\r\n\
--XBOUND\r\n\
Content-Disposition: form-data; name=\"avg_holding_price\"\r\n\r\n\
3200\r\n\
--XBOUND--\r\n";
    let request = Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUND")
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "TCS");
    assert_eq!(body["personal_position"]["return_amount"], "₹312.40");
    assert!(client.prompts()[0].contains("Analyze the Indian stock TCS"));
}

#[tokio::test]
async fn basic_mode_returns_lean_record() {
    let app = app_with(StubClient::replying(TCS_REPLY), AnalysisMode::Basic);

    let (status, body) = send(app, post_json(json!({ "ticker": "TCS" }))).await;

    assert_eq!(status, StatusCode::OK);
    let object = body.as_object().unwrap();
    assert!(object.contains_key("market_cap"));
    assert!(!object.contains_key("shareholding_pattern"));
    assert!(!object.contains_key("personal_position"));
}

#[tokio::test]
async fn empty_body_requires_ticker() {
    let client = StubClient::replying(TCS_REPLY);
    let app = app_with(client.clone(), AnalysisMode::Extended);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Ticker is required" }));
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn blank_ticker_is_rejected() {
    let app = app_with(StubClient::replying(TCS_REPLY), AnalysisMode::Extended);

    let (status, body) = send(app, post_json(json!({ "ticker": "", "avg_holding_price": 120.5 }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Ticker is required");
}

#[tokio::test]
async fn reply_without_json_fails_to_parse() {
    let app = app_with(
        StubClient::replying("I'm sorry, I can't provide real-time stock data."),
        AnalysisMode::Extended,
    );

    let (status, body) = send(app, post_json(json!({ "ticker": "TCS" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse analysis");
    assert_eq!(body["detail"], "Could not process the AI response");
}

#[tokio::test]
async fn malformed_reply_fails_to_parse() {
    let app = app_with(
        StubClient::replying("{ \"company_name\": \"TCS\", \"current_price\": ₹3512 }"),
        AnalysisMode::Extended,
    );

    let (status, body) = send(app, post_json(json!({ "ticker": "TCS" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse analysis");
}

#[tokio::test]
async fn upstream_failure_is_internal_error() {
    let app = app_with(
        StubClient::failing("Gemini API returned 429 Too Many Requests: quota exceeded"),
        AnalysisMode::Extended,
    );

    let (status, body) = send(app, post_json(json!({ "ticker": "TCS" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An internal server error occurred");
    assert_eq!(body["detail"], "Gemini API returned 429 Too Many Requests: quota exceeded");
}

#[tokio::test]
async fn preflight_is_no_content_with_cors_headers() {
    let app = app_with(StubClient::replying(TCS_REPLY), AnalysisMode::Extended);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/analyze")
        .header(header::ORIGIN, ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
}

#[tokio::test]
async fn cors_only_allows_configured_origin() {
    let app = app_with(StubClient::replying(TCS_REPLY), AnalysisMode::Extended);
    let mut allowed = post_json(json!({ "ticker": "TCS" }));
    allowed.headers_mut().insert(header::ORIGIN, ORIGIN.parse().unwrap());

    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);

    let mut foreign = post_json(json!({ "ticker": "TCS" }));
    foreign
        .headers_mut()
        .insert(header::ORIGIN, "http://evil.example".parse().unwrap());

    let response = app.oneshot(foreign).await.unwrap();
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
