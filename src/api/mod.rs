pub mod analyze;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::analysis::AnalysisMode;
use crate::clients::AiClient;
use crate::config::Config;
use crate::types::MessageResponse;
use crate::{AppError, Result};

#[derive(Clone)]
pub struct AppState {
    pub ai_client: Arc<dyn AiClient>,
    pub analysis_mode: AnalysisMode,
}

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/analyze", post(analyze::handler))
}

/// Full application: routes plus CORS, preflight status and request tracing.
pub fn app(state: Arc<AppState>, config: &Config) -> Result<Router> {
    let origin = HeaderValue::from_str(&config.allowed_origin).map_err(|e| {
        AppError::Config(format!("Invalid ALLOWED_ORIGIN '{}': {}", config.allowed_origin, e))
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(create_router()
        .layer(cors)
        .layer(middleware::from_fn(preflight_no_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Stock Analysis API".to_string(),
    })
}

// The CORS layer answers every OPTIONS request itself with 200; preflights
// are reported as 204 instead.
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
