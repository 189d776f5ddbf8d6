use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Reasons the model's reply could not be turned into an analysis record.
///
/// Both variants reach the client as the same fixed message; the distinction
/// only shows up in server logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("No JSON found in response")]
    NoJsonFound,

    #[error("Malformed JSON in response: {0}")]
    MalformedJson(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Failed to parse analysis: {0}")]
    Normalization(#[from] NormalizationError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::Normalization(err) => {
                tracing::error!("Error parsing Gemini response: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Failed to parse analysis",
                        "detail": "Could not process the AI response",
                    }),
                )
            }
            AppError::Internal(err) => {
                tracing::error!("Internal error: {}", err);
                internal_error(err.to_string())
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                internal_error(msg)
            }
            AppError::ExternalApi(msg) => {
                tracing::error!("External API error: {}", msg);
                internal_error(msg)
            }
            AppError::Timeout(msg) => {
                tracing::error!("Upstream timeout: {}", msg);
                internal_error(msg)
            }
        };

        (status, Json(body)).into_response()
    }
}

// Unclassified failures carry their raw text back to the caller.
fn internal_error(detail: String) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({
            "error": "An internal server error occurred",
            "detail": detail,
        }),
    )
}

pub type Result<T> = std::result::Result<T, AppError>;
