//! Runtime configuration read from the environment.

use std::time::Duration;
use url::Url;

use crate::analysis::AnalysisMode;
use crate::{AppError, Result};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key (`GEMINI_API_KEY`, required)
    pub api_key: String,

    /// Gemini model name
    pub model: String,

    /// Base URL of the Gemini REST API
    pub base_url: Url,

    /// Upper bound on a single generation call
    pub request_timeout: Duration,

    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// The single origin allowed by CORS
    pub allowed_origin: String,

    pub analysis_mode: AnalysisMode,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = var("GEMINI_API_KEY")
            .ok_or_else(|| AppError::Config("GEMINI_API_KEY environment variable not set".to_string()))?;

        let base_url = var("GEMINI_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| AppError::Config(format!("Invalid GEMINI_API_BASE_URL '{}': {}", base_url, e)))?;

        let request_timeout = match var("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| AppError::Config(format!("Invalid GEMINI_TIMEOUT_SECS '{}'", raw)))?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let analysis_mode = match var("ANALYSIS_MODE") {
            Some(raw) => raw.parse::<AnalysisMode>().map_err(AppError::Config)?,
            None => AnalysisMode::default(),
        };

        Ok(Self {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
            request_timeout,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            allowed_origin: var("ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
            analysis_mode,
        })
    }

    /// Endpoint for `generateContent` on the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.as_str().trim_end_matches('/'),
            self.model
        )
    }
}
