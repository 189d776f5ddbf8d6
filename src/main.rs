use stock_analysis_be::api::{self, AppState};
use stock_analysis_be::clients::{AiClient, GeminiClient};
use stock_analysis_be::config::Config;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_analysis_be=debug,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{}", e))?;

    // The generation client is built once and shared by every request
    let ai_client: Arc<dyn AiClient> = Arc::new(GeminiClient::new(&config).map_err(|e| anyhow::anyhow!("{}", e))?);
    tracing::info!("Successfully configured Gemini API");

    let app_state = Arc::new(AppState {
        ai_client,
        analysis_mode: config.analysis_mode,
    });

    let app = api::app(app_state, &config).map_err(|e| anyhow::anyhow!("{}", e))?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        "Server listening on http://{} ({:?} analysis)",
        config.bind_addr,
        config.analysis_mode
    );

    axum::serve(listener, app).await?;

    Ok(())
}
