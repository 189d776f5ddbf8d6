//! Quick check that the configured Gemini key and model answer a prompt.

use stock_analysis_be::clients::{AiClient, GeminiClient};
use stock_analysis_be::config::Config;

const PROMPT: &str = "Tell me a fun fact about the Roman Empire.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let key_tail: String = config
        .api_key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    println!("Setting up Gemini API with key: ...{}", key_tail);

    let client = GeminiClient::new(&config).map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("\nTesting {} with prompt: '{}'", config.model, PROMPT);
    match client.generate(PROMPT.to_string()).await {
        Ok(text) => {
            println!("\nGemini API Test Successful!");
            println!("Response:");
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            println!("\nGemini API Test Failed!");
            println!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
