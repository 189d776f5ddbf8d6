pub mod gemini;
pub mod prompts;

pub use gemini::GeminiClient;

use crate::Result;
use async_trait::async_trait;

/// Text-generation backend: prompt in, free text out.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn generate(&self, prompt: String) -> Result<String>;
    fn provider_name(&self) -> &'static str;
}
