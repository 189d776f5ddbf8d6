pub mod ai;

pub use ai::{AiClient, GeminiClient};
