use async_trait::async_trait;
use thiserror::Error;

pub mod gemini;

pub use gemini::GeminiClient;

/// A generative model API that can answer a prompt with JSON text.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Ask `model` to answer `prompt`, requesting JSON output.
    ///
    /// Returns the raw response text. Parsing is left to the caller.
    async fn generate_json(&self, model: &str, prompt: &str) -> Result<String, ModelError>;
}

/// Why a single model attempt did not produce a usable answer
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Response blocked: {0}")]
    Blocked(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Response does not match the trip plan schema: {0}")]
    Schema(String),
}
