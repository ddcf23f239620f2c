use kanal::AsyncSender;

pub mod hf;

pub use hf::HfClient;

/// Streaming explanation provider interface
#[async_trait::async_trait]
pub trait Explainer: Send + Sync {
    /// Request an explanation of `word`, forwarding text fragments over
    /// `chunks` in arrival order as they are decoded. Returns the full
    /// cleaned text once the stream completes.
    async fn explain(
        &self,
        word: &str,
        translation: &str,
        chunks: AsyncSender<String>,
    ) -> Result<String, ExplainError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed stream event: {0}")]
    DecodeError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication error")]
    AuthenticationError,
}
