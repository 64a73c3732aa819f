use etimo_types::EtymologyRecord;

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiLookup;

/// Etymology provider interface
#[async_trait::async_trait]
pub trait EtymologyLookup: Send + Sync {
    /// Look up a trimmed, non-empty word
    async fn lookup(&self, word: &str) -> Result<EtymologyRecord, LookupError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub model: String,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Credential missing from the environment. Retrying will not help
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl LookupError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LookupError::Upstream(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication error")]
    AuthenticationError,
}

impl From<reqwest::Error> for LookupError {
    fn from(error: reqwest::Error) -> Self {
        LookupError::Upstream(UpstreamError::NetworkError(error))
    }
}
