// Error types for touchminer.
// Separates configuration problems, retryable fetch failures, and fatal fetch failures.

use serde_json::error::Category;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transient fetch error: {0}")]
    TransientFetch(String),

    #[error("Fetch failed: {0}")]
    FatalFetch(String),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl MinerError {
    /// Whether a retry with another credential could plausibly succeed.
    ///
    /// A body that is not valid JSON (truncated, HTML error page) is transient.
    /// Valid JSON with the wrong shape is not: the endpoint answered, just not
    /// with what we expected, and asking again will not change that.
    pub fn is_transient(&self) -> bool {
        match self {
            MinerError::TransientFetch(_) | MinerError::RateLimited { .. } => true,
            MinerError::Api(e) => e.is_timeout() || e.is_connect() || e.is_body() || e.is_request(),
            MinerError::Json(e) => matches!(e.classify(), Category::Syntax | Category::Eof),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MinerError>;
