//! Error types for the application.

use thiserror::Error;

/// Errors from upstream API calls (Battle.net and Raider.IO).
///
/// Three categories, surfaced as-is to the command layer: a missing
/// resource, an explicit rate limit, and everything else (bad status or
/// transport failure). No variant triggers a retry anywhere.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,

    #[error("rate limited{}", retry_after.as_deref().map(|ra| format!(" (retry-after: {ra})")).unwrap_or_default())]
    RateLimited { retry_after: Option<String> },

    #[error("upstream API error: {message}")]
    Api { message: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Api {
            message: format!("network error: {e}"),
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {names}")]
    MissingVars { names: String },

    #[error("Invalid value for '{name}': {message}")]
    InvalidValue { name: String, message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Result type alias for upstream API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
