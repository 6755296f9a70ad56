//! Error types, one enum per layer.
//!
//! Input problems are *not* errors: they are [`Rejection`]s carried inside a
//! `ValidationOutcome`. Everything here means the system could not make a
//! determination or could not complete a request.

use crate::domain::validation::Rejection;
use thiserror::Error;

/// Top-level error surfaced by the CLI.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] crate::strategy::StrategyError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    /// 429, or 418 once the IP has been banned for ignoring 429s.
    #[error("Rate limited with status {status} (retry after {retry_after_ms:?}ms)")]
    RateLimited {
        status: u16,
        retry_after_ms: Option<u64>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Structured `{"code": -1111, "msg": "..."}` error body from the exchange.
    #[error("Exchange error {code}: {msg}")]
    Exchange { status: u16, code: i64, msg: String },

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Could not sign request: {0}")]
    Signing(String),
}

impl HttpError {
    /// Exchange error code for an unknown symbol.
    pub const INVALID_SYMBOL: i64 = -1121;

    /// True when the request never produced an exchange answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HttpError::Reqwest(_)
                | HttpError::Timeout
                | HttpError::ServerError { .. }
                | HttpError::RateLimited { .. }
                | HttpError::MaxRetriesExceeded { .. }
        )
    }
}

/// Failures of the market metadata lookup. Always propagated to the caller:
/// the engine could not make a determination.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Symbol '{symbol}' not found on the exchange")]
    NotFound { symbol: String },

    #[error("Could not reach the metadata provider: {0}")]
    Connection(String),

    #[error("Malformed metadata for '{symbol}': {reason}")]
    Malformed { symbol: String, reason: String },
}

impl MetadataError {
    /// Classify an HTTP failure that happened while looking up `symbol`.
    pub fn from_http(symbol: &str, err: HttpError) -> Self {
        match err {
            HttpError::NotFound(_) => MetadataError::NotFound {
                symbol: symbol.to_string(),
            },
            HttpError::Exchange { code, .. } if code == HttpError::INVALID_SYMBOL => {
                MetadataError::NotFound {
                    symbol: symbol.to_string(),
                }
            }
            HttpError::InvalidResponse(reason) => MetadataError::Malformed {
                symbol: symbol.to_string(),
                reason,
            },
            other => MetadataError::Connection(other.to_string()),
        }
    }
}

/// Missing or invalid environment configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required. Set it in your environment or .env file.")]
    Missing(&'static str),

    #[error("{0} cannot be empty.")]
    Blank(&'static str),

    #[error("Invalid value for {key} ('{value}'): {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Could not initialise logging: {0}")]
    Logging(String),
}

/// Failure to place a single order.
#[derive(Error, Debug)]
pub enum OrderError {
    /// The input failed validation; nothing was sent to the exchange.
    #[error("{0}")]
    Rejected(Rejection),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Exchange request failed: {0}")]
    Exchange(#[from] HttpError),
}
