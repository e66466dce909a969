//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all upstream operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::{Classify, RetryClass};

use thiserror::Error;

/// Errors that can occur while talking to an upstream data provider.
///
/// Each variant is classified into a [`RetryClass`] via [`Classify::retry_class`],
/// which determines whether the retry wrapper should try again.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider has no data for the requested symbol or series.
    #[error("No data: {0}")]
    NoData(String),

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider rejected the request (4xx other than 429).
    #[error("Client error: {provider} returned {status}")]
    ClientError {
        /// The provider that rejected the request
        provider: String,
        /// HTTP status code
        status: u16,
    },

    /// The provider failed on its side, or the connection broke.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered with a payload we could not interpret.
    #[error("Invalid payload from {provider}: {message}")]
    InvalidPayload {
        /// The provider that sent the payload
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The provider needs an API key and none is configured.
    #[error("Missing API key for {provider}")]
    MissingApiKey {
        /// The provider without a key
        provider: String,
    },
}

impl Classify for MarketDataError {
    fn retry_class(&self) -> RetryClass {
        match self {
            // Transient errors - retry with backoff
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::ProviderError { .. } => {
                RetryClass::WithBackoff
            }

            // Terminal errors - never retry
            Self::NoData(_)
            | Self::ClientError { .. }
            | Self::InvalidPayload { .. }
            | Self::MissingApiKey { .. } => RetryClass::Never,
        }
    }
}

impl MarketDataError {
    /// Map a reqwest transport error for `provider`.
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else if err.is_decode() {
            Self::InvalidPayload {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::ProviderError {
                provider: provider.to_string(),
                message: format!("Request failed: {}", err),
            }
        }
    }

    /// Map a non-success HTTP status for `provider`.
    pub fn from_status(provider: &str, status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited {
                provider: provider.to_string(),
            }
        } else if status.is_client_error() {
            Self::ClientError {
                provider: provider.to_string(),
                status: status.as_u16(),
            }
        } else {
            Self::ProviderError {
                provider: provider.to_string(),
                message: format!("HTTP {}", status),
            }
        }
    }

    /// Build an [`InvalidPayload`](Self::InvalidPayload) error.
    pub fn invalid_payload(provider: &str, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = MarketDataError::RateLimited {
            provider: "POLYGON".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = MarketDataError::Timeout {
            provider: "FRED".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_server_error_retries_with_backoff() {
        let error = MarketDataError::from_status("EIA", reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_client_error_never_retries() {
        let error = MarketDataError::from_status("POLYGON", reqwest::StatusCode::FORBIDDEN);
        assert!(matches!(
            error,
            MarketDataError::ClientError { status: 403, .. }
        ));
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_too_many_requests_is_rate_limited() {
        let error = MarketDataError::from_status("POLYGON", reqwest::StatusCode::TOO_MANY_REQUESTS);
        assert!(matches!(error, MarketDataError::RateLimited { .. }));
    }

    #[test]
    fn test_missing_key_never_retries() {
        let error = MarketDataError::MissingApiKey {
            provider: "FRED".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::NoData("CBOE:VIX".to_string());
        assert_eq!(format!("{}", error), "No data: CBOE:VIX");

        let error = MarketDataError::ProviderError {
            provider: "BLS".to_string(),
            message: "HTTP 503 Service Unavailable".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: BLS - HTTP 503 Service Unavailable"
        );
    }
}
