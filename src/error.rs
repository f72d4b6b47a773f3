//! Error types for dydl

use crate::download::FetchError;
use thiserror::Error;

/// Main error type for dydl operations
#[derive(Debug, Error)]
pub enum DydlError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Interrupted by user")]
    Interrupted,

    #[error("Generic error: {0}")]
    Generic(String),
}

impl DydlError {
    /// Check if the user asked to stop (EOF or Ctrl-C at a prompt)
    pub fn is_interrupted(&self) -> bool {
        matches!(self, DydlError::Interrupted)
    }

    /// Check if error came from the network layer
    pub fn is_network_error(&self) -> bool {
        matches!(self, DydlError::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_classification() {
        assert!(DydlError::Interrupted.is_interrupted());
        assert!(!DydlError::Generic("x".to_string()).is_interrupted());
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err: DydlError = FetchError::Failed {
            code: Some(1),
            message: "ERROR: boom".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "ERROR: boom");
        assert!(!err.is_network_error());
    }

    #[test]
    fn test_config_error_message() {
        let err = DydlError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad value");
    }
}
