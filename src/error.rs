//! Error types and result aliases for the SpecBuddy client.
//!
//! This module defines the core error type [`SpecBuddyError`] and the [`Result`] type alias
//! used throughout the library. Every remote call returns `Result<T>`, including the
//! best-effort session notifications, so callers can observe failures instead of relying on logs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpecBuddyError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API error: {endpoint} returned {status}")]
    ApiError { endpoint: String, status: u16 },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, SpecBuddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = SpecBuddyError::ApiError {
            endpoint: "/chat".to_string(),
            status: 502,
        };
        assert_eq!(err.to_string(), "API error: /chat returned 502");
    }

    #[test]
    fn test_config_error_display() {
        let err = SpecBuddyError::ConfigError("invalid timeout".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: invalid timeout");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: SpecBuddyError = json_err.into();

        match err {
            SpecBuddyError::SerializationError(_) => {}
            _ => panic!("Expected SerializationError"),
        }
    }

    #[test]
    fn test_error_debug() {
        let err = SpecBuddyError::ConfigError("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("ConfigError"));
    }
}
