//! Error types for vaultmind.

use thiserror::Error;

/// Result type alias using vaultmind's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vaultmind operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Provider rejected the request for quota or rate reasons (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Requested model does not exist on the provider (HTTP 404)
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether a provider-side model switch may recover from this error.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, Error::RateLimited(_) | Error::ModelNotFound(_))
    }

    /// Whether this error signals an exhausted quota.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("model timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: model timeout");
    }

    #[test]
    fn test_error_display_rate_limited() {
        let err = Error::RateLimited("quota".to_string());
        assert_eq!(err.to_string(), "Rate limit exceeded: quota");
    }

    #[test]
    fn test_error_display_model_not_found() {
        let err = Error::ModelNotFound("gemini-x".to_string());
        assert_eq!(err.to_string(), "Model not found: gemini-x");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_fallback_eligibility() {
        assert!(Error::RateLimited("x".into()).is_fallback_eligible());
        assert!(Error::ModelNotFound("x".into()).is_fallback_eligible());
        assert!(!Error::Inference("x".into()).is_fallback_eligible());
        assert!(!Error::Request("x".into()).is_fallback_eligible());
    }

    #[test]
    fn test_is_rate_limited() {
        assert!(Error::RateLimited("x".into()).is_rate_limited());
        assert!(!Error::ModelNotFound("x".into()).is_rate_limited());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
