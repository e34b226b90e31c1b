//! Provider error classification shared by the HTTP backends.

use vaultmind_core::Error;

/// Provider-agnostic error codes derived from HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCode {
    /// Invalid authentication credentials.
    AuthenticationError,
    /// Rate limit or quota exceeded.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Request too large.
    ContextLengthExceeded,
    /// Server error.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl ProviderErrorCode {
    /// Determine error code from HTTP status and provider error type/status string.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        let error_type = error_type.to_ascii_lowercase();
        match (status, error_type.as_str()) {
            (401, _) | (403, _) => Self::AuthenticationError,
            (429, _) | (_, "resource_exhausted") => Self::RateLimitExceeded,
            (404, _) | (_, "model_not_found") | (_, "not_found") => Self::ModelNotFound,
            (400, t) if t.contains("context_length") => Self::ContextLengthExceeded,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if a cheaper/alternate model may succeed where this one failed.
    pub fn warrants_model_fallback(&self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::ModelNotFound)
    }
}

/// Convert a provider error to a vaultmind Error.
pub fn to_core_error(code: ProviderErrorCode, message: &str) -> Error {
    match code {
        ProviderErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed: {}", message))
        }
        ProviderErrorCode::RateLimitExceeded => Error::RateLimited(message.to_string()),
        ProviderErrorCode::ModelNotFound => Error::ModelNotFound(message.to_string()),
        ProviderErrorCode::ContextLengthExceeded => {
            Error::Inference(format!("Context too long: {}", message))
        }
        ProviderErrorCode::ServerError => Error::Inference(format!("Server error: {}", message)),
        ProviderErrorCode::Unknown => Error::Inference(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_401() {
        let code = ProviderErrorCode::from_response(401, "invalid_api_key");
        assert_eq!(code, ProviderErrorCode::AuthenticationError);
    }

    #[test]
    fn test_error_code_from_429() {
        let code = ProviderErrorCode::from_response(429, "RESOURCE_EXHAUSTED");
        assert_eq!(code, ProviderErrorCode::RateLimitExceeded);
    }

    #[test]
    fn test_error_code_from_status_string() {
        let code = ProviderErrorCode::from_response(400, "RESOURCE_EXHAUSTED");
        assert_eq!(code, ProviderErrorCode::RateLimitExceeded);
        let code = ProviderErrorCode::from_response(400, "NOT_FOUND");
        assert_eq!(code, ProviderErrorCode::ModelNotFound);
    }

    #[test]
    fn test_error_code_from_404() {
        let code = ProviderErrorCode::from_response(404, "");
        assert_eq!(code, ProviderErrorCode::ModelNotFound);
    }

    #[test]
    fn test_error_code_from_502() {
        let code = ProviderErrorCode::from_response(502, "bad_gateway");
        assert_eq!(code, ProviderErrorCode::ServerError);
    }

    #[test]
    fn test_error_code_from_unknown() {
        let code = ProviderErrorCode::from_response(418, "im_a_teapot");
        assert_eq!(code, ProviderErrorCode::Unknown);
    }

    #[test]
    fn test_fallback_codes() {
        assert!(ProviderErrorCode::RateLimitExceeded.warrants_model_fallback());
        assert!(ProviderErrorCode::ModelNotFound.warrants_model_fallback());
        assert!(!ProviderErrorCode::ServerError.warrants_model_fallback());
        assert!(!ProviderErrorCode::AuthenticationError.warrants_model_fallback());
    }

    #[test]
    fn test_to_core_error_rate_limit() {
        let err = to_core_error(ProviderErrorCode::RateLimitExceeded, "Too many requests");
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn test_to_core_error_model_not_found() {
        let err = to_core_error(ProviderErrorCode::ModelNotFound, "no such model");
        assert!(matches!(err, Error::ModelNotFound(_)));
    }

    #[test]
    fn test_to_core_error_auth() {
        let err = to_core_error(ProviderErrorCode::AuthenticationError, "Invalid key");
        assert!(err.to_string().contains("Authentication failed"));
    }
}
