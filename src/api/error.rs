//! API error types for the REST client.

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed - missing or invalid token.
    #[error("Authentication failed: check your API token")]
    Unauthorized,

    /// Permission denied - the token lacks access to the resource.
    #[error("Permission denied: you don't have access to this resource")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The backend refused the request as malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited by the backend.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// Backend server error.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The resource was modified concurrently.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend answered with `success: false`.
    #[error("{0}")]
    Rejected(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            400 | 422 => ApiError::BadRequest(context.to_string()),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            409 => ApiError::Conflict(context.to_string()),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "test");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_from_status_404() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "/api/admin/vendors");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "/api/admin/vendors"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_status_validation() {
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "invalid status");
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_error_from_status_429() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "test");
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[test]
    fn test_error_from_status_500() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "test");
        assert!(matches!(err, ApiError::ServerError(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_errors_not_retryable() {
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::NotFound("x".to_string()).is_retryable());
        assert!(!ApiError::Rejected("x".to_string()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Rejected("Booking already cancelled".to_string());
        assert_eq!(err.to_string(), "Booking already cancelled");

        let err = ApiError::NotFound("/api/bookings".to_string());
        assert_eq!(err.to_string(), "Resource not found: /api/bookings");
    }
}
