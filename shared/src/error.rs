//! Error types for Medbook Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Medbook Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Authentication error (missing or unusable identity)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Validation error with a machine-readable code
    #[error("Validation error: {message}")]
    Validation {
        code: &'static str,
        message: String,
    },

    /// Reservation lookup miss
    #[error("Reservation not found: {0}")]
    NotFound(String),

    /// DynamoDB operation failure
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation error with the generic code.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Auth(_) => 401,
            Error::Validation { .. } => 400,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Machine-readable error code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Auth(_) => "UNAUTHORIZED",
            Error::Validation { code, .. } => code,
            Error::NotFound(_) => "RESERVATION_NOT_FOUND",
            _ => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_mapping() {
        let err = Error::Auth("no sub".to_string());
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.code(), "UNAUTHORIZED");

        let err = Error::Validation {
            code: "MISSING_BODY",
            message: "Missing body".to_string(),
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), "MISSING_BODY");

        let err = Error::NotFound("abc".to_string());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.code(), "RESERVATION_NOT_FOUND");

        let err = Error::Store("put failed".to_string());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
