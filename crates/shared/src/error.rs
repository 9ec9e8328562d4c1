//! Application-wide error types.
//!
//! Handlers convert report and repository failures into `AppError`, which
//! carries the HTTP status and the machine-readable code of the response body.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message without the error kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::BusinessRule(msg)
            | Self::Database(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound("Report 'Cash Flow' not found".into()), 404, "NOT_FOUND")]
    #[case(AppError::Validation("date_from after date_to".into()), 400, "VALIDATION_ERROR")]
    #[case(AppError::BusinessRule("No Accounts Found! Please Add One".into()), 422, "BUSINESS_RULE_VIOLATION")]
    #[case(AppError::Database("connection refused".into()), 500, "DATABASE_ERROR")]
    #[case(AppError::Internal("report tree cycle".into()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_message_strips_kind_prefix() {
        let err = AppError::BusinessRule("No Accounts Found! Please Add One".into());
        assert_eq!(
            err.to_string(),
            "Business rule violation: No Accounts Found! Please Add One"
        );
        assert_eq!(err.message(), "No Accounts Found! Please Add One");
    }
}
