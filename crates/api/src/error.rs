//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledgerlens_core::reports::ReportError;
use ledgerlens_db::RepositoryError;
use ledgerlens_shared::AppError;
use serde_json::json;
use tracing::error;

/// Error returned by handlers, rendered as `{ "error", "message" }`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// The wrapped application error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.0
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        let message = err.to_string();
        Self(match err {
            ReportError::NoAccountsFound => AppError::BusinessRule(message),
            ReportError::InvalidDateRange { .. } => AppError::Validation(message),
            ReportError::ReportNotFound(_) => AppError::NotFound(message),
            ReportError::TreeCycle(_)
            | ReportError::UnknownParent { .. }
            | ReportError::DuplicateLine(_)
            | ReportError::Export(_)
            | ReportError::Source(_) => AppError::Internal(message),
        })
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let message = err.to_string();
        Self(match err {
            RepositoryError::CompanyNotFound(_) => AppError::NotFound(message),
            RepositoryError::Database(_) => AppError::Database(message),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side details stay in the logs
        let message = if status.is_server_error() {
            error!(error = %self.0, "Request failed");
            "An error occurred".to_string()
        } else {
            self.0.message().to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use ledgerlens_shared::types::{CompanyId, ReportLineId};
    use rstest::rstest;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(ReportError::NoAccountsFound, 422, "BUSINESS_RULE_VIOLATION")]
    #[case(ReportError::ReportNotFound("Cash Flow".into()), 404, "NOT_FOUND")]
    #[case(ReportError::TreeCycle(ReportLineId::new()), 500, "INTERNAL_ERROR")]
    #[case(ReportError::Export("io".into()), 500, "INTERNAL_ERROR")]
    fn test_report_error_mapping(
        #[case] err: ReportError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        let api = ApiError::from(err);
        assert_eq!(api.inner().status_code(), status);
        assert_eq!(api.inner().error_code(), code);
    }

    #[test]
    fn test_invalid_date_range_is_validation() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let api = ApiError::from(ReportError::InvalidDateRange { start, end });
        assert_eq!(api.inner().status_code(), 400);
    }

    #[test]
    fn test_company_not_found_mapping() {
        let api = ApiError::from(RepositoryError::CompanyNotFound(CompanyId::new()));
        assert_eq!(api.inner().status_code(), 404);
    }

    #[tokio::test]
    async fn test_client_error_body_carries_message() {
        let response = ApiError::from(ReportError::NoAccountsFound).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "BUSINESS_RULE_VIOLATION");
        assert_eq!(body["message"], "No Accounts Found! Please Add One");
    }

    #[tokio::test]
    async fn test_server_error_body_hides_details() {
        let err = ReportError::Source("connection reset".into());
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "An error occurred");
    }
}
