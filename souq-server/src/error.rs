//! Unified service-layer error type for souq-server
//!
//! `ServiceError` bridges the gap between data-layer errors (`StoreError`,
//! `sqlx::Error`, `BoxError`) and the API-layer error (`AppError`). Every
//! service returns [`ServiceResult`]; handlers then either render it as JSON
//! (read endpoints) or turn it into a [`FormRedirect`] (form actions).

use axum::response::{IntoResponse, Redirect, Response};
use shared::error::{AppError, ErrorCode};

use crate::db::StoreError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: Database/infrastructure errors (auto-logged)
/// - `App`: Business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::from(e).into()
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => {
                ServiceError::App(AppError::new(ErrorCode::ImagePrimaryConflict).with_detail("cause", msg))
            }
            StoreError::Database(msg) => ServiceError::Db(msg.into()),
        }
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::database(db_err.to_string())
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

/// 303 redirect returned by form actions, on success and on failure alike
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRedirect {
    pub location: String,
}

impl FormRedirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl IntoResponse for FormRedirect {
    fn into_response(self) -> Response {
        Redirect::to(&self.location).into_response()
    }
}

/// Result of a form action; both arms redirect
pub type ActionResult = Result<FormRedirect, FormRedirect>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_becomes_retryable_app_error() {
        let err: AppError = ServiceError::from(StoreError::Conflict("dup".into())).into();
        assert_eq!(err.code, ErrorCode::ImagePrimaryConflict);
        assert_eq!(err.reason(), "primary_conflict");
    }

    #[test]
    fn test_database_message_is_kept() {
        let err: AppError = ServiceError::from(StoreError::Database("connection reset".into())).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.reason(), "connection reset");
    }

    #[test]
    fn test_form_redirect_is_see_other() {
        let resp = FormRedirect::to("/en/supplier").into_response();
        assert_eq!(resp.status(), http::StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], "/en/supplier");
    }
}
