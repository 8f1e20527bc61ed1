//! Application error and its JSON body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// Details carry context a caller acts on, e.g. the `anchor` of the edit-page
/// section that fixes a publish-gate failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the default message for the code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a string detail
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.as_ref()?.get(key)?.as_str()
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Redirect reason for form actions
    ///
    /// Data-store failures carry their raw message so the page can show what
    /// actually went wrong; everything else uses the code's short tag.
    pub fn reason(&self) -> String {
        match self.code {
            ErrorCode::DatabaseError => self.message.clone(),
            code => code.tag().to_string(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{r} not found")).with_detail("resource", r)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Identity provider error carrying the provider's message
    pub fn auth_provider(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AuthProviderError, msg)
    }

    /// Used both for absent rows and for listings owned by someone else
    pub fn listing_not_found() -> Self {
        Self::new(ErrorCode::ListingNotFound)
    }
}

/// JSON body of an error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        if self.code.category() == ErrorCategory::System {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (self.http_status(), Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::ListingNotFound);
        assert_eq!(err.code, ErrorCode::ListingNotFound);
        assert_eq!(err.message, "Listing not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::new(ErrorCode::ListingRateMissing).with_detail("anchor", "pricing");
        assert_eq!(err.detail_str("anchor"), Some("pricing"));
        assert_eq!(err.detail_str("missing"), None);
    }

    #[test]
    fn test_reason_uses_tag() {
        assert_eq!(
            AppError::new(ErrorCode::ListingImageMissing).reason(),
            "missing_image"
        );
        assert_eq!(AppError::listing_not_found().reason(), "not_found");
        assert_eq!(AppError::auth_provider("Invalid login credentials").reason(), "auth_error");
    }

    #[test]
    fn test_reason_passes_database_message_through() {
        let err = AppError::database("relation \"listings\" does not exist");
        assert_eq!(err.reason(), "relation \"listings\" does not exist");
    }

    #[test]
    fn test_not_found_names_resource() {
        let err = AppError::not_found("Locale fr");
        assert_eq!(err.message, "Locale fr not found");
        assert_eq!(err.detail_str("resource"), Some("Locale fr"));
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_body() {
        let err = AppError::new(ErrorCode::ImageUrlInvalid).with_detail("url", "ftp://x");
        let json = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(json["code"], 5002);
        assert_eq!(json["details"]["url"], "ftp://x");

        let json = serde_json::to_string(&ErrorBody::from(&AppError::listing_not_found())).unwrap();
        assert_eq!(json, r#"{"code":4001,"message":"Listing not found"}"#);
    }

    #[test]
    fn test_into_response_status() {
        let resp = AppError::new(ErrorCode::ImagePrimaryConflict).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
