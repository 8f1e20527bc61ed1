//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotFound | Self::ListingNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::ImagePrimaryConflict => StatusCode::CONFLICT,

            // 403 Forbidden
            Self::SupplierNotOnboarded => StatusCode::FORBIDDEN,

            // 429 Too Many Requests
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway (identity provider failed)
            Self::AuthProviderError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient, client can retry)
            Self::NetworkError => StatusCode::SERVICE_UNAVAILABLE,

            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation and publish-gate failures)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
