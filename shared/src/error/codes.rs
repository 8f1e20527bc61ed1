//! Error codes for Souq
//!
//! Codes are grouped by range:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Supplier errors
//! - 4xxx: Listing errors
//! - 5xxx: Listing image errors
//! - 9xxx: System errors
//!
//! Every code also carries a short snake_case *tag*. Form actions append the tag
//! to their redirect target (`?err=missing_title`) so the page can pick the
//! localized message for it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code enum, serialized as its u16 value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Resource not found
    NotFound = 3,
    /// Request is missing or carries unusable fields
    InvalidRequest = 5,
    /// Malformed identifier
    InvalidId = 8,

    // ==================== 1xxx: Auth ====================
    /// Password too short
    PasswordTooShort = 1006,
    /// Password confirmation does not match
    PasswordMismatch = 1007,
    /// Too many attempts
    TooManyAttempts = 1008,
    /// Identity provider rejected or failed the call
    AuthProviderError = 1009,
    /// Email address missing
    EmailMissing = 1010,

    // ==================== 3xxx: Supplier ====================
    /// Supplier has not finished onboarding
    SupplierNotOnboarded = 3002,
    /// Supplier profile is missing fields required for listing creation
    SupplierProfileIncomplete = 3003,
    /// Supplier display name missing
    DisplayNameMissing = 3004,

    // ==================== 4xxx: Listing ====================
    /// Listing not found (or not owned by the caller)
    ListingNotFound = 4001,
    /// Listing has no title in either language
    ListingTitleMissing = 4002,
    /// Listing has no positive daily or weekly rate
    ListingRateMissing = 4003,
    /// Listing has no images
    ListingImageMissing = 4004,

    // ==================== 5xxx: Listing image ====================
    /// Image URL is not an absolute http(s) URL
    ImageUrlInvalid = 5002,
    /// Concurrent primary-image update collided with the one-primary constraint
    ImagePrimaryConflict = 5003,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Short snake_case reason used in redirect query strings
    pub const fn tag(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not_found",
            ErrorCode::InvalidRequest => "bad_request",
            ErrorCode::InvalidId => "bad_id",

            ErrorCode::PasswordTooShort => "password_too_short",
            ErrorCode::PasswordMismatch => "password_mismatch",
            ErrorCode::TooManyAttempts => "too_many_attempts",
            ErrorCode::AuthProviderError => "auth_error",
            ErrorCode::EmailMissing => "missing_email",

            ErrorCode::SupplierNotOnboarded => "not_onboarded",
            ErrorCode::SupplierProfileIncomplete => "profile_incomplete",
            ErrorCode::DisplayNameMissing => "missing_name",

            ErrorCode::ListingNotFound => "not_found",
            ErrorCode::ListingTitleMissing => "missing_title",
            ErrorCode::ListingRateMissing => "missing_rate",
            ErrorCode::ListingImageMissing => "missing_image",

            ErrorCode::ImageUrlInvalid => "bad_url",
            ErrorCode::ImagePrimaryConflict => "primary_conflict",

            ErrorCode::DatabaseError => "database",
            ErrorCode::NetworkError => "network",
        }
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidId => "Invalid identifier",

            // Auth
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters.",
            ErrorCode::PasswordMismatch => "Passwords do not match.",
            ErrorCode::TooManyAttempts => "Too many attempts",
            ErrorCode::AuthProviderError => "Identity provider error",
            ErrorCode::EmailMissing => "Missing email address",

            // Supplier
            ErrorCode::SupplierNotOnboarded => "Supplier onboarding is not complete",
            ErrorCode::SupplierProfileIncomplete => "Supplier profile is incomplete",
            ErrorCode::DisplayNameMissing => "Display name is required",

            // Listing
            ErrorCode::ListingNotFound => "Listing not found",
            ErrorCode::ListingTitleMissing => "Listing needs a title in English or Arabic",
            ErrorCode::ListingRateMissing => "Listing needs a positive daily or weekly rate",
            ErrorCode::ListingImageMissing => "Listing needs at least one image",

            // Image
            ErrorCode::ImageUrlInvalid => "Image URL must be an absolute http(s) URL",
            ErrorCode::ImagePrimaryConflict => "Primary image changed concurrently, retry",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::InvalidId),

            1006 => Ok(ErrorCode::PasswordTooShort),
            1007 => Ok(ErrorCode::PasswordMismatch),
            1008 => Ok(ErrorCode::TooManyAttempts),
            1009 => Ok(ErrorCode::AuthProviderError),
            1010 => Ok(ErrorCode::EmailMissing),

            3002 => Ok(ErrorCode::SupplierNotOnboarded),
            3003 => Ok(ErrorCode::SupplierProfileIncomplete),
            3004 => Ok(ErrorCode::DisplayNameMissing),

            4001 => Ok(ErrorCode::ListingNotFound),
            4002 => Ok(ErrorCode::ListingTitleMissing),
            4003 => Ok(ErrorCode::ListingRateMissing),
            4004 => Ok(ErrorCode::ListingImageMissing),

            5002 => Ok(ErrorCode::ImageUrlInvalid),
            5003 => Ok(ErrorCode::ImagePrimaryConflict),

            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
