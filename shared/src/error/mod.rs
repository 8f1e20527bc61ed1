//! Error system for Souq
//!
//! - [`ErrorCode`]: numeric codes, each with a short redirect tag
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: code, message and structured details
//! - [`ErrorBody`]: JSON body of error responses
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Supplier errors
//! - 4xxx: Listing errors
//! - 5xxx: Listing image errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! // Publish gate failure, rendered as `?err=missing_rate#pricing` by form actions
//! let err = AppError::new(ErrorCode::ListingRateMissing).with_detail("anchor", "pricing");
//! assert_eq!(err.reason(), "missing_rate");
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, 4003);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorBody};
