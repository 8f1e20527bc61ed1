//! Business logic shared by form actions and read endpoints
//!
//! Services return [`ServiceResult`](crate::error::ServiceResult); turning a
//! failure into a redirect or a JSON error is the caller's choice.

pub mod catalog;
pub mod images;
pub mod listings;
pub mod publish;
pub mod suppliers;
