//! Shared types for Souq
//!
//! Error system, domain models and locale helpers used by the server and by
//! anything that consumes its JSON.

pub mod error;
pub mod locale;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use locale::Locale;
pub use serde::{Deserialize, Serialize};
