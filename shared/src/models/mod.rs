//! Data models
//!
//! Shared between souq-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUIDs (Postgres `uuid`).

pub mod catalog;
pub mod city;
pub mod listing;
pub mod listing_image;
pub mod profile;
pub mod supplier;

// Re-exports
pub use catalog::*;
pub use city::*;
pub use listing::*;
pub use listing_image::*;
pub use profile::*;
pub use supplier::*;
