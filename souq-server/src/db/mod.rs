//! Database access layer
//!
//! Per-table query functions take `&PgPool` and return [`StoreResult`].
//! [`MarketStore`] fronts them so services can run against Postgres
//! ([`pg::PgStore`]) or the in-process [`memory::MemoryStore`].

pub mod catalog;
pub mod cities;
pub mod listing_images;
pub mod listings;
pub mod memory;
pub mod pg;
pub mod profiles;
pub mod suppliers;

use async_trait::async_trait;
use shared::models::{
    City, Listing, ListingCreate, ListingImage, ListingImageCreate, PublicListing, Role,
    StatusChange, Supplier, SupplierUpsert,
};
use thiserror::Error;
use uuid::Uuid;

/// Postgres SQLSTATE for unique and exclusion constraint violations
const UNIQUE_VIOLATION: &str = "23505";
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write; the caller may retry
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && matches!(
                db.code().as_deref(),
                Some(UNIQUE_VIOLATION) | Some(EXCLUSION_VIOLATION)
            )
        {
            return StoreError::Conflict(db.message().to_string());
        }
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Data store used by every service
///
/// Ownership is never cached: every call that touches a listing re-derives it
/// through the supplier's `owner_id`.
#[async_trait]
pub trait MarketStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // ── profiles ──
    /// `None` when the account has no profile row
    async fn role_of(&self, user_id: Uuid) -> StoreResult<Option<Role>>;
    async fn set_role(&self, user_id: Uuid, role: Role) -> StoreResult<()>;

    // ── suppliers ──
    async fn supplier_by_owner(&self, owner_id: Uuid) -> StoreResult<Option<Supplier>>;
    async fn upsert_supplier(&self, owner_id: Uuid, data: &SupplierUpsert)
    -> StoreResult<Supplier>;

    // ── cities ──
    async fn list_cities(&self) -> StoreResult<Vec<City>>;

    // ── listings ──
    async fn insert_listing(&self, supplier_id: Uuid, data: &ListingCreate)
    -> StoreResult<Listing>;
    async fn listing_owned_by(&self, listing_id: Uuid, owner_id: Uuid)
    -> StoreResult<Option<Listing>>;
    /// Newest first
    async fn listings_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Listing>>;
    /// Writes status, slug and `published_at` in one statement
    async fn apply_status(&self, listing_id: Uuid, change: &StatusChange)
    -> StoreResult<Option<Listing>>;

    // ── listing images ──
    /// Primary first, then `sort_order`, then oldest first
    async fn images_for_listing(&self, listing_id: Uuid) -> StoreResult<Vec<ListingImage>>;
    async fn count_images(&self, listing_id: Uuid) -> StoreResult<u64>;
    /// Inserts the image, promoting it when requested or when the listing has
    /// no primary yet. Demotion of the old primary happens in the same transaction.
    async fn insert_image(&self, listing_id: Uuid, data: &ListingImageCreate)
    -> StoreResult<ListingImage>;
    /// Returns `false` when `image_id` is not an image of `listing_id` (nothing changes)
    async fn set_primary_image(&self, listing_id: Uuid, image_id: Uuid) -> StoreResult<bool>;
    /// Returns `false` when no row matched both ids
    async fn delete_image(&self, listing_id: Uuid, image_id: Uuid) -> StoreResult<bool>;

    // ── public catalog ──
    async fn published_listings(&self, limit: i64) -> StoreResult<Vec<PublicListing>>;
    async fn published_by_slug(&self, slug: &str) -> StoreResult<Option<PublicListing>>;
    async fn published_by_id(&self, id: Uuid) -> StoreResult<Option<PublicListing>>;
}
