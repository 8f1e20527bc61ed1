//! Listing Image Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing image entity
///
/// At most one image per listing has `is_primary = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ListingImage {
    pub id: Uuid,
    pub listing_id: Uuid,
    /// Absolute http(s) URL
    pub url: String,
    pub alt_en: Option<String>,
    pub alt_ar: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Add image payload (URL already validated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingImageCreate {
    pub url: String,
    pub alt_en: Option<String>,
    pub alt_ar: Option<String>,
    pub sort_order: i32,
    /// Caller asked for primary; the store also promotes when no primary exists
    pub is_primary: bool,
}

/// Display order: primary first, then `sort_order`, then oldest first
pub fn sort_for_display(images: &mut [ListingImage]) {
    images.sort_by(|a, b| {
        b.is_primary
            .cmp(&a.is_primary)
            .then(a.sort_order.cmp(&b.sort_order))
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// Number of primary images in a set
pub fn primary_count(images: &[ListingImage]) -> usize {
    images.iter().filter(|i| i.is_primary).count()
}
