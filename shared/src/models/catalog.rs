//! Public catalog projection
//!
//! Anonymous readers only ever see this shape. It is built from published
//! listings joined with their supplier, and resolved for one locale before it
//! leaves the server.

use super::listing_image::ListingImage;
use crate::locale::{Locale, is_fallback, localize_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Published listing row (`status = 'published' AND published_at IS NOT NULL`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PublicListing {
    pub id: Uuid,
    pub slug: Option<String>,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub daily_rate: Option<f64>,
    pub weekly_rate: Option<f64>,
    pub currency: String,
    pub published_at: DateTime<Utc>,
    pub min_days: i32,
    pub delivery_available: bool,
    pub operator_available: bool,
    pub deposit_amount: Option<f64>,
    pub supplier_display_name: Option<String>,
    pub supplier_city: Option<String>,
}

/// A public listing resolved for one locale
#[derive(Debug, Clone, Serialize)]
pub struct LocalizedListing {
    #[serde(flatten)]
    pub listing: PublicListing,
    pub locale: Locale,
    pub title: String,
    pub title_is_fallback: bool,
    pub description: String,
    pub description_is_fallback: bool,
}

impl LocalizedListing {
    pub fn new(locale: Locale, listing: PublicListing) -> Self {
        let (te, ta) = (listing.title_en.as_deref(), listing.title_ar.as_deref());
        let (de, da) = (
            listing.description_en.as_deref(),
            listing.description_ar.as_deref(),
        );
        Self {
            locale,
            title: localize_text(locale, te, ta),
            title_is_fallback: is_fallback(locale, te, ta),
            description: localize_text(locale, de, da),
            description_is_fallback: is_fallback(locale, de, da),
            listing,
        }
    }

    /// Path segment used in public URLs; the id stands in until a slug exists
    pub fn public_key(&self) -> String {
        self.listing
            .slug
            .clone()
            .unwrap_or_else(|| self.listing.id.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalizedImage {
    pub id: Uuid,
    pub url: String,
    pub alt: String,
    pub alt_is_fallback: bool,
    pub sort_order: i32,
    pub is_primary: bool,
}

impl LocalizedImage {
    pub fn new(locale: Locale, image: &ListingImage) -> Self {
        let (e, a) = (image.alt_en.as_deref(), image.alt_ar.as_deref());
        Self {
            id: image.id,
            url: image.url.clone(),
            alt: localize_text(locale, e, a),
            alt_is_fallback: is_fallback(locale, e, a),
            sort_order: image.sort_order,
            is_primary: image.is_primary,
        }
    }
}

/// Public listing detail page payload
#[derive(Debug, Clone, Serialize)]
pub struct PublicListingDetail {
    pub listing: LocalizedListing,
    pub images: Vec<LocalizedImage>,
}
