//! Listing Model

use crate::error::{AppError, ErrorCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix of every slug assigned on first publish
pub const SLUG_PREFIX: &str = "listing-";

/// Listing lifecycle status
///
/// Flat enumeration: any status may be written over any other, only the move
/// to `Published` is gated (see [`Listing::publish_blocker`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::Published => "published",
            ListingStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(ListingStatus::Draft),
            "published" => Some(ListingStatus::Published),
            "archived" => Some(ListingStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown listing status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl TryFrom<String> for ListingStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(UnknownStatus(value))
    }
}

/// Deterministic slug for a listing id: `listing-` plus the first 8 id chars
pub fn slug_for(id: Uuid) -> String {
    let hex = id.simple().to_string();
    format!("{}{}", SLUG_PREFIX, &hex[..8])
}

/// Listing entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Listing {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub daily_rate: Option<f64>,
    pub weekly_rate: Option<f64>,
    /// ISO 4217 code
    pub currency: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: ListingStatus,
    pub slug: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub city_id: Option<Uuid>,
    pub min_days: i32,
    pub delivery_available: bool,
    pub operator_available: bool,
    pub deposit_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reason a listing cannot be published, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishBlocker {
    MissingTitle,
    MissingRate,
    MissingImage,
}

impl PublishBlocker {
    pub fn code(&self) -> ErrorCode {
        match self {
            PublishBlocker::MissingTitle => ErrorCode::ListingTitleMissing,
            PublishBlocker::MissingRate => ErrorCode::ListingRateMissing,
            PublishBlocker::MissingImage => ErrorCode::ListingImageMissing,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.code().tag()
    }

    /// Section of the edit page that fixes the problem
    pub fn anchor(&self) -> &'static str {
        match self {
            PublishBlocker::MissingTitle => "details",
            PublishBlocker::MissingRate => "pricing",
            PublishBlocker::MissingImage => "images",
        }
    }
}

impl From<PublishBlocker> for AppError {
    fn from(blocker: PublishBlocker) -> Self {
        AppError::new(blocker.code()).with_detail("anchor", blocker.anchor())
    }
}

fn positive(rate: Option<f64>) -> bool {
    rate.is_some_and(|r| r.is_finite() && r > 0.0)
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

impl Listing {
    pub fn has_title(&self) -> bool {
        has_text(self.title_en.as_deref()) || has_text(self.title_ar.as_deref())
    }

    pub fn has_rate(&self) -> bool {
        positive(self.daily_rate) || positive(self.weekly_rate)
    }

    /// First publish gate failure for the persisted row, if any
    pub fn publish_blocker(&self, image_count: u64) -> Option<PublishBlocker> {
        if !self.has_title() {
            Some(PublishBlocker::MissingTitle)
        } else if !self.has_rate() {
            Some(PublishBlocker::MissingRate)
        } else if image_count == 0 {
            Some(PublishBlocker::MissingImage)
        } else {
            None
        }
    }

    pub fn is_public(&self) -> bool {
        self.status == ListingStatus::Published && self.published_at.is_some()
    }
}

/// Create listing payload (always inserted as a draft)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCreate {
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub daily_rate: Option<f64>,
    pub weekly_rate: Option<f64>,
    pub currency: String,
    pub city_id: Option<Uuid>,
    pub min_days: i32,
    pub delivery_available: bool,
    pub operator_available: bool,
    pub deposit_amount: Option<f64>,
}

/// Status write computed by the publish controller
///
/// `published_at` and `slug` are written together with `status` in one update.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: ListingStatus,
    pub slug: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}
