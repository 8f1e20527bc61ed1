//! Supplier Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supplier entity (one per owner account)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: Uuid,
    /// Identity provider user id
    pub owner_id: Uuid,
    pub display_name: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

impl Supplier {
    /// Portal access requires a display name
    pub fn is_onboarded(&self) -> bool {
        filled(self.display_name.as_deref())
    }

    /// Listing creation additionally requires a city
    pub fn is_complete_for_listing(&self) -> bool {
        self.is_onboarded() && filled(self.city.as_deref())
    }
}

/// Upsert payload keyed by owner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierUpsert {
    pub display_name: String,
    pub city: Option<String>,
    /// Leave the stored city alone when `city` is `None` instead of clearing it
    pub keep_city: bool,
}
