//! City reference data

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct City {
    pub id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    pub slug: String,
}

impl City {
    fn fields(&self) -> [&str; 3] {
        [&self.name_en, &self.name_ar, &self.slug]
    }

    /// Case-insensitive equality against any of the three names
    pub fn is_exact(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        !q.is_empty() && self.fields().iter().any(|f| f.to_lowercase() == q)
    }

    /// Case-insensitive substring match against any of the three names
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        !q.is_empty() && self.fields().iter().any(|f| f.to_lowercase().contains(&q))
    }
}

/// Best-effort city lookup for free-text supplier input
///
/// An exact name wins over substring matches. Among several substring matches
/// the one with the lowest slug is taken so the result is stable. No match
/// leaves the listing without a city.
pub fn resolve_city<'a>(cities: &'a [City], query: &str) -> Option<&'a City> {
    if let Some(city) = cities.iter().find(|c| c.is_exact(query)) {
        return Some(city);
    }
    cities
        .iter()
        .filter(|c| c.matches(query))
        .min_by(|a, b| a.slug.cmp(&b.slug))
}
