//! RevalidationHub: process-local staleness signal for rendered paths
//!
//! Writers bump a per-path generation counter after a mutation; readers derive
//! weak ETags from those counters so clients and caches can revalidate cheaply.
//!
//! ```text
//! publish / unpublish / image change / supplier profile write
//!       │ revalidate_listing() / revalidate_supplier()
//!       ▼
//! RevalidationHub
//!   └── generations: path → counter   (ETag source)
//! ```

use dashmap::DashMap;
use shared::Locale;
use std::sync::Arc;
use uuid::Uuid;

pub fn supplier_listings_path(locale: Locale) -> String {
    format!("/{locale}/supplier/listings")
}

pub fn supplier_listing_path(locale: Locale, id: Uuid) -> String {
    format!("/{locale}/supplier/listings/{id}")
}

pub fn public_index_path(locale: Locale) -> String {
    format!("/{locale}/listings")
}

pub fn public_listing_path(locale: Locale, key: &str) -> String {
    format!("/{locale}/listings/{key}")
}

/// What a mutation touched
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Status change: both supplier views, the public index and the public detail
    Status { slug: Option<&'a str> },
    /// Image change: the supplier detail, plus public views while the listing is live
    Images { slug: Option<&'a str>, public: bool },
}

#[derive(Clone)]
pub struct RevalidationHub {
    generations: Arc<DashMap<String, u64>>,
    /// Distinguishes ETags across restarts, when counters start over
    epoch: Arc<str>,
}

impl Default for RevalidationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RevalidationHub {
    pub fn new() -> Self {
        let epoch = Uuid::new_v4().simple().to_string();
        Self {
            generations: Arc::new(DashMap::new()),
            epoch: Arc::from(&epoch[..8]),
        }
    }

    pub fn generation(&self, path: &str) -> u64 {
        self.generations.get(path).map(|g| *g).unwrap_or(0)
    }

    /// Mark one path stale, returning its new generation
    pub fn revalidate_path(&self, path: &str) -> u64 {
        let generation = {
            let mut entry = self.generations.entry(path.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };
        tracing::debug!(path, generation, "Path revalidated");
        generation
    }

    /// Mark every view of a listing affected by `scope` stale, in both locales
    pub fn revalidate_listing(&self, id: Uuid, scope: Scope<'_>) {
        for locale in Locale::ALL {
            match scope {
                Scope::Status { slug } => {
                    self.revalidate_path(&supplier_listings_path(locale));
                    self.revalidate_path(&supplier_listing_path(locale, id));
                    self.revalidate_public(locale, slug);
                }
                Scope::Images { slug, public } => {
                    self.revalidate_path(&supplier_listing_path(locale, id));
                    if public {
                        self.revalidate_public(locale, slug);
                    }
                }
            }
        }
    }

    /// Supplier name and city appear on every public row of theirs: mark the
    /// index and the detail pages of their published listings stale
    pub fn revalidate_supplier<'a>(&self, published_slugs: impl IntoIterator<Item = &'a str>) {
        let slugs: Vec<&str> = published_slugs.into_iter().collect();
        for locale in Locale::ALL {
            self.revalidate_path(&public_index_path(locale));
            for slug in &slugs {
                self.revalidate_path(&public_listing_path(locale, slug));
            }
        }
    }

    fn revalidate_public(&self, locale: Locale, slug: Option<&str>) {
        self.revalidate_path(&public_index_path(locale));
        if let Some(slug) = slug {
            self.revalidate_path(&public_listing_path(locale, slug));
        }
    }

    /// Weak ETag over the generations of `paths`
    pub fn etag(&self, paths: &[&str]) -> String {
        let gens: Vec<String> = paths
            .iter()
            .map(|p| self.generation(p).to_string())
            .collect();
        format!("W/\"{}-{}\"", self.epoch, gens.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_counts_up() {
        let hub = RevalidationHub::new();
        assert_eq!(hub.generation("/en/listings"), 0);
        assert_eq!(hub.revalidate_path("/en/listings"), 1);
        assert_eq!(hub.revalidate_path("/en/listings"), 2);
        assert_eq!(hub.generation("/ar/listings"), 0);
    }

    #[test]
    fn test_etag_changes_with_generation() {
        let hub = RevalidationHub::new();
        let before = hub.etag(&["/en/listings"]);
        assert!(before.starts_with("W/\""));
        assert_eq!(before, hub.etag(&["/en/listings"]));
        hub.revalidate_path("/en/listings");
        assert_ne!(before, hub.etag(&["/en/listings"]));
    }

    #[test]
    fn test_status_scope_covers_both_locales() {
        let hub = RevalidationHub::new();
        let id = Uuid::new_v4();
        hub.revalidate_listing(
            id,
            Scope::Status {
                slug: Some("listing-abcdef12"),
            },
        );
        for locale in Locale::ALL {
            assert_eq!(hub.generation(&supplier_listings_path(locale)), 1);
            assert_eq!(hub.generation(&supplier_listing_path(locale, id)), 1);
            assert_eq!(hub.generation(&public_index_path(locale)), 1);
            assert_eq!(
                hub.generation(&public_listing_path(locale, "listing-abcdef12")),
                1
            );
        }
    }

    #[test]
    fn test_image_scope_skips_public_for_drafts() {
        let hub = RevalidationHub::new();
        let id = Uuid::new_v4();
        hub.revalidate_listing(
            id,
            Scope::Images {
                slug: None,
                public: false,
            },
        );
        assert_eq!(hub.generation(&supplier_listing_path(Locale::En, id)), 1);
        assert_eq!(hub.generation(&supplier_listings_path(Locale::En)), 0);
        assert_eq!(hub.generation(&public_index_path(Locale::Ar)), 0);
    }

    #[test]
    fn test_supplier_scope_covers_public_views() {
        let hub = RevalidationHub::new();
        hub.revalidate_supplier(["listing-abcdef12"]);
        for locale in Locale::ALL {
            assert_eq!(hub.generation(&public_index_path(locale)), 1);
            assert_eq!(
                hub.generation(&public_listing_path(locale, "listing-abcdef12")),
                1
            );
            assert_eq!(hub.generation(&supplier_listings_path(locale)), 0);
        }
    }
}
