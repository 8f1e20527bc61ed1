//! In-process [`MarketStore`]
//!
//! Selected with `DATABASE_URL=memory://` for local runs and used by the test
//! suite. Mirrors the Postgres semantics that matter to callers: ownership
//! joins, slug coalescing, the one-primary constraint and the catalog
//! visibility predicate.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use shared::models::{
    City, Listing, ListingCreate, ListingImage, ListingImageCreate, ListingStatus,
    PublicListing, Role, StatusChange, Supplier, SupplierUpsert, primary_count,
    sort_for_display,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MarketStore, StoreError, StoreResult};

/// Same reference cities as the initial migration
const SEED_CITIES: &[(&str, &str, &str)] = &[
    ("Riyadh", "الرياض", "riyadh"),
    ("Jeddah", "جدة", "jeddah"),
    ("Mecca", "مكة المكرمة", "mecca"),
    ("Medina", "المدينة المنورة", "medina"),
    ("Dammam", "الدمام", "dammam"),
    ("Al Khobar", "الخبر", "al-khobar"),
    ("Dhahran", "الظهران", "dhahran"),
    ("Tabuk", "تبوك", "tabuk"),
    ("Abha", "أبها", "abha"),
    ("Buraidah", "بريدة", "buraidah"),
];

#[derive(Default)]
struct Inner {
    roles: HashMap<Uuid, Role>,
    /// owner_id -> supplier
    suppliers: HashMap<Uuid, Supplier>,
    cities: Vec<City>,
    listings: HashMap<Uuid, Listing>,
    images: Vec<ListingImage>,
}

impl Inner {
    fn supplier_by_id(&self, supplier_id: Uuid) -> Option<&Supplier> {
        self.suppliers.values().find(|s| s.id == supplier_id)
    }

    fn owns(&self, listing: &Listing, owner_id: Uuid) -> bool {
        self.supplier_by_id(listing.supplier_id)
            .is_some_and(|s| s.owner_id == owner_id)
    }

    fn public(&self, listing: &Listing) -> Option<PublicListing> {
        if listing.status != ListingStatus::Published {
            return None;
        }
        let published_at = listing.published_at?;
        let supplier = self.supplier_by_id(listing.supplier_id);
        Some(PublicListing {
            id: listing.id,
            slug: listing.slug.clone(),
            title_en: listing.title_en.clone(),
            title_ar: listing.title_ar.clone(),
            description_en: listing.description_en.clone(),
            description_ar: listing.description_ar.clone(),
            daily_rate: listing.daily_rate,
            weekly_rate: listing.weekly_rate,
            currency: listing.currency.clone(),
            published_at,
            min_days: listing.min_days,
            delivery_available: listing.delivery_available,
            operator_available: listing.operator_available,
            deposit_amount: listing.deposit_amount,
            supplier_display_name: supplier.and_then(|s| s.display_name.clone()),
            supplier_city: supplier.and_then(|s| s.city.clone()),
        })
    }

    fn images_of(&self, listing_id: Uuid) -> Vec<ListingImage> {
        self.images
            .iter()
            .filter(|i| i.listing_id == listing_id)
            .cloned()
            .collect()
    }

    /// Stand-in for the `listing_images_one_primary` constraint
    fn check_one_primary(&self, listing_id: Uuid) -> StoreResult<()> {
        if primary_count(&self.images_of(listing_id)) > 1 {
            return Err(StoreError::Conflict(format!(
                "listing {listing_id} would have more than one primary image"
            )));
        }
        Ok(())
    }
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let cities = SEED_CITIES
            .iter()
            .map(|(en, ar, slug)| City {
                id: Uuid::new_v4(),
                name_en: (*en).to_string(),
                name_ar: (*ar).to_string(),
                slug: (*slug).to_string(),
            })
            .collect();
        Self {
            inner: RwLock::new(Inner {
                cities,
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn role_of(&self, user_id: Uuid) -> StoreResult<Option<Role>> {
        Ok(self.inner.read().await.roles.get(&user_id).copied())
    }

    async fn set_role(&self, user_id: Uuid, role: Role) -> StoreResult<()> {
        self.inner.write().await.roles.insert(user_id, role);
        Ok(())
    }

    async fn supplier_by_owner(&self, owner_id: Uuid) -> StoreResult<Option<Supplier>> {
        Ok(self.inner.read().await.suppliers.get(&owner_id).cloned())
    }

    async fn upsert_supplier(
        &self,
        owner_id: Uuid,
        data: &SupplierUpsert,
    ) -> StoreResult<Supplier> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let supplier = inner
            .suppliers
            .entry(owner_id)
            .and_modify(|s| {
                s.display_name = Some(data.display_name.clone());
                if data.city.is_some() || !data.keep_city {
                    s.city = data.city.clone();
                }
                s.updated_at = now;
            })
            .or_insert_with(|| Supplier {
                id: Uuid::new_v4(),
                owner_id,
                display_name: Some(data.display_name.clone()),
                city: data.city.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(supplier.clone())
    }

    async fn list_cities(&self) -> StoreResult<Vec<City>> {
        let mut cities = self.inner.read().await.cities.clone();
        cities.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(cities)
    }

    async fn insert_listing(
        &self,
        supplier_id: Uuid,
        data: &ListingCreate,
    ) -> StoreResult<Listing> {
        let mut inner = self.inner.write().await;
        if inner.supplier_by_id(supplier_id).is_none() {
            return Err(StoreError::Database(format!(
                "insert or update on table \"listings\" violates foreign key constraint: supplier {supplier_id}"
            )));
        }
        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            supplier_id,
            title_en: data.title_en.clone(),
            title_ar: data.title_ar.clone(),
            description_en: data.description_en.clone(),
            description_ar: data.description_ar.clone(),
            daily_rate: data.daily_rate,
            weekly_rate: data.weekly_rate,
            currency: data.currency.clone(),
            status: ListingStatus::Draft,
            slug: None,
            published_at: None,
            city_id: data.city_id,
            min_days: data.min_days,
            delivery_available: data.delivery_available,
            operator_available: data.operator_available,
            deposit_amount: data.deposit_amount,
            created_at: now,
            updated_at: now,
        };
        inner.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn listing_owned_by(
        &self,
        listing_id: Uuid,
        owner_id: Uuid,
    ) -> StoreResult<Option<Listing>> {
        let inner = self.inner.read().await;
        Ok(inner
            .listings
            .get(&listing_id)
            .filter(|l| inner.owns(l, owner_id))
            .cloned())
    }

    async fn listings_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Listing>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Listing> = inner
            .listings
            .values()
            .filter(|l| inner.owns(l, owner_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn apply_status(
        &self,
        listing_id: Uuid,
        change: &StatusChange,
    ) -> StoreResult<Option<Listing>> {
        let mut inner = self.inner.write().await;
        let Some(listing) = inner.listings.get_mut(&listing_id) else {
            return Ok(None);
        };
        listing.status = change.status;
        if listing.slug.is_none() {
            listing.slug = change.slug.clone();
        }
        listing.published_at = change.published_at;
        listing.updated_at = Utc::now();
        Ok(Some(listing.clone()))
    }

    async fn images_for_listing(&self, listing_id: Uuid) -> StoreResult<Vec<ListingImage>> {
        let mut images = self.inner.read().await.images_of(listing_id);
        sort_for_display(&mut images);
        Ok(images)
    }

    async fn count_images(&self, listing_id: Uuid) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .images
            .iter()
            .filter(|i| i.listing_id == listing_id)
            .count() as u64)
    }

    async fn insert_image(
        &self,
        listing_id: Uuid,
        data: &ListingImageCreate,
    ) -> StoreResult<ListingImage> {
        let mut inner = self.inner.write().await;
        let has_primary = inner
            .images
            .iter()
            .any(|i| i.listing_id == listing_id && i.is_primary);
        let promote = data.is_primary || !has_primary;

        if promote {
            for image in inner.images.iter_mut().filter(|i| i.listing_id == listing_id) {
                image.is_primary = false;
            }
        }

        let image = ListingImage {
            id: Uuid::new_v4(),
            listing_id,
            url: data.url.clone(),
            alt_en: data.alt_en.clone(),
            alt_ar: data.alt_ar.clone(),
            sort_order: data.sort_order,
            is_primary: promote,
            created_at: Utc::now(),
        };
        inner.images.push(image.clone());
        inner.check_one_primary(listing_id)?;
        Ok(image)
    }

    async fn set_primary_image(&self, listing_id: Uuid, image_id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let belongs = inner
            .images
            .iter()
            .any(|i| i.id == image_id && i.listing_id == listing_id);
        if !belongs {
            return Ok(false);
        }
        for image in inner.images.iter_mut().filter(|i| i.listing_id == listing_id) {
            image.is_primary = image.id == image_id;
        }
        inner.check_one_primary(listing_id)?;
        Ok(true)
    }

    async fn delete_image(&self, listing_id: Uuid, image_id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.images.len();
        inner
            .images
            .retain(|i| !(i.id == image_id && i.listing_id == listing_id));
        Ok(inner.images.len() < before)
    }

    async fn published_listings(&self, limit: i64) -> StoreResult<Vec<PublicListing>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<PublicListing> = inner
            .listings
            .values()
            .filter_map(|l| inner.public(l))
            .collect();
        rows.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn published_by_slug(&self, slug: &str) -> StoreResult<Option<PublicListing>> {
        let inner = self.inner.read().await;
        Ok(inner
            .listings
            .values()
            .filter(|l| l.slug.as_deref() == Some(slug))
            .find_map(|l| inner.public(l)))
    }

    async fn published_by_id(&self, id: Uuid) -> StoreResult<Option<PublicListing>> {
        let inner = self.inner.read().await;
        Ok(inner.listings.get(&id).and_then(|l| inner.public(l)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, Uuid, Listing) {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let supplier = store
            .upsert_supplier(
                owner,
                &SupplierUpsert {
                    display_name: "Acme".into(),
                    city: Some("Riyadh".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let listing = store
            .insert_listing(
                supplier.id,
                &ListingCreate {
                    title_en: Some("Generator".into()),
                    title_ar: None,
                    description_en: None,
                    description_ar: None,
                    daily_rate: Some(100.0),
                    weekly_rate: None,
                    currency: "SAR".into(),
                    city_id: None,
                    min_days: 1,
                    delivery_available: false,
                    operator_available: false,
                    deposit_amount: None,
                },
            )
            .await
            .unwrap();
        (store, owner, listing)
    }

    fn image(url: &str, is_primary: bool) -> ListingImageCreate {
        ListingImageCreate {
            url: url.into(),
            alt_en: None,
            alt_ar: None,
            sort_order: 0,
            is_primary,
        }
    }

    #[tokio::test]
    async fn test_upsert_city_keep_or_clear() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let first = store
            .upsert_supplier(
                owner,
                &SupplierUpsert {
                    display_name: "Acme".into(),
                    city: Some("Riyadh".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = store
            .upsert_supplier(
                owner,
                &SupplierUpsert {
                    display_name: "Acme Rentals".into(),
                    city: None,
                    keep_city: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.display_name.as_deref(), Some("Acme Rentals"));
        assert_eq!(second.city.as_deref(), Some("Riyadh"));

        let third = store
            .upsert_supplier(
                owner,
                &SupplierUpsert {
                    display_name: "Acme Rentals".into(),
                    city: None,
                    keep_city: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(third.city, None);
    }

    #[tokio::test]
    async fn test_ownership_is_enforced() {
        let (store, owner, listing) = seeded().await;
        assert!(store.listing_owned_by(listing.id, owner).await.unwrap().is_some());
        assert!(
            store
                .listing_owned_by(listing.id, Uuid::new_v4())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_slug_is_never_replaced() {
        let (store, _, listing) = seeded().await;
        let publish = |slug: &str| StatusChange {
            status: ListingStatus::Published,
            slug: Some(slug.into()),
            published_at: Some(Utc::now()),
        };
        store.apply_status(listing.id, &publish("listing-aaaaaaaa")).await.unwrap();
        let row = store
            .apply_status(listing.id, &publish("listing-bbbbbbbb"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.slug.as_deref(), Some("listing-aaaaaaaa"));
    }

    #[tokio::test]
    async fn test_set_primary_foreign_image_is_noop() {
        let (store, owner, listing) = seeded().await;
        let supplier = store.supplier_by_owner(owner).await.unwrap().unwrap();
        let other = store
            .insert_listing(
                supplier.id,
                &ListingCreate {
                    title_en: Some("Crane".into()),
                    ..listing_create_stub()
                },
            )
            .await
            .unwrap();
        let mine = store.insert_image(listing.id, &image("https://x.test/a.jpg", false)).await.unwrap();
        let foreign = store.insert_image(other.id, &image("https://x.test/b.jpg", false)).await.unwrap();

        assert!(!store.set_primary_image(listing.id, foreign.id).await.unwrap());

        let images = store.images_for_listing(listing.id).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, mine.id);
        assert!(images[0].is_primary);
    }

    #[tokio::test]
    async fn test_delete_is_scoped_by_listing() {
        let (store, _, listing) = seeded().await;
        let img = store.insert_image(listing.id, &image("https://x.test/a.jpg", false)).await.unwrap();
        assert!(!store.delete_image(Uuid::new_v4(), img.id).await.unwrap());
        assert!(store.delete_image(listing.id, img.id).await.unwrap());
        assert_eq!(store.count_images(listing.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_catalog_hides_drafts() {
        let (store, _, listing) = seeded().await;
        assert!(store.published_listings(50).await.unwrap().is_empty());
        assert!(store.published_by_id(listing.id).await.unwrap().is_none());

        store
            .apply_status(
                listing.id,
                &StatusChange {
                    status: ListingStatus::Published,
                    slug: Some("listing-x".into()),
                    published_at: Some(Utc::now()),
                },
            )
            .await
            .unwrap();
        let rows = store.published_listings(50).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].supplier_display_name.as_deref(), Some("Acme"));
        assert!(store.published_by_slug("listing-x").await.unwrap().is_some());
    }

    fn listing_create_stub() -> ListingCreate {
        ListingCreate {
            title_en: None,
            title_ar: None,
            description_en: None,
            description_ar: None,
            daily_rate: None,
            weekly_rate: None,
            currency: "SAR".into(),
            city_id: None,
            min_days: 1,
            delivery_available: false,
            operator_available: false,
            deposit_amount: None,
        }
    }
}
