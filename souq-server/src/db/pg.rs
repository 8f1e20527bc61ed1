//! Postgres-backed [`MarketStore`]

use async_trait::async_trait;
use shared::models::{
    City, Listing, ListingCreate, ListingImage, ListingImageCreate, PublicListing, Role,
    StatusChange, Supplier, SupplierUpsert,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{MarketStore, StoreResult, catalog, cities, listing_images, listings, profiles, suppliers};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarketStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn role_of(&self, user_id: Uuid) -> StoreResult<Option<Role>> {
        profiles::find_role(&self.pool, user_id).await
    }

    async fn set_role(&self, user_id: Uuid, role: Role) -> StoreResult<()> {
        profiles::upsert_role(&self.pool, user_id, role).await
    }

    async fn supplier_by_owner(&self, owner_id: Uuid) -> StoreResult<Option<Supplier>> {
        suppliers::find_by_owner(&self.pool, owner_id).await
    }

    async fn upsert_supplier(
        &self,
        owner_id: Uuid,
        data: &SupplierUpsert,
    ) -> StoreResult<Supplier> {
        suppliers::upsert_by_owner(&self.pool, owner_id, data).await
    }

    async fn list_cities(&self) -> StoreResult<Vec<City>> {
        cities::list(&self.pool).await
    }

    async fn insert_listing(
        &self,
        supplier_id: Uuid,
        data: &ListingCreate,
    ) -> StoreResult<Listing> {
        listings::insert(&self.pool, supplier_id, data).await
    }

    async fn listing_owned_by(
        &self,
        listing_id: Uuid,
        owner_id: Uuid,
    ) -> StoreResult<Option<Listing>> {
        listings::find_owned(&self.pool, listing_id, owner_id).await
    }

    async fn listings_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Listing>> {
        listings::list_by_owner(&self.pool, owner_id).await
    }

    async fn apply_status(
        &self,
        listing_id: Uuid,
        change: &StatusChange,
    ) -> StoreResult<Option<Listing>> {
        listings::apply_status(&self.pool, listing_id, change).await
    }

    async fn images_for_listing(&self, listing_id: Uuid) -> StoreResult<Vec<ListingImage>> {
        listing_images::list_for_listing(&self.pool, listing_id).await
    }

    async fn count_images(&self, listing_id: Uuid) -> StoreResult<u64> {
        listing_images::count_for_listing(&self.pool, listing_id).await
    }

    async fn insert_image(
        &self,
        listing_id: Uuid,
        data: &ListingImageCreate,
    ) -> StoreResult<ListingImage> {
        listing_images::insert(&self.pool, listing_id, data).await
    }

    async fn set_primary_image(&self, listing_id: Uuid, image_id: Uuid) -> StoreResult<bool> {
        listing_images::set_primary(&self.pool, listing_id, image_id).await
    }

    async fn delete_image(&self, listing_id: Uuid, image_id: Uuid) -> StoreResult<bool> {
        listing_images::delete(&self.pool, listing_id, image_id).await
    }

    async fn published_listings(&self, limit: i64) -> StoreResult<Vec<PublicListing>> {
        catalog::list_published(&self.pool, limit).await
    }

    async fn published_by_slug(&self, slug: &str) -> StoreResult<Option<PublicListing>> {
        catalog::find_by_slug(&self.pool, slug).await
    }

    async fn published_by_id(&self, id: Uuid) -> StoreResult<Option<PublicListing>> {
        catalog::find_by_id(&self.pool, id).await
    }
}
