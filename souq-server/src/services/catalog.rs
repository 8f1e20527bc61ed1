//! Public catalog reads (published listings only)

use shared::Locale;
use shared::error::AppError;
use shared::models::{
    LocalizedImage, LocalizedListing, PublicListing, PublicListingDetail, sort_for_display,
};
use shared::util::parse_uuid;

use crate::db::MarketStore;
use crate::error::ServiceResult;

/// Images shown on a public detail page
pub const DETAIL_IMAGE_LIMIT: usize = 12;

/// Newest published first
pub async fn index(
    store: &dyn MarketStore,
    locale: Locale,
    limit: i64,
) -> ServiceResult<Vec<LocalizedListing>> {
    let rows = store.published_listings(limit).await?;
    Ok(rows
        .into_iter()
        .map(|row| LocalizedListing::new(locale, row))
        .collect())
}

/// Slug lookup first; a UUID key falls back to an id lookup
async fn find(store: &dyn MarketStore, key: &str) -> ServiceResult<Option<PublicListing>> {
    if let Some(row) = store.published_by_slug(key).await? {
        return Ok(Some(row));
    }
    match parse_uuid(key) {
        Some(id) => Ok(store.published_by_id(id).await?),
        None => Ok(None),
    }
}

pub async fn detail(
    store: &dyn MarketStore,
    locale: Locale,
    key: &str,
) -> ServiceResult<PublicListingDetail> {
    let row = find(store, key)
        .await?
        .ok_or_else(AppError::listing_not_found)?;

    let mut images = store.images_for_listing(row.id).await?;
    sort_for_display(&mut images);
    let images = images
        .iter()
        .take(DETAIL_IMAGE_LIMIT)
        .map(|img| LocalizedImage::new(locale, img))
        .collect();

    Ok(PublicListingDetail {
        listing: LocalizedListing::new(locale, row),
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::error::ServiceError;
    use chrono::Utc;
    use shared::error::ErrorCode;
    use shared::models::{
        ListingCreate, ListingImageCreate, ListingStatus, StatusChange, SupplierUpsert, slug_for,
    };
    use uuid::Uuid;

    async fn published(store: &MemoryStore, title_en: Option<&str>, title_ar: Option<&str>) -> Uuid {
        let supplier = store
            .upsert_supplier(
                Uuid::new_v4(),
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
                    title_en: title_en.map(str::to_string),
                    title_ar: title_ar.map(str::to_string),
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
        for i in 0..15 {
            store
                .insert_image(
                    listing.id,
                    &ListingImageCreate {
                        url: format!("https://x.test/{i}.jpg"),
                        alt_en: None,
                        alt_ar: None,
                        sort_order: i,
                        is_primary: false,
                    },
                )
                .await
                .unwrap();
        }
        store
            .apply_status(
                listing.id,
                &StatusChange {
                    status: ListingStatus::Published,
                    slug: Some(slug_for(listing.id)),
                    published_at: Some(Utc::now()),
                },
            )
            .await
            .unwrap();
        listing.id
    }

    #[tokio::test]
    async fn test_detail_by_slug_or_id() {
        let store = MemoryStore::new();
        let id = published(&store, Some("Generator"), None).await;

        let by_slug = detail(&store, Locale::En, &slug_for(id)).await.unwrap();
        assert_eq!(by_slug.listing.listing.id, id);
        assert_eq!(by_slug.images.len(), DETAIL_IMAGE_LIMIT);
        assert!(by_slug.images[0].is_primary);

        let by_id = detail(&store, Locale::Ar, &id.to_string()).await.unwrap();
        assert_eq!(by_id.listing.title, "Generator");
        assert!(by_id.listing.title_is_fallback);
    }

    #[tokio::test]
    async fn test_unknown_key_is_not_found() {
        let store = MemoryStore::new();
        for key in ["listing-deadbeef", "not-a-uuid", &Uuid::new_v4().to_string()] {
            match detail(&store, Locale::En, key).await.unwrap_err() {
                ServiceError::App(e) => assert_eq!(e.code, ErrorCode::ListingNotFound),
                ServiceError::Db(e) => panic!("unexpected db error: {e}"),
            }
        }
    }

    #[tokio::test]
    async fn test_index_is_localized_and_limited() {
        let store = MemoryStore::new();
        published(&store, None, Some("رافعة")).await;
        published(&store, Some("Generator"), None).await;

        let all = index(&store, Locale::En, 50).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Generator");
        assert_eq!(all[1].title, "رافعة");
        assert!(all[1].title_is_fallback);

        assert_eq!(index(&store, Locale::En, 1).await.unwrap().len(), 1);
    }
}
