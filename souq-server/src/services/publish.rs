//! Publish lifecycle: draft ⇄ published ⇄ archived
//!
//! Any status may move to any other. Only the move to `published` is gated,
//! and the gate reads the persisted row, never the request. A passing
//! transition is written as one update of status, slug and `published_at`.

use chrono::{DateTime, Utc};
use shared::error::AppError;
use shared::models::{Listing, ListingStatus, PublishBlocker, StatusChange, slug_for};
use uuid::Uuid;

use crate::db::MarketStore;
use crate::error::ServiceResult;
use crate::revalidate::{RevalidationHub, Scope};

/// Work out the write for moving `listing` to `target`
///
/// `image_count` only matters when publishing. The slug is assigned once
/// and then carried through every later transition.
pub fn plan_transition(
    listing: &Listing,
    target: ListingStatus,
    image_count: u64,
    now: DateTime<Utc>,
) -> Result<StatusChange, PublishBlocker> {
    match target {
        ListingStatus::Published => {
            if let Some(blocker) = listing.publish_blocker(image_count) {
                return Err(blocker);
            }
            Ok(StatusChange {
                status: target,
                slug: Some(
                    listing
                        .slug
                        .clone()
                        .unwrap_or_else(|| slug_for(listing.id)),
                ),
                published_at: Some(now),
            })
        }
        ListingStatus::Draft | ListingStatus::Archived => Ok(StatusChange {
            status: target,
            slug: listing.slug.clone(),
            published_at: None,
        }),
    }
}

/// Move an owned listing to `target`
pub async fn set_status(
    store: &dyn MarketStore,
    revalidator: &RevalidationHub,
    owner_id: Uuid,
    listing_id: Uuid,
    target: ListingStatus,
) -> ServiceResult<Listing> {
    let listing = store
        .listing_owned_by(listing_id, owner_id)
        .await?
        .ok_or_else(AppError::listing_not_found)?;

    let image_count = match target {
        ListingStatus::Published => store.count_images(listing.id).await?,
        _ => 0,
    };

    let change = plan_transition(&listing, target, image_count, Utc::now()).map_err(|blocker| {
        tracing::debug!(listing_id = %listing.id, reason = blocker.tag(), "Publish blocked");
        AppError::from(blocker)
    })?;

    let updated = store
        .apply_status(listing.id, &change)
        .await?
        .ok_or_else(AppError::listing_not_found)?;

    revalidator.revalidate_listing(
        updated.id,
        Scope::Status {
            slug: updated.slug.as_deref(),
        },
    );
    tracing::info!(
        listing_id = %updated.id,
        from = %listing.status,
        to = %updated.status,
        "Listing status changed"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::error::ServiceError;
    use crate::revalidate::{public_index_path, public_listing_path, supplier_listings_path};
    use shared::Locale;
    use shared::error::ErrorCode;
    use shared::models::{ListingCreate, ListingImageCreate, Supplier, SupplierUpsert};

    fn draft(daily_rate: Option<f64>) -> ListingCreate {
        ListingCreate {
            title_en: Some("Generator".into()),
            title_ar: None,
            description_en: None,
            description_ar: None,
            daily_rate,
            weekly_rate: None,
            currency: "SAR".into(),
            city_id: None,
            min_days: 1,
            delivery_available: false,
            operator_available: false,
            deposit_amount: None,
        }
    }

    fn image(url: &str) -> ListingImageCreate {
        ListingImageCreate {
            url: url.into(),
            alt_en: None,
            alt_ar: None,
            sort_order: 0,
            is_primary: false,
        }
    }

    async fn setup(daily_rate: Option<f64>) -> (MemoryStore, Supplier, Listing) {
        let store = MemoryStore::new();
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
            .insert_listing(supplier.id, &draft(daily_rate))
            .await
            .unwrap();
        (store, supplier, listing)
    }

    fn code_of(err: ServiceError) -> ErrorCode {
        match err {
            ServiceError::App(e) => e.code,
            ServiceError::Db(e) => panic!("unexpected db error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_plan_checks_title_then_rate_then_images() {
        let (_, _, mut listing) = setup(None).await;
        listing.title_en = None;
        let now = Utc::now();
        assert_eq!(
            plan_transition(&listing, ListingStatus::Published, 0, now),
            Err(PublishBlocker::MissingTitle)
        );
        listing.title_ar = Some("مولد".into());
        assert_eq!(
            plan_transition(&listing, ListingStatus::Published, 0, now),
            Err(PublishBlocker::MissingRate)
        );
        listing.weekly_rate = Some(500.0);
        assert_eq!(
            plan_transition(&listing, ListingStatus::Published, 0, now),
            Err(PublishBlocker::MissingImage)
        );
        let change = plan_transition(&listing, ListingStatus::Published, 1, now).unwrap();
        assert_eq!(change.slug, Some(slug_for(listing.id)));
        assert_eq!(change.published_at, Some(now));
    }

    #[tokio::test]
    async fn test_plan_rejects_non_positive_and_non_finite_rates() {
        let (_, _, mut listing) = setup(Some(0.0)).await;
        listing.weekly_rate = Some(-5.0);
        assert_eq!(
            plan_transition(&listing, ListingStatus::Published, 3, Utc::now()),
            Err(PublishBlocker::MissingRate)
        );
        listing.daily_rate = Some(f64::INFINITY);
        assert_eq!(
            plan_transition(&listing, ListingStatus::Published, 3, Utc::now()),
            Err(PublishBlocker::MissingRate)
        );
    }

    #[tokio::test]
    async fn test_plan_unpublish_and_archive_skip_gate() {
        let (_, _, mut listing) = setup(None).await;
        listing.slug = Some("listing-abcdef12".into());
        for target in [ListingStatus::Draft, ListingStatus::Archived] {
            let change = plan_transition(&listing, target, 0, Utc::now()).unwrap();
            assert_eq!(change.status, target);
            assert_eq!(change.published_at, None);
            assert_eq!(change.slug.as_deref(), Some("listing-abcdef12"));
        }
    }

    #[tokio::test]
    async fn test_publish_without_images_leaves_status_unchanged() {
        let (store, supplier, listing) = setup(Some(100.0)).await;
        let hub = RevalidationHub::new();
        let err = set_status(
            &store,
            &hub,
            supplier.owner_id,
            listing.id,
            ListingStatus::Published,
        )
        .await
        .unwrap_err();
        assert_eq!(code_of(err), ErrorCode::ListingImageMissing);

        let after = store
            .listing_owned_by(listing.id, supplier.owner_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status, ListingStatus::Draft);
        assert_eq!(after.published_at, None);
        assert_eq!(after.slug, None);
        assert_eq!(hub.generation(&supplier_listings_path(Locale::En)), 0);
    }

    #[tokio::test]
    async fn test_publish_without_rate_fails() {
        let (store, supplier, listing) = setup(None).await;
        store
            .insert_image(listing.id, &image("https://x.test/a.jpg"))
            .await
            .unwrap();
        let err = set_status(
            &store,
            &RevalidationHub::new(),
            supplier.owner_id,
            listing.id,
            ListingStatus::Published,
        )
        .await
        .unwrap_err();
        assert_eq!(code_of(err), ErrorCode::ListingRateMissing);
    }

    #[tokio::test]
    async fn test_slug_survives_unpublish_and_republish() {
        let (store, supplier, listing) = setup(Some(100.0)).await;
        let hub = RevalidationHub::new();
        store
            .insert_image(listing.id, &image("https://x.test/a.jpg"))
            .await
            .unwrap();

        let published = set_status(
            &store,
            &hub,
            supplier.owner_id,
            listing.id,
            ListingStatus::Published,
        )
        .await
        .unwrap();
        let slug = published.slug.clone().unwrap();
        assert_eq!(slug, slug_for(listing.id));
        assert!(published.published_at.is_some());
        assert_eq!(hub.generation(&public_index_path(Locale::Ar)), 1);
        assert_eq!(hub.generation(&public_listing_path(Locale::En, &slug)), 1);

        let draft = set_status(&store, &hub, supplier.owner_id, listing.id, ListingStatus::Draft)
            .await
            .unwrap();
        assert_eq!(draft.status, ListingStatus::Draft);
        assert_eq!(draft.published_at, None);
        assert_eq!(draft.slug.as_deref(), Some(slug.as_str()));

        let again = set_status(
            &store,
            &hub,
            supplier.owner_id,
            listing.id,
            ListingStatus::Published,
        )
        .await
        .unwrap();
        assert_eq!(again.slug.as_deref(), Some(slug.as_str()));
    }

    #[tokio::test]
    async fn test_other_owner_gets_not_found() {
        let (store, _, listing) = setup(Some(100.0)).await;
        let err = set_status(
            &store,
            &RevalidationHub::new(),
            Uuid::new_v4(),
            listing.id,
            ListingStatus::Archived,
        )
        .await
        .unwrap_err();
        assert_eq!(code_of(err), ErrorCode::ListingNotFound);
    }
}
