//! Listing image collection: add, choose primary, delete
//!
//! Each listing has at most one primary image. The store enforces it; these
//! operations only decide which image should hold the flag.

use shared::error::{AppError, ErrorCode};
use shared::models::{Listing, ListingImage, ListingImageCreate};
use uuid::Uuid;

use crate::db::MarketStore;
use crate::error::ServiceResult;
use crate::revalidate::{RevalidationHub, Scope};
use crate::util::{FormData, get_str, parse_flag, parse_sort_order, safe_http_url};

/// Parse the add-image form; only the URL can make it fail
pub fn parse_image_form(form: &FormData) -> Result<ListingImageCreate, AppError> {
    let url = get_str(form, "url")
        .as_deref()
        .and_then(safe_http_url)
        .ok_or_else(|| AppError::new(ErrorCode::ImageUrlInvalid))?;
    Ok(ListingImageCreate {
        url,
        alt_en: get_str(form, "alt_en"),
        alt_ar: get_str(form, "alt_ar"),
        sort_order: parse_sort_order(form.get("sort_order").map(String::as_str)),
        is_primary: parse_flag(form.get("is_primary").map(String::as_str)),
    })
}

async fn owned_listing(
    store: &dyn MarketStore,
    owner_id: Uuid,
    listing_id: Uuid,
) -> ServiceResult<Listing> {
    Ok(store
        .listing_owned_by(listing_id, owner_id)
        .await?
        .ok_or_else(AppError::listing_not_found)?)
}

fn signal(revalidator: &RevalidationHub, listing: &Listing) {
    revalidator.revalidate_listing(
        listing.id,
        Scope::Images {
            slug: listing.slug.as_deref(),
            public: listing.is_public(),
        },
    );
}

/// Add an image; it becomes primary when asked or when the listing has none
pub async fn add_image(
    store: &dyn MarketStore,
    revalidator: &RevalidationHub,
    owner_id: Uuid,
    listing_id: Uuid,
    data: ListingImageCreate,
) -> ServiceResult<ListingImage> {
    let listing = owned_listing(store, owner_id, listing_id).await?;
    let image = store.insert_image(listing.id, &data).await?;
    signal(revalidator, &listing);
    tracing::info!(
        listing_id = %listing.id,
        image_id = %image.id,
        is_primary = image.is_primary,
        "Listing image added"
    );
    Ok(image)
}

/// Make `image_id` the listing's only primary image
///
/// An image of another listing matches nothing and changes nothing; the
/// call still succeeds. Returns whether the flag moved.
pub async fn set_primary(
    store: &dyn MarketStore,
    revalidator: &RevalidationHub,
    owner_id: Uuid,
    listing_id: Uuid,
    image_id: Uuid,
) -> ServiceResult<bool> {
    let listing = owned_listing(store, owner_id, listing_id).await?;
    let moved = store.set_primary_image(listing.id, image_id).await?;
    if moved {
        signal(revalidator, &listing);
    } else {
        tracing::warn!(
            listing_id = %listing.id,
            image_id = %image_id,
            "Set primary matched no image of this listing"
        );
    }
    Ok(moved)
}

/// Delete one image of an owned listing
///
/// A deleted primary is not replaced, and a published listing stays
/// published even with no images left.
pub async fn delete_image(
    store: &dyn MarketStore,
    revalidator: &RevalidationHub,
    owner_id: Uuid,
    listing_id: Uuid,
    image_id: Uuid,
) -> ServiceResult<bool> {
    let listing = owned_listing(store, owner_id, listing_id).await?;
    let deleted = store.delete_image(listing.id, image_id).await?;
    if !deleted {
        tracing::warn!(listing_id = %listing.id, image_id = %image_id, "Image to delete not found");
        return Ok(false);
    }

    signal(revalidator, &listing);
    if listing.is_public() && store.count_images(listing.id).await? == 0 {
        tracing::warn!(listing_id = %listing.id, "Published listing has no images left");
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::error::ServiceError;
    use crate::revalidate::supplier_listing_path;
    use shared::Locale;
    use shared::models::{ListingCreate, SupplierUpsert, primary_count};

    struct Fixture {
        store: MemoryStore,
        hub: RevalidationHub,
        owner: Uuid,
        listing: Listing,
        other: Listing,
    }

    fn draft() -> ListingCreate {
        ListingCreate {
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
        }
    }

    async fn fixture() -> Fixture {
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
        let listing = store.insert_listing(supplier.id, &draft()).await.unwrap();
        let other = store.insert_listing(supplier.id, &draft()).await.unwrap();
        Fixture {
            store,
            hub: RevalidationHub::new(),
            owner,
            listing,
            other,
        }
    }

    fn req(url: &str, primary: bool) -> ListingImageCreate {
        ListingImageCreate {
            url: url.into(),
            alt_en: None,
            alt_ar: None,
            sort_order: 0,
            is_primary: primary,
        }
    }

    async fn add(f: &Fixture, listing: &Listing, url: &str, primary: bool) -> ListingImage {
        add_image(&f.store, &f.hub, f.owner, listing.id, req(url, primary))
            .await
            .unwrap()
    }

    async fn images(f: &Fixture, listing: &Listing) -> Vec<ListingImage> {
        f.store.images_for_listing(listing.id).await.unwrap()
    }

    #[test]
    fn test_parse_image_form() {
        let mut form = FormData::new();
        form.insert("url".into(), "ftp://x.test/a.jpg".into());
        let err = parse_image_form(&form).unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageUrlInvalid);
        assert_eq!(err.reason(), "bad_url");

        form.insert("url".into(), " https://x.test/a.jpg ".into());
        form.insert("sort_order".into(), "NaN".into());
        form.insert("is_primary".into(), "true".into());
        form.insert("alt_ar".into(), "صورة".into());
        let data = parse_image_form(&form).unwrap();
        assert_eq!(data.url, "https://x.test/a.jpg");
        assert_eq!(data.sort_order, 0);
        assert!(data.is_primary);
        assert_eq!(data.alt_en, None);
        assert_eq!(data.alt_ar.as_deref(), Some("صورة"));
    }

    #[tokio::test]
    async fn test_first_image_is_primary_regardless_of_flag() {
        let f = fixture().await;
        let first = add(&f, &f.listing, "https://x.test/a.jpg", false).await;
        assert!(first.is_primary);
        let second = add(&f, &f.listing, "https://x.test/b.jpg", false).await;
        assert!(!second.is_primary);
        assert_eq!(primary_count(&images(&f, &f.listing).await), 1);
        assert_eq!(
            f.hub
                .generation(&supplier_listing_path(Locale::Ar, f.listing.id)),
            2
        );
    }

    #[tokio::test]
    async fn test_requested_primary_demotes_previous() {
        let f = fixture().await;
        let first = add(&f, &f.listing, "https://x.test/a.jpg", false).await;
        let second = add(&f, &f.listing, "https://x.test/b.jpg", true).await;

        let all = images(&f, &f.listing).await;
        assert_eq!(primary_count(&all), 1);
        let find = |id: Uuid| all.iter().find(|i| i.id == id).unwrap().is_primary;
        assert!(!find(first.id));
        assert!(find(second.id));
    }

    #[tokio::test]
    async fn test_set_primary_moves_flag() {
        let f = fixture().await;
        let first = add(&f, &f.listing, "https://x.test/a.jpg", false).await;
        let second = add(&f, &f.listing, "https://x.test/b.jpg", false).await;

        assert!(
            set_primary(&f.store, &f.hub, f.owner, f.listing.id, second.id)
                .await
                .unwrap()
        );
        let all = images(&f, &f.listing).await;
        assert_eq!(primary_count(&all), 1);
        assert_eq!(all[0].id, second.id);
        assert!(all.iter().any(|i| i.id == first.id && !i.is_primary));
    }

    #[tokio::test]
    async fn test_set_primary_with_foreign_image_is_noop() {
        let f = fixture().await;
        add(&f, &f.listing, "https://x.test/a.jpg", false).await;
        let foreign = add(&f, &f.other, "https://x.test/z.jpg", false).await;

        let before = images(&f, &f.listing).await;
        let moved = set_primary(&f.store, &f.hub, f.owner, f.listing.id, foreign.id)
            .await
            .unwrap();
        assert!(!moved);

        let after = images(&f, &f.listing).await;
        assert_eq!(
            before.iter().map(|i| (i.id, i.is_primary)).collect::<Vec<_>>(),
            after.iter().map(|i| (i.id, i.is_primary)).collect::<Vec<_>>()
        );
        assert!(images(&f, &f.other).await[0].is_primary);
    }

    #[tokio::test]
    async fn test_delete_primary_leaves_none() {
        let f = fixture().await;
        let first = add(&f, &f.listing, "https://x.test/a.jpg", false).await;
        add(&f, &f.listing, "https://x.test/b.jpg", false).await;

        assert!(
            delete_image(&f.store, &f.hub, f.owner, f.listing.id, first.id)
                .await
                .unwrap()
        );
        let all = images(&f, &f.listing).await;
        assert_eq!(all.len(), 1);
        assert_eq!(primary_count(&all), 0);

        // Scoped by listing: deleting through the wrong listing does nothing
        let other_img = add(&f, &f.other, "https://x.test/z.jpg", false).await;
        assert!(
            !delete_image(&f.store, &f.hub, f.owner, f.listing.id, other_img.id)
                .await
                .unwrap()
        );
        assert_eq!(images(&f, &f.other).await.len(), 1);
    }

    #[tokio::test]
    async fn test_primary_count_never_exceeds_one() {
        let f = fixture().await;
        let mut ids = Vec::new();
        for (i, primary) in [false, true, false, true, true].into_iter().enumerate() {
            let img = add(&f, &f.listing, &format!("https://x.test/{i}.jpg"), primary).await;
            ids.push(img.id);
            assert!(primary_count(&images(&f, &f.listing).await) <= 1);
        }
        for id in ids.iter().rev().take(3) {
            set_primary(&f.store, &f.hub, f.owner, f.listing.id, *id)
                .await
                .unwrap();
            assert_eq!(primary_count(&images(&f, &f.listing).await), 1);
        }
        for id in &ids[..2] {
            delete_image(&f.store, &f.hub, f.owner, f.listing.id, *id)
                .await
                .unwrap();
            assert!(primary_count(&images(&f, &f.listing).await) <= 1);
        }
    }

    #[tokio::test]
    async fn test_not_owner_cannot_touch_images() {
        let f = fixture().await;
        let err = add_image(
            &f.store,
            &f.hub,
            Uuid::new_v4(),
            f.listing.id,
            req("https://x.test/a.jpg", false),
        )
        .await
        .unwrap_err();
        match err {
            ServiceError::App(e) => assert_eq!(e.code, ErrorCode::ListingNotFound),
            ServiceError::Db(e) => panic!("unexpected db error: {e}"),
        }
        assert!(images(&f, &f.listing).await.is_empty());
    }
}
