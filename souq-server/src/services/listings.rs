//! Listing drafts and the supplier-side listing reads

use shared::error::{AppError, ErrorCode};
use shared::models::{
    Listing, ListingCreate, ListingImage, Supplier, resolve_city, sort_for_display,
};
use uuid::Uuid;

use crate::db::MarketStore;
use crate::error::ServiceResult;
use crate::util::{FormData, get_str, parse_flag, parse_min_days, parse_number};

/// Listing with its images in display order
#[derive(Debug, Clone, serde::Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub images: Vec<ListingImage>,
}

/// Parsed create form; `city` is free text, resolved against the city table
#[derive(Debug, Clone)]
pub struct DraftForm {
    pub data: ListingCreate,
    pub city: Option<String>,
}

impl DraftForm {
    pub fn parse(form: &FormData, default_currency: &str) -> Self {
        let currency = get_str(form, "currency")
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| default_currency.to_string());
        Self {
            data: ListingCreate {
                title_en: get_str(form, "title_en"),
                title_ar: get_str(form, "title_ar"),
                description_en: get_str(form, "description_en"),
                description_ar: get_str(form, "description_ar"),
                daily_rate: parse_number(form.get("daily_rate").map(String::as_str)),
                weekly_rate: parse_number(form.get("weekly_rate").map(String::as_str)),
                currency,
                city_id: None,
                min_days: parse_min_days(form.get("min_days").map(String::as_str)),
                delivery_available: parse_flag(form.get("delivery_available").map(String::as_str)),
                operator_available: parse_flag(form.get("operator_available").map(String::as_str)),
                deposit_amount: parse_number(form.get("deposit_amount").map(String::as_str)),
            },
            city: get_str(form, "city"),
        }
    }
}

/// Create a draft for the caller's supplier
///
/// The supplier profile must be complete (name and city) before the form is
/// even looked at. The city falls back to the supplier's own city.
pub async fn create_draft(
    store: &dyn MarketStore,
    supplier: Option<&Supplier>,
    mut form: DraftForm,
) -> ServiceResult<Listing> {
    let supplier = supplier
        .filter(|s| s.is_complete_for_listing())
        .ok_or_else(|| AppError::new(ErrorCode::SupplierProfileIncomplete))?;

    if form.data.title_en.is_none() && form.data.title_ar.is_none() {
        return Err(AppError::new(ErrorCode::ListingTitleMissing).into());
    }

    if let Some(query) = form.city.as_deref().or(supplier.city.as_deref()) {
        let cities = store.list_cities().await?;
        let city = resolve_city(&cities, query);
        if city.is_none() {
            tracing::debug!(city = query, "No city matched, listing left without one");
        }
        form.data.city_id = city.map(|c| c.id);
    }

    let listing = store.insert_listing(supplier.id, &form.data).await?;
    tracing::info!(listing_id = %listing.id, supplier_id = %supplier.id, "Listing draft created");
    Ok(listing)
}

pub async fn list_for_owner(store: &dyn MarketStore, owner_id: Uuid) -> ServiceResult<Vec<Listing>> {
    Ok(store.listings_by_owner(owner_id).await?)
}

/// Owned listing with images; someone else's listing reads as not found
pub async fn detail_for_owner(
    store: &dyn MarketStore,
    listing_id: Uuid,
    owner_id: Uuid,
) -> ServiceResult<ListingDetail> {
    let listing = store
        .listing_owned_by(listing_id, owner_id)
        .await?
        .ok_or_else(AppError::listing_not_found)?;
    let mut images = store.images_for_listing(listing.id).await?;
    sort_for_display(&mut images);
    Ok(ListingDetail { listing, images })
}
