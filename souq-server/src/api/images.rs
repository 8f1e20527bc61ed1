//! Listing image actions: add, set primary, delete
//!
//! All three land back on the listing's images section.

use axum::extract::{Path, State};
use shared::Locale;
use shared::error::{AppError, ErrorCode};
use shared::util::parse_uuid;
use uuid::Uuid;

use crate::auth::CurrentSession;
use crate::auth::gate::require_supplier_portal;
use crate::error::{ActionResult, FormRedirect, ServiceError};
use crate::revalidate::{supplier_listing_path, supplier_listings_path};
use crate::services::images;
use crate::state::AppState;
use crate::util::{FormData, redirect_url};

fn done(locale: Locale, listing_id: Uuid) -> FormRedirect {
    FormRedirect::to(redirect_url(
        &supplier_listing_path(locale, listing_id),
        &[("img", "1")],
        Some("images"),
    ))
}

fn bad_request(locale: Locale) -> FormRedirect {
    FormRedirect::to(redirect_url(
        &supplier_listings_path(locale),
        &[("err", ErrorCode::InvalidRequest.tag())],
        None,
    ))
}

/// Unknown or foreign listings go to the dashboard; anything else back to the listing
fn failed(locale: Locale, listing_id: Uuid, err: ServiceError) -> FormRedirect {
    let err = AppError::from(err);
    if err.code == ErrorCode::ListingNotFound {
        return FormRedirect::to(redirect_url(
            &supplier_listings_path(locale),
            &[("err", err.code.tag())],
            None,
        ));
    }
    FormRedirect::to(redirect_url(
        &supplier_listing_path(locale, listing_id),
        &[("err", &err.reason())],
        Some("images"),
    ))
}

/// Listing id from the path and image id from the form
fn ids(id: &str, form: &FormData) -> Option<(Uuid, Uuid)> {
    let listing_id = parse_uuid(id)?;
    let image_id = parse_uuid(form.get("image_id")?)?;
    Some((listing_id, image_id))
}

/// POST /{locale}/supplier/listings/{id}/images
pub async fn add(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((locale, id)): Path<(String, String)>,
    axum::Form(form): axum::Form<FormData>,
) -> ActionResult {
    let locale = Locale::safe(&locale);
    let Some(listing_id) = parse_uuid(&id) else {
        return Err(bad_request(locale));
    };
    let page = supplier_listing_path(locale, listing_id);
    let access = require_supplier_portal(&*state.store, &session, locale, &page).await?;

    let data = images::parse_image_form(&form).map_err(|e| {
        FormRedirect::to(redirect_url(&page, &[("err", &e.reason())], None))
    })?;

    images::add_image(
        &*state.store,
        &state.revalidator,
        access.user.id,
        listing_id,
        data,
    )
    .await
    .map_err(|e| failed(locale, listing_id, e))?;

    Ok(done(locale, listing_id))
}

/// POST /{locale}/supplier/listings/{id}/images/primary
pub async fn set_primary(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((locale, id)): Path<(String, String)>,
    axum::Form(form): axum::Form<FormData>,
) -> ActionResult {
    let locale = Locale::safe(&locale);
    let Some((listing_id, image_id)) = ids(&id, &form) else {
        return Err(bad_request(locale));
    };
    let page = supplier_listing_path(locale, listing_id);
    let access = require_supplier_portal(&*state.store, &session, locale, &page).await?;

    images::set_primary(
        &*state.store,
        &state.revalidator,
        access.user.id,
        listing_id,
        image_id,
    )
    .await
    .map_err(|e| failed(locale, listing_id, e))?;

    Ok(done(locale, listing_id))
}

/// POST /{locale}/supplier/listings/{id}/images/delete
pub async fn delete(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((locale, id)): Path<(String, String)>,
    axum::Form(form): axum::Form<FormData>,
) -> ActionResult {
    let locale = Locale::safe(&locale);
    let Some((listing_id, image_id)) = ids(&id, &form) else {
        return Err(bad_request(locale));
    };
    let page = supplier_listing_path(locale, listing_id);
    let access = require_supplier_portal(&*state.store, &session, locale, &page).await?;

    images::delete_image(
        &*state.store,
        &state.revalidator,
        access.user.id,
        listing_id,
        image_id,
    )
    .await
    .map_err(|e| failed(locale, listing_id, e))?;

    Ok(done(locale, listing_id))
}
