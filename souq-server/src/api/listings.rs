//! Supplier listing pages and actions: list, create, detail, status

use axum::{
    Json,
    extract::{Path, State},
};
use shared::Locale;
use shared::error::{AppError, ErrorCode};
use shared::models::{Listing, ListingStatus};
use shared::util::parse_uuid;

use crate::auth::CurrentSession;
use crate::auth::gate::require_supplier_portal;
use crate::error::{ActionResult, FormRedirect};
use crate::revalidate::{supplier_listing_path, supplier_listings_path};
use crate::services::listings::{self, DraftForm, ListingDetail};
use crate::services::publish;
use crate::state::AppState;
use crate::util::{FormData, redirect_url};

/// Back to the listing dashboard with `err`
fn to_dashboard(locale: Locale, err: &str) -> FormRedirect {
    FormRedirect::to(redirect_url(
        &supplier_listings_path(locale),
        &[("err", err)],
        None,
    ))
}

/// GET /{locale}/supplier/listings
pub async fn list(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(locale): Path<String>,
) -> Result<Json<Vec<Listing>>, FormRedirect> {
    let locale = Locale::safe(&locale);
    let page = supplier_listings_path(locale);
    let access = require_supplier_portal(&*state.store, &session, locale, &page).await?;
    let rows = listings::list_for_owner(&*state.store, access.user.id)
        .await
        .map_err(|e| {
            FormRedirect::to(redirect_url(
                &format!("/{locale}/supplier"),
                &[("err", &AppError::from(e).reason())],
                None,
            ))
        })?;
    Ok(Json(rows))
}

/// POST /{locale}/supplier/listings
pub async fn create(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(locale): Path<String>,
    axum::Form(form): axum::Form<FormData>,
) -> ActionResult {
    let locale = Locale::safe(&locale);
    let new_page = format!("/{locale}/supplier/listings/new");
    let access = require_supplier_portal(&*state.store, &session, locale, &new_page).await?;

    let draft = DraftForm::parse(&form, &state.default_currency);
    let listing = listings::create_draft(&*state.store, access.supplier.as_ref(), draft)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            if err.code == ErrorCode::SupplierProfileIncomplete {
                return FormRedirect::to(redirect_url(
                    &format!("/{locale}/supplier/profile"),
                    &[("next", &new_page)],
                    None,
                ));
            }
            FormRedirect::to(redirect_url(&new_page, &[("error", &err.reason())], None))
        })?;

    state.revalidator.revalidate_path(&supplier_listings_path(locale));
    Ok(FormRedirect::to(redirect_url(
        &supplier_listing_path(locale, listing.id),
        &[("created", "1")],
        Some("images"),
    )))
}

/// GET /{locale}/supplier/listings/{id}
pub async fn detail(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((locale, id)): Path<(String, String)>,
) -> Result<Json<ListingDetail>, FormRedirect> {
    let locale = Locale::safe(&locale);
    let Some(listing_id) = parse_uuid(&id) else {
        return Err(to_dashboard(locale, ErrorCode::InvalidId.tag()));
    };
    let page = supplier_listing_path(locale, listing_id);
    let access = require_supplier_portal(&*state.store, &session, locale, &page).await?;

    let detail = listings::detail_for_owner(&*state.store, listing_id, access.user.id)
        .await
        .map_err(|e| to_dashboard(locale, &AppError::from(e).reason()))?;
    Ok(Json(detail))
}

/// POST /{locale}/supplier/listings/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((locale, id)): Path<(String, String)>,
    axum::Form(form): axum::Form<FormData>,
) -> ActionResult {
    let locale = Locale::safe(&locale);
    let target = form
        .get("status")
        .and_then(|s| ListingStatus::parse(s.trim()));
    let (Some(listing_id), Some(target)) = (parse_uuid(&id), target) else {
        return Err(to_dashboard(locale, ErrorCode::InvalidId.tag()));
    };
    let page = supplier_listing_path(locale, listing_id);
    let access = require_supplier_portal(&*state.store, &session, locale, &page).await?;

    publish::set_status(
        &*state.store,
        &state.revalidator,
        access.user.id,
        listing_id,
        target,
    )
    .await
    .map_err(|e| {
        let err = AppError::from(e);
        match err.detail_str("anchor") {
            // Publish gate: back to the section that needs fixing
            Some(anchor) => FormRedirect::to(redirect_url(
                &page,
                &[("err", err.code.tag())],
                Some(anchor),
            )),
            None => to_dashboard(locale, &err.reason()),
        }
    })?;

    Ok(FormRedirect::to(redirect_url(
        &page,
        &[("updated", "1")],
        Some("images"),
    )))
}
