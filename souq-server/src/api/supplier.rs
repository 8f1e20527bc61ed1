//! Supplier portal: onboarding and profile

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::Locale;
use shared::error::{AppError, ErrorCode};
use shared::models::{Role, Supplier};

use crate::auth::CurrentSession;
use crate::auth::gate::{
    onboarding_path, require_supplier_portal, require_user, resolve_role, store_failure,
};
use crate::error::{ActionResult, FormRedirect};
use crate::services::suppliers;
use crate::state::AppState;
use crate::util::{FormData, get_str, portal_home, redirect_url, safe_next};

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PortalOverview {
    pub role: Role,
    pub supplier: Option<Supplier>,
    pub listing_count: usize,
    /// Listing creation needs display name and city
    pub can_create_listings: bool,
}

/// GET /{locale}/supplier
pub async fn portal(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(locale): Path<String>,
) -> Result<Json<PortalOverview>, FormRedirect> {
    let locale = Locale::safe(&locale);
    let access =
        require_supplier_portal(&*state.store, &session, locale, &portal_home(locale)).await?;
    let listings = state
        .store
        .listings_by_owner(access.user.id)
        .await
        .map_err(|e| store_failure(locale, e.into()))?;

    Ok(Json(PortalOverview {
        role: access.role,
        can_create_listings: access
            .supplier
            .as_ref()
            .is_some_and(Supplier::is_complete_for_listing),
        supplier: access.supplier,
        listing_count: listings.len(),
    }))
}

#[derive(Debug, Serialize)]
pub struct OnboardingStatus {
    pub role: Role,
    pub has_supplier: bool,
}

/// GET /{locale}/supplier/start
///
/// Callers who already pass the portal gate are sent straight in.
pub async fn start_page(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(locale): Path<String>,
) -> Result<Json<OnboardingStatus>, FormRedirect> {
    let locale = Locale::safe(&locale);
    let page = format!("/{locale}/supplier/start");
    let user = require_user(&session, locale, &page)?;
    let role = resolve_role(&*state.store, &user)
        .await
        .map_err(|e| store_failure(locale, e))?;
    let supplier = suppliers::fetch(&*state.store, user.id)
        .await
        .map_err(|e| store_failure(locale, e))?;

    let has_supplier = supplier.as_ref().is_some_and(Supplier::is_onboarded);
    if role == Role::Admin || (role == Role::Supplier && has_supplier) {
        return Err(FormRedirect::to(portal_home(locale)));
    }
    Ok(Json(OnboardingStatus { role, has_supplier }))
}

/// POST /{locale}/supplier/start
pub async fn become_supplier(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(locale): Path<String>,
    axum::Form(form): axum::Form<FormData>,
) -> ActionResult {
    let locale = Locale::safe(&locale);
    let next = safe_next(locale, form.get("next").map(String::as_str));
    let user = require_user(&session, locale, &onboarding_path(locale, &next))?;

    suppliers::become_supplier(
        &*state.store,
        &state.revalidator,
        &user,
        get_str(&form, "display_name"),
        get_str(&form, "city"),
    )
    .await
    .map_err(|e| {
        let err: AppError = e.into();
        FormRedirect::to(redirect_url(
            &format!("/{locale}/supplier/start"),
            &[("error", &err.reason()), ("next", &next)],
            None,
        ))
    })?;

    Ok(FormRedirect::to(next))
}

/// GET /{locale}/supplier/profile
pub async fn profile_page(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(locale): Path<String>,
) -> Result<Json<Option<Supplier>>, FormRedirect> {
    let locale = Locale::safe(&locale);
    let page = format!("/{locale}/supplier/profile");
    let access = require_supplier_portal(&*state.store, &session, locale, &page).await?;
    Ok(Json(access.supplier))
}

/// POST /{locale}/supplier/profile
pub async fn update_profile(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(locale): Path<String>,
    Query(query): Query<NextQuery>,
    axum::Form(form): axum::Form<FormData>,
) -> ActionResult {
    let locale = Locale::safe(&locale);
    let raw_next = form.get("next").cloned().or(query.next);
    let next = safe_next(locale, raw_next.as_deref());
    let page = format!("/{locale}/supplier/profile");
    let access = require_supplier_portal(&*state.store, &session, locale, &page).await?;

    suppliers::update_profile(
        &*state.store,
        &state.revalidator,
        &access.user,
        access.role,
        get_str(&form, "display_name"),
        get_str(&form, "city"),
    )
    .await
    .map_err(|e| {
        let err: AppError = e.into();
        if err.code == ErrorCode::SupplierNotOnboarded {
            return FormRedirect::to(onboarding_path(locale, &next));
        }
        FormRedirect::to(redirect_url(
            &page,
            &[("error", &err.reason()), ("next", &next)],
            None,
        ))
    })?;

    Ok(FormRedirect::to(redirect_url(
        &next,
        &[("profile_saved", "1")],
        None,
    )))
}
