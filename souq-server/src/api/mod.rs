//! API routes for souq-server
//!
//! Every page lives under a locale segment (`/en/...`, `/ar/...`). Reads
//! answer JSON; form actions answer `303 See Other`.

pub mod auth;
pub mod catalog;
pub mod health;
pub mod images;
pub mod listings;
pub mod supplier;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::rate_limit::{register_rate_limit, sign_in_rate_limit};
use crate::auth::session::resolve_session;
use crate::state::AppState;

/// Form posts are small; image URLs are links, not uploads
const BODY_LIMIT: usize = 64 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Rate limited per IP
    let sign_in = Router::new()
        .route("/{locale}/sign-in", post(auth::sign_in))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            sign_in_rate_limit,
        ));
    let register = Router::new()
        .route("/{locale}/register", post(auth::register))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    let account = Router::new()
        .route("/auth/exchange", get(auth::exchange))
        .route("/auth/set-session", post(auth::set_session))
        .route("/{locale}/sign-out", post(auth::sign_out))
        .route("/{locale}/reset-password", post(auth::reset_password))
        .route("/{locale}/update-password", post(auth::update_password))
        .merge(sign_in)
        .merge(register);

    // Anonymous
    let catalog = Router::new()
        .route("/{locale}/listings", get(catalog::index))
        .route("/{locale}/listings/{key}", get(catalog::detail));

    // Supplier portal (gated per handler)
    let portal = Router::new()
        .route("/{locale}/supplier", get(supplier::portal))
        .route(
            "/{locale}/supplier/start",
            get(supplier::start_page).post(supplier::become_supplier),
        )
        .route(
            "/{locale}/supplier/profile",
            get(supplier::profile_page).post(supplier::update_profile),
        )
        .route(
            "/{locale}/supplier/listings",
            get(listings::list).post(listings::create),
        )
        .route("/{locale}/supplier/listings/{id}", get(listings::detail))
        .route(
            "/{locale}/supplier/listings/{id}/status",
            post(listings::set_status),
        )
        .route("/{locale}/supplier/listings/{id}/images", post(images::add))
        .route(
            "/{locale}/supplier/listings/{id}/images/primary",
            post(images::set_primary),
        )
        .route(
            "/{locale}/supplier/listings/{id}/images/delete",
            post(images::delete),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/health", get(health::provider_health))
        .merge(account)
        .merge(catalog)
        .merge(portal)
        // Resolves the caller and rotates session cookies on every request
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
