//! Public catalog endpoints
//!
//! Responses carry a weak ETag built from the revalidation generations of
//! the paths they render, so an unchanged catalog answers `304`.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use shared::Locale;
use shared::error::AppError;

use crate::revalidate::{public_index_path, public_listing_path};
use crate::services::catalog;
use crate::state::AppState;

fn locale_or_404(segment: &str) -> Result<Locale, AppError> {
    Locale::parse(segment).ok_or_else(|| AppError::not_found(format!("Locale {segment}")))
}

fn matches_etag(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|tag| tag == etag || tag == "*")
}

fn not_modified(etag: String) -> Response {
    (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response()
}

/// GET /{locale}/listings
pub async fn index(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let locale = locale_or_404(&locale)?;
    let etag = state.revalidator.etag(&[&public_index_path(locale)]);
    if matches_etag(&headers, &etag) {
        return Ok(not_modified(etag));
    }

    let rows = catalog::index(&*state.store, locale, state.catalog_page_size).await?;
    Ok(([(header::ETAG, etag)], Json(rows)).into_response())
}

/// GET /{locale}/listings/{key}
///
/// `key` is a slug, or a listing id for listings reached before their slug
pub async fn detail(
    State(state): State<AppState>,
    Path((locale, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let locale = locale_or_404(&locale)?;
    let etag = state.revalidator.etag(&[
        &public_index_path(locale),
        &public_listing_path(locale, &key),
    ]);
    if matches_etag(&headers, &etag) {
        return Ok(not_modified(etag));
    }

    let detail = catalog::detail(&*state.store, locale, &key).await?;
    Ok(([(header::ETAG, etag)], Json(detail)).into_response())
}
