//! Session cookies and the per-request session resolver
//!
//! The provider's access token is short-lived and rotates on refresh. Every
//! request passes through [`resolve_session`], which identifies the caller
//! from the cookies, refreshes an expired token when it can, and writes the
//! rotated (or cleared) cookies onto the response.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderMap, HeaderValue, header, request::Parts};

use super::claims::verify_access_token;
use super::provider::{AuthSession, AuthUser};
use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "sb-access-token";
pub const REFRESH_COOKIE: &str = "sb-refresh-token";
pub const VERIFIER_COOKIE: &str = "sb-code-verifier";

/// Used when the provider omits `expires_in`
const DEFAULT_ACCESS_MAX_AGE: i64 = 60 * 60;
const REFRESH_MAX_AGE: i64 = 60 * 60 * 24 * 30;
/// Recovery links are good for about an hour
pub const VERIFIER_MAX_AGE: i64 = 60 * 60;

/// Identity resolved for the current request
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub user: Option<AuthUser>,
    /// Valid access token for provider calls made on the caller's behalf
    pub access_token: Option<String>,
}

/// Anonymous when the resolver did not run
impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Value of cookie `name` from any `Cookie` header
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn set_cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", 0, secure)
}

pub fn session_cookies(session: &AuthSession, secure: bool) -> Vec<String> {
    let access_max_age = session
        .expires_in
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_ACCESS_MAX_AGE);
    vec![
        set_cookie(ACCESS_COOKIE, &session.access_token, access_max_age, secure),
        set_cookie(REFRESH_COOKIE, &session.refresh_token, REFRESH_MAX_AGE, secure),
    ]
}

pub fn clear_session_cookies(secure: bool) -> Vec<String> {
    vec![
        clear_cookie(ACCESS_COOKIE, secure),
        clear_cookie(REFRESH_COOKIE, secure),
    ]
}

pub fn append_cookies(headers: &mut HeaderMap, cookies: &[String]) {
    for cookie in cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Dropping unencodable cookie: {e}"),
        }
    }
}

/// True when the handler already wrote the session cookies itself
fn sets_session_cookie(headers: &HeaderMap) -> bool {
    let prefix = format!("{ACCESS_COOKIE}=");
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}

async fn identify(state: &AppState, access_token: &str) -> Option<AuthUser> {
    match &state.jwt_secret {
        Some(secret) => verify_access_token(access_token, secret),
        None => state.identity.get_user(access_token).await.ok(),
    }
}

/// Middleware: resolve the caller and propagate rotated cookies
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let access = read_cookie(request.headers(), ACCESS_COOKIE);
    let refresh = read_cookie(request.headers(), REFRESH_COOKIE);

    let mut session = CurrentSession::default();
    let mut outgoing: Vec<String> = Vec::new();

    if let Some(token) = access.as_deref()
        && let Some(user) = identify(&state, token).await
    {
        session = CurrentSession {
            user: Some(user),
            access_token: Some(token.to_string()),
        };
    } else if let Some(refresh_token) = refresh.as_deref() {
        match state.identity.refresh_session(refresh_token).await {
            Ok(rotated) => {
                tracing::debug!(user_id = %rotated.user.id, "Session refreshed");
                outgoing = session_cookies(&rotated, state.cookie_secure);
                session = CurrentSession {
                    user: Some(rotated.user),
                    access_token: Some(rotated.access_token),
                };
            }
            Err(e) => {
                tracing::debug!("Session refresh failed: {e}");
                outgoing = clear_session_cookies(state.cookie_secure);
            }
        }
    } else if access.is_some() {
        // Dead access token with nothing to refresh it
        outgoing = clear_session_cookies(state.cookie_secure);
    }

    request.extensions_mut().insert(session);
    let mut response = next.run(request).await;

    if !outgoing.is_empty() && !sets_session_cookie(response.headers()) {
        append_cookies(response.headers_mut(), &outgoing);
    }
    response
}
