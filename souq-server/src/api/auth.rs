//! Sign-in, registration, password recovery and session bridging
//!
//! These are thin wrappers over the identity provider. Their job is to move
//! provider sessions into cookies and to redirect with a readable reason.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use shared::Locale;
use shared::error::ErrorCode;

use crate::auth::gate::require_user;
use crate::auth::pkce;
use crate::auth::provider::AuthSession;
use crate::auth::session::{
    CurrentSession, VERIFIER_COOKIE, VERIFIER_MAX_AGE, append_cookies, clear_cookie,
    clear_session_cookies, read_cookie, session_cookies, set_cookie,
};
use crate::error::{ActionResult, FormRedirect};
use crate::state::AppState;
use crate::util::{FormData, get_str, portal_home, redirect_url, safe_next};

/// Minimum password length accepted by the registration and update forms
const MIN_PASSWORD_LEN: usize = 8;

/// Redirect carrying `Set-Cookie` headers
fn redirect_with_cookies(location: &str, cookies: &[String]) -> Response {
    let mut resp = FormRedirect::to(location).into_response();
    append_cookies(resp.headers_mut(), cookies);
    resp
}

fn form_path(locale: Locale, form: &str) -> String {
    format!("/{locale}/{form}")
}

/// POST /{locale}/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    axum::Form(form): axum::Form<FormData>,
) -> Response {
    let locale = Locale::safe(&locale);
    let next = safe_next(locale, form.get("next").map(String::as_str));
    let email = get_str(&form, "email").unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();

    match state.identity.sign_in_with_password(&email, &password).await {
        Ok(session) => {
            tracing::info!(user_id = %session.user.id, "Signed in");
            redirect_with_cookies(&next, &session_cookies(&session, state.cookie_secure))
        }
        Err(e) => {
            tracing::debug!("Sign-in rejected: {e}");
            let location = redirect_url(
                &form_path(locale, "sign-in"),
                &[("next", &next), ("error", &e.to_string())],
                None,
            );
            FormRedirect::to(location).into_response()
        }
    }
}

/// POST /{locale}/register
pub async fn register(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    axum::Form(form): axum::Form<FormData>,
) -> Response {
    let locale = Locale::safe(&locale);
    let next = match get_str(&form, "next") {
        Some(n) => safe_next(locale, Some(&n)),
        None => format!("/{locale}/listings"),
    };
    let back = |error: &str| {
        FormRedirect::to(redirect_url(
            &form_path(locale, "register"),
            &[("next", &next), ("error", error)],
            None,
        ))
        .into_response()
    };

    let Some(email) = get_str(&form, "email") else {
        return back(ErrorCode::EmailMissing.tag());
    };
    let password = form.get("password").cloned().unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return back(ErrorCode::PasswordTooShort.tag());
    }

    let confirm_target = redirect_url(
        &format!("{}/auth/exchange", state.site_url),
        &[("next", &next)],
        None,
    );
    match state.identity.sign_up(&email, &password, &confirm_target).await {
        Ok(Some(session)) => {
            tracing::info!(user_id = %session.user.id, "Registered and signed in");
            redirect_with_cookies(&next, &session_cookies(&session, state.cookie_secure))
        }
        Ok(None) => FormRedirect::to(redirect_url(
            &form_path(locale, "register"),
            &[("sent", "1"), ("next", &next)],
            None,
        ))
        .into_response(),
        Err(e) => back(&e.to_string()),
    }
}

/// POST /{locale}/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(locale): Path<String>,
) -> Response {
    let locale = Locale::safe(&locale);
    if let Some(token) = session.access_token.as_deref()
        && let Err(e) = state.identity.sign_out(token).await
    {
        tracing::warn!("Provider sign-out failed: {e}");
    }
    redirect_with_cookies(&format!("/{locale}"), &clear_session_cookies(state.cookie_secure))
}

/// POST /{locale}/reset-password
///
/// The PKCE verifier stays in a cookie until the recovery link comes back
/// through `/auth/exchange`.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    axum::Form(form): axum::Form<FormData>,
) -> Response {
    let locale = Locale::safe(&locale);
    let back = |params: &[(&str, &str)]| {
        FormRedirect::to(redirect_url(&form_path(locale, "reset-password"), params, None))
    };

    let Some(email) = get_str(&form, "email") else {
        return back(&[("error", ErrorCode::EmailMissing.tag())]).into_response();
    };

    let verifier = pkce::generate_verifier();
    let challenge = pkce::challenge_s256(&verifier);
    let redirect_to = redirect_url(
        &format!("{}/auth/exchange", state.site_url),
        &[("next", &form_path(locale, "update-password"))],
        None,
    );

    match state
        .identity
        .reset_password_for_email(&email, &redirect_to, &challenge)
        .await
    {
        Ok(()) => {
            let mut resp = back(&[("sent", "1")]).into_response();
            append_cookies(
                resp.headers_mut(),
                &[set_cookie(
                    VERIFIER_COOKIE,
                    &verifier,
                    VERIFIER_MAX_AGE,
                    state.cookie_secure,
                )],
            );
            resp
        }
        Err(e) => back(&[("error", &e.to_string())]).into_response(),
    }
}

/// POST /{locale}/update-password
pub async fn update_password(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(locale): Path<String>,
    axum::Form(form): axum::Form<FormData>,
) -> ActionResult {
    let locale = Locale::safe(&locale);
    let page = form_path(locale, "update-password");
    require_user(&session, locale, &page)?;
    let back = |error: &str| FormRedirect::to(redirect_url(&page, &[("error", error)], None));

    let password = form.get("password").cloned().unwrap_or_default();
    let confirm = form.get("confirm").cloned().unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(back(ErrorCode::PasswordTooShort.tag()));
    }
    if password != confirm {
        return Err(back(ErrorCode::PasswordMismatch.tag()));
    }

    let token = session.access_token.as_deref().unwrap_or_default();
    state
        .identity
        .update_password(token, &password)
        .await
        .map_err(|e| back(&e.to_string()))?;

    Ok(FormRedirect::to(portal_home(locale)))
}

#[derive(Debug, Deserialize)]
pub struct ExchangeQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

/// Locale named by the first segment of a return path
fn locale_of(path: Option<&str>) -> Locale {
    let segment = path
        .unwrap_or_default()
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();
    Locale::safe(segment)
}

/// GET /auth/exchange?code&next
pub async fn exchange(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ExchangeQuery>,
) -> Response {
    let locale = locale_of(query.next.as_deref());
    let next = safe_next(locale, query.next.as_deref());

    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return FormRedirect::to(next).into_response();
    };
    let verifier = read_cookie(&headers, VERIFIER_COOKIE).unwrap_or_default();

    match state.identity.exchange_code_for_session(code, &verifier).await {
        Ok(session) => {
            tracing::info!(user_id = %session.user.id, "Authorization code exchanged");
            let mut cookies = session_cookies(&session, state.cookie_secure);
            cookies.push(clear_cookie(VERIFIER_COOKIE, state.cookie_secure));
            redirect_with_cookies(&next, &cookies)
        }
        Err(e) => {
            tracing::debug!("Code exchange failed: {e}");
            FormRedirect::to(redirect_url(&next, &[("error", &e.to_string())], None))
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetSessionRequest {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

fn bad_session(error: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "ok": false, "error": error })),
    )
        .into_response()
}

/// POST /auth/set-session
///
/// Bridge for the implicit flow: the browser posts the tokens it found in
/// the URL fragment, the server checks them and stores them as cookies.
pub async fn set_session(
    State(state): State<AppState>,
    body: Result<Json<SetSessionRequest>, JsonRejection>,
) -> Response {
    let tokens = body.ok().and_then(|Json(req)| {
        let access = req.access_token.filter(|t| !t.is_empty())?;
        let refresh = req.refresh_token.filter(|t| !t.is_empty())?;
        Some((access, refresh))
    });
    let Some((access_token, refresh_token)) = tokens else {
        return bad_session("Missing tokens");
    };

    let user = match state.identity.get_user(&access_token).await {
        Ok(user) => user,
        Err(e) => return bad_session(&e.to_string()),
    };
    let session = AuthSession {
        access_token,
        refresh_token,
        expires_in: None,
        user,
    };

    let mut resp = Json(serde_json::json!({ "ok": true })).into_response();
    append_cookies(
        resp.headers_mut(),
        &session_cookies(&session, state.cookie_secure),
    );
    resp
}
