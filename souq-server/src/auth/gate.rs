//! Route gates: signed-in and supplier-portal checks
//!
//! Gates never fail with an error page. A caller who does not pass is sent
//! somewhere useful (sign-in, onboarding, home) with a return path.

use shared::Locale;
use shared::models::{Role, Supplier};

use super::provider::AuthUser;
use super::session::CurrentSession;
use crate::db::MarketStore;
use crate::error::{FormRedirect, ServiceResult};
use crate::util::redirect_url;

/// Caller admitted to the supplier portal
#[derive(Debug, Clone)]
pub struct PortalAccess {
    pub user: AuthUser,
    pub role: Role,
    /// Admins may be admitted without a supplier row
    pub supplier: Option<Supplier>,
}

pub fn sign_in_path(locale: Locale, next: &str) -> String {
    redirect_url(&format!("/{locale}/sign-in"), &[("next", next)], None)
}

pub fn onboarding_path(locale: Locale, next: &str) -> String {
    redirect_url(&format!("/{locale}/supplier/start"), &[("next", next)], None)
}

/// Redirect home with the failure reason
pub fn store_failure(locale: Locale, err: crate::error::ServiceError) -> FormRedirect {
    let err: shared::error::AppError = err.into();
    FormRedirect::to(redirect_url(&format!("/{locale}"), &[("err", &err.reason())], None))
}

pub fn require_user(
    session: &CurrentSession,
    locale: Locale,
    next: &str,
) -> Result<AuthUser, FormRedirect> {
    session
        .user
        .clone()
        .ok_or_else(|| FormRedirect::to(sign_in_path(locale, next)))
}

/// Profile role, `buyer` when the account has no profile row
pub async fn resolve_role(store: &dyn MarketStore, user: &AuthUser) -> ServiceResult<Role> {
    Ok(store.role_of(user.id).await?.unwrap_or_default())
}

/// Admins always pass; suppliers pass once onboarded; everyone else goes to
/// onboarding with `next` preserved
pub async fn require_supplier_portal(
    store: &dyn MarketStore,
    session: &CurrentSession,
    locale: Locale,
    next: &str,
) -> Result<PortalAccess, FormRedirect> {
    let user = require_user(session, locale, next)?;
    let role = resolve_role(store, &user)
        .await
        .map_err(|e| store_failure(locale, e))?;
    let supplier = store
        .supplier_by_owner(user.id)
        .await
        .map_err(|e| store_failure(locale, e.into()))?;

    let admitted = match role {
        Role::Admin => true,
        Role::Supplier => supplier.as_ref().is_some_and(Supplier::is_onboarded),
        Role::Buyer => false,
    };
    if !admitted {
        return Err(FormRedirect::to(onboarding_path(locale, next)));
    }

    Ok(PortalAccess {
        user,
        role,
        supplier,
    })
}
