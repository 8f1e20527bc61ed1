//! Supplier onboarding and profile maintenance

use shared::error::{AppError, ErrorCode};
use shared::models::{Role, Supplier, SupplierUpsert};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::MarketStore;
use crate::error::ServiceResult;
use crate::revalidate::RevalidationHub;

/// Public rows carry the supplier's name and city, so a profile write makes
/// their live listings stale
async fn revalidate_public(
    store: &dyn MarketStore,
    revalidator: &RevalidationHub,
    owner_id: Uuid,
) -> ServiceResult<()> {
    let listings = store.listings_by_owner(owner_id).await?;
    let slugs: Vec<&str> = listings
        .iter()
        .filter(|l| l.is_public())
        .filter_map(|l| l.slug.as_deref())
        .collect();
    if !slugs.is_empty() {
        revalidator.revalidate_supplier(slugs);
    }
    Ok(())
}

pub async fn fetch(store: &dyn MarketStore, owner_id: Uuid) -> ServiceResult<Option<Supplier>> {
    Ok(store.supplier_by_owner(owner_id).await?)
}

/// Onboard the caller as a supplier
///
/// Promotes the profile to `supplier` (admins keep their role) and
/// creates or refreshes the supplier row.
pub async fn become_supplier(
    store: &dyn MarketStore,
    revalidator: &RevalidationHub,
    user: &AuthUser,
    display_name: Option<String>,
    city: Option<String>,
) -> ServiceResult<Supplier> {
    let display_name = display_name.ok_or_else(|| AppError::new(ErrorCode::DisplayNameMissing))?;

    let role = store.role_of(user.id).await?.unwrap_or_default();
    if role != Role::Admin {
        store.set_role(user.id, Role::Supplier).await?;
    }

    let supplier = store
        .upsert_supplier(
            user.id,
            &SupplierUpsert {
                display_name,
                city,
                keep_city: true,
            },
        )
        .await?;
    tracing::info!(user_id = %user.id, supplier_id = %supplier.id, "Supplier onboarded");
    revalidate_public(store, revalidator, user.id).await?;
    Ok(supplier)
}

/// Update an existing supplier profile
///
/// Non-admins must already have a supplier row. A blank city clears it.
pub async fn update_profile(
    store: &dyn MarketStore,
    revalidator: &RevalidationHub,
    user: &AuthUser,
    role: Role,
    display_name: Option<String>,
    city: Option<String>,
) -> ServiceResult<Supplier> {
    let display_name = display_name.ok_or_else(|| AppError::new(ErrorCode::DisplayNameMissing))?;

    if role != Role::Admin && store.supplier_by_owner(user.id).await?.is_none() {
        return Err(AppError::new(ErrorCode::SupplierNotOnboarded).into());
    }

    let supplier = store
        .upsert_supplier(
            user.id,
            &SupplierUpsert {
                display_name,
                city,
                keep_city: false,
            },
        )
        .await?;
    revalidate_public(store, revalidator, user.id).await?;
    Ok(supplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::error::ServiceError;

    fn hub() -> RevalidationHub {
        RevalidationHub::new()
    }

    fn user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: None,
        }
    }

    fn code_of(err: ServiceError) -> ErrorCode {
        match err {
            ServiceError::App(e) => e.code,
            ServiceError::Db(e) => panic!("unexpected db error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_become_supplier_promotes_buyer() {
        let store = MemoryStore::new();
        let u = user();
        let supplier = become_supplier(&store, &hub(), &u, Some("Acme".into()), Some("Riyadh".into()))
            .await
            .unwrap();
        assert!(supplier.is_complete_for_listing());
        assert_eq!(store.role_of(u.id).await.unwrap(), Some(Role::Supplier));
    }

    #[tokio::test]
    async fn test_become_supplier_keeps_admin() {
        let store = MemoryStore::new();
        let u = user();
        store.set_role(u.id, Role::Admin).await.unwrap();
        become_supplier(&store, &hub(), &u, Some("Ops".into()), None)
            .await
            .unwrap();
        assert_eq!(store.role_of(u.id).await.unwrap(), Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_missing_name_is_rejected_before_any_write() {
        let store = MemoryStore::new();
        let u = user();
        let err = become_supplier(&store, &hub(), &u, None, Some("Riyadh".into()))
            .await
            .unwrap_err();
        assert_eq!(code_of(err), ErrorCode::DisplayNameMissing);
        assert_eq!(store.role_of(u.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_profile_requires_supplier_row() {
        let store = MemoryStore::new();
        let u = user();
        let err = update_profile(&store, &hub(), &u, Role::Supplier, Some("Acme".into()), None)
            .await
            .unwrap_err();
        assert_eq!(code_of(err), ErrorCode::SupplierNotOnboarded);

        // Admins may create their row from the profile page
        let s = update_profile(&store, &hub(), &u, Role::Admin, Some("Acme".into()), None)
            .await
            .unwrap();
        assert_eq!(s.display_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_blank_city_clears_on_profile_save() {
        let store = MemoryStore::new();
        let u = user();
        become_supplier(&store, &hub(), &u, Some("Acme".into()), Some("Riyadh".into()))
            .await
            .unwrap();

        // Onboarding again without a city keeps it
        let s = become_supplier(&store, &hub(), &u, Some("Acme".into()), None)
            .await
            .unwrap();
        assert_eq!(s.city.as_deref(), Some("Riyadh"));

        let s = update_profile(&store, &hub(), &u, Role::Supplier, Some("Acme".into()), None)
            .await
            .unwrap();
        assert_eq!(s.city, None);
        assert!(!s.is_complete_for_listing());
    }
}
