use shared::models::{Supplier, SupplierUpsert};
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreResult;

const COLUMNS: &str = "id, owner_id, display_name, city, created_at, updated_at";

pub async fn find_by_owner(pool: &PgPool, owner_id: Uuid) -> StoreResult<Option<Supplier>> {
    let row = sqlx::query_as::<_, Supplier>(&format!(
        "SELECT {COLUMNS} FROM suppliers WHERE owner_id = $1"
    ))
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Create-or-update keyed on `owner_id`
///
/// With `keep_city`, a `None` city leaves the stored city untouched so
/// onboarding (name only) does not wipe a city entered earlier. Profile
/// saves write the city as given.
pub async fn upsert_by_owner(
    pool: &PgPool,
    owner_id: Uuid,
    data: &SupplierUpsert,
) -> StoreResult<Supplier> {
    let row = sqlx::query_as::<_, Supplier>(&format!(
        r#"
        INSERT INTO suppliers (owner_id, display_name, city)
        VALUES ($1, $2, $3)
        ON CONFLICT (owner_id) DO UPDATE SET
            display_name = EXCLUDED.display_name,
            city = CASE WHEN $4 THEN COALESCE(EXCLUDED.city, suppliers.city)
                        ELSE EXCLUDED.city END,
            updated_at = now()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(&data.display_name)
    .bind(&data.city)
    .bind(data.keep_city)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
