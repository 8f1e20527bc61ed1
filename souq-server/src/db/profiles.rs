use shared::models::Role;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreResult;

pub async fn find_role(pool: &PgPool, user_id: Uuid) -> StoreResult<Option<Role>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT role FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(role,)| Role::from_db(&role)))
}

pub async fn upsert_role(pool: &PgPool, user_id: Uuid, role: Role) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, role)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE SET role = EXCLUDED.role, updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;
    Ok(())
}
