use shared::models::City;
use sqlx::PgPool;

use super::StoreResult;

/// All reference cities, ordered by slug
pub async fn list(pool: &PgPool) -> StoreResult<Vec<City>> {
    let rows = sqlx::query_as::<_, City>(
        "SELECT id, name_en, name_ar, slug FROM cities ORDER BY slug",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
