//! Public catalog reads
//!
//! Every query here carries the visibility predicate itself; nothing relies on
//! row-level security in the database.

use shared::models::PublicListing;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreResult;

const SELECT_PUBLIC: &str = r#"
    SELECT l.id, l.slug, l.title_en, l.title_ar, l.description_en, l.description_ar,
           l.daily_rate, l.weekly_rate, l.currency, l.published_at, l.min_days,
           l.delivery_available, l.operator_available, l.deposit_amount,
           s.display_name AS supplier_display_name, s.city AS supplier_city
    FROM listings l
    JOIN suppliers s ON s.id = l.supplier_id
    WHERE l.status = 'published' AND l.published_at IS NOT NULL
"#;

pub async fn list_published(pool: &PgPool, limit: i64) -> StoreResult<Vec<PublicListing>> {
    let rows = sqlx::query_as::<_, PublicListing>(&format!(
        "{SELECT_PUBLIC} ORDER BY l.published_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> StoreResult<Option<PublicListing>> {
    let row = sqlx::query_as::<_, PublicListing>(&format!("{SELECT_PUBLIC} AND l.slug = $1"))
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Option<PublicListing>> {
    let row = sqlx::query_as::<_, PublicListing>(&format!("{SELECT_PUBLIC} AND l.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
