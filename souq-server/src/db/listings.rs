use shared::models::{Listing, ListingCreate, StatusChange};
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreResult;

const COLUMNS: &str = "l.id, l.supplier_id, l.title_en, l.title_ar, \
    l.description_en, l.description_ar, l.daily_rate, l.weekly_rate, l.currency, l.status, \
    l.slug, l.published_at, l.city_id, l.min_days, l.delivery_available, \
    l.operator_available, l.deposit_amount, l.created_at, l.updated_at";

pub async fn insert(pool: &PgPool, supplier_id: Uuid, data: &ListingCreate) -> StoreResult<Listing> {
    let row = sqlx::query_as::<_, Listing>(&format!(
        r#"
        INSERT INTO listings AS l (
            supplier_id, title_en, title_ar, description_en, description_ar,
            daily_rate, weekly_rate, currency, status, city_id, min_days,
            delivery_available, operator_available, deposit_amount
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'draft', $9, $10, $11, $12, $13)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(supplier_id)
    .bind(&data.title_en)
    .bind(&data.title_ar)
    .bind(&data.description_en)
    .bind(&data.description_ar)
    .bind(data.daily_rate)
    .bind(data.weekly_rate)
    .bind(&data.currency)
    .bind(data.city_id)
    .bind(data.min_days)
    .bind(data.delivery_available)
    .bind(data.operator_available)
    .bind(data.deposit_amount)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Fetch a listing only if its supplier belongs to `owner_id`
pub async fn find_owned(
    pool: &PgPool,
    listing_id: Uuid,
    owner_id: Uuid,
) -> StoreResult<Option<Listing>> {
    let row = sqlx::query_as::<_, Listing>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM listings l
        JOIN suppliers s ON s.id = l.supplier_id
        WHERE l.id = $1 AND s.owner_id = $2
        "#
    ))
    .bind(listing_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> StoreResult<Vec<Listing>> {
    let rows = sqlx::query_as::<_, Listing>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM listings l
        JOIN suppliers s ON s.id = l.supplier_id
        WHERE s.owner_id = $1
        ORDER BY l.created_at DESC
        "#
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Single-statement status write
///
/// `COALESCE` keeps an existing slug: the slug is only ever filled, never
/// replaced or cleared.
pub async fn apply_status(
    pool: &PgPool,
    listing_id: Uuid,
    change: &StatusChange,
) -> StoreResult<Option<Listing>> {
    let row = sqlx::query_as::<_, Listing>(&format!(
        r#"
        UPDATE listings AS l SET
            status = $2,
            slug = COALESCE(l.slug, $3),
            published_at = $4,
            updated_at = now()
        WHERE l.id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(listing_id)
    .bind(change.status.as_str())
    .bind(&change.slug)
    .bind(change.published_at)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
