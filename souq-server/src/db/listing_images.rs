//! Listing image queries
//!
//! The one-primary rule is held by the `listing_images_one_primary` constraint.
//! Writes here are shaped so the constraint never fires in normal use; when two
//! requests race anyway the loser gets [`super::StoreError::Conflict`].

use shared::models::{ListingImage, ListingImageCreate};
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreResult;

const COLUMNS: &str = "id, listing_id, url, alt_en, alt_ar, sort_order, is_primary, created_at";

pub async fn list_for_listing(pool: &PgPool, listing_id: Uuid) -> StoreResult<Vec<ListingImage>> {
    let rows = sqlx::query_as::<_, ListingImage>(&format!(
        r#"
        SELECT {COLUMNS} FROM listing_images
        WHERE listing_id = $1
        ORDER BY is_primary DESC, sort_order ASC, created_at ASC
        "#
    ))
    .bind(listing_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_for_listing(pool: &PgPool, listing_id: Uuid) -> StoreResult<u64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM listing_images WHERE listing_id = $1")
        .bind(listing_id)
        .fetch_one(pool)
        .await?;
    Ok(count.max(0) as u64)
}

/// Insert an image, demoting the current primary first when the new one takes over
pub async fn insert(
    pool: &PgPool,
    listing_id: Uuid,
    data: &ListingImageCreate,
) -> StoreResult<ListingImage> {
    let mut tx = pool.begin().await?;

    // Serialize image writes per listing
    sqlx::query("SELECT id FROM listings WHERE id = $1 FOR UPDATE")
        .bind(listing_id)
        .execute(&mut *tx)
        .await?;

    let (has_primary,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM listing_images WHERE listing_id = $1 AND is_primary)",
    )
    .bind(listing_id)
    .fetch_one(&mut *tx)
    .await?;

    let promote = data.is_primary || !has_primary;

    if promote && has_primary {
        sqlx::query(
            "UPDATE listing_images SET is_primary = FALSE WHERE listing_id = $1 AND is_primary",
        )
        .bind(listing_id)
        .execute(&mut *tx)
        .await?;
    }

    let row = sqlx::query_as::<_, ListingImage>(&format!(
        r#"
        INSERT INTO listing_images (listing_id, url, alt_en, alt_ar, sort_order, is_primary)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(listing_id)
    .bind(&data.url)
    .bind(&data.alt_en)
    .bind(&data.alt_ar)
    .bind(data.sort_order)
    .bind(promote)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Move the primary flag to `image_id` in one statement
///
/// The `EXISTS` guard makes a foreign image id match zero rows, so the
/// listing keeps its current primary instead of losing it.
pub async fn set_primary(pool: &PgPool, listing_id: Uuid, image_id: Uuid) -> StoreResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE listing_images
        SET is_primary = (id = $2)
        WHERE listing_id = $1
          AND EXISTS (
              SELECT 1 FROM listing_images WHERE id = $2 AND listing_id = $1
          )
        "#,
    )
    .bind(listing_id)
    .bind(image_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, listing_id: Uuid, image_id: Uuid) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM listing_images WHERE id = $1 AND listing_id = $2")
        .bind(image_id)
        .bind(listing_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
