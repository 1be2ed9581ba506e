//! Campaign code database operations

use crate::db::models::{CodeItem, NewCodeItem};
use crate::db::DbPool;
use crate::error::Result;

/// Fetch a page of code items for a job, ordered by id ascending.
///
/// Both worker phases page with this query; they keep independent cursors
/// (`after_id` starts at 0 for the zipping re-scan).
pub async fn fetch_page(
    pool: &DbPool,
    job_id: i64,
    after_id: i64,
    limit: i64,
) -> Result<Vec<CodeItem>> {
    let items = sqlx::query_as::<_, CodeItem>(
        r#"
        SELECT * FROM campaign_codes
        WHERE job_id = $1
          AND id > $2
        ORDER BY id ASC
        LIMIT $3
        "#,
    )
    .bind(job_id)
    .bind(after_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Count items belonging to a job
pub async fn count_items(pool: &DbPool, job_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM campaign_codes WHERE job_id = $1",
    )
    .bind(job_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Bulk-insert code items (enqueue-side tooling and tests)
pub async fn insert_items(pool: &DbPool, items: &[NewCodeItem]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for item in items {
        sqlx::query(
            r#"
            INSERT INTO campaign_codes (job_id, token, campaign_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(item.job_id)
        .bind(&item.token)
        .bind(&item.campaign_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
