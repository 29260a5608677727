//! Post Repository (content store)
//!
//! The engine reads posts when resolving order references and patches the
//! status field when the owning order moves; authoring happens elsewhere.

use super::RepoResult;
use shared::models::{Post, PostCreate, PostStatus};
use sqlx::SqlitePool;

const POST_SELECT: &str = "SELECT id, advertiser_id, title, body, anchor_text, anchor_url, completed_url, status, created_at, updated_at FROM post";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Post>> {
    let sql = format!("{} WHERE id = ?", POST_SELECT);
    let row = sqlx::query_as::<_, Post>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Patch the content record's status. Returns false when the post is gone;
/// the caller decides whether that matters.
pub async fn update_status(pool: &SqlitePool, id: i64, status: PostStatus) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query("UPDATE post SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn create(pool: &SqlitePool, data: PostCreate) -> RepoResult<Post> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO post (id, advertiser_id, title, body, anchor_text, anchor_url, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(data.advertiser_id)
    .bind(&data.title)
    .bind(&data.body)
    .bind(&data.anchor_text)
    .bind(&data.anchor_url)
    .bind(PostStatus::Pending)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to create post".into()))
}
