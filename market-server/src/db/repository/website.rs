//! Website Repository (catalog lookup)
//!
//! The engine only resolves listings here; catalog management lives in a
//! different service.

use super::RepoResult;
use shared::models::{Website, WebsiteCreate};
use sqlx::SqlitePool;

const WEBSITE_SELECT: &str = "SELECT id, publisher_id, domain, guest_post_price, link_insertion_price, writing_price, is_active, created_at, updated_at FROM website";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Website>> {
    let sql = format!("{} WHERE id = ?", WEBSITE_SELECT);
    let row = sqlx::query_as::<_, Website>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: WebsiteCreate) -> RepoResult<Website> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO website (id, publisher_id, domain, guest_post_price, link_insertion_price, writing_price, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
    )
    .bind(id)
    .bind(data.publisher_id)
    .bind(&data.domain)
    .bind(data.guest_post_price)
    .bind(data.link_insertion_price)
    .bind(data.writing_price)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to create website".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_create_and_find() {
        let db = DbService::in_memory().await.unwrap();
        let site = create(
            &db.pool,
            WebsiteCreate {
                publisher_id: 7,
                domain: "example.com".into(),
                guest_post_price: 50.0,
                link_insertion_price: 25.0,
                writing_price: 80.0,
            },
        )
        .await
        .unwrap();

        let found = find_by_id(&db.pool, site.id).await.unwrap().unwrap();
        assert_eq!(found.publisher_id, 7);
        assert_eq!(found.domain, "example.com");
        assert!(found.is_active);

        assert!(find_by_id(&db.pool, 123456).await.unwrap().is_none());
    }
}
