//! Cross-Reference Resolver
//!
//! Recovers the content record behind an order for display. linkInsertion
//! orders historically store the content id in `linkInsertionId`;
//! [`Order::content_ref`] normalizes that into a [`ContentRef`] and both
//! variants resolve through the same post lookup. Resolution is read-side
//! only (the persisted row is never rewritten) and runs independently
//! per row on list reads, since every order points at its own record.

use crate::db::repository::{order as order_repo, post};
use shared::error::AppResult;
use shared::models::{Order, OrderDetail, OrderView, Post};
use sqlx::SqlitePool;

/// Look up the content record an order points at, if any.
/// A dangling or unparseable reference degrades to None.
pub async fn resolve_post(pool: &SqlitePool, order: &Order) -> AppResult<Option<Post>> {
    match order.content_ref() {
        Some(content) => Ok(post::find_by_id(pool, content.post_id()).await?),
        None => Ok(None),
    }
}

/// Attach resolved content to every row of a list page
pub async fn resolve_views(pool: &SqlitePool, views: &mut [OrderView]) -> AppResult<()> {
    for view in views.iter_mut() {
        view.post = resolve_post(pool, &view.order).await?;
    }
    Ok(())
}

/// Assemble the full detail for one order: timeline plus resolved content
pub async fn load_detail(pool: &SqlitePool, order: Order) -> AppResult<OrderDetail> {
    let timeline = order_repo::timeline(pool, order.id).await?;
    let post = resolve_post(pool, &order).await?;
    Ok(OrderDetail {
        order,
        timeline,
        post,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::website;
    use shared::models::{PostCreate, WebsiteCreate};
    use shared::order::OrderType;

    async fn seed(db: &DbService) -> (i64, i64) {
        let site = website::create(
            &db.pool,
            WebsiteCreate {
                publisher_id: 20,
                domain: "example.com".into(),
                guest_post_price: 50.0,
                link_insertion_price: 25.0,
                writing_price: 80.0,
            },
        )
        .await
        .unwrap();
        let content = post::create(
            &db.pool,
            PostCreate {
                advertiser_id: 10,
                title: "Anchor placement".into(),
                body: None,
                anchor_text: Some("best widgets".into()),
                anchor_url: Some("https://widgets.example/best".into()),
            },
        )
        .await
        .unwrap();
        (site.id, content.id)
    }

    async fn link_insertion_order(
        db: &DbService,
        website_id: i64,
        link_insertion_id: Option<String>,
    ) -> Order {
        order_repo::create(
            &db.pool,
            order_repo::NewOrder {
                advertiser_id: 10,
                publisher_id: 20,
                website_id,
                order_type: OrderType::LinkInsertion,
                post_id: None,
                link_insertion_id,
                price: 25.0,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolves_legacy_shapes() {
        let db = DbService::in_memory().await.unwrap();
        let (site, content_id) = seed(&db).await;

        // Raw id, numeric string (JSON), and populated object all resolve
        let shapes = [
            content_id.to_string(),
            format!("\"{content_id}\""),
            format!(r#"{{"_id": {content_id}, "title": "Anchor placement"}}"#),
        ];
        for shape in shapes {
            let order = link_insertion_order(&db, site, Some(shape.clone())).await;
            let detail = load_detail(&db.pool, order).await.unwrap();
            let post = detail.post.unwrap_or_else(|| panic!("unresolved for {shape}"));
            assert_eq!(post.id, content_id);
            assert_eq!(post.title, "Anchor placement");
        }
    }

    #[tokio::test]
    async fn test_dangling_reference_degrades_gracefully() {
        let db = DbService::in_memory().await.unwrap();
        let (site, _) = seed(&db).await;

        // Valid shape, but no such post
        let order = link_insertion_order(&db, site, Some("424242".into())).await;
        let detail = load_detail(&db.pool, order).await.unwrap();
        assert!(detail.post.is_none());

        // Unparseable shape
        let order = link_insertion_order(&db, site, Some("not-an-id".into())).await;
        let detail = load_detail(&db.pool, order).await.unwrap();
        assert!(detail.post.is_none());
    }

    #[tokio::test]
    async fn test_list_rows_resolve_independently() {
        let db = DbService::in_memory().await.unwrap();
        let (site, content_id) = seed(&db).await;
        let second = post::create(
            &db.pool,
            PostCreate {
                advertiser_id: 10,
                title: "Second placement".into(),
                body: None,
                anchor_text: None,
                anchor_url: None,
            },
        )
        .await
        .unwrap();

        link_insertion_order(&db, site, Some(content_id.to_string())).await;
        link_insertion_order(&db, site, Some(second.id.to_string())).await;
        link_insertion_order(&db, site, None).await;

        let (mut views, total) = order_repo::list(
            &db.pool,
            order_repo::OrderScope::Publisher(20),
            &order_repo::OrderListFilter {
                page: 1,
                limit: 10,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(total, 3);

        resolve_views(&db.pool, &mut views).await.unwrap();

        let resolved: Vec<_> = views
            .iter()
            .filter_map(|v| v.post.as_ref().map(|p| p.id))
            .collect();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains(&content_id));
        assert!(resolved.contains(&second.id));
        // The order with no reference stays unresolved, not an error
        assert_eq!(views.iter().filter(|v| v.post.is_none()).count(), 1);
    }
}
