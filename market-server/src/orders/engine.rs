//! Status Transition Engine
//!
//! Applies role-gated status changes: resolve the caller to an actor,
//! validate against the policy table, then write the new status and the
//! timeline entry in one transaction. The read-modify-append runs inside
//! that transaction, so two concurrent callers serialize instead of
//! overwriting each other with stale state.

use crate::auth::CurrentUser;
use crate::db::repository::order::{self as order_repo, ORDER_SELECT};
use crate::orders::resolver;
use crate::orders::sync_worker::{ContentPatch, ContentSyncHandle};
use shared::error::{AppError, AppResult};
use shared::models::{Order, OrderDetail, PostStatus, Role};
use shared::order::{OrderStatus, TransitionError, validate_transition};
use sqlx::SqlitePool;

/// A requested status change
#[derive(Debug, Clone)]
pub struct TransitionCommand {
    pub status: OrderStatus,
    pub note: Option<String>,
    /// Stored on the order only when the target status is `rejected`
    pub rejection_reason: Option<String>,
}

/// Match the caller to one of the order's actors
///
/// Admins act on any order; everyone else must be the order's own
/// advertiser or publisher, in the role their token claims.
pub fn resolve_actor(caller: &CurrentUser, order: &Order) -> AppResult<Role> {
    match caller.role {
        Role::Admin => Ok(Role::Admin),
        Role::Advertiser if caller.id == order.advertiser_id => Ok(Role::Advertiser),
        Role::Publisher if caller.id == order.publisher_id => Ok(Role::Publisher),
        _ => Err(AppError::permission_denied(
            "Caller is not a counterparty of this order",
        )
        .with_detail("orderId", order.id)),
    }
}

fn map_transition_error(err: TransitionError, actor: Role) -> AppError {
    match err {
        TransitionError::NotAllowed { from, to } => {
            AppError::invalid_transition(from.as_str(), to.as_str())
                .with_detail("actor", actor.as_str())
        }
        TransitionError::InvalidTarget { to } => AppError::invalid_request(format!(
            "Advertisers may only complete or reject an order, got {}",
            to
        ))
        .with_detail("actor", actor.as_str()),
    }
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::database(e.to_string())
}

/// Validate and apply a status change, returning the refreshed detail
pub async fn update_status(
    pool: &SqlitePool,
    content_sync: &ContentSyncHandle,
    caller: &CurrentUser,
    order_id: i64,
    cmd: TransitionCommand,
) -> AppResult<OrderDetail> {
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await.map_err(db_err)?;

    let sql = format!("{} WHERE id = ?", ORDER_SELECT);
    let order: Option<Order> = sqlx::query_as(&sql)
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
    let order = order.ok_or_else(|| AppError::order_not_found(order_id))?;

    let actor = resolve_actor(caller, &order)?;
    validate_transition(actor, order.status, cmd.status)
        .map_err(|e| map_transition_error(e, actor))?;

    let rejection_reason = if cmd.status == OrderStatus::Rejected {
        cmd.rejection_reason
    } else {
        None
    };
    // completed_at is written at most once: COALESCE keeps the first value
    let completed_at = (cmd.status == OrderStatus::Completed).then_some(now);

    sqlx::query(
        "UPDATE orders SET status = ?1, updated_at = ?2, rejection_reason = COALESCE(?3, rejection_reason), completed_at = COALESCE(completed_at, ?4) WHERE id = ?5",
    )
    .bind(cmd.status)
    .bind(now)
    .bind(&rejection_reason)
    .bind(completed_at)
    .bind(order_id)
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;

    let next_seq: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(seq), 0) + 1 FROM order_event WHERE order_id = ?")
            .bind(order_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

    sqlx::query(
        "INSERT INTO order_event (order_id, seq, status, note, updated_by, updated_by_role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(order_id)
    .bind(next_seq)
    .bind(cmd.status)
    .bind(&cmd.note)
    .bind(caller.id)
    .bind(caller.role)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;

    tx.commit().await.map_err(db_err)?;

    tracing::info!(
        order_id,
        actor = %actor,
        from = %order.status,
        to = %cmd.status,
        "Order status updated"
    );

    let updated = order_repo::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::order_not_found(order_id))?;

    // Best-effort content sync, queued after the order commit
    if let Some(post_status) = PostStatus::from_order_status(cmd.status)
        && let Some(content) = updated.content_ref()
    {
        content_sync.enqueue(ContentPatch {
            post_id: content.post_id(),
            status: post_status,
        });
    }

    resolver::load_detail(pool, updated).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{post, website};
    use crate::orders::sync_worker;
    use shared::error::ErrorCode;
    use shared::models::{PostCreate, WebsiteCreate};
    use shared::order::OrderType;

    struct Fixture {
        db: DbService,
        sync: ContentSyncHandle,
        worker: Option<sync_worker::ContentSyncWorker>,
        advertiser: CurrentUser,
        publisher: CurrentUser,
        admin: CurrentUser,
        post_id: i64,
        order_id: i64,
    }

    fn user(id: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            username: format!("user-{id}"),
            role,
        }
    }

    async fn fixture() -> Fixture {
        let db = DbService::in_memory().await.unwrap();
        let (sync, worker) = sync_worker::channel(db.pool.clone());

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
                title: "Guest post draft".into(),
                body: None,
                anchor_text: None,
                anchor_url: None,
            },
        )
        .await
        .unwrap();

        let order = order_repo::create(
            &db.pool,
            order_repo::NewOrder {
                advertiser_id: 10,
                publisher_id: 20,
                website_id: site.id,
                order_type: OrderType::GuestPost,
                post_id: Some(content.id),
                link_insertion_id: None,
                price: 50.0,
            },
        )
        .await
        .unwrap();

        Fixture {
            db,
            sync,
            worker: Some(worker),
            advertiser: user(10, Role::Advertiser),
            publisher: user(20, Role::Publisher),
            admin: user(1, Role::Admin),
            post_id: content.id,
            order_id: order.id,
        }
    }

    fn cmd(status: OrderStatus) -> TransitionCommand {
        TransitionCommand {
            status,
            note: None,
            rejection_reason: None,
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle_walk() {
        let mut f = fixture().await;

        let detail = update_status(
            &f.db.pool,
            &f.sync,
            &f.publisher,
            f.order_id,
            cmd(OrderStatus::InProgress),
        )
        .await
        .unwrap();
        assert_eq!(detail.order.status, OrderStatus::InProgress);
        assert_eq!(detail.timeline.len(), 2);

        let detail = update_status(
            &f.db.pool,
            &f.sync,
            &f.publisher,
            f.order_id,
            cmd(OrderStatus::AdvertiserApproval),
        )
        .await
        .unwrap();
        assert_eq!(detail.timeline.len(), 3);

        let detail = update_status(
            &f.db.pool,
            &f.sync,
            &f.advertiser,
            f.order_id,
            cmd(OrderStatus::Completed),
        )
        .await
        .unwrap();
        assert_eq!(detail.order.status, OrderStatus::Completed);
        assert_eq!(detail.timeline.len(), 4);
        assert!(detail.order.completed_at.is_some());
        // Last timeline entry always mirrors the order's status
        assert_eq!(detail.timeline.last().unwrap().status, OrderStatus::Completed);
        assert_eq!(detail.timeline.last().unwrap().updated_by, 10);
        assert_eq!(
            detail.timeline.last().unwrap().updated_by_role,
            Role::Advertiser
        );

        // Content record ends up approved once the queue drains
        drop(f.sync);
        f.worker.take().unwrap().drain().await;
        let content = post::find_by_id(&f.db.pool, f.post_id).await.unwrap().unwrap();
        assert_eq!(content.status, shared::models::PostStatus::Approved);
    }

    #[tokio::test]
    async fn test_advertiser_cannot_skip_to_completed() {
        let f = fixture().await;
        let err = update_status(
            &f.db.pool,
            &f.sync,
            &f.advertiser,
            f.order_id,
            cmd(OrderStatus::Completed),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        // Order unchanged: still requested, timeline untouched
        let order = order_repo::find_by_id(&f.db.pool, f.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Requested);
        assert_eq!(order_repo::timeline(&f.db.pool, f.order_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_advertiser_invalid_target_is_bad_input() {
        let f = fixture().await;
        let err = update_status(
            &f.db.pool,
            &f.sync,
            &f.advertiser,
            f.order_id,
            cmd(OrderStatus::InProgress),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_publisher_rejected_edge_outside_graph() {
        let f = fixture().await;
        let err = update_status(
            &f.db.pool,
            &f.sync,
            &f.publisher,
            f.order_id,
            cmd(OrderStatus::Completed),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(
            err.message,
            "Invalid transition from requested to completed"
        );
    }

    #[tokio::test]
    async fn test_stranger_is_refused() {
        let f = fixture().await;
        for stranger in [user(99, Role::Publisher), user(99, Role::Advertiser)] {
            let err = update_status(
                &f.db.pool,
                &f.sync,
                &stranger,
                f.order_id,
                cmd(OrderStatus::InProgress),
            )
            .await
            .unwrap_err();
            assert_eq!(err.code, ErrorCode::PermissionDenied);
        }
        // Advertiser posing as publisher on their own order is refused too
        let crossed = user(10, Role::Publisher);
        let err = update_status(
            &f.db.pool,
            &f.sync,
            &crossed,
            f.order_id,
            cmd(OrderStatus::InProgress),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_rejection_reason_stored_only_on_reject() {
        let f = fixture().await;
        let detail = update_status(
            &f.db.pool,
            &f.sync,
            &f.publisher,
            f.order_id,
            TransitionCommand {
                status: OrderStatus::Rejected,
                note: Some("Cannot take this one".into()),
                rejection_reason: Some("Topic does not fit the site".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(detail.order.status, OrderStatus::Rejected);
        assert_eq!(
            detail.order.rejection_reason.as_deref(),
            Some("Topic does not fit the site")
        );
        assert_eq!(
            detail.timeline.last().unwrap().note.as_deref(),
            Some("Cannot take this one")
        );
    }

    #[tokio::test]
    async fn test_no_edges_leave_terminal_states() {
        let f = fixture().await;
        update_status(&f.db.pool, &f.sync, &f.publisher, f.order_id, cmd(OrderStatus::Rejected))
            .await
            .unwrap();

        let err = update_status(
            &f.db.pool,
            &f.sync,
            &f.publisher,
            f.order_id,
            cmd(OrderStatus::InProgress),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[tokio::test]
    async fn test_admin_forces_any_status_and_completed_at_sticks() {
        let f = fixture().await;

        let detail = update_status(
            &f.db.pool,
            &f.sync,
            &f.admin,
            f.order_id,
            cmd(OrderStatus::Completed),
        )
        .await
        .unwrap();
        let first_completed_at = detail.order.completed_at.unwrap();

        // Admin can even leave a terminal state
        update_status(&f.db.pool, &f.sync, &f.admin, f.order_id, cmd(OrderStatus::Requested))
            .await
            .unwrap();
        let detail = update_status(
            &f.db.pool,
            &f.sync,
            &f.admin,
            f.order_id,
            cmd(OrderStatus::Completed),
        )
        .await
        .unwrap();
        // Set exactly once: the original completion time survives
        assert_eq!(detail.order.completed_at, Some(first_completed_at));
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let f = fixture().await;
        let err = update_status(&f.db.pool, &f.sync, &f.admin, 424242, cmd(OrderStatus::Rejected))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }
}
