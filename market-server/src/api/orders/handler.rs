//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order::{self as order_repo, OrderListFilter, OrderScope};
use crate::orders::engine::{self, TransitionCommand};
use crate::orders::resolver;
use crate::utils::{AppError, AppResult};
use shared::models::{
    CheckoutRequest, CheckoutResponse, OrderDetail, OrderListResponse, Pagination, Role,
    UpdateStatusRequest,
};
use shared::order::OrderStatus;

/// Query params for listing orders
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub search: Option<String>,
    /// Admin only: query another publisher's orders
    pub publisher_id: Option<i64>,
    /// Admin only: query another advertiser's orders
    pub advertiser_id: Option<i64>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// POST /api/orders/checkout - Materialize the cart into orders
pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<CheckoutResponse>> {
    let response = crate::orders::checkout::place_orders(&state.pool, &user, payload).await?;
    Ok(Json(response))
}

/// GET /api/orders/publisher - Orders for the calling publisher
pub async fn list_for_publisher(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<OrderListResponse>> {
    let publisher_id = match user.role {
        Role::Publisher => user.id,
        Role::Admin => query.publisher_id.ok_or_else(|| {
            AppError::invalid_request("publisherId is required for admin queries")
        })?,
        Role::Advertiser => {
            return Err(AppError::permission_denied("Publisher role required"));
        }
    };
    list_orders(&state, OrderScope::Publisher(publisher_id), query).await
}

/// GET /api/orders/advertiser - Orders for the calling advertiser
pub async fn list_for_advertiser(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<OrderListResponse>> {
    let advertiser_id = match user.role {
        Role::Advertiser => user.id,
        Role::Admin => query.advertiser_id.ok_or_else(|| {
            AppError::invalid_request("advertiserId is required for admin queries")
        })?,
        Role::Publisher => {
            return Err(AppError::permission_denied("Advertiser role required"));
        }
    };
    list_orders(&state, OrderScope::Advertiser(advertiser_id), query).await
}

async fn list_orders(
    state: &ServerState,
    scope: OrderScope,
    query: ListQuery,
) -> AppResult<Json<OrderListResponse>> {
    let filter = OrderListFilter {
        status: query.status,
        search: query.search,
        page: query.page.max(1),
        limit: query.limit.clamp(1, 100),
    };

    let (mut orders, total) = order_repo::list(&state.pool, scope, &filter).await?;
    // Cross-reference resolution runs per row; each order points at its own
    // content record
    resolver::resolve_views(&state.pool, &mut orders).await?;

    Ok(Json(OrderListResponse {
        orders,
        pagination: Pagination::new(filter.page, filter.limit, total),
    }))
}

/// GET /api/orders/:id - Order detail with timeline and resolved content
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let order = order_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::order_not_found(id))?;

    // Only the order's counterparties may read it (admin bypasses)
    engine::resolve_actor(&user, &order)?;

    let detail = resolver::load_detail(&state.pool, order).await?;
    Ok(Json(detail))
}

/// PATCH /api/orders/:id/status - Apply a status transition
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = engine::update_status(
        &state.pool,
        &state.content_sync,
        &user,
        id,
        TransitionCommand {
            status: payload.status,
            note: payload.note,
            rejection_reason: payload.rejection_reason,
        },
    )
    .await?;
    Ok(Json(detail))
}

/// DELETE /api/orders/:id - Remove an order (admin only, no state check)
pub async fn delete_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let removed = order_repo::delete(&state.pool, id).await?;
    if !removed {
        return Err(AppError::order_not_found(id));
    }
    tracing::info!(order_id = id, "Order deleted");
    Ok(Json(true))
}
