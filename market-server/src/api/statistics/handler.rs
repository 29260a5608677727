//! Statistics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order::{self as order_repo, OrderScope};
use crate::orders::trends::{self, TrendPoint};
use crate::utils::{AppResult, time};
use shared::models::Role;
use shared::order::OrderStatus;

// ============================================================================
// Response Types
// ============================================================================

/// Count of orders in each lifecycle status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub requested: i64,
    pub in_progress: i64,
    pub advertiser_approval: i64,
    pub completed: i64,
    pub rejected: i64,
}

/// Order statistics response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatsResponse {
    pub status_counts: StatusCounts,
    /// Sum of completed orders' prices
    pub total_revenue: f64,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    /// Admin only: scope to one publisher
    pub publisher_id: Option<i64>,
    /// Admin only: scope to one advertiser
    pub advertiser_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsQuery {
    /// Period shorthand: "7d", "30d", "90d" (default "7d")
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Admin only: scope to one publisher
    pub publisher_id: Option<i64>,
    /// Admin only: scope to one advertiser
    pub advertiser_id: Option<i64>,
}

/// Non-admin callers always see their own side; admins may pass an
/// explicit scope or none at all (marketplace-wide)
fn scope_for(
    user: &CurrentUser,
    publisher_id: Option<i64>,
    advertiser_id: Option<i64>,
) -> Option<OrderScope> {
    match user.role {
        Role::Publisher => Some(OrderScope::Publisher(user.id)),
        Role::Advertiser => Some(OrderScope::Advertiser(user.id)),
        Role::Admin => publisher_id
            .map(OrderScope::Publisher)
            .or_else(|| advertiser_id.map(OrderScope::Advertiser)),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/statistics/orders - Status counts and completed revenue
pub async fn get_order_stats(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<OrderStatsResponse>> {
    let scope = scope_for(&user, query.publisher_id, query.advertiser_id);

    let rows = order_repo::status_counts(&state.pool, scope).await?;
    let mut status_counts = StatusCounts::default();
    for row in rows {
        match row.status {
            OrderStatus::Requested => status_counts.requested = row.count,
            OrderStatus::InProgress => status_counts.in_progress = row.count,
            OrderStatus::AdvertiserApproval => status_counts.advertiser_approval = row.count,
            OrderStatus::Completed => status_counts.completed = row.count,
            OrderStatus::Rejected => status_counts.rejected = row.count,
        }
    }

    let total_revenue = order_repo::completed_revenue(&state.pool, scope).await?;

    Ok(Json(OrderStatsResponse {
        status_counts,
        total_revenue,
    }))
}

/// GET /api/statistics/trends - Dense daily status counts
pub async fn get_order_trends(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<TrendsQuery>,
) -> AppResult<Json<Vec<TrendPoint>>> {
    let scope = scope_for(&user, query.publisher_id, query.advertiser_id);
    let (start, end) = time::resolve_range(
        query.period.as_deref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )?;

    tracing::debug!(
        ?scope,
        start = %start,
        end = %end,
        "Fetching order trends"
    );

    let series = trends::order_trends(&state.pool, scope, start, end).await?;
    Ok(Json(series))
}
