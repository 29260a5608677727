//! Order Repository
//!
//! Read side and creation for orders plus the aggregate queries behind
//! statistics and trends. Status mutations go through the transition
//! engine (`crate::orders::engine`), which owns its own transaction.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderEvent, OrderView, Role};
use shared::order::{OrderStatus, OrderType};
use sqlx::SqlitePool;

pub const ORDER_SELECT: &str = "SELECT id, advertiser_id, publisher_id, website_id, order_type, post_id, link_insertion_id, price, status, rejection_reason, created_at, updated_at, completed_at FROM orders";

const ORDER_VIEW_SELECT: &str = "SELECT o.id, o.advertiser_id, o.publisher_id, o.website_id, o.order_type, o.post_id, o.link_insertion_id, o.price, o.status, o.rejection_reason, o.created_at, o.updated_at, o.completed_at, w.domain AS website_domain FROM orders o LEFT JOIN website w ON w.id = o.website_id";

/// Which counterparty a query is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    Publisher(i64),
    Advertiser(i64),
}

impl OrderScope {
    fn column(&self) -> &'static str {
        match self {
            OrderScope::Publisher(_) => "publisher_id",
            OrderScope::Advertiser(_) => "advertiser_id",
        }
    }

    fn id(&self) -> i64 {
        match *self {
            OrderScope::Publisher(id) | OrderScope::Advertiser(id) => id,
        }
    }
}

/// Filters for paginated list queries
#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    /// Matched against the joined website domain
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

/// Insert payload for a new order (status always starts at `requested`)
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub advertiser_id: i64,
    pub publisher_id: i64,
    pub website_id: i64,
    pub order_type: OrderType,
    pub post_id: Option<i64>,
    pub link_insertion_id: Option<String>,
    pub price: f64,
}

/// Raw `(status, count)` aggregation row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusCountRow {
    pub status: OrderStatus,
    pub count: i64,
}

/// Raw `(day, status, count)` aggregation row for trends
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusDayCount {
    /// Calendar date of `created_at`, formatted YYYY-MM-DD
    pub day: String,
    pub status: OrderStatus,
    pub count: i64,
}

/// Create an order with its first timeline entry, atomically
pub async fn create(pool: &SqlitePool, data: NewOrder) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, advertiser_id, publisher_id, website_id, order_type, post_id, link_insertion_id, price, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(data.advertiser_id)
    .bind(data.publisher_id)
    .bind(data.website_id)
    .bind(data.order_type)
    .bind(data.post_id)
    .bind(&data.link_insertion_id)
    .bind(data.price)
    .bind(OrderStatus::Requested)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO order_event (order_id, seq, status, note, updated_by, updated_by_role, created_at) VALUES (?1, 1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(id)
    .bind(OrderStatus::Requested)
    .bind("Order placed")
    .bind(data.advertiser_id)
    .bind(Role::Advertiser)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{} WHERE id = ?", ORDER_SELECT);
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Full audit trail for an order, oldest first
pub async fn timeline(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderEvent>> {
    let rows = sqlx::query_as::<_, OrderEvent>(
        "SELECT status, created_at AS timestamp, note, updated_by, updated_by_role FROM order_event WHERE order_id = ? ORDER BY seq",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Paginated scoped list with optional status filter and domain search.
/// Returns the page plus the total row count for the same filters.
pub async fn list(
    pool: &SqlitePool,
    scope: OrderScope,
    filter: &OrderListFilter,
) -> RepoResult<(Vec<OrderView>, i64)> {
    let mut where_clause = format!("WHERE o.{} = ?", scope.column());
    if filter.status.is_some() {
        where_clause.push_str(" AND o.status = ?");
    }
    if filter.search.is_some() {
        where_clause.push_str(" AND w.domain LIKE ?");
    }

    let page = filter.page.max(1);
    let limit = filter.limit.clamp(1, 100);
    let offset = (page - 1) * limit;
    let pattern = filter.search.as_ref().map(|s| format!("%{s}%"));

    let sql = format!(
        "{} {} ORDER BY o.created_at DESC LIMIT ? OFFSET ?",
        ORDER_VIEW_SELECT, where_clause
    );
    let mut query = sqlx::query_as::<_, OrderView>(&sql).bind(scope.id());
    if let Some(status) = filter.status {
        query = query.bind(status);
    }
    if let Some(ref pattern) = pattern {
        query = query.bind(pattern);
    }
    let orders = query.bind(limit).bind(offset).fetch_all(pool).await?;

    let count_sql = format!(
        "SELECT COUNT(*) FROM orders o LEFT JOIN website w ON w.id = o.website_id {}",
        where_clause
    );
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(scope.id());
    if let Some(status) = filter.status {
        count_query = count_query.bind(status);
    }
    if let Some(ref pattern) = pattern {
        count_query = count_query.bind(pattern);
    }
    let total = count_query.fetch_one(pool).await?;

    Ok((orders, total))
}

/// Hard delete an order and its timeline. Administrative and
/// unconditional, no status check.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM order_event WHERE order_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

/// Count of orders per status, optionally scoped to one counterparty
pub async fn status_counts(
    pool: &SqlitePool,
    scope: Option<OrderScope>,
) -> RepoResult<Vec<StatusCountRow>> {
    let (sql, scope_id) = match scope {
        Some(scope) => (
            format!(
                "SELECT status, COUNT(*) AS count FROM orders WHERE {} = ? GROUP BY status",
                scope.column()
            ),
            Some(scope.id()),
        ),
        None => (
            "SELECT status, COUNT(*) AS count FROM orders GROUP BY status".to_string(),
            None,
        ),
    };
    let mut query = sqlx::query_as::<_, StatusCountRow>(&sql);
    if let Some(id) = scope_id {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Total price of completed orders, optionally scoped
pub async fn completed_revenue(pool: &SqlitePool, scope: Option<OrderScope>) -> RepoResult<f64> {
    let (sql, scope_id) = match scope {
        Some(scope) => (
            format!(
                "SELECT COALESCE(SUM(price), 0.0) FROM orders WHERE status = ? AND {} = ?",
                scope.column()
            ),
            Some(scope.id()),
        ),
        None => (
            "SELECT COALESCE(SUM(price), 0.0) FROM orders WHERE status = ?".to_string(),
            None,
        ),
    };
    let mut query = sqlx::query_scalar::<_, f64>(&sql).bind(OrderStatus::Completed);
    if let Some(id) = scope_id {
        query = query.bind(id);
    }
    Ok(query.fetch_one(pool).await?)
}

/// Raw per-day, per-status counts inside `[start_millis, end_millis)`,
/// grouped by the calendar date of `created_at`. Gap-filling is the trend
/// aggregator's job.
pub async fn status_day_counts(
    pool: &SqlitePool,
    scope: Option<OrderScope>,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<StatusDayCount>> {
    let scope_clause = match scope {
        Some(ref s) => format!(" AND {} = ?", s.column()),
        None => String::new(),
    };
    let sql = format!(
        "SELECT date(created_at / 1000, 'unixepoch') AS day, status, COUNT(*) AS count FROM orders WHERE created_at >= ? AND created_at < ?{} GROUP BY day, status ORDER BY day",
        scope_clause
    );
    let mut query = sqlx::query_as::<_, StatusDayCount>(&sql)
        .bind(start_millis)
        .bind(end_millis);
    if let Some(scope) = scope {
        query = query.bind(scope.id());
    }
    Ok(query.fetch_all(pool).await?)
}
