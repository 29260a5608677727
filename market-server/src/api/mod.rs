//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (公共路由)
//! - [`orders`] - 订单生命周期接口
//! - [`statistics`] - 订单统计与趋势接口

pub mod health;
pub mod orders;
pub mod statistics;

use axum::Router;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Order lifecycle API - authentication required
        .merge(orders::router())
        // Statistics API - authentication required
        .merge(statistics::router())
        // Health API - public route
        .merge(health::router())
}
