//! Statistics API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Statistics router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/statistics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", get(handler::get_order_stats))
        .route("/trends", get(handler::get_order_trends))
}
