//! Order API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let admin_routes = Router::new()
        .route("/{id}", delete(handler::delete_order))
        .layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/checkout", post(handler::checkout))
        .route("/publisher", get(handler::list_for_publisher))
        .route("/advertiser", get(handler::list_for_advertiser))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .merge(admin_routes)
}
