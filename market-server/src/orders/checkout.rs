//! Cart Materializer
//!
//! Turns a checkout cart into persisted orders, one per line item, in list
//! order. Each item denormalizes the owning publisher from the catalog at
//! creation time. Creation is deliberately per-item: an unresolvable
//! listing aborts the whole call, but items already written stay written
//! (callers see the NotFound and retry at the transport layer).

use crate::auth::CurrentUser;
use crate::db::repository::order::{self as order_repo, NewOrder};
use crate::db::repository::website;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CheckoutItem, CheckoutRequest, CheckoutResponse, Role};
use shared::order::OrderType;
use sqlx::SqlitePool;

/// Field-level validation, before anything touches the database
fn validate_items(items: &[CheckoutItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::invalid_request("Cart is empty"));
    }
    for (index, item) in items.iter().enumerate() {
        if item.price <= 0.0 {
            return Err(AppError::invalid_request("Item price must be positive")
                .with_detail("item", index)
                .with_detail("price", item.price));
        }
        let needs_content = matches!(
            item.order_type,
            OrderType::GuestPost | OrderType::LinkInsertion
        );
        if needs_content && item.content_id.is_none() {
            return Err(AppError::invalid_request(format!(
                "contentId is required for {} orders",
                item.order_type
            ))
            .with_detail("item", index));
        }
    }
    Ok(())
}

/// Materialize the cart into orders
pub async fn place_orders(
    pool: &SqlitePool,
    caller: &CurrentUser,
    req: CheckoutRequest,
) -> AppResult<CheckoutResponse> {
    if caller.role != Role::Advertiser {
        return Err(AppError::permission_denied(
            "Only advertisers can place orders",
        ));
    }
    validate_items(&req.items)?;

    let mut orders = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let site = website::find_by_id(pool, item.website_id)
            .await?
            .ok_or_else(|| AppError::website_not_found(item.website_id))?;
        if !site.is_active {
            return Err(AppError::with_message(
                ErrorCode::WebsiteInactive,
                format!("Website {} is not accepting orders", site.domain),
            )
            .with_detail("websiteId", site.id));
        }

        // The historical field routing: linkInsertion orders park the
        // content id under linkInsertionId, everything else uses postId
        let content_id = item.content_id.map(|c| c.0);
        let (post_id, link_insertion_id) = match item.order_type {
            OrderType::GuestPost | OrderType::WritingGuestPost => (content_id, None),
            OrderType::LinkInsertion => (None, content_id.map(|id| id.to_string())),
        };

        let order = order_repo::create(
            pool,
            NewOrder {
                advertiser_id: caller.id,
                publisher_id: site.publisher_id,
                website_id: site.id,
                order_type: item.order_type,
                post_id,
                link_insertion_id,
                price: item.price,
            },
        )
        .await?;

        tracing::info!(
            order_id = order.id,
            advertiser_id = caller.id,
            publisher_id = site.publisher_id,
            order_type = %item.order_type,
            "Order placed"
        );
        orders.push(order);
    }

    let count = orders.len();
    Ok(CheckoutResponse { orders, count })
}
