//! Order Model
//!
//! One order per purchased line item, tying one advertiser to one
//! publisher's listing. The persisted row keeps the historical field
//! layout (including the overloaded `linkInsertionId`); readers go through
//! [`Order::content_ref`] instead of inspecting the raw fields.

use crate::models::{Post, Role};
use crate::order::{ContentId, ContentRef, OrderStatus, OrderType, parse_legacy_ref};
use serde::{Deserialize, Serialize};

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub advertiser_id: i64,
    /// Denormalized from the website at creation; never rewritten, even if
    /// the listing changes hands later
    pub publisher_id: i64,
    pub website_id: i64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Content pointer for guestPost / writingGuestPost orders
    pub post_id: Option<i64>,
    /// Legacy pointer for linkInsertion orders: holds a content-record id
    /// in whatever shape the writing client used (number, string, object)
    pub link_insertion_id: Option<String>,
    pub price: f64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

impl Order {
    /// Resolve which field points at this order's content record
    ///
    /// guestPost / writingGuestPost orders use `postId`. linkInsertion
    /// orders trust `postId` when present, otherwise normalize the legacy
    /// `linkInsertionId` value. Returns None when nothing usable is stored;
    /// callers degrade to "no content assigned".
    pub fn content_ref(&self) -> Option<ContentRef> {
        match self.order_type {
            OrderType::GuestPost | OrderType::WritingGuestPost => {
                self.post_id.map(ContentRef::Post)
            }
            OrderType::LinkInsertion => match self.post_id {
                Some(id) => Some(ContentRef::Post(id)),
                None => self
                    .link_insertion_id
                    .as_deref()
                    .and_then(parse_legacy_ref)
                    .map(ContentRef::LegacyLinkInsertionPost),
            },
        }
    }
}

/// Timeline entry, one append-only row per status change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderEvent {
    pub status: OrderStatus,
    pub timestamp: i64,
    pub note: Option<String>,
    pub updated_by: i64,
    pub updated_by_role: Role,
}

/// Order row enriched for list views: website domain from the catalog,
/// content record resolved per row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderView {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub order: Order,
    pub website_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "db", sqlx(skip))]
    pub post: Option<Post>,
}

/// Full order detail: order, audit trail, resolved content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub timeline: Vec<OrderEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}

/// Pagination envelope for list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total > 0 {
            (total + limit - 1) / limit
        } else {
            1
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// Paginated order list response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub orders: Vec<OrderView>,
    pub pagination: Pagination,
}

// =============================================================================
// API Request Types
// =============================================================================

/// One cart line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub website_id: i64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub price: f64,
    /// Selected content record, required for guestPost / linkInsertion.
    /// Accepts the legacy shapes (number, string, populated object).
    #[serde(default)]
    pub content_id: Option<ContentId>,
}

/// Checkout payload, materialized into one order per item in list order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

/// Checkout result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub orders: Vec<Order>,
    pub count: usize,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}
