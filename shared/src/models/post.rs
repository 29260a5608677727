//! Post Model (content record)
//!
//! Holds the authored content or requirements document behind an order's
//! deliverable. The order engine reads posts when resolving references and
//! patches `status` when the owning order moves.

use crate::order::OrderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content record status
///
/// Kept in sync with the owning order by the content sync worker:
/// order `inProgress` → post `inProgress`, order `completed` → `approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "camelCase"))]
pub enum PostStatus {
    Pending,
    InProgress,
    Approved,
    Rejected,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Pending => "pending",
            PostStatus::InProgress => "inProgress",
            PostStatus::Approved => "approved",
            PostStatus::Rejected => "rejected",
        }
    }

    /// The post status implied by an order status, if the order status
    /// is one that propagates to content at all
    pub fn from_order_status(status: OrderStatus) -> Option<PostStatus> {
        match status {
            OrderStatus::InProgress => Some(PostStatus::InProgress),
            OrderStatus::Completed => Some(PostStatus::Approved),
            _ => None,
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content record entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Post {
    pub id: i64,
    pub advertiser_id: i64,
    pub title: String,
    pub body: Option<String>,
    pub anchor_text: Option<String>,
    pub anchor_url: Option<String>,
    /// URL of the published placement, filled on completion
    pub completed_url: Option<String>,
    pub status: PostStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create post payload (content side, used for seeding)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreate {
    pub advertiser_id: i64,
    pub title: String,
    pub body: Option<String>,
    pub anchor_text: Option<String>,
    pub anchor_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_status_follows_order_status() {
        assert_eq!(
            PostStatus::from_order_status(OrderStatus::InProgress),
            Some(PostStatus::InProgress)
        );
        assert_eq!(
            PostStatus::from_order_status(OrderStatus::Completed),
            Some(PostStatus::Approved)
        );
        assert_eq!(PostStatus::from_order_status(OrderStatus::Requested), None);
        assert_eq!(
            PostStatus::from_order_status(OrderStatus::AdvertiserApproval),
            None
        );
        assert_eq!(PostStatus::from_order_status(OrderStatus::Rejected), None);
    }
}
