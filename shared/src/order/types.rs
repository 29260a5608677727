//! Order status and purchase type enums
//!
//! Stored as camelCase TEXT in SQLite and serialized camelCase on the wire,
//! matching the historical document format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status
///
/// Terminal states: [`Completed`](OrderStatus::Completed) and
/// [`Rejected`](OrderStatus::Rejected). The allowed edges are defined in
/// [`super::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "camelCase"))]
pub enum OrderStatus {
    Requested,
    InProgress,
    AdvertiserApproval,
    Completed,
    Rejected,
}

impl OrderStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Requested,
        OrderStatus::InProgress,
        OrderStatus::AdvertiserApproval,
        OrderStatus::Completed,
        OrderStatus::Rejected,
    ];

    /// Wire representation (camelCase)
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Requested => "requested",
            OrderStatus::InProgress => "inProgress",
            OrderStatus::AdvertiserApproval => "advertiserApproval",
            OrderStatus::Completed => "completed",
            OrderStatus::Rejected => "rejected",
        }
    }

    /// No edges leave a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purchase type, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "camelCase"))]
pub enum OrderType {
    GuestPost,
    LinkInsertion,
    WritingGuestPost,
}

impl OrderType {
    /// Wire representation (camelCase)
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::GuestPost => "guestPost",
            OrderType::LinkInsertion => "linkInsertion",
            OrderType::WritingGuestPost => "writingGuestPost",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
