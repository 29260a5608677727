//! Website Model (catalog listing)
//!
//! The catalog is an external concern; the order engine only reads it to
//! resolve the owning publisher and the advertised per-service pricing.

use serde::{Deserialize, Serialize};

/// Catalog listing entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Website {
    pub id: i64,
    pub publisher_id: i64,
    pub domain: String,
    pub guest_post_price: f64,
    pub link_insertion_price: f64,
    pub writing_price: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create website payload (catalog side, used for seeding)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteCreate {
    pub publisher_id: i64,
    pub domain: String,
    #[serde(default)]
    pub guest_post_price: f64,
    #[serde(default)]
    pub link_insertion_price: f64,
    #[serde(default)]
    pub writing_price: f64,
}
