//! Data models
//!
//! Shared between the market server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY, snowflake-style).

pub mod order;
pub mod post;
pub mod role;
pub mod website;

// Re-exports
pub use order::*;
pub use post::*;
pub use role::*;
pub use website::*;
