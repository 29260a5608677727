//! Shared types for the marketplace backend
//!
//! Common types used by the market server and its clients: the unified
//! error system, domain models exchanged over the API, the order state
//! machine, and id/time utilities.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
