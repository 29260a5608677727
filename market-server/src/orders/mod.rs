//! Order engine
//!
//! The marketplace core: cart materialization, the role-gated status state
//! machine, cross-reference resolution for the legacy content pointer, the
//! best-effort content sync queue, and trend aggregation. The pure state
//! machine itself lives in `shared::order`; these modules bind it to
//! storage and callers.

pub mod checkout;
pub mod engine;
pub mod resolver;
pub mod sync_worker;
pub mod trends;

pub use engine::{TransitionCommand, update_status};
pub use sync_worker::{ContentPatch, ContentSyncHandle};
