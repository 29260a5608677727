//! Order status state machine and role policy
//!
//! The transition rules live here as pure functions so every actor path
//! goes through one table instead of role branches scattered across
//! handlers:
//!
//! ```text
//! requested ──────────────► inProgress ──► advertiserApproval ──► completed
//!     │                         │                  │
//!     └────────► rejected ◄─────┴──────────────────┘
//! ```
//!
//! - Publisher: any edge in the graph from the current status.
//! - Advertiser: only advertiserApproval → completed | rejected.
//! - Admin: bypasses both checks (can force any status).

use super::types::OrderStatus;
use crate::models::Role;
use thiserror::Error;

/// Why a requested transition was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The edge is not in the state graph (or the actor may not take it
    /// from the current status)
    #[error("Invalid transition from {from} to {to}")]
    NotAllowed { from: OrderStatus, to: OrderStatus },

    /// The advertiser asked for a target it can never set
    #[error("Advertisers may only complete or reject an order, got {to}")]
    InvalidTarget { to: OrderStatus },
}

/// Forward edges of the state graph
pub const fn graph_targets(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::Requested => &[OrderStatus::InProgress, OrderStatus::Rejected],
        OrderStatus::InProgress => &[OrderStatus::AdvertiserApproval, OrderStatus::Rejected],
        OrderStatus::AdvertiserApproval => &[OrderStatus::Completed, OrderStatus::Rejected],
        OrderStatus::Completed | OrderStatus::Rejected => &[],
    }
}

/// Whether `from -> to` is an edge of the state graph
pub fn is_graph_edge(from: OrderStatus, to: OrderStatus) -> bool {
    graph_targets(from).contains(&to)
}

/// Policy table: targets the given actor may set from the given status
pub fn allowed_targets(actor: Role, from: OrderStatus) -> &'static [OrderStatus] {
    match actor {
        Role::Admin => &OrderStatus::ALL,
        Role::Publisher => graph_targets(from),
        Role::Advertiser => match from {
            OrderStatus::AdvertiserApproval => &[OrderStatus::Completed, OrderStatus::Rejected],
            _ => &[],
        },
    }
}

/// Validate a transition request against the policy table
///
/// The caller has already been matched to one of the order's counterparties
/// (or is an admin); this only answers whether that actor may move the
/// order from `from` to `to`.
pub fn validate_transition(
    actor: Role,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<(), TransitionError> {
    match actor {
        // Admin bypasses the graph entirely
        Role::Admin => Ok(()),
        Role::Advertiser => {
            // A target outside {completed, rejected} is malformed input,
            // regardless of the order's current status
            if !matches!(to, OrderStatus::Completed | OrderStatus::Rejected) {
                return Err(TransitionError::InvalidTarget { to });
            }
            if from != OrderStatus::AdvertiserApproval {
                return Err(TransitionError::NotAllowed { from, to });
            }
            Ok(())
        }
        Role::Publisher => {
            if is_graph_edge(from, to) {
                Ok(())
            } else {
                Err(TransitionError::NotAllowed { from, to })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_graph_edges() {
        assert!(is_graph_edge(Requested, InProgress));
        assert!(is_graph_edge(Requested, Rejected));
        assert!(is_graph_edge(InProgress, AdvertiserApproval));
        assert!(is_graph_edge(InProgress, Rejected));
        assert!(is_graph_edge(AdvertiserApproval, Completed));
        assert!(is_graph_edge(AdvertiserApproval, Rejected));

        // No skipping states
        assert!(!is_graph_edge(Requested, AdvertiserApproval));
        assert!(!is_graph_edge(Requested, Completed));
        assert!(!is_graph_edge(InProgress, Completed));

        // No going backwards
        assert!(!is_graph_edge(InProgress, Requested));
        assert!(!is_graph_edge(AdvertiserApproval, InProgress));
    }

    #[test]
    fn test_no_edges_leave_terminal_states() {
        for to in OrderStatus::ALL {
            assert!(!is_graph_edge(Completed, to));
            assert!(!is_graph_edge(Rejected, to));
        }
    }

    #[test]
    fn test_publisher_follows_graph() {
        assert!(validate_transition(Role::Publisher, Requested, InProgress).is_ok());
        assert!(validate_transition(Role::Publisher, InProgress, AdvertiserApproval).is_ok());
        assert!(validate_transition(Role::Publisher, AdvertiserApproval, Completed).is_ok());
        assert!(validate_transition(Role::Publisher, InProgress, Rejected).is_ok());

        assert_eq!(
            validate_transition(Role::Publisher, Requested, Completed),
            Err(TransitionError::NotAllowed {
                from: Requested,
                to: Completed
            })
        );
        assert_eq!(
            validate_transition(Role::Publisher, Completed, Requested),
            Err(TransitionError::NotAllowed {
                from: Completed,
                to: Requested
            })
        );
    }

    #[test]
    fn test_advertiser_only_acts_in_approval() {
        assert!(validate_transition(Role::Advertiser, AdvertiserApproval, Completed).is_ok());
        assert!(validate_transition(Role::Advertiser, AdvertiserApproval, Rejected).is_ok());

        // Valid target, wrong current status
        for from in [Requested, InProgress, Completed, Rejected] {
            assert_eq!(
                validate_transition(Role::Advertiser, from, Completed),
                Err(TransitionError::NotAllowed {
                    from,
                    to: Completed
                })
            );
        }

        // Targets an advertiser can never set, from any status
        for from in OrderStatus::ALL {
            for to in [Requested, InProgress, AdvertiserApproval] {
                assert_eq!(
                    validate_transition(Role::Advertiser, from, to),
                    Err(TransitionError::InvalidTarget { to })
                );
            }
        }
    }

    #[test]
    fn test_admin_bypasses_everything() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(validate_transition(Role::Admin, from, to).is_ok());
            }
        }
    }

    #[test]
    fn test_policy_table_matches_validate() {
        // The table and the validator must agree for publisher and admin;
        // the advertiser differs only in *how* it refuses (error kind).
        for actor in [Role::Publisher, Role::Admin] {
            for from in OrderStatus::ALL {
                for to in OrderStatus::ALL {
                    let in_table = allowed_targets(actor, from).contains(&to);
                    assert_eq!(in_table, validate_transition(actor, from, to).is_ok());
                }
            }
        }
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let in_table = allowed_targets(Role::Advertiser, from).contains(&to);
                assert_eq!(
                    in_table,
                    validate_transition(Role::Advertiser, from, to).is_ok()
                );
            }
        }
    }

    #[test]
    fn test_error_message_carries_both_statuses() {
        let err = validate_transition(Role::Publisher, Requested, Completed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid transition from requested to completed"
        );
    }
}
