//! Booking status lifecycle.
//!
//! A booking starts `pending` and advances through a fixed state machine:
//!
//! ```text
//! pending ──confirm (provider)──▶ confirmed ──complete (provider)──▶ completed
//!    │                               │
//!    └──cancel (either party)────────┴──cancel (either party)──▶ cancelled
//! ```
//!
//! `cancelled` and `completed` are terminal: no transition leaves them,
//! and re-entering the current status is also rejected.

use crate::error::{BookingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting provider confirmation. Initial status on creation.
    Pending,
    /// Accepted by the provider.
    Confirmed,
    /// Cancelled by either party. Terminal.
    Cancelled,
    /// Service was delivered. Terminal.
    Completed,
}

impl BookingStatus {
    /// Wire representation, matching the persisted column values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parse a persisted or wire status value.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidField`] for unknown values.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(BookingError::InvalidField {
                field: "status",
                reason: format!("unknown status {other:?}"),
            }),
        }
    }

    /// Terminal statuses admit no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Statuses counted as "open" for the one-open-booking-per-service rule.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a booking an actor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    /// The customer who created the booking.
    Customer,
    /// The provider who owns the service.
    Provider,
}

/// Validate a requested status change against the transition table.
///
/// | from      | to        | allowed actor     |
/// |-----------|-----------|-------------------|
/// | pending   | confirmed | provider          |
/// | pending   | cancelled | provider/customer |
/// | confirmed | completed | provider          |
/// | confirmed | cancelled | provider/customer |
///
/// Any other pair (including re-entering the current status or leaving a
/// terminal status) fails with [`BookingError::InvalidTransition`]. A pair
/// that exists in the table but is requested by the wrong role fails with
/// [`BookingError::RoleNotAllowed`].
///
/// # Errors
///
/// See above.
pub const fn validate_transition(
    from: BookingStatus,
    to: BookingStatus,
    role: PartyRole,
) -> Result<()> {
    use BookingStatus::{Cancelled, Completed, Confirmed, Pending};

    match (from, to) {
        (Pending, Confirmed) => match role {
            PartyRole::Provider => Ok(()),
            PartyRole::Customer => Err(BookingError::RoleNotAllowed {
                action: "confirm a booking",
            }),
        },
        (Confirmed, Completed) => match role {
            PartyRole::Provider => Ok(()),
            PartyRole::Customer => Err(BookingError::RoleNotAllowed {
                action: "complete a booking",
            }),
        },
        (Pending | Confirmed, Cancelled) => Ok(()),
        (from, to) => Err(BookingError::InvalidTransition { from, to }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn provider_confirms_pending() {
        assert!(validate_transition(
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            PartyRole::Provider,
        )
        .is_ok());
    }

    #[test]
    fn customer_cannot_confirm() {
        let err = validate_transition(
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            PartyRole::Customer,
        )
        .unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn either_party_cancels_open_bookings() {
        for from in [BookingStatus::Pending, BookingStatus::Confirmed] {
            for role in [PartyRole::Customer, PartyRole::Provider] {
                assert!(
                    validate_transition(from, BookingStatus::Cancelled, role).is_ok(),
                    "cancel from {from} as {role:?} should be allowed"
                );
            }
        }
    }

    #[test]
    fn terminal_statuses_are_final() {
        for from in [BookingStatus::Cancelled, BookingStatus::Completed] {
            for to in [
                BookingStatus::Pending,
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
                BookingStatus::Completed,
            ] {
                let err = validate_transition(from, to, PartyRole::Provider).unwrap_err();
                assert_eq!(err, BookingError::InvalidTransition { from, to });
            }
        }
    }

    #[test]
    fn same_state_reentry_rejected() {
        let err = validate_transition(
            BookingStatus::Pending,
            BookingStatus::Pending,
            PartyRole::Provider,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BookingError::InvalidTransition {
                from: BookingStatus::Pending,
                to: BookingStatus::Pending,
            }
        );
    }

    #[test]
    fn completed_to_pending_always_fails() {
        for role in [PartyRole::Customer, PartyRole::Provider] {
            let err = validate_transition(
                BookingStatus::Completed,
                BookingStatus::Pending,
                role,
            )
            .unwrap_err();
            assert_eq!(
                err,
                BookingError::InvalidTransition {
                    from: BookingStatus::Completed,
                    to: BookingStatus::Pending,
                }
            );
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(BookingStatus::parse("archived").is_err());
    }
}
