//! Error types for booking and availability operations.

use crate::status::BookingStatus;
use thiserror::Error;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Error taxonomy for the booking lifecycle and its stores.
///
/// Variants are grouped by how they surface at the request boundary:
/// validation, not-found, conflict, authorization, transition and
/// system failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BookingError {
    // ═══════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════

    /// A required field was missing from the input.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: &'static str,
    },

    /// A field was present but malformed or out of range.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Not Found
    // ═══════════════════════════════════════════════════════════

    /// A referenced service, slot or booking does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Kind of resource that was missing
        resource: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // Conflict
    // ═══════════════════════════════════════════════════════════

    /// The slot was already consumed by another booking.
    #[error("This time slot has already been booked")]
    SlotAlreadyBooked,

    /// The customer already holds a non-cancelled booking for this service.
    #[error("An open booking for this service already exists")]
    DuplicateOpenBooking,

    /// The slot is referenced by a booking and cannot be deleted.
    #[error("This time slot has a booking and cannot be deleted")]
    SlotInUse,

    /// A concurrent update changed the booking before this one applied.
    #[error("The booking was modified concurrently, please retry")]
    ConcurrentUpdate,

    // ═══════════════════════════════════════════════════════════
    // Authorization
    // ═══════════════════════════════════════════════════════════

    /// The actor is neither the booking's customer nor its provider.
    #[error("You are not a party to this booking")]
    NotAParticipant,

    /// The actor's role is not allowed to perform the requested action.
    #[error("Your role may not perform this action: {action}")]
    RoleNotAllowed {
        /// Short description of the disallowed action
        action: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // Status Lifecycle
    // ═══════════════════════════════════════════════════════════

    /// The requested status change violates the transition table.
    #[error("Cannot transition booking from {from} to {to}")]
    InvalidTransition {
        /// Current status of the booking
        from: BookingStatus,
        /// Requested status
        to: BookingStatus,
    },

    // ═══════════════════════════════════════════════════════════
    // System
    // ═══════════════════════════════════════════════════════════

    /// Storage layer failure.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Internal error (never exposed to users in detail).
    #[error("Internal error")]
    Internal,
}

impl BookingError {
    /// Returns `true` for user-correctable input errors.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidField { .. }
        )
    }

    /// Returns `true` for race or uniqueness conflicts that a client
    /// can resolve by refreshing and retrying.
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::SlotAlreadyBooked
                | Self::DuplicateOpenBooking
                | Self::SlotInUse
                | Self::ConcurrentUpdate
        )
    }

    /// Returns `true` when the actor lacks role or ownership for the action.
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::NotAParticipant | Self::RoleNotAllowed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_classification() {
        assert!(BookingError::SlotAlreadyBooked.is_conflict());
        assert!(BookingError::DuplicateOpenBooking.is_conflict());
        assert!(!BookingError::Internal.is_conflict());
    }

    #[test]
    fn forbidden_classification() {
        assert!(BookingError::NotAParticipant.is_forbidden());
        assert!(
            BookingError::RoleNotAllowed { action: "confirm" }.is_forbidden()
        );
        assert!(!BookingError::SlotAlreadyBooked.is_forbidden());
    }

    #[test]
    fn display_includes_statuses() {
        let err = BookingError::InvalidTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Pending,
        };
        assert_eq!(
            err.to_string(),
            "Cannot transition booking from completed to pending"
        );
    }
}
