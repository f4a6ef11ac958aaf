//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Domain-level error.
///
/// Every variant except `Internal` is a deterministic, user-correctable
/// rejection: surfaced to the caller as-is and never retried automatically
/// (retrying with the same inputs fails identically).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Stock cannot shrink below the quantity already committed to projects.
    #[error("cannot reduce stock to {requested}: {reserved} units are reserved")]
    Capacity { requested: u32, reserved: u32 },

    /// A reservation would exceed the structure's current availability.
    #[error("requested {requested} units but only {available} are available")]
    OverAllocation { requested: u32, available: u32 },

    /// The structure already has an allocation line on this project.
    #[error("structure is already allocated to this project")]
    DuplicateAllocation,

    /// A quantity cannot shrink below what has already been dispatched.
    #[error("cannot set quantity to {requested}: {dispatched} units already dispatched")]
    BelowDispatched { requested: u32, dispatched: u32 },

    /// Removal blocked by existing dispatch records.
    #[error("allocation line has dispatched units; delete its dispatches first")]
    HasDispatches,

    /// A dispatch item exceeds the line's undispatched reservation.
    #[error("requested {requested} units but only {remaining} remain undispatched")]
    InsufficientRemaining { requested: u32, remaining: u32 },

    /// A value failed validation (e.g. malformed or empty input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested entity was not found.
    #[error("not found")]
    NotFound,

    /// The project status state machine does not allow this transition.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    /// Infrastructure failure inside the core (e.g. poisoned state lock).
    #[error("internal: {0}")]
    Internal(String),
}

impl AllocationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for the business-rule rejections a caller can correct by
    /// changing inputs, as opposed to lookup or infrastructure failures.
    pub fn is_rule_rejection(&self) -> bool {
        matches!(
            self,
            Self::Capacity { .. }
                | Self::OverAllocation { .. }
                | Self::DuplicateAllocation
                | Self::BelowDispatched { .. }
                | Self::HasDispatches
                | Self::InsufficientRemaining { .. }
        )
    }
}
