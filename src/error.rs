//! Error types for rotation planning.
//!
//! Only input problems are errors. An unsatisfiable constraint set is not:
//! solvers report it as an empty [`Solution`](crate::scheduler::Solution).

use thiserror::Error;

/// Errors raised while preparing a rotation problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    /// A roster (explicit or inferred from history) has the wrong size.
    #[error("roster must contain exactly {expected} distinct groups, found {found}")]
    RosterMismatch { expected: usize, found: usize },

    /// The same group name appears twice in a roster.
    #[error("duplicate group in roster: {0:?}")]
    DuplicateGroup(String),

    /// A group name is blank.
    #[error("invalid group name: {0:?}")]
    InvalidGroupName(String),

    /// Cycle day outside `1..=2`.
    #[error("cycle day must be 1 or 2, got {0}")]
    InvalidCycle(u8),

    /// A period label that cannot be parsed.
    #[error("unparseable period label: {0:?}")]
    InvalidPeriod(String),

    /// The planning horizon spans zero weeks.
    #[error("planning horizon must span at least one week")]
    EmptyHorizon,

    /// The period table has no periods for a cycle day.
    #[error("period table has no periods for cycle day {0}")]
    EmptyPeriodSet(u8),

    /// A group is named like the make-up label.
    #[error("group name {0:?} is reserved for make-ups")]
    ReservedGroupName(String),

    /// A group index outside the roster.
    #[error("group index {0} is outside the roster")]
    GroupOutOfRange(u8),

    /// The horizon end date is not representable.
    #[error("planning horizon of {0} weeks overflows the calendar")]
    HorizonOverflow(u32),

    /// A compact history carries a roster that differs from the supplied one.
    #[error("history roster conflicts with the supplied roster")]
    RosterConflict,
}

/// Result alias for rotation operations.
pub type Result<T> = std::result::Result<T, RotationError>;
