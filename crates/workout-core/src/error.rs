//! Session error types.

use thiserror::Error;

/// Why a workout cannot be finished yet.
///
/// These are guarded pre-conditions shown to the user before the finish
/// action proceeds, not failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishBlocked {
    /// The session has no exercises.
    #[error("Add an exercise")]
    NoExercises,

    /// Exercises exist but no set carries a weight or rep count.
    #[error("Your workout has no set values")]
    NoSetValues,
}

/// Errors that can occur while mutating a workout session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Exercise is not part of the session.
    #[error("Exercise not in session: {0}")]
    UnknownExercise(String),

    /// Exercise is already part of the session.
    #[error("Exercise already in session: {0}")]
    DuplicateExercise(String),

    /// Reorder request is not a permutation of the current exercises.
    #[error("Invalid exercise order: {0}")]
    InvalidOrder(String),

    /// Finish was requested but a pre-condition is not met.
    #[error("Cannot finish workout: {0}")]
    FinishBlocked(#[from] FinishBlocked),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Serialization(e.to_string())
    }
}
