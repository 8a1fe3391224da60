//! Sync error types.

use std::time::Duration;

use thiserror::Error;
use workout_core::{FinishBlocked, SessionError};

use crate::coordinator::SyncPhase;

/// Result type for remote store calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote store failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The store could not be reached.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete in time.
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    /// The store answered with something unreadable.
    #[error("malformed remote data: {0}")]
    Malformed(String),

    /// The store refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::Malformed(e.to_string())
    }
}

/// Errors surfaced by the sync coordinator.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A session mutation or finish pre-condition failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The coordinator is not holding an active session.
    #[error("no active session (phase: {0})")]
    NotActive(SyncPhase),
}

impl From<FinishBlocked> for SyncError {
    fn from(blocked: FinishBlocked) -> Self {
        SyncError::Session(SessionError::FinishBlocked(blocked))
    }
}

impl SyncError {
    /// The finish pre-condition that blocked the call, if that is the cause.
    pub fn finish_blocked(&self) -> Option<FinishBlocked> {
        match self {
            SyncError::Session(SessionError::FinishBlocked(blocked)) => Some(*blocked),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_malformed() {
        let err: RemoteError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, RemoteError::Malformed(_)));
    }

    #[test]
    fn test_finish_blocked_is_exposed() {
        let err: SyncError = FinishBlocked::NoExercises.into();
        assert_eq!(err.finish_blocked(), Some(FinishBlocked::NoExercises));
        assert_eq!(err.to_string(), "Cannot finish workout: Add an exercise");

        let err = SyncError::NotActive(SyncPhase::Idle);
        assert_eq!(err.finish_blocked(), None);
    }
}
