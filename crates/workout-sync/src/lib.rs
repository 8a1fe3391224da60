//! Persistence and synchronization for the active workout session.
//!
//! - **Remote store**: the authoritative active-session record ([`RemoteStore`])
//! - **Debounce**: coalesces rapid edits into one background save
//! - **Signals**: typed cross-view notifications that trigger a reload
//! - **Coordinator**: load / save / finish / discard state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use workout_sync::prelude::*;
//!
//! let sync = SyncCoordinator::new(remote, clock, SyncConfig::default());
//! sync.mount().await;
//!
//! sync.add_exercises(vec![ExerciseRef::new("squat", "Squat")])?;
//! sync.update(|s| s.update_set(&"squat".into(), 0, SetField::Kg(100.0)))?;
//!
//! let summary = sync.finish().await?;
//! ```

use std::sync::{Mutex, MutexGuard};

pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod handoff;
pub mod remote;
pub mod signal;
pub mod ticker;

pub use config::SyncConfig;
pub use coordinator::{
    DiscardOutcome, FinishSummary, LoadOutcome, SyncCoordinator, SyncPhase, DISCARD_REDIRECT,
};
pub use error::{RemoteError, RemoteResult, SyncError};
pub use remote::{MemoryRemote, RemoteOp, RemoteStore};
pub use signal::{SignalBus, SyncSignal, Visibility};

/// Prelude for convenient imports.
pub mod prelude {
    pub use workout_core::prelude::*;

    pub use crate::config::SyncConfig;
    pub use crate::coordinator::{
        DiscardOutcome, FinishSummary, LoadOutcome, SyncCoordinator, SyncPhase,
    };
    pub use crate::error::{RemoteError, RemoteResult, SyncError};
    pub use crate::handoff::ReplacementSlot;
    pub use crate::remote::{MemoryRemote, RemoteStore};
    pub use crate::signal::{SignalBus, SyncSignal, Visibility};
}

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
