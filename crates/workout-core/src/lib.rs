//! Active workout session domain types and logic.
//!
//! This crate owns everything about a workout in progress that can be
//! expressed without a runtime:
//!
//! - **Clock**: elapsed-time arithmetic over a persisted start origin
//! - **Ledger**: per-exercise logged sets
//! - **Supersets**: disjoint groups of exercises performed back-to-back
//! - **Session**: the aggregate the UI reads and mutates
//! - **Rest timer**: countdown / stopwatch between sets
//!
//! # Example
//!
//! ```rust,ignore
//! use workout_core::prelude::*;
//!
//! let mut session = SessionStore::new(DurationClock::new(clock, origins));
//! session.add_exercises(vec![
//!     ExerciseRef::new("bench", "Bench Press").with_equipment("barbell"),
//!     ExerciseRef::new("row", "Seated Row"),
//! ]);
//! session.form_superset(["bench", "row"].map(ExerciseId::from));
//! session.update_set(&"bench".into(), 0, SetField::Kg(60.0));
//!
//! session.check_finish()?;
//! ```

pub mod catalog;
pub mod clock;
pub mod error;
pub mod exercise;
pub mod format;
pub mod ids;
pub mod ledger;
pub mod rest;
pub mod session;
pub mod superset;

pub use error::{FinishBlocked, SessionError};
pub use ids::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{FinishBlocked, SessionError};
    pub use crate::ids::*;

    pub use crate::catalog::{ExerciseFilter, ExercisePage, Pagination};
    pub use crate::clock::{
        Clock, DurationClock, ManualClock, MemoryOriginStore, OriginStore, SessionClockState,
        SystemClock,
    };
    pub use crate::exercise::ExerciseRef;
    pub use crate::format::{format_clock, format_duration};
    pub use crate::ledger::{SetEntry, SetField, SetLedger};
    pub use crate::rest::{RestTimer, RestTimerMode, RestTimerSettings, RestTick};
    pub use crate::session::{SessionExercise, SessionStore, WorkoutSession};
    pub use crate::superset::{SupersetGroup, SupersetGroups};
}
