//! Remote store contract and an in-memory implementation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use workout_core::catalog::{ExerciseFilter, ExercisePage};
use workout_core::exercise::ExerciseRef;
use workout_core::session::WorkoutSession;

use crate::error::{RemoteError, RemoteResult};
use crate::lock;

/// Authoritative record of the active workout, shared by every view.
///
/// There is a single active session per user; writes are last-write-wins.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the active session, if one exists.
    async fn get_active_session(&self) -> RemoteResult<Option<WorkoutSession>>;

    /// Overwrite the active session.
    async fn save_session(&self, session: &WorkoutSession) -> RemoteResult<()>;

    /// Close the active session as a completed workout.
    async fn finish_session(&self) -> RemoteResult<()>;

    /// Throw the active session away.
    async fn discard_session(&self) -> RemoteResult<()>;

    /// Page through the exercise catalog.
    async fn list_exercises(&self, filter: &ExerciseFilter) -> RemoteResult<ExercisePage>;
}

/// Remote operations, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    Load,
    Save,
    Finish,
    Discard,
    List,
}

#[derive(Debug, Default)]
struct MemoryState {
    active: Option<WorkoutSession>,
    finished: Vec<WorkoutSession>,
    saves: Vec<WorkoutSession>,
    catalog: Vec<ExerciseRef>,
    failing: HashSet<RemoteOp>,
    finish_calls: usize,
    discard_calls: usize,
    latency: Duration,
}

/// In-memory remote store.
///
/// Records every call so tests can assert on what reached the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRemote {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a catalog.
    pub fn with_catalog(catalog: Vec<ExerciseRef>) -> Self {
        let remote = Self::new();
        lock(&remote.state).catalog = catalog;
        remote
    }

    /// Seed the active session.
    pub fn set_active(&self, session: Option<WorkoutSession>) {
        lock(&self.state).active = session;
    }

    /// Make an operation fail (or succeed again).
    pub fn set_failing(&self, op: RemoteOp, failing: bool) {
        let mut state = lock(&self.state);
        if failing {
            state.failing.insert(op);
        } else {
            state.failing.remove(&op);
        }
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        lock(&self.state).latency = latency;
    }

    /// The stored active session.
    pub fn active(&self) -> Option<WorkoutSession> {
        lock(&self.state).active.clone()
    }

    /// Every successfully saved payload, oldest first.
    pub fn saves(&self) -> Vec<WorkoutSession> {
        lock(&self.state).saves.clone()
    }

    pub fn save_count(&self) -> usize {
        lock(&self.state).saves.len()
    }

    /// Completed workouts.
    pub fn finished(&self) -> Vec<WorkoutSession> {
        lock(&self.state).finished.clone()
    }

    pub fn finish_calls(&self) -> usize {
        lock(&self.state).finish_calls
    }

    pub fn discard_calls(&self) -> usize {
        lock(&self.state).discard_calls
    }

    async fn enter(&self, op: RemoteOp) -> RemoteResult<()> {
        let latency = lock(&self.state).latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if lock(&self.state).failing.contains(&op) {
            return Err(RemoteError::Unavailable(format!("{:?} failed", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn get_active_session(&self) -> RemoteResult<Option<WorkoutSession>> {
        self.enter(RemoteOp::Load).await?;
        Ok(lock(&self.state).active.clone())
    }

    async fn save_session(&self, session: &WorkoutSession) -> RemoteResult<()> {
        self.enter(RemoteOp::Save).await?;
        let mut state = lock(&self.state);
        state.active = Some(session.clone());
        state.saves.push(session.clone());
        Ok(())
    }

    async fn finish_session(&self) -> RemoteResult<()> {
        lock(&self.state).finish_calls += 1;
        self.enter(RemoteOp::Finish).await?;
        let mut state = lock(&self.state);
        let session = state
            .active
            .take()
            .ok_or_else(|| RemoteError::Rejected("no active session".to_string()))?;
        state.finished.push(session);
        Ok(())
    }

    async fn discard_session(&self) -> RemoteResult<()> {
        lock(&self.state).discard_calls += 1;
        self.enter(RemoteOp::Discard).await?;
        lock(&self.state).active = None;
        Ok(())
    }

    async fn list_exercises(&self, filter: &ExerciseFilter) -> RemoteResult<ExercisePage> {
        self.enter(RemoteOp::List).await?;
        Ok(filter.apply(&lock(&self.state).catalog))
    }
}
