//! Sync coordinator: keeps the in-memory session and the remote record in
//! step.
//!
//! Mutations apply synchronously to the [`SessionStore`] under a lock that is
//! never held across an await, then schedule a debounced background save.
//! Remote calls only happen at load, save, finish and discard. A reload
//! overwrites local state unconditionally (last write wins).

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use workout_core::clock::DurationClock;
use workout_core::exercise::ExerciseRef;
use workout_core::session::{SessionStore, WorkoutSession};
use workout_core::{ExerciseId, SessionError};

use crate::config::SyncConfig;
use crate::debounce::Debouncer;
use crate::error::{RemoteError, RemoteResult, SyncError};
use crate::handoff::ReplacementSlot;
use crate::lock;
use crate::remote::RemoteStore;
use crate::signal::{SignalBus, SyncSignal, Visibility};
use crate::ticker::spawn_ticker;

/// Where the caller is sent after a discard.
pub const DISCARD_REDIRECT: &str = "/workout";

/// Lifecycle of the coordinated session.
///
/// Saving is not a phase: saves run in the background while `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    /// No session is held.
    Idle,
    /// The first load is in flight.
    Loading,
    /// A session is open for editing.
    Active,
    /// A finish call is in flight.
    Finishing,
    /// A discard call is in flight.
    Discarding,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Active => write!(f, "active"),
            Self::Finishing => write!(f, "finishing"),
            Self::Discarding => write!(f, "discarding"),
        }
    }
}

/// How a load resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Hydrated from the remote record, clock resumed from its start.
    Resumed,
    /// Hydrated from a remote record that had no start; one was assigned.
    AssignedStart,
    /// No remote record; a new empty session was started and pushed.
    Created,
    /// The load failed; local state was kept.
    Fallback,
    /// The coordinator was shut down or busy; the result was dropped.
    Discarded,
}

/// What was finished.
#[derive(Debug, Clone)]
pub struct FinishSummary {
    /// The session as it stood when finish was requested.
    pub session: WorkoutSession,
    pub completed_sets: usize,
    pub total_sets: usize,
    pub volume_kg: f64,
}

/// Result of a discard. Local state is cleared either way.
#[derive(Debug, Clone)]
pub struct DiscardOutcome {
    /// The remote call's result.
    pub remote: RemoteResult<()>,
    /// Where the caller should navigate.
    pub redirect: &'static str,
}

impl DiscardOutcome {
    pub fn remote_confirmed(&self) -> bool {
        self.remote.is_ok()
    }
}

struct State {
    session: SessionStore,
    phase: SyncPhase,
    visibility: Visibility,
    mounted: bool,
}

struct Inner {
    state: Mutex<State>,
    remote: Arc<dyn RemoteStore>,
    config: SyncConfig,
    bus: SignalBus,
    debouncer: Debouncer,
    replacement: ReplacementSlot,
    saves_in_flight: AtomicUsize,
    saves_idle: Notify,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        for task in lock(&self.tasks).drain(..) {
            task.abort();
        }
    }
}

/// Owns the active session and drives its persistence.
///
/// Cheap to clone; clones share the same session. All methods must be
/// called from within a tokio runtime.
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("phase", &self.phase())
            .field("saves_in_flight", &self.inner.saves_in_flight.load(Ordering::SeqCst))
            .field("config", &self.inner.config)
            .finish()
    }
}

impl SyncCoordinator {
    /// Create an idle coordinator with its own signal bus.
    pub fn new(remote: Arc<dyn RemoteStore>, clock: DurationClock, config: SyncConfig) -> Self {
        let bus = SignalBus::new(config.signal_capacity);
        Self::with_bus(remote, clock, config, bus)
    }

    /// Create an idle coordinator listening on a shared signal bus.
    pub fn with_bus(
        remote: Arc<dyn RemoteStore>,
        clock: DurationClock,
        config: SyncConfig,
        bus: SignalBus,
    ) -> Self {
        let debouncer = Debouncer::new(config.debounce());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    session: SessionStore::new(clock),
                    phase: SyncPhase::Idle,
                    visibility: Visibility::Visible,
                    mounted: false,
                }),
                remote,
                config,
                bus,
                debouncer,
                replacement: ReplacementSlot::new(),
                saves_in_flight: AtomicUsize::new(0),
                saves_idle: Notify::new(),
                tasks: Mutex::new(Vec::new()),
                background: Mutex::new(Vec::new()),
            }),
        }
    }

    // ---- lifecycle ----

    /// Enter the workout view: load the active session, then start the
    /// duration ticker and the signal listener.
    pub async fn mount(&self) -> LoadOutcome {
        {
            let mut state = self.state();
            state.mounted = true;
            if state.phase == SyncPhase::Idle {
                state.phase = SyncPhase::Loading;
            }
        }

        let outcome = self.reload().await;
        self.spawn_background();
        outcome
    }

    /// Leave the workout view.
    ///
    /// Stops the ticker, the pending save timer and the signal listener.
    /// In-flight remote calls run to completion; load results arriving
    /// afterwards are dropped.
    pub fn shutdown(&self) {
        let tasks: Vec<JoinHandle<()>> = lock(&self.inner.tasks).drain(..).collect();
        for task in tasks {
            task.abort();
        }
        self.inner.debouncer.cancel();

        let mut state = self.state();
        state.mounted = false;
        state.phase = SyncPhase::Idle;
        state.session.clock_mut().stop(false);
        debug!("sync coordinator shut down");
    }

    /// Fetch the active session and overwrite local state with it.
    pub async fn reload(&self) -> LoadOutcome {
        let result = self.call(self.inner.remote.get_active_session()).await;

        let (outcome, push) = {
            let mut state = self.state();
            if !state.mounted {
                debug!("view unmounted, dropping load result");
                return LoadOutcome::Discarded;
            }
            if matches!(state.phase, SyncPhase::Finishing | SyncPhase::Discarding) {
                debug!(phase = %state.phase, "session closing, dropping load result");
                return LoadOutcome::Discarded;
            }

            let mut push = None;
            let outcome = match result {
                Ok(Some(remote)) => {
                    let start = remote.start_time;
                    let exercises = remote.exercises.len();
                    state.session.hydrate(remote);

                    let outcome = match start {
                        Some(origin) => {
                            state.session.start_clock(origin);
                            LoadOutcome::Resumed
                        }
                        None => {
                            let now = state.session.clock().now();
                            state.session.start_clock(now);
                            push = Some(self.begin_save(&state));
                            LoadOutcome::AssignedStart
                        }
                    };
                    info!(exercises, ?outcome, "active session loaded");
                    outcome
                }
                Ok(None) => {
                    state.session.hydrate(WorkoutSession::default());
                    state.session.mount_clock();
                    push = Some(self.begin_save(&state));
                    info!("no active session, starting a new one");
                    LoadOutcome::Created
                }
                Err(e) => {
                    warn!(error = %e, "failed to load active session, keeping local state");
                    match state.session.clock().stored_origin() {
                        Some(origin) => {
                            state.session.start_clock(origin);
                        }
                        None => {
                            state.session.mount_clock();
                            push = Some(self.begin_save(&state));
                        }
                    }
                    LoadOutcome::Fallback
                }
            };
            state.phase = SyncPhase::Active;
            (outcome, push)
        };

        if let Some(snapshot) = push {
            let this = self.clone();
            let handle = tokio::spawn(async move {
                let _ = this.send(snapshot).await;
            });
            let mut background = lock(&self.inner.background);
            background.retain(|task| !task.is_finished());
            background.push(handle);
        }
        outcome
    }

    /// React to an external change notification.
    ///
    /// Returns whether a reload was applied.
    pub async fn handle_signal(&self, signal: SyncSignal) -> bool {
        let should_reload = {
            let mut state = self.state();
            let active = state.mounted && state.phase == SyncPhase::Active;
            match signal {
                SyncSignal::VisibilityChange { state: next } => {
                    let previous = std::mem::replace(&mut state.visibility, next);
                    active && previous == Visibility::Hidden && next == Visibility::Visible
                }
                SyncSignal::Focus | SyncSignal::SessionChanged => active,
            }
        };
        if !should_reload {
            return false;
        }

        if signal == SyncSignal::SessionChanged {
            tokio::time::sleep(self.inner.config.external_reload_delay()).await;
        }
        debug!(?signal, "reloading after external change");
        self.reload().await != LoadOutcome::Discarded
    }

    // ---- mutation ----

    /// Apply a mutation to the session.
    ///
    /// Any change schedules a debounced save.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut SessionStore) -> R) -> Result<R, SyncError> {
        let (result, changed) = {
            let mut state = self.state();
            if state.phase != SyncPhase::Active {
                return Err(SyncError::NotActive(state.phase));
            }
            let before = state.session.revision();
            let result = mutate(&mut state.session);
            (result, state.session.revision() != before)
        };

        if changed {
            self.schedule_save();
        }
        Ok(result)
    }

    /// Append exercises from the catalog.
    pub fn add_exercises(&self, exercises: Vec<ExerciseRef>) -> Result<usize, SyncError> {
        self.update(|session| session.add_exercises(exercises))
    }

    /// Open the picker in replace mode for `id`.
    pub fn request_replacement(&self, id: ExerciseId) -> Result<(), SyncError> {
        let known = self.read(|session| session.contains(&id));
        if !known {
            return Err(SessionError::UnknownExercise(id.to_string()).into());
        }
        self.inner.replacement.set(id);
        Ok(())
    }

    /// Apply the picker's selection.
    ///
    /// With a replacement pending, the first picked exercise replaces it;
    /// otherwise everything picked is appended. Returns how many exercises
    /// entered the session.
    pub fn apply_picked(&self, picked: Vec<ExerciseRef>) -> Result<usize, SyncError> {
        match self.inner.replacement.take() {
            Some(old) => {
                let Some(first) = picked.into_iter().next() else {
                    debug!(exercise = %old, "picker closed without a replacement");
                    return Ok(0);
                };
                self.update(|session| session.replace_exercise(&old, first))??;
                Ok(1)
            }
            None => self.add_exercises(picked),
        }
    }

    // ---- persistence ----

    /// Save now instead of waiting for the quiet interval.
    ///
    /// Returns whether anything was sent.
    pub async fn flush(&self) -> Result<bool, SyncError> {
        self.inner.debouncer.cancel();
        {
            let state = self.state();
            if state.phase != SyncPhase::Active {
                return Err(SyncError::NotActive(state.phase));
            }
        }
        Ok(self.save_current().await?)
    }

    /// Wait for fire-and-forget pushes started by a load to complete.
    pub async fn drain(&self) {
        let pending: Vec<JoinHandle<()>> = lock(&self.inner.background).drain(..).collect();
        for task in pending {
            if let Err(e) = task.await {
                warn!(error = %e, "background push did not complete");
            }
        }
    }

    /// Finish the workout.
    ///
    /// Blocked unless there is at least one exercise and one set with a
    /// value. On remote failure the local session is left untouched and the
    /// error returned.
    pub async fn finish(&self) -> Result<FinishSummary, SyncError> {
        let summary = {
            let mut state = self.state();
            if state.phase != SyncPhase::Active {
                return Err(SyncError::NotActive(state.phase));
            }
            state.session.check_finish()?;
            state.phase = SyncPhase::Finishing;
            FinishSummary {
                session: state.session.snapshot(),
                completed_sets: state.session.completed_set_count(),
                total_sets: state.session.total_set_count(),
                volume_kg: state.session.volume_kg(),
            }
        };

        // Unsaved edits go out before the session is closed, and saves
        // already sent must land first or they would reopen it.
        let pending = self.inner.debouncer.cancel();
        self.wait_for_saves().await;
        let result = if pending {
            match self.push(summary.session.clone()).await {
                Ok(()) => self.call(self.inner.remote.finish_session()).await,
                Err(e) => Err(e),
            }
        } else {
            self.call(self.inner.remote.finish_session()).await
        };

        match result {
            Ok(()) => {
                let mut state = self.state();
                state.session.clear();
                state.phase = SyncPhase::Idle;
                info!(
                    duration_secs = summary.session.duration_secs,
                    completed_sets = summary.completed_sets,
                    "workout finished"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "failed to finish workout, keeping local session");
                self.state().phase = SyncPhase::Active;
                self.schedule_save();
                Err(e.into())
            }
        }
    }

    /// Throw the workout away.
    ///
    /// Local state and the stored origin are cleared even when the remote
    /// call fails, so a stuck session can always be left.
    pub async fn discard(&self) -> Result<DiscardOutcome, SyncError> {
        {
            let mut state = self.state();
            if state.phase != SyncPhase::Active {
                return Err(SyncError::NotActive(state.phase));
            }
            state.phase = SyncPhase::Discarding;
        }
        self.inner.debouncer.cancel();
        self.wait_for_saves().await;

        let remote = self.call(self.inner.remote.discard_session()).await;
        if let Err(e) = &remote {
            error!(error = %e, "failed to discard workout remotely, clearing local session anyway");
        }

        let mut state = self.state();
        state.session.clear();
        state.phase = SyncPhase::Idle;
        info!(remote_confirmed = remote.is_ok(), "workout discarded");

        Ok(DiscardOutcome {
            remote,
            redirect: DISCARD_REDIRECT,
        })
    }

    // ---- accessors ----

    /// Read the session.
    pub fn read<R>(&self, view: impl FnOnce(&SessionStore) -> R) -> R {
        view(&self.state().session)
    }

    pub fn snapshot(&self) -> WorkoutSession {
        self.read(SessionStore::snapshot)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.read(SessionStore::elapsed_secs)
    }

    pub fn phase(&self) -> SyncPhase {
        self.state().phase
    }

    /// Whether a save is being sent right now.
    pub fn is_saving(&self) -> bool {
        self.inner.saves_in_flight.load(Ordering::SeqCst) > 0
    }

    /// Whether a debounced save is waiting to fire.
    pub fn has_pending_save(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// The bus this coordinator listens on.
    pub fn signals(&self) -> &SignalBus {
        &self.inner.bus
    }

    pub fn replacement(&self) -> &ReplacementSlot {
        &self.inner.replacement
    }

    // ---- internals ----

    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.inner.state)
    }

    fn schedule_save(&self) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.debouncer.schedule(move || async move {
            if let Some(inner) = weak.upgrade() {
                // Failures are logged; the next mutation retries.
                let _ = SyncCoordinator { inner }.save_current().await;
            }
        });
    }

    /// Snapshot at send time and save, skipping empty sessions.
    async fn save_current(&self) -> RemoteResult<bool> {
        let snapshot = {
            let state = self.state();
            if !state.mounted || state.phase != SyncPhase::Active {
                return Ok(false);
            }
            if state.session.is_empty() {
                debug!("no exercises yet, skipping save");
                return Ok(false);
            }
            self.begin_save(&state)
        };
        self.send(snapshot).await.map(|()| true)
    }

    /// Count a save as in flight and snapshot it.
    ///
    /// Taken under the state lock so a save either starts before a phase
    /// change to finishing or discarding, or not at all.
    fn begin_save(&self, state: &State) -> WorkoutSession {
        self.inner.saves_in_flight.fetch_add(1, Ordering::SeqCst);
        state.session.snapshot()
    }

    async fn push(&self, snapshot: WorkoutSession) -> RemoteResult<()> {
        self.inner.saves_in_flight.fetch_add(1, Ordering::SeqCst);
        self.send(snapshot).await
    }

    /// Send a save already counted by [`begin_save`](Self::begin_save).
    async fn send(&self, snapshot: WorkoutSession) -> RemoteResult<()> {
        let _in_flight = InFlight(self.inner.as_ref());
        let result = self.call(self.inner.remote.save_session(&snapshot)).await;

        match &result {
            Ok(()) => debug!(
                exercises = snapshot.exercises.len(),
                duration_secs = snapshot.duration_secs,
                "session saved"
            ),
            Err(e) => warn!(error = %e, "failed to save session"),
        }
        result
    }

    /// Wait until no save is in flight.
    async fn wait_for_saves(&self) {
        loop {
            let idle = self.inner.saves_idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();
            if self.inner.saves_in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            debug!("waiting for in-flight saves");
            idle.await;
        }
    }

    async fn call<T>(&self, fut: impl Future<Output = RemoteResult<T>>) -> RemoteResult<T> {
        with_timeout(self.inner.config.request_timeout(), fut).await
    }

    fn spawn_background(&self) {
        let mut tasks = lock(&self.inner.tasks);
        if !tasks.is_empty() || !self.state().mounted {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        tasks.push(spawn_ticker(self.inner.config.tick_interval(), move || {
            match weak.upgrade() {
                Some(inner) => {
                    lock(&inner.state).session.tick();
                    true
                }
                None => false,
            }
        }));

        let mut signals = self.inner.bus.subscribe();
        let weak = Arc::downgrade(&self.inner);
        tasks.push(tokio::spawn(async move {
            loop {
                let signal = match signals.recv().await {
                    Ok(signal) => signal,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "signal listener lagged, reloading");
                        SyncSignal::SessionChanged
                    }
                    Err(RecvError::Closed) => break,
                };
                let Some(inner) = weak.upgrade() else { break };
                SyncCoordinator { inner }.handle_signal(signal).await;
            }
        }));
    }
}

/// Releases one counted save when dropped, even if the send was cancelled.
struct InFlight<'a>(&'a Inner);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.0.saves_in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.saves_idle.notify_waiters();
        }
    }
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = RemoteResult<T>>,
) -> RemoteResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryRemote, RemoteOp};
    use chrono::{TimeZone, Utc};
    use workout_core::clock::{ManualClock, MemoryOriginStore};
    use workout_core::ledger::SetField;

    fn coordinator(remote: &MemoryRemote) -> SyncCoordinator {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
        let duration = DurationClock::new(Arc::new(clock), Arc::new(MemoryOriginStore::new()));
        SyncCoordinator::new(Arc::new(remote.clone()), duration, SyncConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_requires_active_session() {
        let remote = MemoryRemote::new();
        let sync = coordinator(&remote);

        let err = sync.add_exercises(vec![ExerciseRef::new("a", "A")]).unwrap_err();
        assert!(matches!(err, SyncError::NotActive(SyncPhase::Idle)));

        assert_eq!(sync.mount().await, LoadOutcome::Created);
        assert_eq!(sync.phase(), SyncPhase::Active);
        assert_eq!(sync.add_exercises(vec![ExerciseRef::new("a", "A")]).unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_session_is_not_saved_by_debounce() {
        let remote = MemoryRemote::new();
        let sync = coordinator(&remote);
        sync.mount().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let baseline = remote.save_count();

        sync.add_exercises(vec![ExerciseRef::new("a", "A")]).unwrap();
        sync.update(|s| s.remove_exercise(&"a".into())).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(remote.save_count(), baseline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_finish_keeps_session_and_reschedules_save() {
        let remote = MemoryRemote::new();
        let sync = coordinator(&remote);
        sync.mount().await;
        sync.add_exercises(vec![ExerciseRef::new("a", "A")]).unwrap();
        sync.update(|s| s.update_set(&"a".into(), 0, SetField::Reps(5))).unwrap();

        remote.set_failing(RemoteOp::Finish, true);
        let err = sync.finish().await.unwrap_err();
        assert!(matches!(err, SyncError::Remote(_)));
        assert_eq!(sync.phase(), SyncPhase::Active);
        assert_eq!(sync.read(|s| s.exercises().len()), 1);
        assert!(sync.has_pending_save());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_timeout() {
        let remote = MemoryRemote::new();
        remote.set_latency(Duration::from_secs(60));
        let sync = coordinator(&remote);

        assert_eq!(sync.mount().await, LoadOutcome::Fallback);
        assert_eq!(sync.phase(), SyncPhase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_then_visible_reloads() {
        let remote = MemoryRemote::new();
        let sync = coordinator(&remote);
        sync.mount().await;

        let hidden = SyncSignal::VisibilityChange { state: Visibility::Hidden };
        let visible = SyncSignal::VisibilityChange { state: Visibility::Visible };

        assert!(!sync.handle_signal(visible).await);
        assert!(!sync.handle_signal(hidden).await);
        assert!(sync.handle_signal(visible).await);
        assert!(sync.handle_signal(SyncSignal::Focus).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_late_load() {
        let remote = MemoryRemote::new();
        let sync = coordinator(&remote);
        sync.mount().await;

        remote.set_latency(Duration::from_millis(200));
        let reloading = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.reload().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        sync.shutdown();

        assert_eq!(reloading.await.unwrap(), LoadOutcome::Discarded);
        assert_eq!(sync.phase(), SyncPhase::Idle);
    }
}
