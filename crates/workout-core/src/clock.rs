//! Duration clock: elapsed time since a persisted start origin.
//!
//! The origin is stored through an [`OriginStore`] so a reloaded view resumes
//! the same count instead of restarting at zero. The clock itself never
//! ticks; a runtime calls [`DurationClock::tick`] once per interval.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to (for tests and replays).
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }

    /// Jump to an instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *lock(&self.now) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

/// Persistent slot for the session's start origin.
///
/// Values are raw strings (epoch milliseconds) so that a corrupted entry can
/// be detected and treated as absent.
pub trait OriginStore: Send + Sync {
    /// Read the stored origin, if any.
    fn load(&self) -> Option<String>;

    /// Overwrite the stored origin.
    fn store(&self, raw: &str);

    /// Forget the stored origin.
    fn clear(&self);
}

/// In-memory origin store.
#[derive(Debug, Clone, Default)]
pub struct MemoryOriginStore {
    value: Arc<Mutex<Option<String>>>,
}

impl MemoryOriginStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a raw value.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }
}

impl OriginStore for MemoryOriginStore {
    fn load(&self) -> Option<String> {
        lock(&self.value).clone()
    }

    fn store(&self, raw: &str) {
        *lock(&self.value) = Some(raw.to_string());
    }

    fn clear(&self) {
        *lock(&self.value) = None;
    }
}

/// Explicit clock state owned by the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionClockState {
    /// When the workout started.
    pub origin: Option<DateTime<Utc>>,
    /// Whether ticks are being produced.
    pub running: bool,
}

/// Converts a start origin into elapsed seconds.
#[derive(Clone)]
pub struct DurationClock {
    state: SessionClockState,
    clock: Arc<dyn Clock>,
    origins: Arc<dyn OriginStore>,
}

impl std::fmt::Debug for DurationClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurationClock")
            .field("state", &self.state)
            .finish()
    }
}

impl DurationClock {
    /// Create a stopped clock with no origin.
    pub fn new(clock: Arc<dyn Clock>, origins: Arc<dyn OriginStore>) -> Self {
        Self {
            state: SessionClockState::default(),
            clock,
            origins,
        }
    }

    /// Resume from the stored origin, or start one now if none is stored.
    ///
    /// Returns the elapsed seconds immediately so the first readout does not
    /// wait for a tick.
    pub fn mount(&mut self) -> u64 {
        match self.stored_origin() {
            Some(origin) => self.state.origin = Some(origin),
            None => {
                let now = self.clock.now();
                self.persist(now);
                self.state.origin = Some(now);
            }
        }
        self.state.running = true;
        self.elapsed_secs()
    }

    /// Record `origin` persistently and start ticking.
    pub fn start(&mut self, origin: DateTime<Utc>) -> u64 {
        self.persist(origin);
        self.state.origin = Some(origin);
        self.state.running = true;
        self.elapsed_secs()
    }

    /// Halt ticking; with `reset` the origin is forgotten as well.
    pub fn stop(&mut self, reset: bool) {
        self.state.running = false;
        if reset {
            self.state.origin = None;
            self.origins.clear();
        }
    }

    /// Seconds since the origin, floored; zero without an origin.
    pub fn elapsed_secs(&self) -> u64 {
        match self.state.origin {
            Some(origin) => {
                let millis = (self.clock.now() - origin).num_milliseconds();
                (millis.max(0) / 1000) as u64
            }
            None => 0,
        }
    }

    /// Elapsed seconds for one tick, or `None` while stopped.
    pub fn tick(&self) -> Option<u64> {
        if self.state.running {
            Some(self.elapsed_secs())
        } else {
            None
        }
    }

    /// Stored origin, ignoring missing or unparseable entries.
    pub fn stored_origin(&self) -> Option<DateTime<Utc>> {
        let raw = self.origins.load()?;
        let millis = raw.trim().parse::<i64>().ok()?;
        DateTime::from_timestamp_millis(millis)
    }

    /// The current instant according to the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current origin.
    pub fn origin(&self) -> Option<DateTime<Utc>> {
        self.state.origin
    }

    /// Whether ticks are being produced.
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Snapshot of the clock state.
    pub fn state(&self) -> SessionClockState {
        self.state
    }

    fn persist(&self, origin: DateTime<Utc>) {
        self.origins.store(&origin.timestamp_millis().to_string());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture() -> (ManualClock, MemoryOriginStore) {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        (ManualClock::new(start), MemoryOriginStore::new())
    }

    #[test]
    fn test_mount_without_origin_starts_now() {
        let (clock, origins) = fixture();
        let mut duration = DurationClock::new(Arc::new(clock.clone()), Arc::new(origins.clone()));

        assert_eq!(duration.mount(), 0);
        assert!(duration.is_running());
        assert_eq!(
            origins.load(),
            Some(clock.now().timestamp_millis().to_string())
        );

        clock.advance(Duration::seconds(3));
        assert_eq!(duration.tick(), Some(3));
    }

    #[test]
    fn test_mount_resumes_stored_origin_immediately() {
        let (clock, _) = fixture();
        let origin = clock.now() - Duration::seconds(125);
        let origins = MemoryOriginStore::with_raw(origin.timestamp_millis().to_string());
        let mut duration = DurationClock::new(Arc::new(clock), Arc::new(origins));

        assert_eq!(duration.mount(), 125);
    }

    #[test]
    fn test_unparseable_origin_is_treated_as_absent() {
        let (clock, _) = fixture();
        let origins = MemoryOriginStore::with_raw("not-a-number");
        let mut duration = DurationClock::new(Arc::new(clock.clone()), Arc::new(origins.clone()));

        assert_eq!(duration.mount(), 0);
        assert_eq!(duration.origin(), Some(clock.now()));
        assert_eq!(
            origins.load(),
            Some(clock.now().timestamp_millis().to_string())
        );
    }

    #[test]
    fn test_stop_keeps_origin_unless_reset() {
        let (clock, origins) = fixture();
        let mut duration = DurationClock::new(Arc::new(clock.clone()), Arc::new(origins.clone()));
        duration.mount();
        clock.advance(Duration::seconds(10));

        duration.stop(false);
        assert_eq!(duration.tick(), None);
        assert_eq!(duration.elapsed_secs(), 10);
        assert!(origins.load().is_some());

        duration.stop(true);
        assert_eq!(duration.elapsed_secs(), 0);
        assert!(origins.load().is_none());
    }

    #[test]
    fn test_origin_in_future_reads_zero() {
        let (clock, origins) = fixture();
        let mut duration = DurationClock::new(Arc::new(clock.clone()), Arc::new(origins));
        duration.start(clock.now() + Duration::seconds(30));
        assert_eq!(duration.elapsed_secs(), 0);
    }

    #[test]
    fn test_elapsed_is_floored() {
        let (clock, origins) = fixture();
        let mut duration = DurationClock::new(Arc::new(clock.clone()), Arc::new(origins));
        duration.start(clock.now());
        clock.advance(Duration::milliseconds(1999));
        assert_eq!(duration.elapsed_secs(), 1);
    }
}
