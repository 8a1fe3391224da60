//! End-to-end session flows against the in-memory remote store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use workout_core::prelude::*;
use workout_sync::prelude::*;
use workout_sync::RemoteOp;

struct Harness {
    remote: MemoryRemote,
    clock: ManualClock,
    origins: MemoryOriginStore,
    sync: SyncCoordinator,
}

fn harness() -> Harness {
    harness_with(MemoryRemote::new(), MemoryOriginStore::new())
}

fn harness_with(remote: MemoryRemote, origins: MemoryOriginStore) -> Harness {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
    let duration = DurationClock::new(Arc::new(clock.clone()), Arc::new(origins.clone()));
    let sync = SyncCoordinator::new(Arc::new(remote.clone()), duration, SyncConfig::default());
    Harness {
        remote,
        clock,
        origins,
        sync,
    }
}

fn ex(id: &str) -> ExerciseRef {
    ExerciseRef::new(id, id.to_uppercase())
}

fn id(s: &str) -> ExerciseId {
    ExerciseId::new(s)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn test_finish_gates_then_succeeds() {
    let h = harness();
    h.sync.mount().await;
    settle().await;

    let err = h.sync.finish().await.unwrap_err();
    assert_eq!(err.finish_blocked(), Some(FinishBlocked::NoExercises));
    assert_eq!(err.to_string(), "Cannot finish workout: Add an exercise");

    h.sync.add_exercises(vec![ex("a")]).unwrap();
    let err = h.sync.finish().await.unwrap_err();
    assert_eq!(err.finish_blocked(), Some(FinishBlocked::NoSetValues));
    assert_eq!(h.remote.finish_calls(), 0);

    h.sync
        .update(|s| s.update_set(&id("a"), 0, SetField::Kg(20.0)))
        .unwrap();
    let summary = h.sync.finish().await.unwrap();

    assert_eq!(h.remote.finish_calls(), 1);
    assert_eq!(summary.session.exercises.len(), 1);
    assert_eq!(h.remote.finished().len(), 1);
    assert_eq!(h.remote.finished()[0].exercises[0].sets[0].kg, 20.0);

    assert_eq!(h.sync.phase(), SyncPhase::Idle);
    assert!(h.sync.read(|s| s.is_empty()));
    assert!(h.origins.load().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_debounced_save_fires_once_with_final_state() {
    let h = harness();
    h.sync.mount().await;
    settle().await;
    let baseline = h.remote.save_count();

    h.sync.add_exercises(vec![ex("a")]).unwrap();
    for kg in [10.0, 20.0, 30.0, 40.0] {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.sync
            .update(|s| s.update_set(&id("a"), 0, SetField::Kg(kg)))
            .unwrap();
    }
    assert_eq!(h.remote.save_count(), baseline);

    tokio::time::sleep(Duration::from_millis(600)).await;

    let saves = h.remote.saves();
    assert_eq!(saves.len(), baseline + 1);
    let last = saves.last().unwrap();
    assert_eq!(last.exercises[0].sets[0].kg, 40.0);
    assert_eq!(last, &h.sync.snapshot());
}

#[tokio::test(start_paused = true)]
async fn test_failed_save_retried_on_next_mutation() {
    let h = harness();
    h.sync.mount().await;
    settle().await;
    let baseline = h.remote.save_count();

    h.remote.set_failing(RemoteOp::Save, true);
    h.sync.add_exercises(vec![ex("a")]).unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.remote.save_count(), baseline);

    h.remote.set_failing(RemoteOp::Save, false);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.remote.save_count(), baseline);

    h.sync.add_exercises(vec![ex("b")]).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.remote.save_count(), baseline + 1);
    assert_eq!(h.remote.active().unwrap().exercises.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_resume_from_remote_start_without_tick() {
    let remote = MemoryRemote::new();
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() - chrono::Duration::seconds(125);
    remote.set_active(Some(WorkoutSession {
        exercises: vec![SessionExercise {
            exercise: ex("a"),
            sets: vec![SetEntry::blank(1)],
        }],
        start_time: Some(start),
        ..Default::default()
    }));
    let h = harness_with(remote, MemoryOriginStore::new());

    assert_eq!(h.sync.mount().await, LoadOutcome::Resumed);
    assert_eq!(h.sync.elapsed_secs(), 125);
    assert_eq!(h.origins.load(), Some(start.timestamp_millis().to_string()));

    h.clock.advance(chrono::Duration::seconds(5));
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(h.sync.elapsed_secs(), 130);
}

#[tokio::test(start_paused = true)]
async fn test_resume_from_stored_origin_when_load_fails() {
    let remote = MemoryRemote::new();
    remote.set_failing(RemoteOp::Load, true);
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let origins = MemoryOriginStore::with_raw((now - chrono::Duration::seconds(125)).timestamp_millis().to_string());
    let h = harness_with(remote, origins);

    assert_eq!(h.sync.mount().await, LoadOutcome::Fallback);
    assert_eq!(h.sync.elapsed_secs(), 125);
    assert_eq!(h.sync.phase(), SyncPhase::Active);

    settle().await;
    assert_eq!(h.remote.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_new_session_is_pushed_with_origin() {
    let h = harness();
    assert_eq!(h.sync.mount().await, LoadOutcome::Created);
    h.sync.drain().await;

    let pushed = h.remote.active().unwrap();
    assert!(pushed.exercises.is_empty());
    assert_eq!(pushed.start_time, Some(h.clock.now()));
}

#[tokio::test(start_paused = true)]
async fn test_missing_start_time_is_assigned_and_saved() {
    let remote = MemoryRemote::new();
    remote.set_active(Some(WorkoutSession {
        exercises: vec![SessionExercise {
            exercise: ex("a"),
            sets: Vec::new(),
        }],
        ..Default::default()
    }));
    let h = harness_with(remote, MemoryOriginStore::new());

    assert_eq!(h.sync.mount().await, LoadOutcome::AssignedStart);
    settle().await;

    assert_eq!(h.remote.active().unwrap().start_time, Some(h.clock.now()));
    assert!(h.origins.load().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_superset_regrouping_scenario() {
    let h = harness();
    h.sync.mount().await;
    h.sync.add_exercises(vec![ex("a"), ex("b"), ex("c")]).unwrap();

    h.sync.update(|s| s.form_superset([id("a"), id("b")])).unwrap();
    h.sync.update(|s| s.form_superset([id("b"), id("c")])).unwrap();

    let snapshot = h.sync.snapshot();
    assert_eq!(snapshot.superset_groups, vec![vec![id("b"), id("c")]]);
    assert!(!h.sync.read(|s| s.is_in_superset(&id("a"))));
}

#[tokio::test(start_paused = true)]
async fn test_session_changed_signal_reloads_after_delay() {
    let h = harness();
    h.sync.mount().await;
    h.sync.add_exercises(vec![ex("a")]).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Another view writes the record directly and announces it.
    let mut written = h.remote.active().unwrap();
    written.exercises.push(SessionExercise {
        exercise: ex("z"),
        sets: vec![SetEntry::blank(1)],
    });
    h.remote.set_active(Some(written));
    h.sync.signals().notify_session_changed();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.sync.read(|s| s.exercises().len()), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.sync.read(|s| s.exercise_ids()), vec![id("a"), id("z")]);
}

#[tokio::test(start_paused = true)]
async fn test_reload_overwrites_unsaved_local_edits() {
    let h = harness();
    h.sync.mount().await;
    h.sync.add_exercises(vec![ex("a")]).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    h.sync.add_exercises(vec![ex("b")]).unwrap();
    assert!(h.sync.handle_signal(SyncSignal::Focus).await);

    assert_eq!(h.sync.read(|s| s.exercise_ids()), vec![id("a")]);
}

#[tokio::test(start_paused = true)]
async fn test_discard_clears_even_when_remote_fails() {
    let h = harness();
    h.sync.mount().await;
    h.sync.add_exercises(vec![ex("a")]).unwrap();

    h.remote.set_failing(RemoteOp::Discard, true);
    let outcome = h.sync.discard().await.unwrap();

    assert!(!outcome.remote_confirmed());
    assert_eq!(outcome.redirect, "/workout");
    assert_eq!(h.remote.discard_calls(), 1);
    assert!(h.sync.read(|s| s.is_empty()));
    assert!(h.origins.load().is_none());
    assert_eq!(h.sync.phase(), SyncPhase::Idle);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!h.remote.saves().iter().any(|s| !s.exercises.is_empty()));
}

#[tokio::test(start_paused = true)]
async fn test_picker_replaces_pending_exercise() {
    let h = harness();
    h.sync.mount().await;
    h.sync.add_exercises(vec![ex("a"), ex("b")]).unwrap();

    h.sync.request_replacement(id("a")).unwrap();
    assert_eq!(h.sync.apply_picked(vec![ex("x"), ex("y")]).unwrap(), 1);
    assert_eq!(h.sync.read(|s| s.exercise_ids()), vec![id("x"), id("b")]);
    assert!(!h.sync.replacement().is_pending());

    assert_eq!(h.sync.apply_picked(vec![ex("y")]).unwrap(), 1);
    assert_eq!(h.sync.read(|s| s.exercise_ids()), vec![id("x"), id("b"), id("y")]);
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_save_survives_shutdown() {
    let h = harness();
    h.sync.mount().await;
    settle().await;
    let baseline = h.remote.save_count();

    h.remote.set_latency(Duration::from_millis(300));
    h.sync.add_exercises(vec![ex("a")]).unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(h.sync.is_saving());

    h.sync.shutdown();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.remote.save_count(), baseline + 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_save() {
    let h = harness();
    h.sync.mount().await;
    settle().await;
    let baseline = h.remote.save_count();

    h.sync.add_exercises(vec![ex("a")]).unwrap();
    h.sync.shutdown();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(h.remote.save_count(), baseline);
}

#[tokio::test(start_paused = true)]
async fn test_finish_waits_for_save_in_flight() {
    let h = harness();
    h.sync.mount().await;
    settle().await;

    h.sync.add_exercises(vec![ex("a")]).unwrap();
    h.sync
        .update(|s| s.update_set(&id("a"), 0, SetField::Reps(8)))
        .unwrap();
    h.remote.set_latency(Duration::from_millis(300));
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(h.sync.is_saving());

    h.remote.set_latency(Duration::ZERO);
    h.sync.finish().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(h.remote.finished().len(), 1);
    assert_eq!(h.remote.finished()[0].exercises[0].sets[0].reps, 8);
    assert!(h.remote.active().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_discard_waits_for_save_in_flight() {
    let h = harness();
    h.sync.mount().await;
    settle().await;

    h.sync.add_exercises(vec![ex("a")]).unwrap();
    h.remote.set_latency(Duration::from_millis(300));
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(h.sync.is_saving());

    h.remote.set_latency(Duration::ZERO);
    let outcome = h.sync.discard().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(outcome.remote_confirmed());
    assert_eq!(h.remote.discard_calls(), 1);
    assert!(h.remote.active().is_none());
}
