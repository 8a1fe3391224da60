//! Session store: the single source of truth for the active workout.
//!
//! Every mutation is synchronous and bumps [`SessionStore::revision`], which
//! is what a persistence layer watches to know a save is due. Elapsed-time
//! ticks only write the elapsed field and do not count as a mutation.

use crate::clock::DurationClock;
use crate::error::{FinishBlocked, SessionError};
use crate::exercise::ExerciseRef;
use crate::ids::ExerciseId;
use crate::ledger::{SetEntry, SetField, SetLedger};
use crate::superset::SupersetGroups;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An exercise with its sets, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionExercise {
    #[serde(flatten)]
    pub exercise: ExerciseRef,
    #[serde(default)]
    pub sets: Vec<SetEntry>,
}

/// The persisted form of an active workout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    /// Exercises in display order, each with its sets.
    #[serde(default)]
    pub exercises: Vec<SessionExercise>,
    /// Superset groups as id lists.
    #[serde(default)]
    pub superset_groups: Vec<Vec<ExerciseId>>,
    /// Elapsed seconds at the time of the save.
    #[serde(default, rename = "duration")]
    pub duration_secs: u64,
    /// When the workout started.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
}

impl WorkoutSession {
    /// Whether the session carries no exercises.
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

/// In-memory workout state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    exercises: Vec<ExerciseRef>,
    ledger: SetLedger,
    supersets: SupersetGroups,
    clock: DurationClock,
    elapsed_secs: u64,
    revision: u64,
}

impl SessionStore {
    /// Create an empty session around a clock.
    pub fn new(clock: DurationClock) -> Self {
        Self {
            exercises: Vec::new(),
            ledger: SetLedger::new(),
            supersets: SupersetGroups::new(),
            clock,
            elapsed_secs: 0,
            revision: 0,
        }
    }

    // ---- exercises ----

    /// Append exercises, each starting with a default set.
    ///
    /// An id already in the session has its reference overwritten in place
    /// (last write wins) and keeps its sets. Returns how many were new.
    pub fn add_exercises<I>(&mut self, list: I) -> usize
    where
        I: IntoIterator<Item = ExerciseRef>,
    {
        let mut added = 0;
        for exercise in list {
            match self.exercises.iter_mut().find(|e| e.id == exercise.id) {
                Some(existing) => *existing = exercise,
                None => {
                    self.ledger.ensure_default(&exercise.id);
                    self.exercises.push(exercise);
                    added += 1;
                }
            }
        }
        self.touch();
        added
    }

    /// Drop an exercise along with its sets and superset membership.
    pub fn remove_exercise(&mut self, id: &ExerciseId) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| &e.id != id);
        if self.exercises.len() == before {
            return false;
        }
        self.ledger.remove_exercise(id);
        self.supersets.drop_exercise(id);
        self.touch();
        true
    }

    /// Substitute an exercise in place.
    ///
    /// The replacement is a new exercise: the old sets and superset
    /// membership are dropped and it starts with a fresh default set.
    pub fn replace_exercise(&mut self, old: &ExerciseId, new: ExerciseRef) -> Result<(), SessionError> {
        let pos = self
            .position(old)
            .ok_or_else(|| SessionError::UnknownExercise(old.to_string()))?;

        if &new.id != old && self.contains(&new.id) {
            return Err(SessionError::DuplicateExercise(new.id.to_string()));
        }

        self.ledger.remove_exercise(old);
        self.supersets.drop_exercise(old);
        self.ledger.remove_exercise(&new.id);
        self.supersets.drop_exercise(&new.id);

        self.ledger.ensure_default(&new.id);
        self.exercises[pos] = new;
        self.touch();
        Ok(())
    }

    /// Replace the display order. `order` must be a permutation of the
    /// current exercise ids.
    pub fn reorder(&mut self, order: &[ExerciseId]) -> Result<(), SessionError> {
        if order.len() != self.exercises.len() {
            return Err(SessionError::InvalidOrder(format!(
                "expected {} ids, got {}",
                self.exercises.len(),
                order.len()
            )));
        }

        let mut seen = HashSet::with_capacity(order.len());
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            if !seen.insert(id) {
                return Err(SessionError::InvalidOrder(format!("{} listed twice", id)));
            }
            let exercise = self
                .exercises
                .iter()
                .find(|e| &e.id == id)
                .ok_or_else(|| SessionError::UnknownExercise(id.to_string()))?;
            reordered.push(exercise.clone());
        }

        self.exercises = reordered;
        self.touch();
        Ok(())
    }

    /// Move the exercise at `from` so it ends up at `to`.
    pub fn move_exercise(&mut self, from: usize, to: usize) -> Result<(), SessionError> {
        let len = self.exercises.len();
        if from >= len || to >= len {
            return Err(SessionError::InvalidOrder(format!(
                "move {} -> {} out of range for {} exercises",
                from, to, len
            )));
        }

        let mut order: Vec<ExerciseId> = self.exercises.iter().map(|e| e.id.clone()).collect();
        let moved = order.remove(from);
        order.insert(to, moved);
        self.reorder(&order)
    }

    // ---- sets ----

    /// Append a blank set. Returns its number, or `None` for an unknown
    /// exercise.
    pub fn add_set(&mut self, id: &ExerciseId) -> Option<u32> {
        if !self.contains(id) {
            return None;
        }
        let number = self.ledger.add_set(id);
        self.touch();
        Some(number)
    }

    /// Change one field of one set. Out-of-range updates are ignored.
    pub fn update_set(&mut self, id: &ExerciseId, index: usize, field: SetField) -> bool {
        let changed = self.ledger.update_field(id, index, field);
        if changed {
            self.touch();
        }
        changed
    }

    /// Flip a set's completed flag.
    pub fn toggle_set(&mut self, id: &ExerciseId, index: usize) -> bool {
        let changed = self.ledger.toggle_completed(id, index);
        if changed {
            self.touch();
        }
        changed
    }

    // ---- supersets ----

    /// Group exercises into a superset.
    ///
    /// Ids not in the session are ignored; fewer than two remaining ids
    /// just ungroups them.
    pub fn form_superset<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ExerciseId>,
    {
        let known: Vec<ExerciseId> = ids.into_iter().filter(|id| self.contains(id)).collect();
        self.supersets.form_group(known);
        self.touch();
    }

    /// Remove the whole superset containing `id`.
    pub fn dissolve_superset(&mut self, id: &ExerciseId) -> bool {
        let dissolved = self.supersets.dissolve_group_containing(id).is_some();
        if dissolved {
            self.touch();
        }
        dissolved
    }

    /// Whether `id` belongs to any superset.
    pub fn is_in_superset(&self, id: &ExerciseId) -> bool {
        self.supersets.is_grouped(id)
    }

    // ---- derived ----

    /// Completed sets as a percentage of all sets; 0 with no sets.
    pub fn progress(&self) -> f64 {
        let total = self.total_set_count();
        if total == 0 {
            return 0.0;
        }
        self.completed_set_count() as f64 / total as f64 * 100.0
    }

    /// Whether any set has a weight or rep count entered.
    pub fn has_logged_any_set(&self) -> bool {
        self.session_sets().any(SetEntry::has_values)
    }

    /// Pre-conditions for finishing, checked in order.
    pub fn check_finish(&self) -> Result<(), FinishBlocked> {
        if self.exercises.is_empty() {
            return Err(FinishBlocked::NoExercises);
        }
        if !self.has_logged_any_set() {
            return Err(FinishBlocked::NoSetValues);
        }
        Ok(())
    }

    /// Sets across every exercise.
    pub fn total_set_count(&self) -> usize {
        self.session_sets().count()
    }

    /// Sets marked completed.
    pub fn completed_set_count(&self) -> usize {
        self.session_sets().filter(|s| s.completed).count()
    }

    /// Sum of kg × reps over completed sets.
    pub fn volume_kg(&self) -> f64 {
        self.session_sets()
            .filter(|s| s.completed)
            .map(SetEntry::volume)
            .sum()
    }

    // ---- clock ----

    /// Resume or start the duration clock.
    pub fn mount_clock(&mut self) -> u64 {
        self.elapsed_secs = self.clock.mount();
        self.elapsed_secs
    }

    /// Start the clock from a known origin.
    pub fn start_clock(&mut self, origin: DateTime<Utc>) -> u64 {
        self.elapsed_secs = self.clock.start(origin);
        self.elapsed_secs
    }

    /// Refresh the elapsed field. Not a mutation.
    pub fn tick(&mut self) -> Option<u64> {
        let elapsed = self.clock.tick()?;
        self.elapsed_secs = elapsed;
        Some(elapsed)
    }

    /// The duration clock.
    pub fn clock(&self) -> &DurationClock {
        &self.clock
    }

    /// Mutable access to the duration clock.
    pub fn clock_mut(&mut self) -> &mut DurationClock {
        &mut self.clock
    }

    /// Elapsed seconds as of the last tick.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    // ---- persistence ----

    /// Persistable snapshot. Every exercise carries at least one set.
    pub fn snapshot(&self) -> WorkoutSession {
        let exercises = self
            .exercises
            .iter()
            .map(|exercise| {
                let sets = match self.ledger.get(&exercise.id) {
                    Some(sets) if !sets.is_empty() => sets.to_vec(),
                    _ => vec![SetEntry::blank(1)],
                };
                SessionExercise {
                    exercise: exercise.clone(),
                    sets,
                }
            })
            .collect();

        WorkoutSession {
            exercises,
            superset_groups: self.supersets.to_lists(),
            duration_secs: self.elapsed_secs,
            start_time: self.clock.origin(),
        }
    }

    /// Overwrite local state with a persisted session.
    ///
    /// The clock is left alone; callers decide how to treat the start time.
    pub fn hydrate(&mut self, session: WorkoutSession) {
        self.exercises.clear();
        self.ledger.clear();

        for entry in session.exercises {
            if self.contains(&entry.exercise.id) {
                continue;
            }
            self.ledger.replace_sets(&entry.exercise.id, entry.sets);
            self.exercises.push(entry.exercise);
        }

        let ids: Vec<ExerciseId> = self.exercise_ids();
        self.supersets = SupersetGroups::from_groups(
            session
                .superset_groups
                .into_iter()
                .map(|group| group.into_iter().filter(|id| ids.contains(id)).collect::<Vec<_>>()),
        );
        self.touch();
    }

    /// Empty the session and forget the start origin.
    pub fn clear(&mut self) {
        self.exercises.clear();
        self.ledger.clear();
        self.supersets.clear();
        self.clock.stop(true);
        self.elapsed_secs = 0;
        self.touch();
    }

    // ---- accessors ----

    /// Exercises in display order.
    pub fn exercises(&self) -> &[ExerciseRef] {
        &self.exercises
    }

    /// Exercise ids in display order.
    pub fn exercise_ids(&self) -> Vec<ExerciseId> {
        self.exercises.iter().map(|e| e.id.clone()).collect()
    }

    /// Look up an exercise by id.
    pub fn exercise(&self, id: &ExerciseId) -> Option<&ExerciseRef> {
        self.exercises.iter().find(|e| &e.id == id)
    }

    /// Sets of one exercise; empty for an unknown id.
    pub fn sets(&self, id: &ExerciseId) -> &[SetEntry] {
        self.ledger.get(id).unwrap_or(&[])
    }

    /// The set ledger.
    pub fn ledger(&self) -> &SetLedger {
        &self.ledger
    }

    /// The superset groups.
    pub fn supersets(&self) -> &SupersetGroups {
        &self.supersets
    }

    /// Whether `id` is in the session.
    pub fn contains(&self, id: &ExerciseId) -> bool {
        self.position(id).is_some()
    }

    /// Whether no exercises have been added.
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Monotonic mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn position(&self, id: &ExerciseId) -> Option<usize> {
        self.exercises.iter().position(|e| &e.id == id)
    }

    fn session_sets(&self) -> impl Iterator<Item = &SetEntry> {
        self.exercises.iter().flat_map(|e| self.sets(&e.id))
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
