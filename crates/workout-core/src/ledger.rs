//! Set ledger: the logged sets of every exercise in a session.

use crate::ids::ExerciseId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder shown in the "previous" column when nothing is known.
pub const NO_PREVIOUS: &str = "-";

/// One logged attempt at an exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
    /// 1-based position within the exercise.
    pub set_number: u32,
    /// Last-known value for this set, or [`NO_PREVIOUS`].
    pub previous: String,
    /// Weight in kilograms.
    pub kg: f64,
    /// Repetitions.
    pub reps: u32,
    /// Whether the set has been ticked off.
    pub completed: bool,
}

impl SetEntry {
    /// A zero-value, incomplete set at the given position.
    pub fn blank(set_number: u32) -> Self {
        Self {
            set_number,
            previous: NO_PREVIOUS.to_string(),
            kg: 0.0,
            reps: 0,
            completed: false,
        }
    }

    /// Whether the user entered a weight or a rep count.
    pub fn has_values(&self) -> bool {
        self.kg > 0.0 || self.reps > 0
    }

    /// Weight moved in this set.
    pub fn volume(&self) -> f64 {
        self.kg * self.reps as f64
    }

    fn apply(&mut self, field: SetField) {
        match field {
            // Negative or non-finite input is stored as zero.
            SetField::Kg(kg) => self.kg = if kg.is_finite() { kg.max(0.0) } else { 0.0 },
            SetField::Reps(reps) => self.reps = reps,
            SetField::Completed(done) => self.completed = done,
            SetField::Previous(prev) => self.previous = prev,
        }
    }
}

/// A single field update on a set.
#[derive(Debug, Clone, PartialEq)]
pub enum SetField {
    Kg(f64),
    Reps(u32),
    Completed(bool),
    Previous(String),
}

/// Mapping from exercise to its ordered sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SetLedger {
    sets: HashMap<ExerciseId, Vec<SetEntry>>,
}

impl SetLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a blank first set if the exercise has none. Idempotent.
    ///
    /// Returns `true` if a set was inserted.
    pub fn ensure_default(&mut self, exercise_id: &ExerciseId) -> bool {
        let sets = self.sets.entry(exercise_id.clone()).or_default();
        if sets.is_empty() {
            sets.push(SetEntry::blank(1));
            true
        } else {
            false
        }
    }

    /// Append a blank set numbered after the current last one.
    pub fn add_set(&mut self, exercise_id: &ExerciseId) -> u32 {
        let sets = self.sets.entry(exercise_id.clone()).or_default();
        let number = sets.len() as u32 + 1;
        sets.push(SetEntry::blank(number));
        number
    }

    /// Replace one field of one set.
    ///
    /// Unknown exercises and out-of-range indices are ignored; returns
    /// whether anything changed.
    pub fn update_field(&mut self, exercise_id: &ExerciseId, index: usize, field: SetField) -> bool {
        match self.sets.get_mut(exercise_id).and_then(|s| s.get_mut(index)) {
            Some(set) => {
                set.apply(field);
                true
            }
            None => false,
        }
    }

    /// Flip the completed flag of one set.
    pub fn toggle_completed(&mut self, exercise_id: &ExerciseId, index: usize) -> bool {
        let current = match self.get(exercise_id).and_then(|s| s.get(index)) {
            Some(set) => set.completed,
            None => return false,
        };
        self.update_field(exercise_id, index, SetField::Completed(!current))
    }

    /// Delete an exercise's entire set list.
    pub fn remove_exercise(&mut self, exercise_id: &ExerciseId) -> Option<Vec<SetEntry>> {
        self.sets.remove(exercise_id)
    }

    /// Replace an exercise's sets wholesale (used when hydrating).
    ///
    /// An empty list still leaves the exercise with its default set.
    pub fn replace_sets(&mut self, exercise_id: &ExerciseId, sets: Vec<SetEntry>) {
        self.sets.insert(exercise_id.clone(), sets);
        self.ensure_default(exercise_id);
    }

    /// Sets logged for an exercise.
    pub fn get(&self, exercise_id: &ExerciseId) -> Option<&[SetEntry]> {
        self.sets.get(exercise_id).map(|s| s.as_slice())
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.sets.clear();
    }

    /// Number of exercises with an entry.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
