//! Hand-off between the session view and the exercise picker.

use std::sync::{Arc, Mutex};

use workout_core::ExerciseId;

use crate::lock;

/// Holds the id of the exercise the user asked to replace while the picker
/// is open. Consumed exactly once.
#[derive(Debug, Clone, Default)]
pub struct ReplacementSlot {
    pending: Arc<Mutex<Option<ExerciseId>>>,
}

impl ReplacementSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as pending replacement, overwriting any earlier mark.
    pub fn set(&self, id: ExerciseId) {
        tracing::debug!(exercise = %id, "replacement pending");
        *lock(&self.pending) = Some(id);
    }

    /// The pending id, without consuming it.
    pub fn peek(&self) -> Option<ExerciseId> {
        lock(&self.pending).clone()
    }

    /// Consume the pending id.
    pub fn take(&self) -> Option<ExerciseId> {
        lock(&self.pending).take()
    }

    pub fn clear(&self) {
        *lock(&self.pending) = None;
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes() {
        let slot = ReplacementSlot::new();
        slot.set("bench".into());

        let shared = slot.clone();
        assert_eq!(shared.peek(), Some(ExerciseId::new("bench")));
        assert_eq!(shared.take(), Some(ExerciseId::new("bench")));
        assert!(!slot.is_pending());
        assert_eq!(slot.take(), None);
    }
}
