//! Superset grouping.
//!
//! Groups are pairwise disjoint and always hold at least two exercises. A
//! group that would drop below two members is discarded entirely.

use crate::ids::ExerciseId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Minimum members for a group to exist.
pub const MIN_GROUP_SIZE: usize = 2;

/// A set of exercises performed back-to-back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SupersetGroup(BTreeSet<ExerciseId>);

impl SupersetGroup {
    /// Whether the group contains an exercise.
    pub fn contains(&self, id: &ExerciseId) -> bool {
        self.0.contains(id)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over members in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ExerciseId> {
        self.0.iter()
    }

    /// Members as a list, for persistence.
    pub fn to_vec(&self) -> Vec<ExerciseId> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<ExerciseId> for SupersetGroup {
    fn from_iter<I: IntoIterator<Item = ExerciseId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered list of disjoint superset groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SupersetGroups {
    groups: Vec<SupersetGroup>,
}

impl SupersetGroups {
    /// Create with no groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted groups, restoring the invariants.
    ///
    /// Each group is applied through [`form_group`](Self::form_group) in
    /// order, so later groups win on overlap and undersized groups vanish.
    pub fn from_groups<I, G>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = ExerciseId>,
    {
        let mut result = Self::new();
        for group in groups {
            result.form_group(group);
        }
        result
    }

    /// Whether an exercise belongs to any group.
    pub fn is_grouped(&self, id: &ExerciseId) -> bool {
        self.groups.iter().any(|g| g.contains(id))
    }

    /// The group holding an exercise, if any.
    pub fn group_of(&self, id: &ExerciseId) -> Option<&SupersetGroup> {
        self.groups.iter().find(|g| g.contains(id))
    }

    /// Evict `ids` from their current groups, then add them as a new group
    /// if there are at least two.
    ///
    /// A single id simply ungroups that exercise.
    pub fn form_group<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ExerciseId>,
    {
        let new_group: SupersetGroup = ids.into_iter().collect();

        for group in &mut self.groups {
            group.0.retain(|id| !new_group.contains(id));
        }
        self.prune();

        if new_group.len() >= MIN_GROUP_SIZE {
            self.groups.push(new_group);
        }
    }

    /// Remove the whole group containing `id`, ungrouping every partner.
    ///
    /// Returns the dissolved group.
    pub fn dissolve_group_containing(&mut self, id: &ExerciseId) -> Option<SupersetGroup> {
        let pos = self.groups.iter().position(|g| g.contains(id))?;
        Some(self.groups.remove(pos))
    }

    /// Remove one exercise from whatever group holds it.
    pub fn drop_exercise(&mut self, id: &ExerciseId) -> bool {
        let mut removed = false;
        for group in &mut self.groups {
            removed |= group.0.remove(id);
        }
        self.prune();
        removed
    }

    /// Groups in creation order.
    pub fn groups(&self) -> &[SupersetGroup] {
        &self.groups
    }

    /// Groups as plain id lists, for persistence.
    pub fn to_lists(&self) -> Vec<Vec<ExerciseId>> {
        self.groups.iter().map(SupersetGroup::to_vec).collect()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Remove every group.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    fn prune(&mut self) {
        self.groups.retain(|g| g.len() >= MIN_GROUP_SIZE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<ExerciseId> {
        list.iter().map(|s| ExerciseId::new(*s)).collect()
    }

    fn assert_disjoint(groups: &SupersetGroups) {
        let mut seen = BTreeSet::new();
        for group in groups.groups() {
            assert!(group.len() >= MIN_GROUP_SIZE);
            for id in group.iter() {
                assert!(seen.insert(id.clone()), "{} in two groups", id);
            }
        }
    }

    #[test]
    fn test_form_group() {
        let mut groups = SupersetGroups::new();
        groups.form_group(ids(&["a", "b"]));

        assert!(groups.is_grouped(&"a".into()));
        assert!(groups.is_grouped(&"b".into()));
        assert!(!groups.is_grouped(&"c".into()));
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_form_group_evicts_and_discards_remnants() {
        let mut groups = SupersetGroups::new();
        groups.form_group(ids(&["a", "b"]));
        groups.form_group(ids(&["b", "c"]));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups.groups()[0].to_vec(), ids(&["b", "c"]));
        assert!(!groups.is_grouped(&"a".into()));
        assert_disjoint(&groups);
    }

    #[test]
    fn test_single_id_ungroups_without_forming() {
        let mut groups = SupersetGroups::new();
        groups.form_group(ids(&["a", "b", "c"]));
        groups.form_group(ids(&["c"]));

        assert_eq!(groups.len(), 1);
        assert!(!groups.is_grouped(&"c".into()));
        assert!(groups.is_grouped(&"a".into()));
    }

    #[test]
    fn test_dissolve_removes_every_partner() {
        let mut groups = SupersetGroups::new();
        groups.form_group(ids(&["a", "b", "c"]));
        groups.form_group(ids(&["d", "e"]));

        let dissolved = groups.dissolve_group_containing(&"b".into()).unwrap();
        assert_eq!(dissolved.len(), 3);
        for id in ["a", "b", "c"] {
            assert!(!groups.is_grouped(&id.into()));
        }
        assert!(groups.is_grouped(&"d".into()));
        assert!(groups.dissolve_group_containing(&"z".into()).is_none());
    }

    #[test]
    fn test_drop_exercise_prunes_singletons() {
        let mut groups = SupersetGroups::new();
        groups.form_group(ids(&["a", "b"]));
        groups.form_group(ids(&["c", "d", "e"]));

        assert!(groups.drop_exercise(&"a".into()));
        assert!(!groups.is_grouped(&"b".into()));

        assert!(groups.drop_exercise(&"c".into()));
        assert_eq!(groups.group_of(&"d".into()).unwrap().len(), 2);
        assert!(!groups.drop_exercise(&"zzz".into()));
        assert_disjoint(&groups);
    }

    #[test]
    fn test_from_groups_restores_invariants() {
        let groups = SupersetGroups::from_groups(vec![
            ids(&["a", "b"]),
            ids(&["c"]),
            ids(&["b", "d"]),
        ]);

        assert_eq!(groups.to_lists(), vec![ids(&["b", "d"])]);
        assert_disjoint(&groups);
    }

    #[test]
    fn test_disjoint_under_mixed_operations() {
        let mut groups = SupersetGroups::new();
        let ops: [(&str, &[&str]); 7] = [
            ("form", &["a", "b"]),
            ("form", &["c", "d", "e"]),
            ("form", &["e", "a"]),
            ("drop", &["d"]),
            ("form", &["b", "c", "f"]),
            ("dissolve", &["f"]),
            ("form", &["a", "e", "g"]),
        ];
        for (op, list) in ops {
            match op {
                "form" => groups.form_group(ids(list)),
                "drop" => {
                    groups.drop_exercise(&list[0].into());
                }
                _ => {
                    groups.dissolve_group_containing(&list[0].into());
                }
            }
            assert_disjoint(&groups);
        }
    }
}
