//! Exercise references.

use crate::ids::ExerciseId;
use serde::{Deserialize, Serialize};

/// Equipment tags that are never appended to a display name.
const UNLISTED_EQUIPMENT: [&str; 2] = ["bodyweight", "other"];

/// An exercise as fetched from the catalog.
///
/// The catalog owns these; a session only references them and never mutates
/// one in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRef {
    /// Catalog identifier.
    #[serde(rename = "_id")]
    pub id: ExerciseId,
    /// Display name.
    pub name: String,
    /// Equipment tag (e.g. "barbell", "dumbbell").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    /// Thumbnail image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Demonstration media URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl ExerciseRef {
    /// Create a reference with only an id and a name.
    pub fn new(id: impl Into<ExerciseId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            equipment: None,
            thumbnail_url: None,
            media_url: None,
        }
    }

    /// Set the equipment tag.
    pub fn with_equipment(mut self, equipment: impl Into<String>) -> Self {
        self.equipment = Some(equipment.into());
        self
    }

    /// Set the thumbnail URL.
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Name with the equipment in parentheses, e.g. `"Bench Press (Barbell)"`.
    ///
    /// Bodyweight and "other" equipment are left out, as is equipment the
    /// name already mentions.
    pub fn display_name(&self) -> String {
        let Some(equipment) = self.equipment.as_deref().filter(|e| !e.is_empty()) else {
            return self.name.clone();
        };

        if UNLISTED_EQUIPMENT.contains(&equipment)
            || self.name.to_lowercase().contains(&equipment.to_lowercase())
        {
            return self.name.clone();
        }

        let mut chars = equipment.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{} ({})", self.name, capitalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_appends_equipment() {
        let ex = ExerciseRef::new("bench", "Bench Press").with_equipment("barbell");
        assert_eq!(ex.display_name(), "Bench Press (Barbell)");
    }

    #[test]
    fn test_display_name_skips_bodyweight_and_other() {
        let push_up = ExerciseRef::new("pu", "Push Up").with_equipment("bodyweight");
        let misc = ExerciseRef::new("m", "Sled Push").with_equipment("other");
        assert_eq!(push_up.display_name(), "Push Up");
        assert_eq!(misc.display_name(), "Sled Push");
    }

    #[test]
    fn test_display_name_skips_equipment_already_in_name() {
        let ex = ExerciseRef::new("db", "Dumbbell Fly").with_equipment("dumbbell");
        assert_eq!(ex.display_name(), "Dumbbell Fly");
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = r#"{"_id":"sq","name":"Squat","equipment":"barbell","thumbnailUrl":"t.png"}"#;
        let ex: ExerciseRef = serde_json::from_str(json).unwrap();
        assert_eq!(ex.id.as_str(), "sq");
        assert_eq!(ex.thumbnail_url.as_deref(), Some("t.png"));
        assert!(ex.media_url.is_none());
    }
}
