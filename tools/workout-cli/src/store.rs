//! File-backed remote store and origin store.
//!
//! Layout under the data directory:
//!
//! ```text
//! active.json    the active session (absent when none)
//! history.json   finished workouts, oldest first
//! catalog.json   exercise catalog (built-in list when absent)
//! origin         start origin in epoch milliseconds
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use workout_core::catalog::{ExerciseFilter, ExercisePage};
use workout_core::clock::OriginStore;
use workout_core::exercise::ExerciseRef;
use workout_core::session::WorkoutSession;
use workout_sync::{RemoteError, RemoteResult, RemoteStore};

const ACTIVE_FILE: &str = "active.json";
const HISTORY_FILE: &str = "history.json";
const CATALOG_FILE: &str = "catalog.json";
const ORIGIN_FILE: &str = "origin";

/// A finished workout as kept in the history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedWorkout {
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub session: WorkoutSession,
}

/// Remote store persisted as JSON files.
#[derive(Debug, Clone)]
pub struct FileRemote {
    dir: PathBuf,
}

impl FileRemote {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Finished workouts, oldest first.
    pub async fn history(&self) -> RemoteResult<Vec<FinishedWorkout>> {
        Ok(read_json(&self.path(HISTORY_FILE)).await?.unwrap_or_default())
    }

    /// The whole catalog.
    pub async fn catalog(&self) -> RemoteResult<Vec<ExerciseRef>> {
        Ok(read_json(&self.path(CATALOG_FILE))
            .await?
            .unwrap_or_else(default_catalog))
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    async fn remove_active(&self) -> RemoteResult<()> {
        match tokio::fs::remove_file(self.path(ACTIVE_FILE)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&self.path(ACTIVE_FILE), e)),
        }
    }
}

#[async_trait]
impl RemoteStore for FileRemote {
    async fn get_active_session(&self) -> RemoteResult<Option<WorkoutSession>> {
        read_json(&self.path(ACTIVE_FILE)).await
    }

    async fn save_session(&self, session: &WorkoutSession) -> RemoteResult<()> {
        write_json(&self.path(ACTIVE_FILE), session).await
    }

    async fn finish_session(&self) -> RemoteResult<()> {
        let session: WorkoutSession = read_json(&self.path(ACTIVE_FILE))
            .await?
            .ok_or_else(|| RemoteError::Rejected("no active session".to_string()))?;

        let mut history = self.history().await?;
        history.push(FinishedWorkout {
            finished_at: Utc::now(),
            session,
        });
        write_json(&self.path(HISTORY_FILE), &history).await?;
        self.remove_active().await
    }

    async fn discard_session(&self) -> RemoteResult<()> {
        self.remove_active().await
    }

    async fn list_exercises(&self, filter: &ExerciseFilter) -> RemoteResult<ExercisePage> {
        Ok(filter.apply(&self.catalog().await?))
    }
}

/// Start origin persisted in a small text file.
#[derive(Debug, Clone)]
pub struct FileOriginStore {
    path: PathBuf,
}

impl FileOriginStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(ORIGIN_FILE),
        }
    }
}

impl OriginStore for FileOriginStore {
    fn load(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn store(&self, raw: &str) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&self.path, raw) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to store start origin");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to clear start origin")
            }
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> RemoteResult<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}

/// Write through a temp file so a crash never leaves half a record.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> RemoteResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| io_error(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: std::io::Error) -> RemoteError {
    RemoteError::Unavailable(format!("{}: {}", path.display(), e))
}

/// Catalog used until a catalog.json is provided.
pub fn default_catalog() -> Vec<ExerciseRef> {
    [
        ("bench-press", "Bench Press", "barbell"),
        ("incline-db-press", "Incline Dumbbell Press", "dumbbell"),
        ("squat", "Squat", "barbell"),
        ("front-squat", "Front Squat", "barbell"),
        ("deadlift", "Deadlift", "barbell"),
        ("romanian-deadlift", "Romanian Deadlift", "barbell"),
        ("overhead-press", "Overhead Press", "barbell"),
        ("lateral-raise", "Lateral Raise", "dumbbell"),
        ("pull-up", "Pull Up", "bodyweight"),
        ("push-up", "Push Up", "bodyweight"),
        ("seated-row", "Seated Row", "cable"),
        ("lat-pulldown", "Lat Pulldown", "cable"),
        ("bicep-curl", "Bicep Curl", "dumbbell"),
        ("tricep-pushdown", "Tricep Pushdown", "cable"),
        ("leg-press", "Leg Press", "machine"),
        ("leg-curl", "Leg Curl", "machine"),
        ("calf-raise", "Calf Raise", "machine"),
        ("plank", "Plank", "bodyweight"),
        ("hip-thrust", "Hip Thrust", "barbell"),
        ("face-pull", "Face Pull", "cable"),
        ("kettlebell-swing", "Kettlebell Swing", "kettlebell"),
    ]
    .into_iter()
    .map(|(id, name, equipment)| ExerciseRef::new(id, name).with_equipment(equipment))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("workout-{}-{}-{}", name, std::process::id(), nanos))
    }

    #[tokio::test]
    async fn test_save_finish_history() {
        let dir = scratch_dir("finish");
        let remote = FileRemote::new(&dir);
        assert!(remote.get_active_session().await.unwrap().is_none());

        let session = WorkoutSession {
            duration_secs: 42,
            ..Default::default()
        };
        remote.save_session(&session).await.unwrap();
        assert_eq!(remote.get_active_session().await.unwrap(), Some(session));

        remote.finish_session().await.unwrap();
        assert!(remote.get_active_session().await.unwrap().is_none());
        let history = remote.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].session.duration_secs, 42);

        assert!(matches!(
            remote.finish_session().await,
            Err(RemoteError::Rejected(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_corrupt_active_file_is_malformed() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(ACTIVE_FILE), "{not json").unwrap();

        let remote = FileRemote::new(&dir);
        assert!(matches!(
            remote.get_active_session().await,
            Err(RemoteError::Malformed(_))
        ));
        remote.discard_session().await.unwrap();
        assert!(remote.get_active_session().await.unwrap().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_default_catalog_search() {
        let remote = FileRemote::new(scratch_dir("catalog"));
        let page = remote
            .list_exercises(&ExerciseFilter::new().with_search("squat"))
            .await
            .unwrap();
        let ids: Vec<&str> = page.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["squat", "front-squat"]);
    }

    #[test]
    fn test_origin_store_roundtrip() {
        let dir = scratch_dir("origin");
        let origins = FileOriginStore::new(&dir);
        assert!(origins.load().is_none());

        origins.store("1740819600000");
        assert_eq!(origins.load().as_deref(), Some("1740819600000"));

        origins.clear();
        assert!(origins.load().is_none());
        origins.clear();
        let _ = std::fs::remove_dir_all(&dir);
    }
}
