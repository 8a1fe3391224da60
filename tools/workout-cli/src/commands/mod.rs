//! CLI command implementations.

pub mod catalog;
pub mod config;
pub mod exercise;
pub mod finish;
pub mod history;
pub mod rest;
pub mod session;
pub mod sets;
pub mod superset;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use workout_core::exercise::ExerciseRef;
use workout_core::ids::ExerciseId;
use workout_sync::{RemoteStore, SyncCoordinator};

use crate::context::Context;

/// Mount the active workout, or tell the user there is none.
pub(crate) async fn open_active(ctx: &Context) -> Result<Option<SyncCoordinator>> {
    match ctx.remote().get_active_session().await {
        Ok(None) => {
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({ "active": false }));
            } else {
                ctx.output
                    .info("No active workout. Run `workout start` to begin one.");
            }
            Ok(None)
        }
        Ok(Some(_)) | Err(_) => Ok(Some(ctx.open().await?.0)),
    }
}

/// Look catalog ids up, failing on the first unknown one.
pub(crate) async fn lookup_exercises(ctx: &Context, ids: &[String]) -> Result<Vec<ExerciseRef>> {
    let catalog = ctx.remote().catalog().await?;
    ids.iter()
        .map(|id| {
            let id = ExerciseId::new(id.as_str());
            match catalog.iter().find(|e| e.id == id) {
                Some(exercise) => Ok(exercise.clone()),
                None => bail!("Unknown exercise '{}'. See `workout catalog --search`.", id),
            }
        })
        .collect()
}

/// Parse a 1-based position into an index.
pub(crate) fn index_from(position: usize, what: &str) -> Result<usize> {
    match position.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("{} numbers start at 1", what),
    }
}

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Keep refreshing the duration until interrupted.
    #[arg(short, long)]
    pub follow: bool,
}

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Catalog ids of the exercises to add.
    #[arg(required = true)]
    pub exercises: Vec<String>,
}

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Exercise id.
    pub exercise: String,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the replace command.
#[derive(Args)]
pub struct ReplaceArgs {
    /// Exercise id to replace.
    pub exercise: String,

    /// Catalog id of the replacement.
    pub with: String,
}

/// Arguments for the move command.
#[derive(Args)]
pub struct MoveArgs {
    /// Current position (1-based).
    pub from: usize,

    /// New position (1-based).
    pub to: usize,
}

/// Arguments for the set command.
#[derive(Args)]
pub struct SetArgs {
    #[command(subcommand)]
    pub command: SetCommand,
}

#[derive(Subcommand)]
pub enum SetCommand {
    /// Append a blank set.
    Add {
        /// Exercise id.
        exercise: String,
    },
    /// Change the values of a set.
    Update {
        /// Exercise id.
        exercise: String,
        /// Set number (1-based).
        set: usize,
        /// Weight in kilograms.
        #[arg(long)]
        kg: Option<f64>,
        /// Repetitions.
        #[arg(long)]
        reps: Option<u32>,
        /// Value shown in the previous column.
        #[arg(long)]
        previous: Option<String>,
    },
    /// Tick a set off, or un-tick it.
    Done {
        /// Exercise id.
        exercise: String,
        /// Set number (1-based).
        set: usize,
    },
}

/// Arguments for the group command.
#[derive(Args)]
pub struct GroupArgs {
    /// Exercise ids to perform back-to-back.
    #[arg(required = true)]
    pub exercises: Vec<String>,
}

/// Arguments for the ungroup command.
#[derive(Args)]
pub struct UngroupArgs {
    /// Any member of the superset to dissolve.
    pub exercise: String,
}

/// Arguments for the finish command.
#[derive(Args)]
pub struct FinishArgs {
    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the discard command.
#[derive(Args)]
pub struct DiscardArgs {
    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Case-insensitive name search.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page number.
    #[arg(short, long, default_value = "1")]
    pub page: u32,

    /// Items per page.
    #[arg(short, long, default_value = "20")]
    pub limit: u32,
}

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    /// Show only the last N workouts.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the rest command.
#[derive(Args)]
pub struct RestArgs {
    /// Countdown length in seconds (overrides the configured default).
    #[arg(short, long)]
    pub secs: Option<u64>,

    /// Add this many steps to the countdown.
    #[arg(long, default_value = "0")]
    pub longer: u32,

    /// Remove this many steps from the countdown.
    #[arg(long, default_value = "0")]
    pub shorter: u32,

    /// Count up instead of down.
    #[arg(long)]
    pub stopwatch: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,

        /// Write workout.json instead of workout.toml.
        #[arg(long)]
        json: bool,
    },
    /// Check the configuration for values that cannot work.
    Validate,
}
