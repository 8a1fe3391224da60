//! Start and inspect the active workout.

use std::time::Duration;

use anyhow::Result;
use console::Term;
use serde::Serialize;
use workout_core::format::format_duration;
use workout_core::session::WorkoutSession;
use workout_sync::{LoadOutcome, SyncCoordinator, SyncPhase};

use super::StatusArgs;
use crate::context::Context;
use crate::output::{format_kg, superset_badge};

/// Everything the status screen shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub phase: SyncPhase,
    pub elapsed_secs: u64,
    pub elapsed: String,
    pub progress: f64,
    pub completed_sets: usize,
    pub total_sets: usize,
    pub volume_kg: f64,
    pub session: WorkoutSession,
}

impl StatusView {
    pub fn capture(sync: &SyncCoordinator) -> Self {
        let phase = sync.phase();
        sync.read(|store| Self {
            phase,
            elapsed_secs: store.elapsed_secs(),
            elapsed: format_duration(store.elapsed_secs()),
            progress: store.progress(),
            completed_sets: store.completed_set_count(),
            total_sets: store.total_set_count(),
            volume_kg: store.volume_kg(),
            session: store.snapshot(),
        })
    }
}

/// Run the start command.
pub async fn start(ctx: &Context) -> Result<()> {
    let (sync, outcome) = ctx.open().await?;

    match outcome {
        LoadOutcome::Created => ctx.output.success("Workout started"),
        LoadOutcome::Resumed | LoadOutcome::AssignedStart => {
            ctx.output.info("Resuming the active workout")
        }
        LoadOutcome::Fallback | LoadOutcome::Discarded => {}
    }

    print_status(ctx, &StatusView::capture(&sync));
    ctx.close(&sync).await
}

/// Run the status command.
pub async fn status(args: StatusArgs, ctx: &Context) -> Result<()> {
    let Some(sync) = super::open_active(ctx).await? else {
        return Ok(());
    };
    print_status(ctx, &StatusView::capture(&sync));

    if args.follow && !ctx.output.is_json() {
        follow(&sync).await?;
    }
    ctx.close(&sync).await
}

/// Redraw the duration line once per second until Ctrl-C.
async fn follow(sync: &SyncCoordinator) -> Result<()> {
    let term = Term::stdout();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                term.clear_line()?;
                term.write_str(&format!("Duration: {}", format_duration(sync.elapsed_secs())))?;
            }
            _ = &mut ctrl_c => {
                term.write_line("")?;
                return Ok(());
            }
        }
    }
}

/// Render the session.
pub fn print_status(ctx: &Context, view: &StatusView) {
    if ctx.output.is_json() {
        ctx.output.json(view);
        return;
    }

    ctx.output.header("Active workout");
    ctx.output.kv("Duration", &view.elapsed);
    ctx.output.kv(
        "Sets",
        &format!("{}/{} completed", view.completed_sets, view.total_sets),
    );
    ctx.output.kv("Progress", &format!("{:.0}%", view.progress));
    ctx.output.kv("Volume", &format!("{} kg", format_kg(view.volume_kg)));

    if view.session.exercises.is_empty() {
        ctx.output.info("");
        ctx.output.info("No exercises yet. Use `workout catalog` and `workout add`.");
        return;
    }

    for (position, entry) in view.session.exercises.iter().enumerate() {
        let badge = view
            .session
            .superset_groups
            .iter()
            .position(|group| group.contains(&entry.exercise.id))
            .map(superset_badge)
            .unwrap_or_default();

        println!();
        println!(
            "  {}. {} ({}) {}",
            position + 1,
            entry.exercise.display_name(),
            entry.exercise.id,
            badge
        );
        ctx.output.set_table(&entry.sets);
    }
}
