//! Finished workout history.

use anyhow::{Context as _, Result};
use workout_core::format::format_duration;

use super::HistoryArgs;
use crate::context::Context;
use crate::output::format_kg;

/// Run the history command.
pub async fn run(args: HistoryArgs, ctx: &Context) -> Result<()> {
    let mut history = ctx
        .remote()
        .history()
        .await
        .context("Failed to read workout history")?;
    history.reverse();
    if let Some(limit) = args.limit {
        history.truncate(limit);
    }

    if ctx.output.is_json() {
        ctx.output.json(&history);
        return Ok(());
    }

    ctx.output.header("Workout history");
    if history.is_empty() {
        ctx.output.info("No finished workouts yet");
        return Ok(());
    }

    let widths = [17, 9, 10, 6, 10];
    ctx.output
        .table_row(&["FINISHED", "DURATION", "EXERCISES", "SETS", "VOLUME"], &widths);
    for workout in &history {
        let sets = workout.session.exercises.iter().map(|e| e.sets.len()).sum::<usize>();
        let volume: f64 = workout
            .session
            .exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .map(|s| s.volume())
            .sum();

        ctx.output.table_row(
            &[
                &workout.finished_at.format("%Y-%m-%d %H:%M").to_string(),
                &format_duration(workout.session.duration_secs),
                &workout.session.exercises.len().to_string(),
                &sets.to_string(),
                &format!("{} kg", format_kg(volume)),
            ],
            &widths,
        );
    }
    Ok(())
}
