//! Finish and discard.

use anyhow::Result;
use dialoguer::Confirm;
use workout_core::format::format_duration;

use super::{open_active, DiscardArgs, FinishArgs};
use crate::context::Context;
use crate::output::format_kg;

/// Run the finish command.
pub async fn finish(args: FinishArgs, ctx: &Context) -> Result<()> {
    let Some(sync) = open_active(ctx).await? else {
        return Ok(());
    };

    // Surface the gate as a notice rather than an error exit.
    if let Err(blocked) = sync.read(|s| s.check_finish()) {
        ctx.output.warn(&blocked.to_string());
        return ctx.close(&sync).await;
    }

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt("Finish this workout?")
            .default(true)
            .interact()?;
        if !confirmed {
            return ctx.close(&sync).await;
        }
    }

    sync.drain().await;
    let result = sync.finish().await;
    ctx.close(&sync).await?;
    let summary = result?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "finished": true,
            "duration": summary.session.duration_secs,
            "completedSets": summary.completed_sets,
            "totalSets": summary.total_sets,
            "volumeKg": summary.volume_kg,
        }));
        return Ok(());
    }

    ctx.output.success("Workout finished");
    ctx.output
        .kv("Duration", &format_duration(summary.session.duration_secs));
    ctx.output.kv("Exercises", &summary.session.exercises.len().to_string());
    ctx.output.kv(
        "Sets",
        &format!("{}/{} completed", summary.completed_sets, summary.total_sets),
    );
    ctx.output
        .kv("Volume", &format!("{} kg", format_kg(summary.volume_kg)));
    Ok(())
}

/// Run the discard command.
pub async fn discard(args: DiscardArgs, ctx: &Context) -> Result<()> {
    let Some(sync) = open_active(ctx).await? else {
        return Ok(());
    };

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt("Discard this workout? This cannot be undone.")
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Kept");
            return ctx.close(&sync).await;
        }
    }

    sync.drain().await;
    let result = sync.discard().await;
    ctx.close(&sync).await?;
    let outcome = result?;
    tracing::debug!(redirect = outcome.redirect, "discard complete");

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "discarded": true,
            "remoteConfirmed": outcome.remote_confirmed(),
        }));
        return Ok(());
    }

    if let Err(e) = &outcome.remote {
        ctx.output.warn(&format!(
            "Local workout cleared, but the stored copy may remain: {}",
            e
        ));
    } else {
        ctx.output.success("Workout discarded");
    }
    Ok(())
}
