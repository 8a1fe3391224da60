//! Add, remove, replace and reorder exercises.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use workout_core::ids::ExerciseId;

use super::{index_from, lookup_exercises, open_active, AddArgs, MoveArgs, RemoveArgs, ReplaceArgs};
use crate::context::Context;

/// Run the add command.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let picked = lookup_exercises(ctx, &args.exercises).await?;
    let Some(sync) = open_active(ctx).await? else {
        return Ok(());
    };

    let result = sync.add_exercises(picked);
    let closed = ctx.close(&sync).await;
    let added = result?;
    closed?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "added": added }));
    } else {
        ctx.output.success(&format!(
            "Added {} exercise{}",
            added,
            if added == 1 { "" } else { "s" }
        ));
    }
    Ok(())
}

/// Run the remove command.
pub async fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let Some(sync) = open_active(ctx).await? else {
        return Ok(());
    };
    let id = ExerciseId::new(args.exercise);

    let Some(name) = sync.read(|s| s.exercise(&id).map(|e| e.display_name())) else {
        ctx.close(&sync).await?;
        bail!("Exercise '{}' is not in this workout", id);
    };

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove {} and its sets?", name))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.info("Kept");
            return ctx.close(&sync).await;
        }
    }

    let result = sync.update(|s| s.remove_exercise(&id));
    ctx.close(&sync).await?;
    result?;
    ctx.output.success(&format!("Removed {}", name));
    Ok(())
}

/// Run the replace command.
///
/// Goes through the replacement slot the way the picker does, so the new
/// exercise lands at the old one's position with fresh sets.
pub async fn replace(args: ReplaceArgs, ctx: &Context) -> Result<()> {
    let picked = lookup_exercises(ctx, std::slice::from_ref(&args.with)).await?;
    let Some(sync) = open_active(ctx).await? else {
        return Ok(());
    };

    let result = sync
        .request_replacement(ExerciseId::new(args.exercise.as_str()))
        .and_then(|()| sync.apply_picked(picked));
    if result.is_err() {
        sync.replacement().clear();
    }
    ctx.close(&sync).await?;
    result?;

    ctx.output
        .success(&format!("Replaced {} with {}", args.exercise, args.with));
    Ok(())
}

/// Run the move command.
pub async fn move_exercise(args: MoveArgs, ctx: &Context) -> Result<()> {
    let from = index_from(args.from, "Exercise")?;
    let to = index_from(args.to, "Exercise")?;
    let Some(sync) = open_active(ctx).await? else {
        return Ok(());
    };

    let result = sync.update(|s| s.move_exercise(from, to));
    ctx.close(&sync).await?;
    result??;

    ctx.output
        .success(&format!("Moved exercise {} to position {}", args.from, args.to));
    Ok(())
}
