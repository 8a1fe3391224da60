//! Superset commands.

use anyhow::{bail, Result};
use workout_core::ids::ExerciseId;

use super::{open_active, GroupArgs, UngroupArgs};
use crate::context::Context;

/// Run the group command.
pub async fn group(args: GroupArgs, ctx: &Context) -> Result<()> {
    let Some(sync) = open_active(ctx).await? else {
        return Ok(());
    };
    let ids: Vec<ExerciseId> = args.exercises.into_iter().map(ExerciseId::new).collect();

    let unknown: Vec<String> = sync.read(|s| {
        ids.iter()
            .filter(|id| !s.contains(id))
            .map(ToString::to_string)
            .collect()
    });
    if !unknown.is_empty() {
        ctx.close(&sync).await?;
        bail!("Not in this workout: {}", unknown.join(", "));
    }

    let result = sync.update(|s| {
        s.form_superset(ids.iter().cloned());
        ids.iter().all(|id| s.is_in_superset(id))
    });
    ctx.close(&sync).await?;

    if result? {
        ctx.output.success(&format!("Grouped {} exercises", ids.len()));
    } else {
        ctx.output
            .warn("A superset needs at least two exercises; the group was not kept");
    }
    Ok(())
}

/// Run the ungroup command.
pub async fn ungroup(args: UngroupArgs, ctx: &Context) -> Result<()> {
    let Some(sync) = open_active(ctx).await? else {
        return Ok(());
    };
    let id = ExerciseId::new(args.exercise);

    let result = sync.update(|s| s.dissolve_superset(&id));
    ctx.close(&sync).await?;

    if result? {
        ctx.output.success("Superset dissolved");
    } else {
        ctx.output.info(&format!("{} is not in a superset", id));
    }
    Ok(())
}
