//! Set ledger commands.

use anyhow::{bail, Result};
use workout_core::ids::ExerciseId;
use workout_core::ledger::SetField;
use workout_core::rest::RestTimer;
use workout_sync::SyncCoordinator;

use super::{index_from, open_active, SetArgs, SetCommand};
use crate::context::Context;
use crate::output::format_kg;

/// Run the set command.
pub async fn run(args: SetArgs, ctx: &Context) -> Result<()> {
    let Some(sync) = open_active(ctx).await? else {
        return Ok(());
    };
    let result = apply(args.command, ctx, &sync);
    ctx.close(&sync).await?;

    let mut timer = RestTimer::new(ctx.config.rest_timer.clone());
    if result? == Outcome::Completed && !ctx.output.is_json() && timer.on_set_completed() {
        super::rest::watch(timer, ctx).await?;
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Changed,
    Completed,
}

fn apply(command: SetCommand, ctx: &Context, sync: &SyncCoordinator) -> Result<Outcome> {
    match command {
        SetCommand::Add { exercise } => {
            let id = ExerciseId::new(exercise);
            match sync.update(|s| s.add_set(&id))? {
                Some(number) => ctx.output.success(&format!("Added set {} to {}", number, id)),
                None => bail!("Exercise '{}' is not in this workout", id),
            }
        }
        SetCommand::Update {
            exercise,
            set,
            kg,
            reps,
            previous,
        } => {
            let id = ExerciseId::new(exercise);
            let index = index_from(set, "Set")?;

            let mut fields = Vec::new();
            if let Some(kg) = kg {
                if !kg.is_finite() || kg < 0.0 {
                    bail!("Weight must be a non-negative number");
                }
                fields.push(SetField::Kg(kg));
            }
            if let Some(reps) = reps {
                fields.push(SetField::Reps(reps));
            }
            if let Some(previous) = previous {
                fields.push(SetField::Previous(previous));
            }
            if fields.is_empty() {
                bail!("Nothing to update; pass --kg, --reps or --previous");
            }

            let updated = sync.update(|s| {
                fields
                    .into_iter()
                    .all(|field| s.update_set(&id, index, field))
            })?;
            if !updated {
                bail!("Set {} of '{}' does not exist", set, id);
            }

            let summary = sync.read(|s| {
                s.sets(&id)
                    .get(index)
                    .map(|entry| format!("{} kg x {}", format_kg(entry.kg), entry.reps))
            });
            ctx.output.success(&format!(
                "Set {} of {}: {}",
                set,
                id,
                summary.unwrap_or_default()
            ));
        }
        SetCommand::Done { exercise, set } => {
            let id = ExerciseId::new(exercise);
            let index = index_from(set, "Set")?;
            if !sync.update(|s| s.toggle_set(&id, index))? {
                bail!("Set {} of '{}' does not exist", set, id);
            }

            let completed = sync.read(|s| s.sets(&id).get(index).is_some_and(|e| e.completed));
            if completed {
                ctx.output.success(&format!("Set {} of {} completed", set, id));
                return Ok(Outcome::Completed);
            } else {
                ctx.output.info(&format!("Set {} of {} reopened", set, id));
            }
        }
    }
    Ok(Outcome::Changed)
}
