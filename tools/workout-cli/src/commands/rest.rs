//! Rest timer between sets.

use std::time::Duration;

use anyhow::Result;
use console::Term;
use workout_core::rest::{RestTick, RestTimer, RestTimerMode};

use super::RestArgs;
use crate::context::Context;

/// Run the rest command.
pub async fn run(args: RestArgs, ctx: &Context) -> Result<()> {
    let mut settings = ctx.config.rest_timer.clone();
    if let Some(secs) = args.secs {
        settings.default_secs = secs;
    }

    let mut timer = RestTimer::new(settings);
    if args.stopwatch {
        timer.set_mode(RestTimerMode::Stopwatch);
    }
    for _ in 0..args.longer {
        timer.increase();
    }
    for _ in 0..args.shorter {
        timer.decrease();
    }
    timer.start();
    watch(timer, ctx).await
}

/// Drive a started timer once per second until it ends or Ctrl-C.
pub async fn watch(mut timer: RestTimer, ctx: &Context) -> Result<()> {
    let term = Term::stdout();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await;
    redraw(&term, &timer)?;

    loop {
        tokio::select! {
            _ = interval.tick() => match timer.tick() {
                RestTick::Running(_) => redraw(&term, &timer)?,
                RestTick::Finished => {
                    term.clear_line()?;
                    if timer.settings().sound_enabled {
                        term.write_str("\x07")?;
                    }
                    ctx.output.success("Rest over");
                    return Ok(());
                }
                RestTick::Idle => return Ok(()),
            },
            _ = &mut ctrl_c => {
                timer.stop();
                term.write_line("")?;
                ctx.output.info(&format!("Stopped at {}", timer.display()));
                return Ok(());
            }
        }
    }
}

fn redraw(term: &Term, timer: &RestTimer) -> Result<()> {
    term.clear_line()?;
    let label = match timer.mode() {
        RestTimerMode::Countdown => "Rest",
        RestTimerMode::Stopwatch => "Elapsed",
    };
    term.write_str(&format!("{}: {}", label, timer.display()))?;
    Ok(())
}
