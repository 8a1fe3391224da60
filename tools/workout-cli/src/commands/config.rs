//! Configuration management commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force, json } => init_config(force, json, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("data_dir", &ctx.data_dir().display().to_string());

    let sync = &ctx.config.sync;
    ctx.output.info("");
    ctx.output.info("[sync]");
    ctx.output.kv("debounce_ms", &sync.debounce_ms.to_string());
    ctx.output.kv(
        "external_reload_delay_ms",
        &sync.external_reload_delay_ms.to_string(),
    );
    ctx.output.kv("tick_interval_ms", &sync.tick_interval_ms.to_string());
    ctx.output
        .kv("request_timeout_ms", &sync.request_timeout_ms.to_string());
    ctx.output.kv("signal_capacity", &sync.signal_capacity.to_string());

    let rest = &ctx.config.rest_timer;
    ctx.output.info("");
    ctx.output.info("[rest_timer]");
    ctx.output.kv("default_secs", &rest.default_secs.to_string());
    ctx.output.kv("step_secs", &rest.step_secs.to_string());
    ctx.output.kv("auto_start", &rest.auto_start.to_string());
    ctx.output.kv("sound_enabled", &rest.sound_enabled.to_string());

    Ok(())
}

fn init_config(force: bool, json: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx
        .cwd
        .join(if json { "workout.json" } else { "workout.toml" });

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if json {
        CliConfig::default().save(&config_path.to_string_lossy())?;
    } else {
        std::fs::write(&config_path, generate_default_config())?;
    }

    ctx.output
        .success(&format!("Created: {}", config_path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let problems = check(&ctx.config);
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "valid": problems.is_empty(),
            "errors": problems,
        }));
    } else if problems.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        for problem in &problems {
            ctx.output.list_item(problem);
        }
    }

    if !problems.is_empty() {
        bail!("{} configuration error(s)", problems.len());
    }
    Ok(())
}

fn check(config: &CliConfig) -> Vec<String> {
    let mut errors = Vec::new();
    if config.sync.request_timeout_ms == 0 {
        errors.push("sync.request_timeout_ms must be greater than 0".to_string());
    }
    if config.rest_timer.step_secs == 0 {
        errors.push("rest_timer.step_secs must be greater than 0".to_string());
    }
    errors
}
