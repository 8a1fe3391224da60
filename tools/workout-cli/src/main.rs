//! Workout CLI - log a strength workout from the terminal.
//!
//! Commands:
//! - `workout start` - Start or resume the active workout
//! - `workout status` - Show exercises, sets and the running duration
//! - `workout add` / `remove` / `replace` / `move` - Edit the exercise list
//! - `workout set` - Add, fill in and tick off sets
//! - `workout group` / `ungroup` - Manage supersets
//! - `workout finish` / `discard` - Close the workout
//! - `workout catalog` - Browse the exercise catalog
//! - `workout history` - List finished workouts
//! - `workout rest` - Run the rest timer
//! - `workout config` - Manage configuration

mod commands;
mod config;
mod context;
mod logging;
mod output;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    AddArgs, CatalogArgs, ConfigArgs, DiscardArgs, FinishArgs, GroupArgs, HistoryArgs, MoveArgs,
    RemoveArgs, ReplaceArgs, RestArgs, SetArgs, StatusArgs, UngroupArgs,
};

/// Workout CLI - Track the active workout session
#[derive(Parser)]
#[command(name = "workout")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a workout, or resume the one in progress
    Start,

    /// Show the active workout
    Status(StatusArgs),

    /// Add exercises from the catalog
    Add(AddArgs),

    /// Remove an exercise and its sets
    Remove(RemoveArgs),

    /// Swap an exercise for another from the catalog
    Replace(ReplaceArgs),

    /// Move an exercise to another position
    Move(MoveArgs),

    /// Work with sets
    Set(SetArgs),

    /// Group exercises into a superset
    Group(GroupArgs),

    /// Dissolve a superset
    Ungroup(UngroupArgs),

    /// Finish and save the workout
    Finish(FinishArgs),

    /// Throw the workout away
    Discard(DiscardArgs),

    /// Browse the exercise catalog
    Catalog(CatalogArgs),

    /// List finished workouts
    History(HistoryArgs),

    /// Run the rest timer
    Rest(RestArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);
    let output = output::Output::new(cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Start => commands::session::start(&ctx).await,
        Commands::Status(args) => commands::session::status(args, &ctx).await,
        Commands::Add(args) => commands::exercise::add(args, &ctx).await,
        Commands::Remove(args) => commands::exercise::remove(args, &ctx).await,
        Commands::Replace(args) => commands::exercise::replace(args, &ctx).await,
        Commands::Move(args) => commands::exercise::move_exercise(args, &ctx).await,
        Commands::Set(args) => commands::sets::run(args, &ctx).await,
        Commands::Group(args) => commands::superset::group(args, &ctx).await,
        Commands::Ungroup(args) => commands::superset::ungroup(args, &ctx).await,
        Commands::Finish(args) => commands::finish::finish(args, &ctx).await,
        Commands::Discard(args) => commands::finish::discard(args, &ctx).await,
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::History(args) => commands::history::run(args, &ctx).await,
        Commands::Rest(args) => commands::rest::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
