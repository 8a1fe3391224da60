//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the default is `warn`, or `debug` for
/// the workout crates with `--verbose`. Logs go to stderr so `--json` output
/// on stdout stays machine-readable.
pub fn init(verbose: bool, json: bool) {
    let default = if verbose {
        "warn,workout_core=debug,workout_sync=debug,workout=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
