//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the log filter
pub const LOG_ENV: &str = "TYPEGEN_LOG";

/// Install a stderr `fmt` subscriber. `TYPEGEN_LOG` wins over `verbose`.
pub fn init(verbose: bool)
{
    let fallback = if verbose { "typegen=debug" } else { "typegen=warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding) is not an error worth surfacing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
