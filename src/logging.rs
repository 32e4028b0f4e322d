use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "youtube_sync=info,library=info";
const QUIET_FILTER: &str = "youtube_sync=warn,library=warn";

/// Installs the global subscriber. `RUST_LOG` takes precedence over `quiet`.
pub fn init_tracing(quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            QUIET_FILTER.into()
        } else {
            DEFAULT_FILTER.into()
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
