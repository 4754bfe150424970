//! Process-wide structured logging.
//!
//! Library crates only emit `tracing` events; binaries call [`init_with`] once at
//! startup. Logs are JSON lines on stderr so stdout stays free for command
//! output.

use salesbook_core::EngineConfig;
use tracing_subscriber::EnvFilter;

/// Install the subscriber. `RUST_LOG` wins over `config.log_filter`; an
/// unparseable filter falls back to `info`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            recurring_horizon_months = config.recurring_horizon_months,
            default_group_by = ?config.default_group_by,
            "logging initialized"
        );
    }
}
