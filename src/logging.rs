//! Console logging setup.

use anyhow::anyhow;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: LevelFilter) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
