use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogCfg, LogFormat};

/// Builds the filter: `RUST_LOG` wins, otherwise the configured level.
pub fn env_filter(cfg: &LogCfg) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&cfg.level)
            .with_context(|| format!("invalid log filter `{}`", cfg.level)),
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout stays clean
/// for the dashboard and `--json` output.
pub fn init(cfg: &LogCfg) -> Result<()> {
    let filter = env_filter(cfg)?;
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let installed = match cfg.format {
        LogFormat::Pretty => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!(e)).context("failed to install tracing subscriber")
}
