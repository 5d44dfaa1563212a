use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, LogFormat};

pub const LOG_ENV: &str = "COGTASK_LOG";

/// Installs the global subscriber. Everything goes to stderr: stdout is the
/// protocol channel.
pub fn init_tracing(config: &AppConfig) -> Result<()> {
    let filter = env::var(LOG_ENV).unwrap_or_else(|_| config.log_filter.clone());
    let env_filter = build_env_filter(&filter)?;

    let layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    tracing::info!(
        target: "logging",
        filter = %filter,
        format = ?config.log_format,
        "logging_initialized"
    );
    Ok(())
}

fn build_env_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter).with_context(|| format!("failed to parse log filter '{filter}'"))
}
