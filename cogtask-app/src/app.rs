use anyhow::{Context, Result};
use cogtask_timing::HighPrecisionTimer;
use std::io::{self, BufRead, Write};

use crate::cli::config_path_from_args;
use crate::config::AppConfig;
use crate::logging::init_tracing;
use crate::protocol::SessionRegistry;

pub struct App {
    config: AppConfig,
    registry: SessionRegistry<HighPrecisionTimer>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match config_path_from_args()? {
            Some(path) => AppConfig::load(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => AppConfig::default(),
        };
        init_tracing(&config)?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let registry = SessionRegistry::new(config.seed);
        Self { config, registry }
    }

    /// Serves stdin until EOF, one JSON response per request line.
    pub fn run(mut self) -> Result<()> {
        tracing::info!(
            target: "protocol",
            platform = std::env::consts::OS,
            seeded = self.config.seed.is_some(),
            "driver_ready"
        );
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    pub fn serve<I: BufRead, O: Write>(&mut self, input: I, mut output: O) -> Result<()> {
        let mut served = 0usize;
        for line in input.lines() {
            let line = line.context("failed to read request line")?;
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.registry.handle_line(&line);
            writeln!(output, "{reply}").context("failed to write response")?;
            output.flush().context("failed to flush response")?;
            served += 1;
        }
        tracing::info!(
            target: "protocol",
            requests = served,
            sessions = self.registry.len(),
            "driver_finished"
        );
        Ok(())
    }
}
