use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Process-level settings. Task parameters travel with each `start` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub log_filter: String,
    pub log_format: LogFormat,
    /// Seeds every session's sequence generator for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            log_format: LogFormat::Pretty,
            seed: None,
        }
    }
}

impl AppConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(content)?;
        if config.log_filter.trim().is_empty() {
            return Err(anyhow!("log_filter cannot be empty"));
        }
        Ok(config)
    }
}
