use std::{env, path::PathBuf};

use anyhow::{Result, anyhow};

pub const CONFIG_ENV: &str = "COGTASK_CONFIG";

/// `--config <path>` wins over `COGTASK_CONFIG`; neither means built-in defaults.
pub fn config_path_from_args() -> Result<Option<PathBuf>> {
    let mut args = env::args().skip(1);
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                config_path = Some(PathBuf::from(value));
            }
            other => {
                return Err(anyhow!(
                    "unknown argument: {other}. usage: cogtask [--config <path>]"
                ));
            }
        }
    }

    Ok(config_path.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from)))
}
