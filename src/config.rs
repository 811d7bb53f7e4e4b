use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::errors::Result;

/// Configuration for the application.
#[derive(Default, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub defaults: DefaultsConfig,
    pub output: OutputConfig,
}

/// Defaults for command line options that were not given.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub fout: PathBuf,
    pub gsb: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            fout: PathBuf::from("output.traj"),
            gsb: PathBuf::from("R16_to_R25.gsb"),
        }
    }
}

/// Configuration for printed results.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Decimal places of printed positions.
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { precision: 4 }
    }
}

impl Config {
    /// Loads the configuration file.
    ///
    /// Without an explicit path `~/.config/trajframe/config.toml` is used if
    /// it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match std::env::home_dir() {
                Some(home) => home.join(".config/trajframe/config.toml"),
                None => return Ok(Config::default()),
            },
        };
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
