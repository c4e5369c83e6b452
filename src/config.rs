//! Configuration for the `php-member-props` binary.
//!
//! Settings come from a TOML file, looked up in this order:
//!
//! 1. the path given with `--config` (must exist and parse),
//! 2. `php-member-props.toml` in the working directory,
//! 3. `php-member-props/config.toml` in the platform config directory
//!    (`$XDG_CONFIG_HOME`, `~/.config`, `%APPDATA%`),
//! 4. built-in defaults.
//!
//! A file that is simply absent is not an error.  Command-line flags are
//! applied on top of whatever was loaded.
//!
//! ```toml
//! format = "json"
//! include_rejected = true
//! log_level = "php_member_props=debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use etcetera::BaseStrategy;
use serde::Deserialize;

use crate::error::ConfigError;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "php-member-props.toml";

/// Directory under the platform config directory.
const APP_DIR: &str = "php-member-props";

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per variable.
    #[default]
    Text,
    /// A single JSON array.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub format: OutputFormat,
    /// Also report variables that are not properties, with the reason.
    pub include_rejected: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            include_rejected: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse the file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load the configuration following the lookup order above.
    ///
    /// Returns the config together with the file it came from, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        for candidate in default_locations() {
            if candidate.is_file() {
                return Ok((Self::from_file(&candidate)?, Some(candidate)));
            }
        }
        Ok((Self::default(), None))
    }
}

/// Implicit config file locations, most specific first.
pub fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Ok(strategy) = etcetera::choose_base_strategy() {
        paths.push(strategy.config_dir().join(APP_DIR).join("config.toml"));
    }
    paths
}

// ─── Tests ──────────────────────────────────────────────────────────────────
