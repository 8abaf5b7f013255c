//! Optional user configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.hubless/
//!   config.yaml   (optional: every field has a default)
//! ```
//!
//! Like the registry, loading has an `_at(home)` form for tests and a no-arg
//! wrapper that resolves home from `HUBLESS_HOME` or `dirs::home_dir()`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};
use crate::types::SearchDepth;

/// Environment variable overriding the home directory used for config lookup.
pub const HOME_ENV: &str = "HUBLESS_HOME";

/// Parsed `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default search depth; negative means unlimited.
    pub search_max_depth: i64,
    /// Directories holding `<version>/` editor installs, tried before the Hub default.
    pub editor_install_roots: Vec<PathBuf>,
    /// Override for the Hub registry file.
    pub registry_path: Option<PathBuf>,
    pub termination: TerminationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_max_depth: 3,
            editor_install_roots: Vec::new(),
            registry_path: None,
            termination: TerminationConfig::default(),
        }
    }
}

impl Config {
    pub fn search_depth(&self) -> SearchDepth {
        SearchDepth::from_signed(self.search_max_depth)
    }
}

/// Termination poll timing, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationConfig {
    pub poll_interval_ms: u64,
    pub quit_timeout_ms: u64,
    pub force_timeout_ms: u64,
    pub kill_timeout_ms: u64,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            quit_timeout_ms: 10_000,
            force_timeout_ms: 5_000,
            kill_timeout_ms: 10_000,
        }
    }
}

impl TerminationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn quit_timeout(&self) -> Duration {
        Duration::from_millis(self.quit_timeout_ms)
    }

    pub fn force_timeout(&self) -> Duration {
        Duration::from_millis(self.force_timeout_ms)
    }

    pub fn kill_timeout(&self) -> Duration {
        Duration::from_millis(self.kill_timeout_ms)
    }
}

/// `<home>/.hubless/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".hubless").join("config.yaml")
}

/// Load config from `<home>/.hubless/config.yaml`, defaulting when absent.
pub fn load_at(home: &Path) -> Result<Config, CoreError> {
    let path = config_path_at(home);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => return Err(io_err(&path, err)),
    };
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| CoreError::ConfigParse { path, source })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, CoreError> {
    load_at(&home()?)
}

/// Home directory used for config lookup.
pub fn home() -> Result<PathBuf, CoreError> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or(CoreError::HomeNotFound)
}
