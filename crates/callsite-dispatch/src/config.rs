//! Dispatcher configuration.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Configuration file (`callsite.toml`)
//! 3. Environment variables (`CALLSITE_*`)
//! 4. Programmatic overrides
//!
//! ```toml
//! format_key = "type"
//! debug_key = "debug"
//! debug = false
//! wildcard_escape = true
//! default_format = "json"
//! ```
//!
//! `CALLSITE_DEFAULT_FORMAT=yaml` sets `default_format`.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CALLSITE_";

/// File name looked up in the search path when no file is given.
pub const CONFIG_FILE: &str = "callsite.toml";

/// Settings read once when the dispatcher is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Parameter holding the requested format token.
    pub format_key: String,
    /// Parameter holding the debug flag.
    pub debug_key: String,
    /// Attach debug info to every result regardless of the request.
    pub debug: bool,
    /// Rewrite a `query` value of `~` to `*` before binding.
    pub wildcard_escape: bool,
    /// Format token used when the request names none.
    pub default_format: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            format_key: String::from("type"),
            debug_key: String::from("debug"),
            debug: false,
            wildcard_escape: true,
            default_format: None,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The merged sources did not deserialize.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// Loads [`DispatchConfig`] from defaults, a TOML file and the environment.
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("./config/callsite.toml")
///     .load()?;
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    figment: Figment,
    search_paths: Vec<PathBuf>,
    config_file: Option<PathBuf>,
    load_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader that searches the current directory and reads the
    /// environment.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            search_paths: Vec::new(),
            config_file: None,
            load_env: true,
        }
    }

    /// Adds a directory searched for `callsite.toml`.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads this file instead of searching. A missing file is an error.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables `CALLSITE_*` environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges programmatic overrides on top of every other source.
    pub fn merge(mut self, config: DispatchConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> Result<DispatchConfig, ConfigError> {
        let figment = self.build_figment()?;
        let config: DispatchConfig = figment
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        debug!(
            format_key = %config.format_key,
            debug_key = %config.debug_key,
            debug = config.debug,
            "configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(self) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(DispatchConfig::default()));

        match self.config_file {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "loading configuration file");
                figment = figment.merge(Toml::file(path));
            }
            Some(path) => return Err(ConfigError::FileNotFound(path)),
            None => {
                let search_paths = if self.search_paths.is_empty() {
                    std::env::current_dir().into_iter().collect()
                } else {
                    self.search_paths
                };
                if let Some(path) = search_paths
                    .iter()
                    .map(|dir| dir.join(CONFIG_FILE))
                    .find(|p| p.exists())
                {
                    info!(path = %path.display(), "loading configuration file");
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        if self.load_env {
            trace!("loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment.merge(self.figment))
    }
}
