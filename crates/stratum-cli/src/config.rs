//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `STRATUM_*` environment variables, `__` between sections
//!    (`STRATUM_DEFAULTS__PLUGINS=base,manifests`)
//! 3. Config file (`--config`, or the platform config directory)
//! 4. Built-in defaults (always present)

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use stratum_adapters::plugins::{DEFAULT_BUNDLE, PROJECT_VERSION};

use crate::cli::OutputFormat;

const ENV_PREFIX: &str = "STRATUM";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults applied when a flag is not given.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Plugin chain used by `init` when `--plugins` is absent.
    pub plugins: Vec<String>,
    /// Project version used by `init` and `list`.
    pub project_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            plugins: vec![DEFAULT_BUNDLE.to_owned()],
            project_version: PROJECT_VERSION.into(),
            domain: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: OutputFormat::Auto,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, file and environment.
    ///
    /// `config_file` is the path passed via `--config`; it must exist.
    /// Without it the platform config file is read when present.
    pub fn load(config_file: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_file, None)
    }

    /// Like [`Self::load`] with an explicit environment instead of the
    /// process one.
    fn load_with_env(
        config_file: Option<&PathBuf>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::from(Self::config_path().as_path()).required(false),
        }
        .format(FileFormat::Toml);

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("defaults.plugins")
            .try_parsing(true)
            .source(env);

        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(file)
            .add_source(environment)
            .build()?;

        let loaded: AppConfig = config.try_deserialize()?;
        debug!(plugins = ?loaded.defaults.plugins, "configuration loaded");
        Ok(loaded)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stratum.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "stratum", "stratum")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".stratum.toml"))
    }

    /// Serialise to the TOML written by `config init`.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Look up a dotted key such as `defaults.plugins`.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut value = serde_json::to_value(self).ok()?;
        for segment in key.split('.') {
            value = value.get(segment)?.clone();
        }
        Some(value)
    }
}
