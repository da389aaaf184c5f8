//! Configuration loaded from TOML with environment overrides.
//!
//! Lookup order for the file: explicit path, `MADRIGUERA_CONFIG`, then
//! `<config dir>/madriguera/config.toml`. A missing file means defaults.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::models::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `tasks.json` and `activity.json`. Unset means the
    /// in-memory demo store.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub locale: Locale,

    /// How long a completed one-off task stays listed before it is removed.
    #[serde(default = "default_completion_delay_ms")]
    pub completion_delay_ms: u64,

    #[serde(default)]
    pub user: User,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_completion_delay_ms() -> u64 { 1_500 }

/// Longest completion delay honoured: one day.
pub const MAX_COMPLETION_DELAY_MS: u64 = 24 * 60 * 60 * 1_000;

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            locale: Locale::default(),
            completion_delay_ms: default_completion_delay_ms(),
            user: User::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// The configured delay, capped at `MAX_COMPLETION_DELAY_MS`.
    pub fn completion_delay(&self) -> Duration {
        let ms = self.completion_delay_ms.min(MAX_COMPLETION_DELAY_MS);
        Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
    }

    /// Reads a config file. Fails if the file is missing or malformed.
    pub fn from_file(path: &Path) -> Result<Config> {
        let s = std::fs::read_to_string(path)?;
        toml::from_str::<Config>(&s).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves and loads the config, then applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut cfg = match resolve_path(explicit) {
            Some(path) if explicit.is_some() || path.exists() => Config::from_file(&path)?,
            _ => Config::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Applies `MADRIGUERA_*` overrides. Blank values are ignored.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("MADRIGUERA_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("MADRIGUERA_LOCALE") {
            self.locale = v.parse()?;
        }
        if let Some(v) = get("MADRIGUERA_USER") {
            self.user.name = v;
        }
        Ok(())
    }
}

fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    if let Ok(p) = std::env::var("MADRIGUERA_CONFIG") {
        if !p.trim().is_empty() {
            return Some(PathBuf::from(p));
        }
    }
    dirs::config_dir().map(|mut p| {
        p.push("madriguera");
        p.push("config.toml");
        p
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter string, e.g. "warn" or "madriguera=debug". `RUST_LOG` wins.
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Also write logs to a file. The dashboard only logs to the file.
    #[serde(default)]
    pub file: bool,

    /// Directory for log files. Defaults to the OS temp dir.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_logging_level() -> String { "warn".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            file: false,
            directory: None,
        }
    }
}
