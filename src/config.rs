//! Process configuration: a JSON file plus environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::model::Player;
use crate::store::SheetsConfig;

pub const CONFIG_PATH_VAR: &str = "MATCHLOG_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_roster_cache_ttl_secs() -> u64 {
    600
}

/// Which record store backs the session
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    Memory {
        #[serde(default)]
        players: Vec<Player>,
    },
    Sheets(SheetsConfig),
    Postgres {
        database_url: String,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory {
            players: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_roster_cache_ttl_secs")]
    pub roster_cache_ttl_secs: u64,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            roster_cache_ttl_secs: default_roster_cache_ttl_secs(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Reads the file named by `MATCHLOG_CONFIG` (or `config.json`) and applies env overrides.
    /// A missing file is not an error; a malformed one is.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = Self::read_file(Path::new(&path))?;
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    pub fn read_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(Self::from_json(&contents)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Merges the optional file with environment overrides.
    ///
    /// Without a file, `DATABASE_URL` selects postgres; otherwise the empty in-memory store is kept.
    pub fn resolve(
        file: Option<Config>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let from_file = file.is_some();
        let mut config = file.unwrap_or_default();

        if let Some(bind_addr) = lookup("BIND_ADDR") {
            config.bind_addr = bind_addr;
        }

        if let Some(ttl) = lookup("ROSTER_CACHE_TTL_SECS") {
            config.roster_cache_ttl_secs = ttl.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("ROSTER_CACHE_TTL_SECS is not a number: {ttl}"))
            })?;
        }

        if let Some(database_url) = lookup("DATABASE_URL") {
            if let StoreConfig::Postgres { database_url: url } = &mut config.store {
                *url = database_url;
            } else if !from_file {
                config.store = StoreConfig::Postgres { database_url };
            }
        }

        if config.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_addr must not be empty".to_string()));
        }

        Ok(config)
    }

    pub fn roster_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.roster_cache_ttl_secs)
    }
}
