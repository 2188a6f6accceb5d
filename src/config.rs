//! Session configuration.
//!
//! Loaded from an optional `gridsnake.toml`; every key has a default and the
//! command line can override any of them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use crate::error::ConfigError;
use crate::food::FoodPolicy;
use crate::state::{Rules, SelfCollision, DEFAULT_INITIAL_LENGTH, DEFAULT_MAX_FOOD_ATTEMPTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Milliseconds between ticks.
    pub tick_ms: u64,

    /// Board width in cells; fitted to the viewport when unset.
    pub columns: Option<u16>,

    /// Board height in cells; fitted to the viewport when unset.
    pub rows: Option<u16>,

    /// Viewport units per cell.
    pub cell_size: u16,

    pub food_policy: FoodPolicy,

    pub self_collision: SelfCollision,

    pub initial_length: usize,

    /// Random food samples before falling back to enumerating free cells.
    pub max_food_attempts: u32,

    /// Frames kept for export.
    pub history_capacity: usize,

    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,

    pub log_file: Option<PathBuf>,

    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tick_ms: 400,
            columns: None,
            rows: None,
            cell_size: 1,
            food_policy: FoodPolicy::default(),
            self_collision: SelfCollision::default(),
            initial_length: DEFAULT_INITIAL_LENGTH,
            max_food_attempts: DEFAULT_MAX_FOOD_ATTEMPTS,
            history_capacity: 8,
            seed: None,
            log_file: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Reads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Config::default()),
        };

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Config::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(bool, &str); 7] = [
            (self.tick_ms == 0, "tick_ms must be positive"),
            (self.cell_size == 0, "cell_size must be positive"),
            (self.initial_length == 0, "initial_length must be positive"),
            (self.history_capacity == 0, "history_capacity must be positive"),
            (self.max_food_attempts == 0, "max_food_attempts must be positive"),
            (self.columns == Some(0), "columns must be positive"),
            (self.rows == Some(0), "rows must be positive"),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, reason)) => Err(ConfigError::Invalid(reason.to_string())),
            None => Ok(()),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn rules(&self) -> Rules {
        Rules {
            food_policy: self.food_policy,
            self_collision: self.self_collision,
            initial_length: self.initial_length,
            max_food_attempts: self.max_food_attempts,
        }
    }
}
