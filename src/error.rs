use std::path::PathBuf;

use thiserror::Error;

use crate::food::FoodPolicy;
use crate::state::Status;

/// Errors raised by the game core.
///
/// Wall collisions and rejected direction changes are not errors: the first
/// ends the session through `Status::Over`, the second is silently ignored.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid board {columns}x{rows} with cell size {cell_size}: all dimensions must be positive")]
    InvalidBoard { columns: u16, rows: u16, cell_size: u16 },

    #[error("a {length}-cell snake does not fit on a {columns}x{rows} board")]
    BoardTooSmall { columns: u16, rows: u16, length: usize },

    #[error("invalid snake layout: {0}")]
    InvalidSnake(String),

    #[error("no legal food cell on a {columns}x{rows} board under the {policy} policy (after {attempts} random attempts)")]
    FoodPlacementExhausted {
        columns: u16,
        rows: u16,
        policy: FoodPolicy,
        attempts: u32,
    },

    #[error("the game must be running to advance (status: {0})")]
    NotRunning(Status),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
