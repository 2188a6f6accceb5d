//! Single-player grid snake.
//!
//! `GameState` is the deterministic model of one session; `GameLoop` drives
//! it on a fixed tick and reports to a `Renderer` and a `UiState`. Drawing,
//! input devices and export live outside the core and talk to it through
//! those traits, `InputHandle` and `Snapshot`.

pub mod board;
pub mod config;
pub mod error;
pub mod export;
pub mod food;
pub mod game_loop;
pub mod history;
pub mod snake;
pub mod state;

pub use board::{Board, Position};
pub use config::Config;
pub use error::{ConfigError, GameError};
pub use food::FoodPolicy;
pub use game_loop::{Command, GameLoop, InputHandle, Renderer, UiState};
pub use history::History;
pub use snake::{Direction, Snake};
pub use state::{Collision, GameState, Outcome, Rules, SelfCollision, Snapshot, Status};
