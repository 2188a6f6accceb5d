//! Fixed-cadence driver around `GameState`.
//!
//! Input reaches the loop as `Command`s queued through an `InputHandle`; the
//! loop owns the state and applies commands and ticks one at a time from
//! `pump`. The timer is a single deadline that is re-armed only after a tick
//! has finished, so ticks never overlap.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::board::Board;
use crate::error::GameError;
use crate::history::History;
use crate::snake::Direction;
use crate::state::{GameState, Outcome, Snapshot, Status};

pub const DEFAULT_TICK: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Start,
    Pause,
    TogglePause,
    Reset,
}

/// Draws frames. Called after every move and after a reset.
pub trait Renderer {
    fn render(&mut self, frame: &Snapshot);
}

/// Reacts to lifecycle transitions: enabling controls, showing the
/// post-game summary.
pub trait UiState {
    fn status_changed(&mut self, from: Status, to: Status, frame: &Snapshot);
}

/// Cloneable sender for input sources.
#[derive(Clone)]
pub struct InputHandle {
    tx: Sender<Command>,
}

impl InputHandle {
    /// Queues a command. Returns false once the loop is gone.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }
}

pub struct GameLoop<F> {
    state: GameState,
    frontend: F,
    period: Duration,
    next_tick: Option<Instant>,
    history: History,
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl<F: Renderer + UiState> GameLoop<F> {
    pub fn new(state: GameState, frontend: F, period: Duration, history_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut game_loop = GameLoop {
            state,
            frontend,
            period,
            next_tick: None,
            history: History::new(history_capacity),
            tx,
            rx,
        };

        let frame = game_loop.state.snapshot();
        game_loop.frontend.render(&frame);
        game_loop
    }

    pub fn input_handle(&self) -> InputHandle {
        InputHandle { tx: self.tx.clone() }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_timer_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    /// How long the driver may wait for input before the next tick is due.
    /// `None` while the timer is stopped.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick.map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Begins (or resumes) ticking. No-op while running or after game over.
    pub fn start(&mut self, now: Instant) {
        match self.state.status() {
            Status::Running => {}
            Status::Over => debug!("start ignored: game is over, reset first"),
            from => {
                self.next_tick = Some(now + self.period);
                self.transition(from, Status::Running);
                info!(period_ms = self.period.as_millis() as u64, "game running");
            }
        }
    }

    /// Stops ticking. No-op unless running.
    pub fn pause(&mut self) {
        if self.state.status() != Status::Running {
            return;
        }

        self.next_tick = None;
        self.transition(Status::Running, Status::Paused);
        info!(score = self.state.score(), "game paused");
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        match self.state.status() {
            Status::Running => self.pause(),
            Status::Paused => self.start(now),
            _ => {}
        }
    }

    /// Turns the snake; the first turn of an idle session starts it.
    pub fn handle_direction_input(&mut self, direction: Direction, now: Instant) {
        self.state.change_direction(direction);

        if self.state.status() == Status::Idle {
            self.start(now);
        }
    }

    /// Restarts on the current board.
    pub fn reset(&mut self) -> Result<(), GameError> {
        let board = *self.state.board();
        self.reset_with(board)
    }

    /// Restarts on `board`, e.g. after the viewport was resized.
    pub fn reset_with(&mut self, board: Board) -> Result<(), GameError> {
        let from = self.state.status();
        // A board the fresh snake can't fit on leaves the session untouched
        self.state.reset(board)?;
        self.next_tick = None;
        self.history.clear();

        info!(columns = board.columns(), rows = board.rows(), "game reset");
        let frame = self.state.snapshot();
        self.frontend.render(&frame);
        if from != Status::Idle {
            self.frontend.status_changed(from, Status::Idle, &frame);
        }
        Ok(())
    }

    pub fn dispatch(&mut self, command: Command, now: Instant) -> Result<(), GameError> {
        match command {
            Command::Turn(direction) => self.handle_direction_input(direction, now),
            Command::Start => self.start(now),
            Command::Pause => self.pause(),
            Command::TogglePause => self.toggle_pause(now),
            Command::Reset => self.reset()?,
        }
        Ok(())
    }

    /// Applies every queued command, then runs the tick if it is due.
    pub fn pump(&mut self, now: Instant) -> Result<Option<Outcome>, GameError> {
        while let Ok(command) = self.rx.try_recv() {
            self.dispatch(command, now)?;
        }

        match self.next_tick {
            Some(deadline) if deadline <= now => self.tick(now).map(Some),
            _ => Ok(None),
        }
    }

    /// Runs one update step and re-arms the timer once it has returned.
    pub fn tick(&mut self, now: Instant) -> Result<Outcome, GameError> {
        self.next_tick = None;

        let outcome = match self.state.advance() {
            Ok(outcome) => outcome,
            Err(e) => {
                if self.state.status() == Status::Over {
                    warn!(error = %e, "session ended without a collision");
                    let frame = self.state.snapshot();
                    self.history.push(frame.clone());
                    self.frontend.render(&frame);
                    self.frontend.status_changed(Status::Running, Status::Over, &frame);
                }
                return Err(e);
            }
        };

        let frame = self.state.snapshot();
        match outcome {
            Outcome::Collided(cause) => {
                info!(?cause, score = frame.score, "game over");
                self.frontend.status_changed(Status::Running, Status::Over, &frame);
            }
            Outcome::Moved | Outcome::Ate => {
                self.history.push(frame.clone());
                self.frontend.render(&frame);
                self.next_tick = Some(now + self.period);
            }
        }

        Ok(outcome)
    }

    fn transition(&mut self, from: Status, to: Status) {
        self.state.set_status(to);
        let frame = self.state.snapshot();
        self.frontend.status_changed(from, to, &frame);
    }
}
