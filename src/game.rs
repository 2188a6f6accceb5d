use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use gridsnake::export;
use gridsnake::{Board, Command, Config, Direction::*, GameError, GameLoop, GameState, InputHandle};

use crate::term::TermManager;

// Upper bound on how long we block on the keyboard while the timer is stopped.
const IDLE_POLL: Duration = Duration::from_millis(50);

enum Action {
    Game(Command),
    Export,
    Quit,
}

pub struct SnakeGame {
    game: GameLoop<TermManager>,
    input: InputHandle,
    config: Config,
}

impl SnakeGame {
    pub fn new(mut term: TermManager, config: Config) -> anyhow::Result<Self> {
        let board = board_for(&term, &config)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = GameState::new(board, config.rules(), rng)?;

        term.prepare(&board)?;
        let mut game = GameLoop::new(state, term, config.tick(), config.history_capacity);
        game.frontend_mut().show_intro();
        let input = game.input_handle();

        info!(columns = board.columns(), rows = board.rows(), seed = ?config.seed, "session created");
        Ok(SnakeGame { game, input, config })
    }

    pub fn play(&mut self) -> anyhow::Result<()> {
        loop {
            let wait = self.game.time_until_tick(Instant::now()).map_or(IDLE_POLL, |d| d.min(IDLE_POLL));

            for key_ev in self.game.frontend().read_key_events_queue(wait)? {
                match key_action(&key_ev) {
                    Some(Action::Quit) => return Ok(()),
                    Some(Action::Export) => self.export(),
                    Some(Action::Game(command)) => {
                        self.input.send(command);
                    }
                    None => {}
                }
            }

            match self.game.pump(Instant::now()) {
                Ok(_) => {}
                Err(e @ GameError::FoodPlacementExhausted { .. }) => {
                    // Every cell is taken: nothing left to eat.
                    warn!(error = %e, "board full");
                    self.game.frontend_mut().set_caption(" Board full! ");
                }
                Err(e) => return Err(e).context("game update failed"),
            }

            if let Some(e) = self.game.frontend_mut().take_error() {
                return Err(e).context("terminal output failed");
            }
        }
    }

    fn export(&mut self) {
        let frame = match self.game.history().oldest() {
            Some(frame) => frame.clone(),
            None => self.game.state().snapshot(),
        };

        let caption = match export::write_frame(&self.config.export_dir, &frame) {
            Ok(path) => format!(" Saved {} ", path.display()),
            Err(e) => {
                warn!(error = %e, "export failed");
                " Export failed ".to_string()
            }
        };
        self.game.frontend_mut().set_caption(&caption);
    }
}

fn board_for(term: &TermManager, config: &Config) -> anyhow::Result<Board> {
    let (width, height) = term.playfield_size();
    let fitted = Board::fit(width, height, config.cell_size).context("terminal too small")?;

    let board = Board::new(
        config.columns.unwrap_or_else(|| fitted.columns()),
        config.rows.unwrap_or_else(|| fitted.rows()),
        config.cell_size,
    )?;

    if board.columns() > fitted.columns() || board.rows() > fitted.rows() {
        bail!(
            "a {}x{} board does not fit in a {}x{} terminal",
            board.columns(),
            board.rows(),
            width + 2,
            height + 2
        );
    }

    Ok(board)
}

fn key_action(ev: &KeyEvent) -> Option<Action> {
    if ev.code == KeyCode::Char('c') && ev.modifiers == KeyModifiers::CONTROL {
        return Some(Action::Quit);
    }

    let action = match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Action::Game(Command::Turn(Up)),
        KeyCode::Char('a') | KeyCode::Left => Action::Game(Command::Turn(Left)),
        KeyCode::Char('s') | KeyCode::Down => Action::Game(Command::Turn(Down)),
        KeyCode::Char('d') | KeyCode::Right => Action::Game(Command::Turn(Right)),
        KeyCode::Char(' ') => Action::Game(Command::Start),
        KeyCode::Esc | KeyCode::Char('p') => Action::Game(Command::TogglePause),
        KeyCode::Char('r') => Action::Game(Command::Reset),
        KeyCode::Char('e') => Action::Export,
        _ => return None,
    };

    Some(action)
}
