//! The authoritative model of one game session.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Board, Position};
use crate::error::GameError;
use crate::food::{self, FoodPolicy};
use crate::snake::{Direction, Snake};

pub const DEFAULT_INITIAL_LENGTH: usize = 3;
pub const DEFAULT_MAX_FOOD_ATTEMPTS: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    Paused,
    Over,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Idle => "idle",
            Status::Running => "running",
            Status::Paused => "paused",
            Status::Over => "over",
        };
        f.write_str(s)
    }
}

/// Whether running into your own body ends the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SelfCollision {
    /// The head may pass through the body.
    #[default]
    Ignore,
    /// Moving into a cell the body still holds after the move is a collision.
    Enforce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

/// Result of one `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Moved,
    Ate,
    Collided(Collision),
}

/// Per-session rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub food_policy: FoodPolicy,
    pub self_collision: SelfCollision,
    pub initial_length: usize,
    pub max_food_attempts: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            food_policy: FoodPolicy::default(),
            self_collision: SelfCollision::default(),
            initial_length: DEFAULT_INITIAL_LENGTH,
            max_food_attempts: DEFAULT_MAX_FOOD_ATTEMPTS,
        }
    }
}

/// A read-only copy of everything a renderer or exporter needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub snake: Vec<Position>,
    pub direction: Direction,
    pub food: Position,
    pub score: u32,
    pub status: Status,
    pub tick: u64,
}

pub struct GameState {
    board: Board,
    snake: Snake,
    food: Position,
    score: u32,
    status: Status,
    tick: u64,
    rules: Rules,
    rng: StdRng,
}

impl GameState {
    /// Starts an idle session on `board`.
    pub fn new(board: Board, rules: Rules, rng: StdRng) -> Result<Self, GameError> {
        let snake = initial_snake(&board, rules.initial_length)?;
        let mut state = GameState {
            board,
            snake,
            food: Position::new(0, 0),
            score: 0,
            status: Status::Idle,
            tick: 0,
            rules,
            rng,
        };
        state.food = state.place_food()?;

        Ok(state)
    }

    /// Builds an idle session from an explicit layout.
    pub fn with_layout(
        board: Board,
        rules: Rules,
        cells: Vec<Position>,
        direction: Direction,
        food: Position,
        rng: StdRng,
    ) -> Result<Self, GameError> {
        if let Some(outside) = cells.iter().find(|pos| !board.contains(**pos)) {
            return Err(GameError::InvalidSnake(format!("{} is outside the board", outside)));
        }

        let snake = Snake::from_cells(cells, direction)?;
        if !board.contains(food) || snake.occupies(food) {
            return Err(GameError::InvalidSnake(format!("food at {} is not on a free cell", food)));
        }

        Ok(GameState {
            board,
            snake,
            food,
            score: 0,
            status: Status::Idle,
            tick: 0,
            rules,
            rng,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn body(&self) -> &VecDeque<Position> {
        self.snake.body()
    }

    pub fn direction(&self) -> Direction {
        self.snake.direction()
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Requests a turn. A reversal onto the neck, or any turn once the game
    /// is over, is dropped; the return value says whether it took effect.
    pub fn change_direction(&mut self, requested: Direction) -> bool {
        if self.status == Status::Over {
            return false;
        }

        let accepted = self.snake.set_direction(requested);
        if !accepted {
            debug!(%requested, current = %self.snake.direction(), "reversal ignored");
        }
        accepted
    }

    /// Moves the snake one cell.
    ///
    /// Returns `Collided` (and ends the game) when the head would leave the
    /// board, or enter its own body under `SelfCollision::Enforce`. Eating
    /// grows the snake by one and relocates the food; if no legal cell is
    /// left for it the game ends and `FoodPlacementExhausted` is returned.
    pub fn advance(&mut self) -> Result<Outcome, GameError> {
        if self.status != Status::Running {
            return Err(GameError::NotRunning(self.status));
        }

        let new_head = self.snake.next_head();

        if !self.board.contains(new_head) {
            info!(head = %new_head, score = self.score, "hit the wall");
            self.status = Status::Over;
            return Ok(Outcome::Collided(Collision::Wall));
        }

        let eating = new_head == self.food;

        if self.rules.self_collision == SelfCollision::Enforce {
            // The tail cell is vacated this step unless the snake grows.
            let kept = if eating { self.snake.len() } else { self.snake.len() - 1 };
            if self.snake.body().iter().take(kept).any(|cell| *cell == new_head) {
                info!(head = %new_head, score = self.score, "ran into itself");
                self.status = Status::Over;
                return Ok(Outcome::Collided(Collision::Body));
            }
        }

        self.snake.step(eating);
        self.tick += 1;

        if !eating {
            return Ok(Outcome::Moved);
        }

        self.score += 1;
        debug!(score = self.score, length = self.snake.len(), "ate food");

        match self.place_food() {
            Ok(pos) => {
                self.food = pos;
                Ok(Outcome::Ate)
            }
            Err(e) => {
                self.status = Status::Over;
                Err(e)
            }
        }
    }

    /// Picks a legal food cell for the current snake under the session's policy.
    pub fn place_food(&mut self) -> Result<Position, GameError> {
        food::place_food(
            &self.board,
            &self.snake,
            self.rules.food_policy,
            self.rules.max_food_attempts,
            &mut self.rng,
        )
    }

    /// Starts over on `board`: centred snake heading right, fresh food,
    /// zero score, idle.
    pub fn reset(&mut self, board: Board) -> Result<(), GameError> {
        let snake = initial_snake(&board, self.rules.initial_length)?;
        let food = food::place_food(
            &board,
            &snake,
            self.rules.food_policy,
            self.rules.max_food_attempts,
            &mut self.rng,
        )?;

        self.board = board;
        self.snake = snake;
        self.food = food;
        self.score = 0;
        self.tick = 0;
        self.status = Status::Idle;

        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board,
            snake: self.snake.body().iter().copied().collect(),
            direction: self.snake.direction(),
            food: self.food,
            score: self.score,
            status: self.status,
            tick: self.tick,
        }
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

fn initial_snake(board: &Board, length: usize) -> Result<Snake, GameError> {
    let length = length.max(1);
    if length > board.columns() as usize {
        return Err(GameError::BoardTooSmall {
            columns: board.columns(),
            rows: board.rows(),
            length,
        });
    }

    let tail_col = (board.columns() as usize - length) / 2;
    let head = Position::new((tail_col + length - 1) as i32, board.rows() as i32 / 2);

    Ok(Snake::new(head, length, Direction::Right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn running(cells: Vec<(i32, i32)>, direction: Direction, food: (i32, i32), rules: Rules) -> GameState {
        let board = Board::new(10, 10, 1).unwrap();
        let cells = cells.into_iter().map(|(c, r)| Position::new(c, r)).collect();
        let mut state = GameState::with_layout(board, rules, cells, direction, Position::new(food.0, food.1), rng()).unwrap();
        state.set_status(Status::Running);
        state
    }

    #[test]
    fn new_session_is_centred_and_idle() {
        let state = GameState::new(Board::new(10, 10, 1).unwrap(), Rules::default(), rng()).unwrap();
        let cells: Vec<_> = state.body().iter().copied().collect();

        assert_eq!(cells, vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)]);
        assert_eq!(state.direction(), Direction::Right);
        assert_eq!(state.status(), Status::Idle);
        assert_eq!(state.score(), 0);
        assert!(!state.snake().occupies(state.food()));
    }

    #[test]
    fn too_narrow_board_is_rejected() {
        let err = GameState::new(Board::new(2, 5, 1).unwrap(), Rules::default(), rng()).err();
        assert!(matches!(err, Some(GameError::BoardTooSmall { length: 3, .. })));
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut state = running(vec![(5, 5), (4, 5), (3, 5)], Direction::Right, (6, 5), Rules::default());

        assert_eq!(state.advance().unwrap(), Outcome::Ate);

        let cells: Vec<_> = state.body().iter().copied().collect();
        assert_eq!(
            cells,
            vec![Position::new(6, 5), Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)]
        );
        assert_eq!(state.score(), 1);
        assert!(!state.snake().occupies(state.food()));
        assert_eq!(state.status(), Status::Running);
    }

    #[test]
    fn plain_move_keeps_length() {
        let mut state = running(vec![(5, 5), (4, 5), (3, 5)], Direction::Right, (0, 0), Rules::default());
        state.change_direction(Direction::Down);

        assert_eq!(state.advance().unwrap(), Outcome::Moved);
        assert_eq!(state.snake().head(), Position::new(5, 6));
        assert_eq!(state.snake().len(), 3);
        assert_eq!(state.score(), 0);
        assert_eq!(state.tick(), 1);
    }

    #[test]
    fn wall_ends_the_game() {
        let mut state = running(vec![(9, 5), (8, 5)], Direction::Right, (0, 0), Rules::default());
        let before = state.snapshot();

        assert_eq!(state.advance().unwrap(), Outcome::Collided(Collision::Wall));
        assert_eq!(state.status(), Status::Over);

        // frozen until reset
        assert!(!state.change_direction(Direction::Up));
        assert!(matches!(state.advance(), Err(GameError::NotRunning(Status::Over))));
        let after = state.snapshot();
        assert_eq!(after.snake, before.snake);
        assert_eq!(after.food, before.food);
        assert_eq!(after.score, before.score);
    }

    #[test]
    fn every_edge_is_a_wall() {
        let layouts = [
            (vec![(5, 0), (5, 1)], Direction::Up),
            (vec![(0, 5), (1, 5)], Direction::Left),
            (vec![(5, 9), (5, 8)], Direction::Down),
            (vec![(0, 0), (0, 1)], Direction::Up),
            (vec![(9, 9), (8, 9)], Direction::Right),
        ];

        for (cells, direction) in layouts.iter() {
            let mut state = running(cells.clone(), *direction, (3, 3), Rules::default());
            let head = state.snake().head();

            assert_eq!(state.advance().unwrap(), Outcome::Collided(Collision::Wall), "{} heading {}", head, direction);
            assert_eq!(state.status(), Status::Over);
            assert_eq!(state.snake().head(), head);
            assert_eq!(state.tick(), 0);
        }
    }

    #[test]
    fn layout_with_repeated_cells_is_rejected() {
        let board = Board::new(10, 10, 1).unwrap();
        let cells = vec![Position::new(1, 1), Position::new(1, 2), Position::new(1, 1)];
        let err = GameState::with_layout(board, Rules::default(), cells, Direction::Up, Position::new(5, 5), rng()).err();
        assert!(matches!(err, Some(GameError::InvalidSnake(_))));
    }

    #[test]
    fn reversal_is_ignored() {
        let mut state = running(vec![(5, 5), (4, 5), (3, 5)], Direction::Right, (0, 0), Rules::default());
        assert!(!state.change_direction(Direction::Left));
        assert_eq!(state.direction(), Direction::Right);
    }

    #[test]
    fn advance_requires_running() {
        let mut state = GameState::new(Board::new(10, 10, 1).unwrap(), Rules::default(), rng()).unwrap();
        assert!(matches!(state.advance(), Err(GameError::NotRunning(Status::Idle))));
        assert_eq!(state.tick(), 0);
    }

    // A 2x2 loop: head (1,1) moving up into (1,0), which holds the body.
    fn coiled(self_collision: SelfCollision) -> GameState {
        let rules = Rules { self_collision, ..Rules::default() };
        running(
            vec![(1, 1), (0, 1), (0, 0), (1, 0), (2, 0)],
            Direction::Up,
            (5, 5),
            rules,
        )
    }

    #[test]
    fn body_is_passable_by_default() {
        let mut state = coiled(SelfCollision::Ignore);
        assert_eq!(state.advance().unwrap(), Outcome::Moved);
        assert_eq!(state.snake().head(), Position::new(1, 0));
        assert_eq!(state.status(), Status::Running);
    }

    #[test]
    fn enforced_body_collision() {
        let mut state = coiled(SelfCollision::Enforce);
        assert_eq!(state.advance().unwrap(), Outcome::Collided(Collision::Body));
        assert_eq!(state.status(), Status::Over);
    }

    #[test]
    fn chasing_the_tail_is_allowed() {
        let rules = Rules { self_collision: SelfCollision::Enforce, ..Rules::default() };
        // Square loop whose tail at (1,0) is vacated as the head moves in.
        let mut state = running(vec![(1, 1), (0, 1), (0, 0), (1, 0)], Direction::Up, (5, 5), rules);
        assert_eq!(state.advance().unwrap(), Outcome::Moved);
    }

    #[test]
    fn last_bite_exhausts_the_board() {
        let board = Board::new(3, 1, 1).unwrap();
        let cells = vec![Position::new(1, 0), Position::new(0, 0)];
        let mut state =
            GameState::with_layout(board, Rules::default(), cells, Direction::Right, Position::new(2, 0), rng()).unwrap();
        state.set_status(Status::Running);

        let err = state.advance().unwrap_err();
        assert!(matches!(err, GameError::FoodPlacementExhausted { .. }));
        assert_eq!(state.score(), 1);
        assert_eq!(state.snake().len(), 3);
        assert_eq!(state.status(), Status::Over);
    }

    #[test]
    fn reset_restores_a_fresh_session() {
        let mut state = running(vec![(9, 5), (8, 5)], Direction::Up, (0, 0), Rules::default());
        state.advance().unwrap();

        state.reset(Board::new(12, 8, 1).unwrap()).unwrap();
        assert_eq!(state.status(), Status::Idle);
        assert_eq!(state.score(), 0);
        assert_eq!(state.direction(), Direction::Right);
        assert_eq!(state.snake().len(), DEFAULT_INITIAL_LENGTH);
        assert_eq!(state.snake().head(), Position::new(6, 4));
        assert_eq!(state.board().columns(), 12);
    }
}
