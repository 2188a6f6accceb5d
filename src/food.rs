//! Food placement.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::{Board, Position};
use crate::error::GameError;
use crate::snake::Snake;

/// Which cells food may spawn on. Fixed for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FoodPolicy {
    /// Any cell the snake does not occupy.
    #[default]
    AnyFree,
    /// Also skip cells that share an edge with the snake.
    AvoidAdjacent,
    /// Also skip the outermost ring of the board.
    AvoidAdjacentAndBorder,
}

impl FoodPolicy {
    pub fn allows(&self, board: &Board, snake: &Snake, pos: Position) -> bool {
        if !board.contains(pos) || snake.occupies(pos) {
            return false;
        }

        match self {
            FoodPolicy::AnyFree => true,
            FoodPolicy::AvoidAdjacent => !snake.touches(pos),
            FoodPolicy::AvoidAdjacentAndBorder => !snake.touches(pos) && !board.is_border(pos),
        }
    }
}

impl fmt::Display for FoodPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FoodPolicy::AnyFree => "any-free",
            FoodPolicy::AvoidAdjacent => "avoid-adjacent",
            FoodPolicy::AvoidAdjacentAndBorder => "avoid-adjacent-and-border",
        };
        f.write_str(s)
    }
}

/// Picks a cell for the next piece of food.
///
/// Samples uniformly up to `max_attempts` times. If every sample is rejected
/// the legal cells are enumerated and one is chosen uniformly, so the only
/// failure is a board with no legal cell left.
pub fn place_food<R: Rng + ?Sized>(
    board: &Board,
    snake: &Snake,
    policy: FoodPolicy,
    max_attempts: u32,
    rng: &mut R,
) -> Result<Position, GameError> {
    for _ in 0..max_attempts {
        let pos = Position::new(
            rng.gen_range(0..board.columns() as i32),
            rng.gen_range(0..board.rows() as i32),
        );

        if policy.allows(board, snake, pos) {
            debug!(%pos, %policy, "food placed");
            return Ok(pos);
        }
    }

    let choices: Vec<Position> = board.cells().filter(|pos| policy.allows(board, snake, *pos)).collect();

    match choices.choose(rng) {
        Some(pos) => {
            debug!(%pos, %policy, candidates = choices.len(), "food placed after exhausting samples");
            Ok(*pos)
        }
        None => {
            warn!(%policy, columns = board.columns(), rows = board.rows(), "no legal food cell left");
            Err(GameError::FoodPlacementExhausted {
                columns: board.columns(),
                rows: board.rows(),
                policy,
                attempts: max_attempts,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(columns: u16, rows: u16) -> Board {
        Board::new(columns, rows, 1).unwrap()
    }

    #[test]
    fn never_lands_on_the_snake() {
        let board = board(6, 6);
        let snake = Snake::new(Position::new(4, 3), 4, Direction::Right);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let pos = place_food(&board, &snake, FoodPolicy::AnyFree, 16, &mut rng).unwrap();
            assert!(board.contains(pos));
            assert!(!snake.occupies(pos));
        }
    }

    #[test]
    fn strict_policies_keep_their_distance() {
        let board = board(8, 8);
        let snake = Snake::new(Position::new(4, 4), 3, Direction::Right);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let pos = place_food(&board, &snake, FoodPolicy::AvoidAdjacent, 16, &mut rng).unwrap();
            assert!(!snake.occupies(pos));
            assert!(!snake.touches(pos));

            let pos = place_food(&board, &snake, FoodPolicy::AvoidAdjacentAndBorder, 16, &mut rng).unwrap();
            assert!(!snake.touches(pos));
            assert!(!board.is_border(pos));
        }
    }

    #[test]
    fn falls_back_to_the_last_free_cell() {
        // 3x1 board with a two-cell snake: one free cell, zero random attempts.
        let board = board(3, 1);
        let snake = Snake::new(Position::new(1, 0), 2, Direction::Right);
        let mut rng = StdRng::seed_from_u64(1);

        let pos = place_food(&board, &snake, FoodPolicy::AnyFree, 0, &mut rng).unwrap();
        assert_eq!(pos, Position::new(2, 0));
    }

    #[test]
    fn full_board_is_exhausted() {
        let board = board(2, 1);
        let snake = Snake::new(Position::new(1, 0), 2, Direction::Right);
        let mut rng = StdRng::seed_from_u64(1);

        let err = place_food(&board, &snake, FoodPolicy::AnyFree, 32, &mut rng).unwrap_err();
        assert!(matches!(err, GameError::FoodPlacementExhausted { attempts: 32, .. }));
    }

    #[test]
    fn tiny_board_has_no_interior() {
        let board = board(2, 2);
        let snake = Snake::new(Position::new(0, 0), 1, Direction::Right);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(place_food(&board, &snake, FoodPolicy::AvoidAdjacentAndBorder, 8, &mut rng).is_err());
    }
}
