use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::board::Position;
use crate::error::GameError;
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub const ALL: [Direction; 4] = [Up, Down, Left, Right];

    pub fn opposite(&self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(&self, other: &Direction) -> bool {
        self.opposite() == *other
    }

    /// Column and row delta of one step. Rows grow downwards.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn head_char(&self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Up => "up",
            Down => "down",
            Left => "left",
            Right => "right",
        };
        f.write_str(s)
    }
}

/// The snake's cells, head first. Consecutive cells are always orthogonal
/// neighbours: `new` and `from_cells` build it that way and `step` only ever
/// prepends a neighbour of the head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Position>,
    direction: Direction,
}

impl Snake {
    /// A straight snake of `length` cells with its head at `head`, trailing
    /// away from `direction`.
    pub fn new(head: Position, length: usize, direction: Direction) -> Self {
        let behind = direction.opposite();
        let mut body = VecDeque::with_capacity(length.max(1));
        let mut current = head;
        body.push_back(current);

        for _ in 1..length {
            current = current.step(behind);
            body.push_back(current);
        }

        Snake { body, direction }
    }

    pub fn from_cells(cells: Vec<Position>, direction: Direction) -> Result<Self, GameError> {
        if cells.is_empty() {
            return Err(GameError::InvalidSnake("a snake needs at least one cell".to_string()));
        }

        if let Some(pair) = cells.windows(2).find(|pair| !pair[0].is_adjacent(&pair[1])) {
            return Err(GameError::InvalidSnake(format!("{} and {} are not neighbours", pair[0], pair[1])));
        }

        let mut seen = HashSet::with_capacity(cells.len());
        if let Some(pos) = cells.iter().find(|pos| !seen.insert(**pos)) {
            return Err(GameError::InvalidSnake(format!("{} appears twice", pos)));
        }

        Ok(Snake { body: cells.into(), direction })
    }

    pub fn head(&self) -> Position {
        // body is never empty
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn body(&self) -> &VecDeque<Position> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// True if `pos` shares an edge with any segment.
    pub fn touches(&self, pos: Position) -> bool {
        self.body.iter().any(|cell| cell.is_adjacent(&pos))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The cell the head will move into on the next step.
    pub fn next_head(&self) -> Position {
        self.head().step(self.direction)
    }

    /// Turns the snake unless `new_direction` would fold it back onto its neck.
    /// Returns whether the turn was taken.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if new_direction.is_opposite(&self.direction) {
            return false;
        }

        self.direction = new_direction;
        true
    }

    /// Moves the head one cell forward. When `grow` is false the tail is
    /// dropped and returned.
    pub fn step(&mut self, grow: bool) -> Option<Position> {
        let new_head = self.next_head();
        self.body.push_front(new_head);

        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_snake_trails_behind_head() {
        let snake = Snake::new(Position::new(5, 5), 3, Right);
        let cells: Vec<_> = snake.body().iter().copied().collect();
        assert_eq!(cells, vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)]);

        let snake = Snake::new(Position::new(5, 5), 2, Up);
        assert_eq!(snake.tail(), Position::new(5, 6));
    }

    #[test]
    fn from_cells_requires_neighbours() {
        assert!(Snake::from_cells(vec![], Right).is_err());
        assert!(Snake::from_cells(vec![Position::new(0, 0), Position::new(2, 0)], Right).is_err());
        assert!(Snake::from_cells(vec![Position::new(1, 0), Position::new(0, 0)], Right).is_ok());
    }

    #[test]
    fn from_cells_rejects_repeats() {
        let folded = vec![Position::new(1, 1), Position::new(1, 2), Position::new(1, 1)];
        let err = Snake::from_cells(folded, Up).err();
        assert!(matches!(err, Some(GameError::InvalidSnake(ref msg)) if msg.contains("(1, 1)")));

        let looped = vec![Position::new(0, 0), Position::new(1, 0), Position::new(1, 1), Position::new(0, 1), Position::new(0, 0)];
        assert!(Snake::from_cells(looped, Up).is_err());
    }

    #[test]
    fn reversal_is_rejected() {
        for current in Direction::ALL.iter() {
            for requested in Direction::ALL.iter() {
                let mut snake = Snake::new(Position::new(5, 5), 3, *current);
                let accepted = snake.set_direction(*requested);

                if requested.is_opposite(current) {
                    assert!(!accepted);
                    assert_eq!(snake.direction(), *current);
                } else {
                    assert!(accepted);
                    assert_eq!(snake.direction(), *requested);
                }
            }
        }
    }

    #[test]
    fn step_keeps_length_unless_growing() {
        let mut snake = Snake::new(Position::new(5, 5), 3, Right);

        let dropped = snake.step(false);
        assert_eq!(dropped, Some(Position::new(3, 5)));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(6, 5));

        assert_eq!(snake.step(true), None);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Position::new(7, 5));
    }
}
