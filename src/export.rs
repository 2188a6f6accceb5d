//! Plain-text pictures of a frame, for sharing a finished (or recent) game.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::board::Position;
use crate::state::Snapshot;

const HEAD_CHAR: char = '@';
const BODY_CHAR: char = 'o';
const FOOD_CHAR: char = '*';

pub fn render_frame(frame: &Snapshot) -> String {
    let columns = frame.board.columns() as usize;
    let rows = frame.board.rows() as usize;
    let mut grid = vec![vec![' '; columns]; rows];

    let mut put = |pos: Position, ch: char| {
        if frame.board.contains(pos) {
            grid[pos.row as usize][pos.col as usize] = ch;
        }
    };

    put(frame.food, FOOD_CHAR);
    // Tail first so the head wins where a passable body overlaps itself.
    for pos in frame.snake.iter().skip(1).rev() {
        put(*pos, BODY_CHAR);
    }
    if let Some(head) = frame.snake.first() {
        put(*head, HEAD_CHAR);
    }

    let edge = format!("+{}+", "-".repeat(columns));
    let mut out = String::with_capacity((columns + 3) * (rows + 3));
    out.push_str(&edge);
    out.push('\n');
    for row in grid {
        out.push('|');
        out.extend(row);
        out.push_str("|\n");
    }
    out.push_str(&edge);
    out.push('\n');
    out.push_str(&format!("Score: {}  ({}, tick {})\n", frame.score, frame.status, frame.tick));
    out
}

/// Writes `frame` to `dir/snake-<tick>.txt` and returns the path.
pub fn write_frame(dir: &Path, frame: &Snapshot) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("snake-{}.txt", frame.tick));
    fs::write(&path, render_frame(frame))?;

    info!(path = %path.display(), score = frame.score, "frame exported");
    Ok(path)
}
