use std::io::{Stdout, Write, stdout};
use std::time::Duration;

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};
use crossterm::ErrorKind;

use gridsnake::{Board, Position, Renderer, Snapshot, Status, UiState};

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

/// Crossterm front end: draws frames inside a border, overlays message boxes
/// for lifecycle changes and collects key presses.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
    cell_size: TermInt,
    drawn: Vec<Position>,
    error: Option<ErrorKind>,
}

/// Raw mode and the alternate screen, left again on drop.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> crossterm::Result<Self> {
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(out, cursor::Hide, cursor::DisableBlinking)?;
        Ok(TerminalGuard { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(stdout(), cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen);
    }
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> crossterm::Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None, cell_size: 1, drawn: vec![], error: None })
    }

    pub fn show_intro(&mut self) {
        self.show_message(&[
            "Arrow keys or WASD to move",
            "Space to start, Esc to pause",
            "E to export, R to restart",
            "CTRL+C to quit",
        ]);
    }

    /// Space left for the board once the border is drawn.
    pub fn playfield_size(&self) -> Coords {
        (self.width.saturating_sub(2), self.height.saturating_sub(2))
    }

    /// Clears the screen and frames a board of the given size.
    pub fn prepare(&mut self, board: &Board) -> crossterm::Result<()> {
        self.cell_size = board.cell_size();
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
        self.drawn.clear();

        let width = board.columns() * self.cell_size + 2;
        let height = board.rows() * self.cell_size + 2;
        self.draw_borders((width.min(self.width), height.min(self.height)))
    }

    pub fn read_key_events_queue(&self, timeout: Duration) -> crossterm::Result<Vec<KeyEvent>> {
        let mut events = vec![];
        let mut wait = timeout;

        while poll(wait)? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
            wait = Duration::from_millis(0);
        }

        Ok(events)
    }

    /// Takes the first terminal error hit while drawing, if any.
    pub fn take_error(&mut self) -> Option<ErrorKind> {
        self.error.take()
    }

    pub fn show_message(&mut self, lines: &[&str]) {
        if self.has_message() {
            self.hide_message();
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ');
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch);
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush();
    }

    pub fn hide_message(&mut self) {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return,
        };

        // Restore what the box covered from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(ch) = self.screen_char((x, y)) {
                    self.print_at_no_save((x, y), ch);
                }
            }
        }

        self.flush();
    }

    /// Writes a short note into the top border.
    pub fn set_caption(&mut self, text: &str) {
        let room = self.width.saturating_sub(4) as usize;
        for (i, ch) in text.chars().take(room).enumerate() {
            self.print_at((2 + i as TermInt, 0), ch);
        }
        self.flush();
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_borders(&mut self, (width, height): Coords) -> crossterm::Result<()> {
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch);
            self.print_at((x, end_y), ch);
        }

        for y in 1..end_y {
            self.print_at((0, y), '|');
            self.print_at((end_x, y), '|');
        }

        self.stdout.flush()?;
        Ok(())
    }

    fn draw_cell(&mut self, pos: Position, ch: char) {
        let size = self.cell_size;
        let origin = (1 + pos.col as TermInt * size, 1 + pos.row as TermInt * size);

        for dy in 0..size {
            for dx in 0..size {
                self.print_at((origin.0 + dx, origin.1 + dy), ch);
            }
        }
    }

    fn draw_frame(&mut self, frame: &Snapshot, body_char: char) {
        for pos in std::mem::take(&mut self.drawn) {
            self.draw_cell(pos, ' ');
        }

        self.draw_cell(frame.food, FOOD_CHAR);
        for pos in frame.snake.iter().skip(1) {
            self.draw_cell(*pos, body_char);
        }
        if let Some(head) = frame.snake.first() {
            let ch = if body_char == DEAD_SNAKE_CHAR {body_char} else {frame.direction.head_char()};
            self.draw_cell(*head, ch);
        }

        self.drawn = frame.snake.clone();
        self.drawn.push(frame.food);
        self.flush();
    }

    fn print_at(&mut self, pos: Coords, ch: char) {
        if pos.0 >= self.width || pos.1 >= self.height {
            return;
        }

        self.print_at_no_save(pos, ch);
        self.screen[self.width as usize * pos.1 as usize + pos.0 as usize] = ch;
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) {
        // Message boxes go through here so the buffer keeps what they cover
        let res = queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch));
        self.record(res);
    }

    fn screen_char(&self, (x, y): Coords) -> Option<char> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.screen[self.width as usize * y as usize + x as usize])
    }

    fn flush(&mut self) {
        let res = self.stdout.flush().map_err(ErrorKind::from);
        self.record(res);
    }

    fn record(&mut self, res: crossterm::Result<()>) {
        if let Err(e) = res {
            if self.error.is_none() {
                self.error = Some(e);
            }
        }
    }
}

impl Renderer for TermManager {
    fn render(&mut self, frame: &Snapshot) {
        self.draw_frame(frame, SNAKE_BODY_CHAR);
    }
}

impl UiState for TermManager {
    fn status_changed(&mut self, _from: Status, to: Status, frame: &Snapshot) {
        match to {
            Status::Idle => self.show_intro(),
            Status::Running => self.hide_message(),
            Status::Paused => self.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"]),
            Status::Over => {
                self.hide_message();
                self.draw_frame(frame, DEAD_SNAKE_CHAR);
                self.show_message(&[
                    "Game over!",
                    &*format!("Score: {}", frame.score),
                    "",
                    "Press R to play again,",
                    "or CTRL+C to quit.",
                ]);
            }
        }
    }
}
