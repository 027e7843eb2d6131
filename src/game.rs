use crate::shape::{Color, Mask, Shape};
use rand::prelude::*;
use rand::rngs::ThreadRng;
use std::fmt;
use std::mem;
use std::time::Duration;

// 300x600 playfield of 25 pixel blocks
pub const BOARD_WIDTH: usize = 12;
pub const BOARD_HEIGHT: usize = 24;
pub const DROP_INTERVAL_MS: u64 = 100;
pub const LEVEL_UP_SCORE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tetromino {
    pub x: i32, // mask location on the board (upper left)
    pub y: i32,
    pub mask: Mask,
    pub color: Color,
}

impl Tetromino {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, cols: usize) -> Self {
        Self::spawn(Shape::random(rng), cols)
    }

    // centered horizontally on the top row
    pub fn spawn(shape: &Shape, cols: usize) -> Self {
        let mask = shape.mask();
        let x = (cols / 2) as i32 - (mask.width() / 2) as i32;
        Tetromino {
            x,
            y: 0,
            mask,
            color: shape.color(),
        }
    }

    pub fn rotate(&mut self) {
        self.mask.rotate();
    }

    // board coordinates of the occupied cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.mask
            .coor()
            .map(|(x, y)| (self.x + x as i32, self.y + y as i32))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    cells: Vec<Vec<Option<Color>>>, // row 0 is the top
}

impl Default for Board {
    fn default() -> Board {
        Board::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

impl Board {
    pub fn new(cols: usize, rows: usize) -> Board {
        Board {
            cols,
            cells: vec![vec![None; cols]; rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        self.cells.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    pub fn set(&mut self, x: usize, y: usize, v: Option<Color>) {
        if let Some(cell) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = v;
        }
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Whether `piece` fits: every occupied cell inside the side walls, above
    /// the floor, and on an empty cell. Cells above the top row are allowed.
    pub fn is_valid(&self, piece: &Tetromino) -> bool {
        piece.cells().all(|(x, y)| {
            if x < 0 || x >= self.cols as i32 || y >= self.rows() as i32 {
                return false;
            }
            y < 0 || self.get(x as usize, y as usize).is_none()
        })
    }

    // cells above the top row have nowhere to go and are dropped
    fn place(&mut self, piece: &Tetromino) {
        for (x, y) in piece.cells() {
            if y >= 0 {
                self.set(x as usize, y as usize, Some(piece.color));
            }
        }
    }

    /// Removes every full row in one pass and refills the top with empty
    /// rows. Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let rows = self.rows();
        self.cells.retain(|row| !row.iter().all(Option::is_some));
        let cleared = rows - self.cells.len();
        let empty = vec![None; self.cols];
        self.cells.splice(0..0, std::iter::repeat_n(empty, cleared));
        cleared
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{}", if cell.is_some() { '#' } else { '.' })?
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Notifications for the presentation layer, drained after each command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Move,
    Rotate,
    Lock,
    LinesCleared(usize),
    LevelUp(u32),
    GameOver,
}

/// Result of one gravity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fell,
    Locked { cleared: usize },
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Left,
    Right,
    Down,
    Rotate,
}

impl Move {
    fn apply(self, piece: &mut Tetromino) {
        match self {
            Move::Left => piece.x -= 1,
            Move::Right => piece.x += 1,
            Move::Down => piece.y += 1,
            Move::Rotate => piece.rotate(),
        }
    }

    fn undo(self, piece: &mut Tetromino) {
        match self {
            Move::Left => piece.x += 1,
            Move::Right => piece.x -= 1,
            Move::Down => piece.y -= 1,
            // four quarter turns are the identity
            Move::Rotate => (0..3).for_each(|_| piece.rotate()),
        }
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub current: Tetromino,
    pub next: Tetromino,
    pub score: u32,
    pub level: u32,
    pub drop_interval: Duration,
    pub over: bool,
}

pub struct Game<R = ThreadRng> {
    board: Board,
    current: Tetromino, // falling piece
    next: Tetromino,    // preview
    score: u32,
    level: u32,
    drop_interval_ms: u64,
    level_up_score: u32,
    over: bool,
    events: Vec<Event>,
    rng: R,
}

impl Game {
    pub fn new(cols: usize, rows: usize) -> Game {
        Game::with_rng(cols, rows, rand::rng())
    }
}

impl<R: Rng> Game<R> {
    pub fn with_rng(cols: usize, rows: usize, mut rng: R) -> Self {
        let current = Tetromino::new(&mut rng, cols);
        let next = Tetromino::new(&mut rng, cols);
        Game {
            board: Board::new(cols, rows),
            current,
            next,
            score: 0,
            level: 1,
            drop_interval_ms: DROP_INTERVAL_MS,
            level_up_score: LEVEL_UP_SCORE,
            over: false,
            events: Vec::new(),
            rng,
        }
    }

    pub fn with_drop_interval(mut self, interval: Duration) -> Self {
        self.drop_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_level_up_score(mut self, score: u32) -> Self {
        self.level_up_score = score;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for setting up positions.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn current(&self) -> &Tetromino {
        &self.current
    }

    pub fn next(&self) -> &Tetromino {
        &self.next
    }

    pub fn set_current(&mut self, piece: Tetromino) {
        self.current = piece;
    }

    pub fn set_next(&mut self, piece: Tetromino) {
        self.next = piece;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_up_score(&self) -> u32 {
        self.level_up_score
    }

    pub fn drop_interval(&self) -> Duration {
        Duration::from_millis(self.drop_interval_ms)
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain(..)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            current: self.current.clone(),
            next: self.next.clone(),
            score: self.score,
            level: self.level,
            drop_interval: self.drop_interval(),
            over: self.over,
        }
    }

    // move the current piece if it does not hit anything
    fn try_move(&mut self, m: Move) -> bool {
        if self.over {
            return false;
        }
        m.apply(&mut self.current);
        if self.board.is_valid(&self.current) {
            return true;
        }
        m.undo(&mut self.current);
        false
    }

    pub fn move_left(&mut self) -> bool {
        let moved = self.try_move(Move::Left);
        if moved {
            self.events.push(Event::Move);
        }
        moved
    }

    pub fn move_right(&mut self) -> bool {
        let moved = self.try_move(Move::Right);
        if moved {
            self.events.push(Event::Move);
        }
        moved
    }

    /// Rotates clockwise; a rotation that does not fit is undone. The rotate
    /// cue fires for every attempt.
    pub fn rotate(&mut self) -> bool {
        if self.over {
            return false;
        }
        self.events.push(Event::Rotate);
        self.try_move(Move::Rotate)
    }

    /// One row of gravity. Shared by the timed tick and soft drop.
    pub fn step(&mut self) -> Step {
        if self.over {
            return Step::GameOver;
        }
        if self.try_move(Move::Down) {
            return Step::Fell;
        }

        let cleared = self.lock();
        if !self.board.is_valid(&self.current) {
            // topped out
            self.over = true;
            self.events.push(Event::GameOver);
            return Step::GameOver;
        }
        Step::Locked { cleared }
    }

    fn lock(&mut self) -> usize {
        self.board.place(&self.current);
        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            self.score += cleared as u32;
            self.events.push(Event::LinesCleared(cleared));
        }

        let next = Tetromino::new(&mut self.rng, self.board.cols());
        self.current = mem::replace(&mut self.next, next);
        self.events.push(Event::Lock);

        self.level_up();
        cleared
    }

    // one-shot: only level 1 has a successor
    fn level_up(&mut self) {
        if self.level == 1 && self.score >= self.level_up_score {
            self.level += 1;
            self.drop_interval_ms = self.drop_interval_ms * 7 / 10;
            self.events.push(Event::LevelUp(self.level));
        }
    }
}
