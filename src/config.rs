use crate::game::{BOARD_HEIGHT, BOARD_WIDTH, DROP_INTERVAL_MS, LEVEL_UP_SCORE};
use anyhow::{Result, ensure};
use clap::Parser;
use std::time::Duration;

pub const FRAMES_PER_SECOND: u32 = 10;
pub const COUNTDOWN_SECS: u64 = 150;

// widest piece is four cells
const MIN_SIDE: usize = 4;
// two terminal columns per cell must fit a u16 screen coordinate
pub const MAX_COLS: usize = 200;
pub const MAX_ROWS: usize = 200;

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "dropris",
    version,
    about = "Falling-block puzzle in the terminal. Clear 10 rows to reach level 2, then survive the countdown to win.",
    long_about = "Falling-block puzzle in the terminal.\n\n\
        Clear rows to score. At the level-up score the game speeds up and a countdown \
        starts; survive until it runs out to win.\n\n\
        CONTROLS:\n  Left/Right  Move    Up  Rotate    Down  Soft drop    q / Esc  Quit"
)]
pub struct Args {
    /// Playfield width in cells.
    #[arg(long, default_value_t = BOARD_WIDTH, value_name = "COLS")]
    pub cols: usize,

    /// Playfield height in cells.
    #[arg(long, default_value_t = BOARD_HEIGHT, value_name = "ROWS")]
    pub rows: usize,

    /// Milliseconds between gravity steps at level 1.
    #[arg(long, default_value_t = DROP_INTERVAL_MS, value_name = "MS")]
    pub drop_interval: u64,

    /// Frames per second of the input/render loop.
    #[arg(long, default_value_t = FRAMES_PER_SECOND)]
    pub fps: u32,

    /// Seconds to survive after reaching level 2.
    #[arg(long, default_value_t = COUNTDOWN_SECS, value_name = "SECS")]
    pub countdown: u64,

    /// Score that advances level 1 to level 2.
    #[arg(long, default_value_t = LEVEL_UP_SCORE, value_name = "N")]
    pub level_up_score: u32,

    /// Seed for the piece generator; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    pub fn into_config(self) -> Result<GameConfig> {
        let config = GameConfig {
            cols: self.cols,
            rows: self.rows,
            drop_interval: Duration::from_millis(self.drop_interval),
            fps: self.fps,
            countdown: Duration::from_secs(self.countdown),
            level_up_score: self.level_up_score,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub cols: usize,
    pub rows: usize,
    pub drop_interval: Duration,
    pub fps: u32,
    pub countdown: Duration,
    pub level_up_score: u32,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            cols: BOARD_WIDTH,
            rows: BOARD_HEIGHT,
            drop_interval: Duration::from_millis(DROP_INTERVAL_MS),
            fps: FRAMES_PER_SECOND,
            countdown: Duration::from_secs(COUNTDOWN_SECS),
            level_up_score: LEVEL_UP_SCORE,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.cols >= MIN_SIDE,
            "playfield needs at least {MIN_SIDE} columns, got {}",
            self.cols
        );
        ensure!(
            self.rows >= MIN_SIDE,
            "playfield needs at least {MIN_SIDE} rows, got {}",
            self.rows
        );
        ensure!(
            self.cols <= MAX_COLS,
            "playfield is at most {MAX_COLS} columns, got {}",
            self.cols
        );
        ensure!(
            self.rows <= MAX_ROWS,
            "playfield is at most {MAX_ROWS} rows, got {}",
            self.rows
        );
        ensure!(self.fps > 0, "fps must be positive");
        ensure!(
            !self.drop_interval.is_zero(),
            "drop interval must be positive"
        );
        Ok(())
    }

    pub fn frame(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }
}
