//! Frame-level game loop logic shared by the terminal front end and tests:
//! gravity timing, the level 2 countdown, and win/lose detection.

use crate::config::GameConfig;
use crate::game::{Event, Game, Snapshot, Step};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Left,
    Right,
    Rotate,
    SoftDrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Won,
    Lost,
}

/// Time left to survive once the game has sped up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: Duration,
}

impl Countdown {
    pub fn new(total: Duration) -> Self {
        Countdown { remaining: total }
    }

    pub fn tick(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }
}

// MM:SS, whole seconds
impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.remaining.as_secs();
        write!(f, "{:02}:{:02}", secs / 60, secs % 60)
    }
}

pub struct Session {
    game: Game<StdRng>,
    countdown: Countdown,
    since_drop: Duration,
    status: Status,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let game = Game::with_rng(config.cols, config.rows, rng)
            .with_drop_interval(config.drop_interval)
            .with_level_up_score(config.level_up_score);
        Session {
            game,
            countdown: Countdown::new(config.countdown),
            since_drop: Duration::ZERO,
            status: Status::Running,
        }
    }

    pub fn game(&self) -> &Game<StdRng> {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game<StdRng> {
        &mut self.game
    }

    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    // the countdown only runs once the game has sped up
    pub fn countdown_running(&self) -> bool {
        self.game.level() >= 2
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.game.drain_events()
    }

    pub fn apply(&mut self, cmd: Command) -> Status {
        if self.status != Status::Running {
            return self.status;
        }
        match cmd {
            Command::Left => {
                self.game.move_left();
            }
            Command::Right => {
                self.game.move_right();
            }
            Command::Rotate => {
                self.game.rotate();
            }
            Command::SoftDrop => {
                if self.game.step() == Step::GameOver {
                    self.status = Status::Lost;
                }
            }
        }
        self.status
    }

    /// Applies the input gathered during one frame. Each kind of command
    /// acts at most once however often its key repeated, rotation first.
    pub fn apply_frame(&mut self, cmds: &[Command]) -> Status {
        for cmd in [
            Command::Rotate,
            Command::Left,
            Command::Right,
            Command::SoftDrop,
        ] {
            if cmds.contains(&cmd) {
                self.apply(cmd);
            }
        }
        self.status
    }

    /// Advances the clock by one frame: applies gravity once the drop
    /// interval has passed and runs the countdown at level 2.
    pub fn advance(&mut self, elapsed: Duration) -> Status {
        if self.status != Status::Running {
            return self.status;
        }

        self.since_drop += elapsed;
        if self.since_drop > self.game.drop_interval() {
            self.since_drop = Duration::ZERO;
            if self.game.step() == Step::GameOver {
                self.status = Status::Lost;
                return self.status;
            }
        }

        if self.countdown_running() {
            self.countdown.tick(elapsed);
            if self.countdown.is_expired() {
                self.status = Status::Won;
            }
        }
        self.status
    }
}
