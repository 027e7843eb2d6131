//! Falling-block puzzle engine.
//!
//! [`game::Game`] holds the board, the falling and preview pieces, score,
//! level and drop speed. [`session::Session`] wraps it with the frame clock
//! and the level 2 countdown; the `dropris` binary draws it in a terminal.

pub mod config;
pub mod game;
pub mod session;
pub mod shape;
