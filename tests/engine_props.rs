//! Property tests for rotation, validity and locking

use dropris::game::{Board, Game, Step, Tetromino};
use dropris::shape::CATALOG;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

const COLS: usize = 12;
const ROWS: usize = 24;

fn piece(shape: usize, turns: usize, x: i32, y: i32) -> Tetromino {
    let mut p = Tetromino::spawn(&CATALOG[shape], COLS);
    for _ in 0..turns {
        p.rotate();
    }
    p.x = x;
    p.y = y;
    p
}

proptest! {
    #[test]
    fn four_turns_are_identity(shape in 0..CATALOG.len(), turns in 0usize..4) {
        let start = piece(shape, turns, 0, 0);
        let mut p = start.clone();
        for _ in 0..4 {
            p.rotate();
        }
        prop_assert_eq!(p, start);
    }

    #[test]
    fn validity_on_empty_board_is_bounds(
        shape in 0..CATALOG.len(),
        turns in 0usize..4,
        x in -6i32..18,
        y in -6i32..30,
    ) {
        let p = piece(shape, turns, x, y);
        let in_bounds = p
            .cells()
            .all(|(cx, cy)| cx >= 0 && cx < COLS as i32 && cy < ROWS as i32);
        prop_assert_eq!(Board::new(COLS, ROWS).is_valid(&p), in_bounds);
    }

    #[test]
    fn rollout_keeps_invariants(seed in any::<u64>(), moves in prop::collection::vec(0u8..4, 1..400)) {
        let mut g = Game::with_rng(COLS, ROWS, StdRng::seed_from_u64(seed));
        for m in moves {
            if g.is_over() {
                let frozen = g.snapshot();
                prop_assert_eq!(g.step(), Step::GameOver);
                prop_assert_eq!(g.snapshot(), frozen);
                break;
            }
            let score = g.score();
            let filled = g.board().filled_count();
            let visible = g.current().cells().filter(|&(_, y)| y >= 0).count();

            match m {
                0 => { g.move_left(); }
                1 => { g.move_right(); }
                2 => { g.rotate(); }
                _ => {
                    if let Step::Locked { cleared } = g.step() {
                        prop_assert_eq!(
                            g.board().filled_count() + cleared * COLS,
                            filled + visible
                        );
                        prop_assert_eq!(g.score(), score + cleared as u32);
                    }
                }
            }

            prop_assert!(g.score() >= score);
            prop_assert!(g.level() == 1 || g.level() == 2);
            if !g.is_over() {
                prop_assert!(g.board().is_valid(g.current()));
            }
        }
    }
}
