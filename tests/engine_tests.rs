//! Integration tests for the engine through its public API

use dropris::game::{Board, Event, Game, Step, Tetromino};
use dropris::shape::{CATALOG, Color, Kind, Shape};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

fn seeded(seed: u64) -> Game<StdRng> {
    Game::with_rng(12, 24, StdRng::seed_from_u64(seed))
}

fn fill_row_except(board: &mut Board, y: usize, holes: &[usize]) {
    for x in 0..board.cols() {
        if !holes.contains(&x) {
            board.set(x, y, Some(Color::Green));
        }
    }
}

#[test]
fn fresh_piece_fits_empty_board() {
    for seed in 0..50 {
        let g = seeded(seed);
        assert!(g.board().is_valid(g.current()), "seed {seed}");
        assert_eq!(g.current().y, 0);
    }
    for shape in &CATALOG {
        let piece = Tetromino::spawn(shape, 12);
        assert!(Board::new(12, 24).is_valid(&piece), "{shape}");
    }
}

#[test]
fn gravity_only_stacks_until_game_over() {
    let mut g = seeded(1);
    let mut locks = 0;
    let mut over = false;
    for _ in 0..10_000 {
        match g.step() {
            Step::Fell => {}
            Step::Locked { cleared } => {
                // centered pieces never complete a 12 wide row
                assert_eq!(cleared, 0);
                locks += 1;
            }
            Step::GameOver => {
                over = true;
                break;
            }
        }
    }
    assert!(over);
    assert!(locks > 0);
    assert_eq!(g.score(), 0);

    let events: Vec<Event> = g.drain_events().collect();
    assert_eq!(events.last(), Some(&Event::GameOver));
    assert_eq!(
        events.iter().filter(|&&e| e == Event::Lock).count(),
        locks + 1
    );

    let frozen = g.snapshot();
    assert_eq!(g.step(), Step::GameOver);
    assert!(!g.rotate());
    assert_eq!(g.snapshot(), frozen);
}

#[test]
fn moving_left_at_wall_is_silent() {
    let mut g = seeded(2);
    while g.move_left() {}
    let x = g.current().x;
    assert!(g.current().cells().any(|(cx, _)| cx == 0));
    assert!(!g.move_left());
    assert_eq!(g.current().x, x);
    assert!(g.drain_events().all(|e| e == Event::Move));
    assert!(!g.move_left());
    assert_eq!(g.drain_events().count(), 0);
}

#[test]
fn moving_right_stops_at_wall() {
    let mut g = seeded(3);
    let mut moves = 0;
    while g.move_right() {
        moves += 1;
    }
    assert!(moves > 0);
    let right = g.current().cells().map(|(x, _)| x).max();
    assert_eq!(right, Some(11));
}

#[test]
fn single_full_row_clears() {
    let mut board = Board::new(12, 24);
    fill_row_except(&mut board, 7, &[]);
    assert_eq!(board.clear_full_rows(), 1);
    assert_eq!(board.filled_count(), 0);
}

#[test]
fn top_two_rows_clear_together() {
    let mut board = Board::new(12, 24);
    fill_row_except(&mut board, 0, &[]);
    fill_row_except(&mut board, 1, &[]);
    assert_eq!(board.clear_full_rows(), 2);
    assert_eq!(board.filled_count(), 0);
    assert_eq!(board.rows(), 24);
}

#[test]
fn vertical_i_clears_four_rows() {
    let mut g = seeded(4);
    for y in 20..24 {
        fill_row_except(g.board_mut(), y, &[0]);
    }
    let mut i = Tetromino::spawn(Shape::by_kind(Kind::I), 12);
    i.rotate();
    i.x = 0;
    i.y = 17;
    g.set_current(i);

    assert_eq!(g.step(), Step::Fell);
    assert_eq!(g.step(), Step::Fell);
    assert_eq!(g.step(), Step::Fell);
    assert_eq!(g.step(), Step::Locked { cleared: 4 });
    assert_eq!(g.score(), 4);
    assert_eq!(g.board().filled_count(), 0);
    assert_eq!(g.level(), 1);
}

#[test]
fn reaching_threshold_speeds_up() {
    let mut g = seeded(5).with_level_up_score(2);
    for y in [22, 23] {
        fill_row_except(g.board_mut(), y, &[5, 6]);
    }
    let mut o = Tetromino::spawn(Shape::by_kind(Kind::O), 12);
    o.y = 22;
    g.set_current(o);

    assert_eq!(g.step(), Step::Locked { cleared: 2 });
    assert_eq!(g.level(), 2);
    assert_eq!(g.drop_interval(), Duration::from_millis(70));
    assert!(g.drain_events().any(|e| e == Event::LevelUp(2)));
}
