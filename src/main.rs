use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    QueueableCommand, cursor,
    event::{
        Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags, poll, read,
    },
    style::{self, Color as TermColor, Stylize},
    terminal,
};
use rand::Rng;
use std::io::{Write, stdout};
use std::time::Instant;

use dropris::config::{Args, GameConfig};
use dropris::game::{Event, Snapshot, Tetromino};
use dropris::session::{Command, Session, Status};
use dropris::shape::Color;

// score panel to the left of the board, in terminal columns
const PANEL_WIDTH: u16 = 18;

fn screen_color(c: Color) -> TermColor {
    let (r, g, b) = c.rgb();
    TermColor::Rgb { r, g, b }
}

// board size in terminal cells, two columns per board cell
fn board_extent(snap: &Snapshot) -> Result<(u16, u16)> {
    let cols = u16::try_from(snap.board.cols())?;
    let rows = u16::try_from(snap.board.rows())?;
    let width = cols
        .checked_mul(2)
        .context("playfield too wide for the terminal")?;
    Ok((width, rows))
}

fn area_width(session: &Session) -> Result<u16> {
    let (width, _) = board_extent(&session.snapshot())?;
    PANEL_WIDTH
        .checked_add(width)
        .and_then(|w| w.checked_add(2))
        .context("playfield too wide for the terminal")
}

fn centered_x(s: &str, width: u16) -> u16 {
    let n = s.chars().count() as u16;
    width.saturating_sub(n) / 2
}

/// Turns engine notifications into a status line and the terminal bell.
#[derive(Default)]
struct Cues {
    status: String,
    bell: bool,
}

impl Cues {
    fn on(&mut self, event: Event) {
        match event {
            Event::Move => self.status = "move".into(),
            Event::Rotate => self.status = "rotate".into(),
            Event::Lock => self.status = "drop".into(),
            Event::LinesCleared(n) => {
                self.status = format!("{n} line(s) cleared");
                self.bell = true;
            }
            Event::LevelUp(level) => {
                self.status = format!("level {level}! hold out");
                self.bell = true;
            }
            Event::GameOver => self.status = "topped out".into(),
        }
    }
}

fn wait_for_key(keys: &[KeyCode]) -> Result<KeyCode> {
    loop {
        if let TermEvent::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = read()?
        {
            if keys.is_empty() || keys.contains(&code) {
                return Ok(code);
            }
        }
    }
}

fn show_message(lines: &[(&str, TermColor)], width: u16) -> Result<()> {
    let mut stdout = stdout();
    stdout.queue(terminal::Clear(terminal::ClearType::All))?;
    for (i, (text, color)) in lines.iter().enumerate() {
        crossterm::queue!(
            stdout,
            cursor::MoveTo(centered_x(text, width), 6 + 2 * i as u16),
            style::PrintStyledContent(text.with(*color).bold()),
        )?;
    }
    stdout.flush()?;
    Ok(())
}

// false when the player quits from the start screen
fn show_start_screen(width: u16) -> Result<bool> {
    show_message(
        &[
            ("Dropris", TermColor::White),
            ("Press any key to start", TermColor::White),
        ],
        width,
    )?;
    let key = wait_for_key(&[])?;
    Ok(!matches!(key, KeyCode::Char('q') | KeyCode::Esc))
}

fn show_end_screen(text: &str, width: u16) -> Result<()> {
    show_message(
        &[(text, TermColor::Red), ("Press Esc to exit", TermColor::White)],
        width,
    )?;
    wait_for_key(&[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Enter])?;
    Ok(())
}

fn box_(x: u16, y: u16, width: u16, height: u16) -> Result<()> {
    const TOP_LEFT: &str = "\u{250f}";
    const TOP_RIGHT: &str = "\u{2513}";
    const BOTTOM_LEFT: &str = "\u{2517}";
    const BOTTOM_RIGHT: &str = "\u{251b}";
    const VERTICAL: &str = "\u{2503}";
    const HORIZONTAL: &str = "\u{2501}";
    let mut stdout = stdout();

    stdout
        .queue(cursor::MoveTo(x, y))?
        .queue(style::PrintStyledContent(TOP_LEFT.white()))?
        .queue(cursor::MoveTo(x + width, y))?
        .queue(style::PrintStyledContent(TOP_RIGHT.white()))?
        .queue(cursor::MoveTo(x, y + height))?
        .queue(style::PrintStyledContent(BOTTOM_LEFT.white()))?
        .queue(cursor::MoveTo(x + width, y + height))?
        .queue(style::PrintStyledContent(BOTTOM_RIGHT.white()))?;

    for i in 1..width {
        crossterm::queue!(
            stdout,
            cursor::MoveTo(x + i, y),
            style::PrintStyledContent(HORIZONTAL.white()),
            cursor::MoveTo(x + i, y + height),
            style::PrintStyledContent(HORIZONTAL.white())
        )?;
    }
    for i in 1..height {
        crossterm::queue!(
            stdout,
            cursor::MoveTo(x, y + i),
            style::PrintStyledContent(VERTICAL.white()),
            cursor::MoveTo(x + width, y + i),
            style::PrintStyledContent(VERTICAL.white())
        )?;
    }
    Ok(())
}

fn draw_piece(piece: &Tetromino, ox: i32, oy: i32) -> Result<()> {
    let mut stdout = stdout();
    for (x, y) in piece.cells() {
        if y < 0 {
            continue;
        }
        crossterm::queue!(
            stdout,
            cursor::MoveTo((ox + x * 2) as u16, (oy + y) as u16),
            style::PrintStyledContent("  ".on(screen_color(piece.color)))
        )?;
    }
    Ok(())
}

fn render_panel(session: &Session, snap: &Snapshot, cues: &Cues) -> Result<()> {
    let mut stdout = stdout();
    let (_, rows) = board_extent(snap)?;

    crossterm::queue!(
        stdout,
        cursor::MoveTo(1, 2),
        style::PrintStyledContent(
            format!("Score: {}/{}", snap.score, session.game().level_up_score())
                .bold()
                .white()
        ),
        cursor::MoveTo(1, 3),
        style::PrintStyledContent(format!("Level: {}", snap.level).bold().white()),
        cursor::MoveTo(1, 5),
        style::PrintStyledContent("Next piece:".white()),
    )?;

    // preview sits at the panel's left edge
    let next = Tetromino {
        x: 0,
        y: 0,
        ..snap.next.clone()
    };
    draw_piece(&next, 1, 7)?;

    if session.countdown_running() {
        crossterm::queue!(
            stdout,
            cursor::MoveTo(1, rows / 2),
            style::PrintStyledContent("Remaining time:".white()),
            cursor::MoveTo(1, rows / 2 + 1),
            style::PrintStyledContent(session.countdown().to_string().bold().white()),
        )?;
    }

    crossterm::queue!(
        stdout,
        cursor::MoveTo(1, rows + 3),
        style::PrintStyledContent(format!("{:<24}", cues.status).dark_grey()),
    )?;
    Ok(())
}

fn draw_screen(session: &Session, cues: &Cues, shake: (i32, i32)) -> Result<()> {
    let mut stdout = stdout();
    let snap = session.snapshot();
    let (width, rows) = board_extent(&snap)?;

    if shake != (0, 0) || session.countdown_running() {
        // the frame moves, so start from a blank screen
        stdout.queue(terminal::Clear(terminal::ClearType::All))?;
    }
    let bx = (PANEL_WIDTH as i32 + shake.0).max(0) as u16;
    let by = (shake.1 + 1).max(0) as u16;
    box_(bx, by, width + 1, rows + 1)?;

    let (ox, oy) = (bx + 1, by + 1);
    for (y, dy) in (0..snap.board.rows()).zip(0..rows) {
        crossterm::queue!(stdout, cursor::MoveTo(ox, oy + dy))?;
        for x in 0..snap.board.cols() {
            let s = match snap.board.get(x, y) {
                None => "  ".white(),
                Some(color) => "  ".on(screen_color(color)),
            };
            stdout.queue(style::PrintStyledContent(s))?;
        }
    }
    draw_piece(&snap.current, ox.into(), oy.into())?;

    render_panel(session, &snap, cues)?;
    if cues.bell {
        stdout.queue(style::Print("\u{7}"))?;
    }
    stdout.flush()?;
    Ok(())
}

// None when the player quits mid-game
fn runloop(session: &mut Session, config: &GameConfig) -> Result<Option<Status>> {
    let frame = config.frame();
    let mut cues = Cues::default();
    let mut rng = rand::rng();
    let mut last = Instant::now();

    let mut pending = Vec::new();

    loop {
        let deadline = last + frame;
        pending.clear();
        while poll(deadline.saturating_duration_since(Instant::now()))? {
            let TermEvent::Key(KeyEvent { code, kind, .. }) = read()? else {
                continue;
            };
            let cmd = match (code, kind) {
                (_, KeyEventKind::Release) => continue,
                (KeyCode::Char('q') | KeyCode::Esc, _) => return Ok(None),
                // rotation ignores auto-repeat when the terminal reports it
                (KeyCode::Up, KeyEventKind::Press) => Command::Rotate,
                (KeyCode::Left, _) => Command::Left,
                (KeyCode::Right, _) => Command::Right,
                (KeyCode::Down, _) => Command::SoftDrop,
                _ => continue,
            };
            pending.push(cmd);
        }
        session.apply_frame(&pending);

        let now = Instant::now();
        let status = session.advance(now - last);
        last = now;

        cues.bell = false;
        for event in session.drain_events() {
            cues.on(event);
        }
        let shake = if session.countdown_running() {
            (rng.random_range(-1..=1), rng.random_range(-1..=1))
        } else {
            (0, 0)
        };
        draw_screen(session, &cues, shake)?;

        if status != Status::Running {
            return Ok(Some(status));
        }
    }
}

fn play(session: &mut Session, config: &GameConfig) -> Result<()> {
    let width = area_width(session)?;
    if !show_start_screen(width)? {
        return Ok(());
    }
    stdout().queue(terminal::Clear(terminal::ClearType::All))?;

    match runloop(session, config)? {
        Some(Status::Won) => show_end_screen("You Win!", width),
        Some(Status::Lost) => show_end_screen("Game Over", width),
        Some(Status::Running) | None => Ok(()),
    }
}

fn main() -> Result<()> {
    let config = Args::parse().into_config()?;
    let mut session = Session::new(&config);

    crossterm::queue!(
        stdout(),
        style::ResetColor,
        terminal::EnterAlternateScreen,
        terminal::Clear(terminal::ClearType::All),
        cursor::Hide,
        cursor::MoveTo(0, 0)
    )?;
    terminal::enable_raw_mode()?;
    // without this, held keys arrive as repeated presses
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        stdout().queue(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }

    let result = play(&mut session, &config);

    // restore the terminal before reporting anything
    if enhanced {
        stdout().queue(PopKeyboardEnhancementFlags)?;
    }
    crossterm::queue!(
        stdout(),
        terminal::Clear(terminal::ClearType::All),
        terminal::LeaveAlternateScreen,
        cursor::Show,
        cursor::MoveTo(0, 0)
    )?;
    stdout().flush()?;
    terminal::disable_raw_mode()?;
    result?;

    let game = session.game();
    println!("Score: {}; Level: {}", game.score(), game.level());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropris::config::{MAX_COLS, MAX_ROWS};

    #[test]
    fn largest_board_fits_the_screen() {
        let session = Session::new(&GameConfig {
            cols: MAX_COLS,
            rows: MAX_ROWS,
            seed: Some(1),
            ..GameConfig::default()
        });
        assert_eq!(board_extent(&session.snapshot()).unwrap(), (400, 200));
        assert_eq!(area_width(&session).unwrap(), PANEL_WIDTH + 402);
    }

    #[test]
    fn default_area_width() {
        let session = Session::new(&GameConfig::default());
        assert_eq!(area_width(&session).unwrap(), 18 + 24 + 2);
    }
}
