use rand::Rng;
use std::fmt;

// Tetrominos in their canonical (unrotated) orientation, one row per slice.
// Catalog position fixes the pairing of shape and color.
pub static CATALOG: [Shape; 7] = [
    Shape::new(Kind::T, &[&[1, 1, 1], &[0, 1, 0]], Color::Cyan),
    Shape::new(Kind::O, &[&[1, 1], &[1, 1]], Color::Orange),
    Shape::new(Kind::L, &[&[1, 1, 1], &[1, 0, 0]], Color::Blue),
    Shape::new(Kind::J, &[&[1, 1, 1], &[0, 0, 1]], Color::Red),
    Shape::new(Kind::S, &[&[0, 1, 1], &[1, 1, 0]], Color::Purple),
    Shape::new(Kind::Z, &[&[1, 1, 0], &[0, 1, 1]], Color::Green),
    Shape::new(Kind::I, &[&[1, 1, 1, 1]], Color::Yellow),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    T,
    O,
    L,
    J,
    S,
    Z,
    I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Cyan,
    Orange,
    Blue,
    Red,
    Purple,
    Green,
    Yellow,
}

impl Color {
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Cyan => (0, 255, 255),
            Color::Orange => (255, 165, 0),
            Color::Blue => (0, 0, 255),
            Color::Red => (255, 0, 0),
            Color::Purple => (128, 0, 128),
            Color::Green => (0, 255, 0),
            Color::Yellow => (255, 255, 0),
        }
    }
}

/// One catalog entry: a shape, its canonical cells and its color.
#[derive(Debug)]
pub struct Shape {
    kind: Kind,
    rows: &'static [&'static [u8]],
    color: Color,
}

impl Shape {
    const fn new(kind: Kind, rows: &'static [&'static [u8]], color: Color) -> Self {
        Shape { kind, rows, color }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> &'static Shape {
        &CATALOG[rng.random_range(0..CATALOG.len())]
    }

    // catalog is laid out in `Kind` declaration order
    pub fn by_kind(kind: Kind) -> &'static Shape {
        &CATALOG[kind as usize]
    }

    pub const fn kind(&self) -> Kind {
        self.kind
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub fn mask(&self) -> Mask {
        Mask::from_rows(self.rows)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mask = self.mask();
        for r in 0..4 {
            let (w, h) = mask.dim();
            writeln!(f, "{:?} rotation {r} dim: {w}x{h}", self.kind)?;
            write!(f, "{mask}")?;
            mask.rotate();
        }
        Ok(())
    }
}

/// Row-major boolean cell grid of a piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    cells: Vec<bool>,
}

impl Mask {
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let width = rows.first().map_or(0, |r| r.len());
        debug_assert!(rows.iter().all(|r| r.len() == width));
        let cells = rows.iter().flat_map(|r| r.iter().map(|&v| v != 0)).collect();
        Mask { width, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.cells.len() / self.width
        }
    }

    // width, height of mask
    pub fn dim(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && self.cells.get(y * self.width + x).copied().unwrap_or(false)
    }

    // (x, y) of every set cell, row by row
    pub fn coor(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| (i % width, i / width))
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&set| set).count()
    }

    // clockwise: reverse the rows, then transpose
    pub fn rotate(&mut self) {
        let (w, h) = self.dim();
        let mut cells = Vec::with_capacity(self.cells.len());
        for y in 0..w {
            for x in 0..h {
                cells.push(self.get(y, h - 1 - x));
            }
        }
        self.width = h;
        self.cells = cells;
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width {
                write!(f, "{}", if self.get(x, y) { 'X' } else { '.' })?
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
