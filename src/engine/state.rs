use rand::Rng;
use std::fmt;

use super::ops;

pub type Tile = u64;
pub type Score = u64;

/// Side length of the classic board.
pub const DEFAULT_SIZE: usize = 4;
/// Tiles placed on a fresh board.
pub const INITIAL_TILES: usize = 2;
/// Largest tile a grid may hold. Two of these never merge, so every merge
/// result still fits in a `Tile`.
pub const MAX_TILE: Tile = 1 << 62;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Map a key name to a direction.
    ///
    /// Accepts browser-style arrow names (`ArrowUp`), plain names (`up`) and
    /// `w`/`a`/`s`/`d`, case-insensitively. Anything else is `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "arrowup" | "up" | "w" => Some(Direction::Up),
            "arrowdown" | "down" | "s" => Some(Direction::Down),
            "arrowleft" | "left" | "a" => Some(Direction::Left),
            "arrowright" | "right" | "d" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must have at least one row")]
    Empty,
    #[error("row {row} has {len} cells, expected {size}")]
    Ragged { row: usize, len: usize, size: usize },
    #[error("expected {expected} cells for a {size}x{size} grid, got {actual}")]
    SizeMismatch { size: usize, expected: usize, actual: usize },
    #[error("tile {value} at ({row}, {col}) is not a power of two in 2..=2^62")]
    InvalidTile { row: usize, col: usize, value: Tile },
}

/// Source of randomness for tile spawns.
///
/// Every `rand::Rng` is a `SpawnSource` (uniform cell, 2 with probability 0.9,
/// 4 otherwise). Tests can supply a scripted source to pin placements.
pub trait SpawnSource {
    /// Index into the row-major list of empty cells; must be `< empty_cells`.
    fn pick_cell(&mut self, empty_cells: usize) -> usize;
    /// Value of the new tile.
    fn pick_tile(&mut self) -> Tile;
}

impl<R: Rng + ?Sized> SpawnSource for R {
    #[inline]
    fn pick_cell(&mut self, empty_cells: usize) -> usize {
        self.gen_range(0..empty_cells)
    }

    #[inline]
    fn pick_tile(&mut self) -> Tile {
        ops::generate_random_tile(self)
    }
}

/// Outcome of sliding a grid in one direction. The source grid is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub grid: Grid,
    /// True if any cell differs from the source grid.
    pub moved: bool,
    /// Sum of every tile produced by a merge. Zero when `moved` is false.
    pub score_delta: Score,
    /// Number of merges performed.
    pub merges: usize,
}

/// Square board of tiles stored row-major. `0` is an empty cell.
///
/// Every non-zero cell is a power of two >= 2.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<Tile>,
}

impl Grid {
    /// An all-empty `size`x`size` grid.
    ///
    /// Panics if `size` is zero.
    pub fn empty(size: usize) -> Self {
        assert!(size > 0, "grid size must be positive");
        Grid { size, cells: vec![0; size * size] }
    }

    /// Build a grid from rows, validating squareness and tile values.
    ///
    /// ```
    /// use twenty48::engine::Grid;
    /// let g = Grid::from_rows(&[vec![2, 0], vec![0, 4]]).unwrap();
    /// assert_eq!(g.count_empty(), 2);
    /// assert!(Grid::from_rows(&[vec![3, 0], vec![0, 0]]).is_err());
    /// ```
    pub fn from_rows<R: AsRef<[Tile]>>(rows: &[R]) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != size {
                return Err(GridError::Ragged { row, len: r.len(), size });
            }
            cells.extend_from_slice(r);
        }
        Self::from_cells(size, cells)
    }

    /// Build a grid from row-major cells.
    pub fn from_cells(size: usize, cells: Vec<Tile>) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::Empty);
        }
        if cells.len() != size * size {
            return Err(GridError::SizeMismatch { size, expected: size * size, actual: cells.len() });
        }
        for (idx, &value) in cells.iter().enumerate() {
            if !ops::is_valid_tile(value) {
                return Err(GridError::InvalidTile { row: idx / size, col: idx % size, value });
            }
        }
        Ok(Grid { size, cells })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tile at (`row`, `col`). Panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.cells[self.index(row, col)]
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: Tile) {
        debug_assert!(ops::is_valid_tile(value));
        let idx = self.index(row, col);
        self.cells[idx] = value;
    }

    /// Row-major view of all cells.
    #[inline]
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.cells.chunks(self.size)
    }

    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.rows().map(<[Tile]>::to_vec).collect()
    }

    /// Coordinates of empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &t)| t == 0)
            .map(|(idx, _)| (idx / self.size, idx % self.size))
            .collect()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&t| t == 0).count()
    }

    pub fn tile_count(&self) -> usize {
        self.cells.len() - self.count_empty()
    }

    /// Highest tile on the board, 0 when empty.
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tiles, saturating at `u64::MAX`.
    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().fold(0, |acc: u64, &t| acc.saturating_add(t))
    }

    /// Place one new tile into a uniformly chosen empty cell.
    ///
    /// Returns the coordinates filled, or `None` (leaving the grid unchanged)
    /// when the board is full.
    ///
    /// ```
    /// use twenty48::engine::Grid;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let mut g = Grid::empty(4);
    /// g.spawn_tile(&mut rng);
    /// g.spawn_tile(&mut rng);
    /// assert_eq!(g.count_empty(), 14);
    /// ```
    pub fn spawn_tile<S: SpawnSource + ?Sized>(&mut self, source: &mut S) -> Option<(usize, usize)> {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let pick = source.pick_cell(empty.len());
        debug_assert!(pick < empty.len(), "spawn source picked cell {pick} of {}", empty.len());
        let (row, col) = empty[pick];
        let value = source.pick_tile();
        self.set(row, col, value);
        log::trace!("spawned {value} at ({row}, {col})");
        Some((row, col))
    }

    /// Slide and merge every line toward `dir`, returning a new grid.
    ///
    /// ```
    /// use twenty48::engine::{Direction, Grid};
    /// let g = Grid::from_rows(&[vec![2, 2], vec![0, 0]]).unwrap();
    /// let r = g.shift(Direction::Left);
    /// assert!(r.moved);
    /// assert_eq!(r.score_delta, 4);
    /// assert_eq!(r.grid.to_rows(), vec![vec![4, 0], vec![0, 0]]);
    /// ```
    #[inline]
    pub fn shift(&self, dir: Direction) -> MoveResult {
        ops::shift(self, dir)
    }

    /// True when the board is full and no two orthogonal neighbours match.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        ops::is_terminal(self)
    }

    /// Directions that would change the board.
    pub fn available_moves(&self) -> Vec<Direction> {
        Direction::ALL.into_iter().filter(|&d| self.shift(d).moved).collect()
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(row < self.size && col < self.size, "cell ({row}, {col}) outside {0}x{0} grid", self.size);
        row * self.size + col
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::empty(DEFAULT_SIZE)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid").field("size", &self.size).field("rows", &self.to_rows()).finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(self.size * 8);
        for (idx, row) in self.rows().enumerate() {
            if idx > 0 {
                writeln!(f, "{separator}")?;
            }
            let cells: Vec<String> = row.iter().map(|&t| format_val(t)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(val: Tile) -> String {
    match val {
        0 => String::from("       "),
        x => format!("{:^7}", x),
    }
}
