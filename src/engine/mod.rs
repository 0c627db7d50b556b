//! Grid transitions: slide/merge, random spawns and terminal detection.
//!
//! All operations are pure over value-typed [`Grid`]s; the only outside input
//! is the [`SpawnSource`] handed to spawning functions.

mod ops;
pub mod state;

pub use state::{Direction, Grid, GridError, MoveResult, Score, SpawnSource, Tile, DEFAULT_SIZE, INITIAL_TILES, MAX_TILE};

/// An all-empty `size`x`size` grid.
pub fn create_empty_grid(size: usize) -> Grid {
    Grid::empty(size)
}

/// Fill one empty cell with a 2 (90%) or 4 (10%). No-op on a full grid.
pub fn spawn_tile<S: SpawnSource + ?Sized>(grid: &mut Grid, source: &mut S) -> Option<(usize, usize)> {
    grid.spawn_tile(source)
}

/// A fresh grid with `initial_tiles` spawned one after another.
///
/// ```
/// use twenty48::engine;
/// use rand::{rngs::StdRng, SeedableRng};
/// let mut rng = StdRng::seed_from_u64(42);
/// let g = engine::initialize_session(4, engine::INITIAL_TILES, &mut rng);
/// assert_eq!(g.tile_count(), 2);
/// ```
pub fn initialize_session<S: SpawnSource + ?Sized>(size: usize, initial_tiles: usize, source: &mut S) -> Grid {
    let mut grid = create_empty_grid(size);
    for _ in 0..initial_tiles {
        grid.spawn_tile(source);
    }
    grid
}

/// Slide/merge tiles in `direction`. No randomness; `grid` is not modified.
pub fn shift(grid: &Grid, direction: Direction) -> MoveResult {
    grid.shift(direction)
}

/// True if no move in any direction changes the board.
pub fn is_terminal(grid: &Grid) -> bool {
    grid.is_terminal()
}
