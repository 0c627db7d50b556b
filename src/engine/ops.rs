use rand::Rng;

use super::state::{Direction, Grid, MoveResult, Score, Tile, MAX_TILE};

/// Result of collapsing a single line in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineShift {
    pub tiles: Vec<Tile>,
    pub score: Score,
    pub merges: usize,
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 2 } else { 4 }
}

#[inline]
pub(crate) fn is_valid_tile(value: Tile) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

/// Equal tiles merge unless the result would pass `MAX_TILE`.
#[inline]
pub(crate) fn can_merge(a: Tile, b: Tile) -> bool {
    a == b && a != 0 && a < MAX_TILE
}

/// Compact, merge and pad a line whose index 0 is the edge tiles move toward.
///
/// A freshly merged tile is compared again with the next remaining tile, so
/// `[2, 2, 4]` collapses all the way to `[8, 0, 0]`.
pub(crate) fn collapse_line(line: &[Tile]) -> LineShift {
    let mut packed: Vec<Tile> = line.iter().copied().filter(|&t| t != 0).collect();
    let mut score = 0;
    let mut merges = 0;
    let mut idx = 0;
    while idx + 1 < packed.len() {
        if can_merge(packed[idx], packed[idx + 1]) {
            packed[idx] *= 2;
            score = Score::saturating_add(score, packed[idx]);
            packed.remove(idx + 1);
            merges += 1;
            // stay on idx: the merged tile gets checked against its new neighbour
            continue;
        }
        idx += 1;
    }
    packed.resize(line.len(), 0);
    LineShift { tiles: packed, score, merges }
}

/// Board coordinates of line `idx`, ordered from the edge tiles move toward.
fn line_coords(size: usize, idx: usize, dir: Direction) -> impl Iterator<Item = (usize, usize)> {
    (0..size).map(move |k| match dir {
        Direction::Left => (idx, k),
        Direction::Right => (idx, size - 1 - k),
        Direction::Up => (k, idx),
        Direction::Down => (size - 1 - k, idx),
    })
}

pub(crate) fn extract_line(grid: &Grid, idx: usize, dir: Direction) -> Vec<Tile> {
    line_coords(grid.size(), idx, dir).map(|(r, c)| grid.get(r, c)).collect()
}

fn write_line(grid: &mut Grid, idx: usize, dir: Direction, tiles: &[Tile]) {
    for ((r, c), &t) in line_coords(grid.size(), idx, dir).zip(tiles) {
        grid.set(r, c, t);
    }
}

pub(crate) fn shift(grid: &Grid, dir: Direction) -> MoveResult {
    let mut out = grid.clone();
    let mut moved = false;
    let mut score_delta = 0;
    let mut merges = 0;
    for idx in 0..grid.size() {
        let line = extract_line(grid, idx, dir);
        let shifted = collapse_line(&line);
        if shifted.tiles != line {
            moved = true;
            write_line(&mut out, idx, dir, &shifted.tiles);
        }
        score_delta = Score::saturating_add(score_delta, shifted.score);
        merges += shifted.merges;
    }
    MoveResult { grid: out, moved, score_delta, merges }
}

/// Right and bottom neighbours of every cell cover each adjacent pair once.
pub(crate) fn is_terminal(grid: &Grid) -> bool {
    let n = grid.size();
    if grid.count_empty() > 0 {
        return false;
    }
    for row in 0..n {
        for col in 0..n {
            let tile = grid.get(row, col);
            if col + 1 < n && can_merge(grid.get(row, col + 1), tile) {
                return false;
            }
            if row + 1 < n && can_merge(grid.get(row + 1, col), tile) {
                return false;
            }
        }
    }
    true
}
