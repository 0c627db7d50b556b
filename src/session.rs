//! A single game: grid, running score, persisted best score and phase.
//!
//! The host (terminal loop, GUI, test) owns a [`GameSession`] and feeds it
//! directions or raw key names one at a time.

use rand::Rng;

use crate::config::GameConfig;
use crate::engine::{self, Direction, Grid, GridError, Score};
use crate::storage::{load_best_score, save_best_score, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    /// No move can change the board. Only a restart leaves this phase.
    Terminal,
}

/// What a single input did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a direction, or the game is over.
    Ignored,
    /// The direction did not change the board; nothing was touched.
    Unchanged,
    Moved {
        score_delta: Score,
        spawned: Option<(usize, usize)>,
        new_best: bool,
    },
}

#[derive(Debug)]
pub struct GameSession<S, R> {
    grid: Grid,
    score: Score,
    best_score: Score,
    phase: Phase,
    initial_tiles: usize,
    best_score_key: String,
    store: S,
    rng: R,
}

impl<S: KeyValueStore, R: Rng> GameSession<S, R> {
    /// Load the best score once and deal a fresh board.
    pub fn start(config: &GameConfig, store: S, rng: R) -> Self {
        let best_score = load_best_score(&store, &config.best_score_key);
        let mut session = GameSession {
            grid: Grid::empty(config.size),
            score: 0,
            best_score,
            phase: Phase::Active,
            initial_tiles: config.initial_tiles,
            best_score_key: config.best_score_key.clone(),
            store,
            rng,
        };
        session.reset(config.size);
        log::info!("new game, best score {best_score}");
        session
    }

    /// Continue from an existing board and score.
    pub fn resume(config: &GameConfig, grid: Grid, score: Score, store: S, rng: R) -> Result<Self, GridError> {
        if grid.size() != config.size {
            return Err(GridError::SizeMismatch {
                size: config.size,
                expected: config.size * config.size,
                actual: grid.size() * grid.size(),
            });
        }
        let best_score = load_best_score(&store, &config.best_score_key);
        let phase = if grid.is_terminal() { Phase::Terminal } else { Phase::Active };
        let mut session = GameSession {
            grid,
            score: 0,
            best_score,
            phase,
            initial_tiles: config.initial_tiles,
            best_score_key: config.best_score_key.clone(),
            store,
            rng,
        };
        session.add_score(score);
        Ok(session)
    }

    /// Fresh board, score 0, phase Active. The best score is kept.
    pub fn restart(&mut self) {
        self.reset(self.grid.size());
        log::info!("restarted, best score {}", self.best_score);
    }

    /// Map a key name to a direction and apply it; other keys are ignored.
    pub fn handle_key(&mut self, key: &str) -> Outcome {
        match Direction::from_key(key) {
            Some(direction) => self.apply(direction),
            None => Outcome::Ignored,
        }
    }

    /// Slide the board. A productive move spawns one tile, adds the merge
    /// score, persists a new best and re-checks for game over.
    pub fn apply(&mut self, direction: Direction) -> Outcome {
        if self.phase == Phase::Terminal {
            return Outcome::Ignored;
        }
        let result = self.grid.shift(direction);
        if !result.moved {
            return Outcome::Unchanged;
        }
        self.grid = result.grid;
        let spawned = self.grid.spawn_tile(&mut self.rng);
        let new_best = self.add_score(result.score_delta);
        log::debug!("{direction}: +{} ({} merges), score {}", result.score_delta, result.merges, self.score);
        if self.grid.is_terminal() {
            self.phase = Phase::Terminal;
            log::info!("game over, score {} (best {})", self.score, self.best_score);
        }
        Outcome::Moved { score_delta: result.score_delta, spawned, new_best }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn best_score(&self) -> Score {
        self.best_score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn reset(&mut self, size: usize) {
        self.grid = engine::initialize_session(size, self.initial_tiles, &mut self.rng);
        self.score = 0;
        self.phase = if self.grid.is_terminal() { Phase::Terminal } else { Phase::Active };
    }

    /// Returns true when the best score was raised (and written out).
    fn add_score(&mut self, delta: Score) -> bool {
        self.score = self.score.saturating_add(delta);
        if self.score <= self.best_score {
            return false;
        }
        self.best_score = self.score;
        save_best_score(&mut self.store, &self.best_score_key, self.best_score, &mut self.rng);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::storage::{MemoryStore, BEST_SCORE_KEY};
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2048)
    }

    fn top_row(tiles: [u64; 4]) -> Grid {
        Grid::from_rows(&[tiles.to_vec(), vec![0; 4], vec![0; 4], vec![0; 4]]).unwrap()
    }

    #[test]
    fn it_starts_with_two_tiles() {
        let s = GameSession::start(&GameConfig::default(), MemoryStore::new(), rng());
        assert_eq!(s.grid().tile_count(), 2);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best_score(), 0);
        assert_eq!(s.phase(), Phase::Active);
    }

    #[test]
    fn it_loads_best_score_from_store() {
        let mut store = MemoryStore::new();
        store.set(BEST_SCORE_KEY, codec::encode(500, &mut rng()));
        let s = GameSession::start(&GameConfig::default(), store, rng());
        assert_eq!(s.best_score(), 500);
    }

    #[test]
    fn it_keeps_noop_moves_inert() {
        let grid = top_row([2, 0, 0, 0]);
        let mut s = GameSession::resume(&GameConfig::default(), grid.clone(), 8, MemoryStore::new(), rng()).unwrap();
        assert_eq!(s.apply(Direction::Left), Outcome::Unchanged);
        assert_eq!(s.apply(Direction::Up), Outcome::Unchanged);
        assert_eq!(s.grid(), &grid);
        assert_eq!(s.score(), 8);
    }

    #[test]
    fn it_scores_and_spawns_on_merge() {
        let mut s = GameSession::resume(&GameConfig::default(), top_row([2, 2, 0, 0]), 0, MemoryStore::new(), rng()).unwrap();
        let outcome = s.apply(Direction::Left);
        let Outcome::Moved { score_delta, spawned, new_best } = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_eq!(score_delta, 4);
        assert!(spawned.is_some());
        assert!(new_best);
        assert_eq!(s.grid().get(0, 0), 4);
        assert_eq!(s.grid().tile_count(), 2);
        assert_eq!(s.score(), 4);
        assert_eq!(s.best_score(), 4);
        assert_eq!(codec::decode(&s.store().get(BEST_SCORE_KEY).unwrap()), 4);
    }

    #[test]
    fn it_does_not_lower_best_score() {
        let mut store = MemoryStore::new();
        store.set(BEST_SCORE_KEY, codec::encode(1000, &mut rng()));
        let before = store.get(BEST_SCORE_KEY);
        let mut s = GameSession::resume(&GameConfig::default(), top_row([2, 2, 0, 0]), 0, store, rng()).unwrap();
        assert!(matches!(s.apply(Direction::Right), Outcome::Moved { new_best: false, .. }));
        assert_eq!(s.best_score(), 1000);
        assert_eq!(s.store().get(BEST_SCORE_KEY), before);
    }

    #[test]
    fn it_ignores_input_once_terminal() {
        let grid = Grid::from_rows(&[vec![2, 4], vec![4, 2]]).unwrap();
        let config = GameConfig { size: 2, ..GameConfig::default() };
        let mut s = GameSession::resume(&config, grid.clone(), 12, MemoryStore::new(), rng()).unwrap();
        assert!(s.is_terminal());
        assert_eq!(s.apply(Direction::Left), Outcome::Ignored);
        assert_eq!(s.handle_key("ArrowDown"), Outcome::Ignored);
        assert_eq!(s.grid(), &grid);

        s.restart();
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best_score(), 12);
        assert_eq!(s.grid().tile_count(), 2);
    }

    #[test]
    fn it_ignores_unknown_keys() {
        let mut s = GameSession::start(&GameConfig::default(), MemoryStore::new(), rng());
        let before = s.grid().clone();
        assert_eq!(s.handle_key("Escape"), Outcome::Ignored);
        assert_eq!(s.grid(), &before);
    }

    #[test]
    fn it_rejects_mismatched_grid() {
        let err = GameSession::resume(&GameConfig::default(), Grid::empty(3), 0, MemoryStore::new(), rng()).unwrap_err();
        assert_eq!(err, GridError::SizeMismatch { size: 4, expected: 16, actual: 9 });
    }
}
