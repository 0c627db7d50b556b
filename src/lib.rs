//! twenty48: the 2048 game-state engine and best-score codec
//!
//! This crate provides:
//! - A value-typed `Grid` with pure transitions (`shift`, `spawn_tile`, `is_terminal`, ...)
//! - A `GameSession` state machine that scores moves and persists the best score
//! - An obfuscating codec for the stored best score (`codec` module)
//! - Key-value stores for that score (`storage` module)
//!
//! Quick start:
//! ```
//! use twenty48::engine::{self, Direction};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let g0 = engine::initialize_session(4, engine::INITIAL_TILES, &mut rng);
//! let r = engine::shift(&g0, Direction::Left);
//! assert!(r.grid.tile_sum() == g0.tile_sum());
//! ```
//!
//! Full loop with a session and an in-memory store:
//! ```
//! use twenty48::config::GameConfig;
//! use twenty48::engine::Direction;
//! use twenty48::session::GameSession;
//! use twenty48::storage::MemoryStore;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut game = GameSession::start(&GameConfig::default(), MemoryStore::new(), StdRng::seed_from_u64(7));
//! let mut moves = 0;
//! while !game.is_terminal() && moves < 32 {
//!     game.apply(Direction::ALL[moves % 4]);
//!     moves += 1;
//! }
//! assert!(game.best_score() >= game.score());
//! ```
//!
pub mod codec;
pub mod config;
pub mod engine;
pub mod session;
pub mod storage;
