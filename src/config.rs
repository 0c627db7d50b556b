use std::io::Read;
use std::path::{Path, PathBuf};

use crate::engine::{DEFAULT_SIZE, INITIAL_TILES};
use crate::storage::BEST_SCORE_KEY;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("grid size must be at least 2, got {0}")]
    GridTooSmall(usize),
    #[error("{tiles} initial tiles do not fit on a {size}x{size} grid")]
    TooManyTiles { tiles: usize, size: usize },
    #[error("best score key must not be empty")]
    EmptyKey,
}

/// Game settings, loadable from TOML. Every field is optional.
///
/// ```toml
/// size = 4
/// initial_tiles = 2
/// best_score_key = "bestScore"
/// store_path = "/tmp/twenty48.json"
/// seed = 42
/// ```
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    #[serde(default = "defaults::size")]
    pub size: usize,
    #[serde(default = "defaults::initial_tiles")]
    pub initial_tiles: usize,
    #[serde(default = "defaults::best_score_key")]
    pub best_score_key: String,
    /// Where the file store lives; `None` means the platform data dir.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Fixed RNG seed for reproducible games.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: defaults::size(),
            initial_tiles: defaults::initial_tiles(),
            best_score_key: defaults::best_score_key(),
            store_path: None,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < 2 {
            return Err(ConfigError::GridTooSmall(self.size));
        }
        if self.initial_tiles > self.size * self.size {
            return Err(ConfigError::TooManyTiles { tiles: self.initial_tiles, size: self.size });
        }
        if self.best_score_key.is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        Ok(())
    }
}

mod defaults {
    pub fn size() -> usize { super::DEFAULT_SIZE }
    pub fn initial_tiles() -> usize { super::INITIAL_TILES }
    pub fn best_score_key() -> String { super::BEST_SCORE_KEY.to_owned() }
}
