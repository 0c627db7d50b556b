//! Key-value persistence for the best score.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::codec;
use crate::engine::Score;

/// Key the encoded best score lives under.
pub const BEST_SCORE_KEY: &str = "bestScore";

/// Minimal string store, in the shape of browser `localStorage`.
///
/// `set` cannot fail from the caller's point of view; backends that do I/O log
/// and swallow their errors.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        (**self).set(key, value)
    }
}

/// Read the best score. A missing key is 0 without consulting the codec;
/// a corrupted value also reads as 0.
pub fn load_best_score<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Score {
    match store.get(key) {
        None => 0,
        Some(encoded) => {
            let best = codec::decode(&encoded);
            if best == 0 && !encoded.is_empty() {
                log::warn!("stored best score under {key:?} did not decode; starting from 0");
            }
            best
        }
    }
}

pub fn save_best_score<S, R>(store: &mut S, key: &str, best: Score, rng: &mut R)
where
    S: KeyValueStore + ?Sized,
    R: Rng + ?Sized,
{
    store.set(key, codec::encode(best, rng));
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("store file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// A JSON object of string entries on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Load `path`, treating a missing file as an empty store.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(FileStore { path, entries })
    }

    /// Like [`FileStore::open`], but an unreadable file yields an empty store.
    /// The file is only replaced on the next `set`.
    pub fn open_or_empty<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("ignoring unreadable store {}: {e}", path.display());
                FileStore { path, entries: BTreeMap::new() }
            }
        }
    }

    /// `<data dir>/twenty48/store.json`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("twenty48")
            .join("store.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
        if let Err(e) = self.flush() {
            log::warn!("could not persist {}: {e}", self.path.display());
        }
    }
}
