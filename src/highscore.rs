//! Best score tracking
//!
//! A single counter that only ever goes up. It is read once at startup and
//! written back through a [`ScoreStore`] each time it increases; the storage
//! medium is up to the host (LocalStorage on the web, a JSON file natively).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored high score is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// On-disk / in-storage shape of the best score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct StoredHighScore {
    best: u32,
}

fn encode(best: u32) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&StoredHighScore { best })?)
}

fn decode(json: &str) -> Result<u32, StoreError> {
    let stored: StoredHighScore = serde_json::from_str(json)?;
    Ok(stored.best)
}

/// Where the best score lives between sessions
pub trait ScoreStore {
    /// Stored best score, `None` when nothing was saved yet
    fn load(&mut self) -> Result<Option<u32>, StoreError>;
    fn save(&mut self, best: u32) -> Result<(), StoreError>;
}

/// Keeps the score for the lifetime of the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub value: Option<u32>,
    /// Number of successful saves
    pub writes: u32,
}

impl MemoryStore {
    pub fn with_value(best: u32) -> Self {
        Self {
            value: Some(best),
            writes: 0,
        }
    }
}

impl ScoreStore for MemoryStore {
    fn load(&mut self) -> Result<Option<u32>, StoreError> {
        Ok(self.value)
    }

    fn save(&mut self, best: u32) -> Result<(), StoreError> {
        self.value = Some(best);
        self.writes += 1;
        Ok(())
    }
}

/// JSON file store (native)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ScoreStore for FileStore {
    fn load(&mut self) -> Result<Option<u32>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => decode(&json).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, best: u32) -> Result<(), StoreError> {
        std::fs::write(&self.path, encode(best)?)?;
        Ok(())
    }
}

/// Browser LocalStorage store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    const STORAGE_KEY: &'static str = "flappy_web_highscore";

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageStore {
    fn load(&mut self) -> Result<Option<u32>, StoreError> {
        let item = Self::storage()?
            .get_item(Self::STORAGE_KEY)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))?;
        item.as_deref().map(decode).transpose()
    }

    fn save(&mut self, best: u32) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(Self::STORAGE_KEY, &encode(best)?)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }
}

/// The best score of the session, backed by a store
pub struct HighScore {
    best: u32,
    store: Box<dyn ScoreStore>,
}

impl std::fmt::Debug for HighScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighScore").field("best", &self.best).finish()
    }
}

impl HighScore {
    /// Read the stored best score, starting from 0 if absent or unreadable
    pub fn load(mut store: Box<dyn ScoreStore>) -> Self {
        let best = match store.load() {
            Ok(Some(best)) => {
                log::info!("Loaded high score {}", best);
                best
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("Could not load high score, starting fresh: {}", e);
                0
            }
        };
        Self { best, store }
    }

    #[inline]
    pub fn best(&self) -> u32 {
        self.best
    }

    /// Raise the best score to `score` if it is higher, persisting the new value
    ///
    /// Returns true when the best score changed. A failed write is logged and the
    /// in-memory value still advances.
    pub fn record(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = self.store.save(score) {
            log::warn!("Could not save high score {}: {}", score, e);
        }
        true
    }
}
