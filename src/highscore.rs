//! High score persistence
//!
//! A single integer under a fixed key. Read once at startup, written only on
//! a new record. Anything unreadable counts as zero.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use log::{info, warn};
use thiserror::Error;

use crate::platform::KeyValueStore;

/// Storage key for the high score.
pub const STORAGE_KEY: &str = "shurikenHighScore";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read the high score, falling back to 0 if absent or unparsable.
pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> u32 {
    match store.get(STORAGE_KEY) {
        Ok(Some(raw)) => match raw.trim().parse::<u32>() {
            Ok(score) => {
                info!("Loaded high score {}", score);
                score
            }
            Err(_) => {
                warn!("Ignoring unparsable high score {:?}", raw);
                0
            }
        },
        Ok(None) => {
            info!("No high score found, starting fresh");
            0
        }
        Err(e) => {
            warn!("Could not read high score: {}", e);
            0
        }
    }
}

/// Persist `score`. The caller only invokes this on a new record.
pub fn commit<S: KeyValueStore + ?Sized>(store: &mut S, score: u32) -> Result<(), StoreError> {
    store.set(STORAGE_KEY, &score.to_string())?;
    info!("High score {} saved", score);
    Ok(())
}

/// A JSON object on disk, one string value per key.
///
/// The whole file is rewritten on every `set`; it only ever holds a handful
/// of entries.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking the write
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StoreError::Json(e)) => {
                warn!("Replacing corrupt store {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
