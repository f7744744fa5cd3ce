//! Collaborator traits between the gameplay core and the host.
//!
//! The core never touches a terminal, an audio device or the filesystem
//! directly; the frame driver talks to these instead.

use std::collections::HashMap;
use std::io;

use crate::highscore::StoreError;
use crate::sim::{Cue, Snapshot};

/// Something that shows the world.
pub trait Screen {
    /// Draw one frame. Must not mutate gameplay state.
    fn render(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()>;

    /// Called whenever the score or high score changes.
    fn show_scores(&mut self, score: u32, high_score: u32);
}

/// Receives sound cues. Implementations decide whether anything is audible.
pub trait CueSink {
    fn play(&mut self, cue: Cue);
}

/// A string key-value store for the few values that outlive the process.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
