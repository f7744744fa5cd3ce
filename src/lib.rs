//! Shuriken - a one-button arcade game for the terminal
//!
//! Core modules:
//! - `sim`: the world aggregate (physics, obstacles, particles, game modes)
//! - `driver`: per-frame orchestration between the world and its collaborators
//! - `platform`: the narrow traits the core talks to (screen, audio, storage)
//! - `highscore`: persisted high score over a key-value store
//! - `settings`: runtime preferences
//! - `audio`: synthesised sound cues
//! - `render`: half-block terminal renderer

pub mod audio;
pub mod driver;
pub mod highscore;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;

pub use driver::FrameDriver;
pub use settings::Settings;
pub use sim::{Cue, GameEvent, Mode, World};
