//! Player preferences
//!
//! Stored as JSON next to the high score file. Missing or broken files fall
//! back to defaults.

use std::fs;
use std::path::Path;

use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "shuriken-settings.json";
pub const HIGH_SCORE_FILE: &str = "shuriken-highscore.json";
pub const LOG_FILE: &str = "shuriken-tui.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Play sound cues
    pub sound_enabled: bool,
    /// Cue volume (0.0 - 1.0)
    pub volume: f32,
    /// Target frames per second
    pub fps: u32,
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            volume: 1.0,
            fps: 60,
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => {
                info!("Using default settings");
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                warn!("Ignoring bad settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    warn!("Could not save settings: {}", e);
                } else {
                    info!("Settings saved");
                }
            }
            Err(e) => warn!("Could not serialize settings: {}", e),
        }
    }

    /// Clamp out-of-range values instead of rejecting the file.
    pub fn sanitized(mut self) -> Self {
        self.volume = self.volume.clamp(0.0, 1.0);
        self.fps = self.fps.clamp(15, 240);
        self
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// Apply command-line flags: `--mute`, `--debug`, `--seed <n>`.
    pub fn apply_args<I: IntoIterator<Item = String>>(&mut self, args: I) {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--mute" => self.sound_enabled = false,
                "--debug" => self.log_level = "debug".to_string(),
                "--seed" => {
                    if let Some(seed) = args.next().and_then(|s| s.parse().ok()) {
                        self.seed = Some(seed);
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let s: Settings = serde_json::from_str(r#"{"sound_enabled": false}"#).unwrap();
        assert!(!s.sound_enabled);
        assert_eq!(s.fps, 60);
        assert_eq!(s.seed, None);
    }

    #[test]
    fn test_sanitize() {
        let s = Settings {
            volume: 3.0,
            fps: 1,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(s.volume, 1.0);
        assert_eq!(s.fps, 15);
    }

    #[test]
    fn test_level_filter() {
        let mut s = Settings::default();
        assert_eq!(s.level_filter(), LevelFilter::Info);
        s.log_level = "debug".into();
        assert_eq!(s.level_filter(), LevelFilter::Debug);
        s.log_level = "loud".into();
        assert_eq!(s.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_args() {
        let mut s = Settings::default();
        s.apply_args(["--mute", "--seed", "99", "--debug"].map(String::from));
        assert!(!s.sound_enabled);
        assert_eq!(s.seed, Some(99));
        assert_eq!(s.level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("shuriken-no-such-settings.json");
        assert_eq!(Settings::load(&path), Settings::default());
    }
}
