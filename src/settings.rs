//! Game settings and preferences
//!
//! Read from a JSON file next to the binary. Every field has a default, so a
//! partial file only overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::PersistenceError;
use crate::tuning::Tuning;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed run seed; a fresh one is picked when absent
    pub seed: Option<u64>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Best scores ===
    /// `.json` for the JSON table, anything else for `name,score` lines
    pub scores_path: String,
    /// Name recorded with a qualifying score
    pub player_name: String,

    // === Headless runner ===
    /// Ticks to simulate before giving up on a game over
    pub max_ticks: u64,

    /// Randomisation knobs
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            scores_path: "bestscores.json".to_string(),
            player_name: "PLAYER".to_string(),

            max_ticks: 60 * 60 * 10,

            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(PersistenceError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring settings file {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.tuning = self.tuning.sanitized();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{ "seed": 7, "tuning": { "alien_spawn_ticks": 90 } }"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.master_volume, 0.8);
        assert_eq!(settings.tuning.alien_spawn_ticks, 90);
        assert_eq!(
            settings.tuning.split_speed_gain,
            Tuning::default().split_speed_gain
        );
    }

    #[test]
    fn test_volumes_clamped() {
        let settings = Settings::from_json(r#"{ "master_volume": 3.0, "sfx_volume": -1.0 }"#).unwrap();
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
    }

    #[test]
    fn test_bad_json_falls_back() {
        assert!(matches!(
            Settings::from_json("[1, 2"),
            Err(PersistenceError::Format(_))
        ));
        let path = std::env::temp_dir().join(format!("asteroids-core-{}-missing-settings.json", std::process::id()));
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("asteroids-core-{}-settings.json", std::process::id()));
        let settings = Settings {
            seed: Some(99),
            muted: true,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        let _ = std::fs::remove_file(&path);
    }
}
