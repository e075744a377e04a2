//! Game settings
//!
//! Loaded from a JSON file; any missing field takes its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::TICK_MS;
use crate::error::EngineError;
use crate::input::KeyBindings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    // === Surface ===
    /// Playfield width in pixels
    pub width: u32,
    /// Playfield height in pixels
    pub height: u32,

    // === Loop ===
    /// Delay between ticks, also the simulated `dt`
    pub tick_ms: u64,

    // === Input ===
    pub key_bindings: KeyBindings,

    // === Demo ===
    /// Seed for the demo's enemy spawner and scripted input
    pub seed: u64,
    /// Ticks the headless demo runs for
    pub demo_ticks: u64,
    /// Seconds between enemy waves in the demo
    pub enemy_interval: f32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 480,

            tick_ms: TICK_MS,

            key_bindings: KeyBindings::default(),

            seed: 12345,
            demo_ticks: 100,
            enemy_interval: 1.0,
        }
    }
}

impl GameSettings {
    /// Fixed step length in seconds
    pub fn tick_dt(&self) -> f32 {
        self.tick_ms as f32 / 1000.0
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(EngineError::Settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults if the file is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(self).map_err(EngineError::Settings)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
