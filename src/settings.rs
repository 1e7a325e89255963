//! Player preferences
//!
//! Persisted separately from balance tuning as a small JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the shotgun reacts to the fire signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TriggerFeel {
    /// Keeps pumping while the trigger is held
    #[default]
    Held,
    /// One blast per trigger pull
    Edge,
}

impl TriggerFeel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerFeel::Held => "Held",
            TriggerFeel::Edge => "Edge",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "held" | "hold" => Some(TriggerFeel::Held),
            "edge" | "tap" => Some(TriggerFeel::Edge),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Feedback ===
    /// Emit screen-shake impulses to the renderer
    pub screen_shake: bool,
    /// Freeze-frame on kills and detonations
    pub hit_pause: bool,

    // === Controls ===
    /// Shotgun trigger behaviour
    pub shotgun_trigger: TriggerFeel,

    // === Accessibility ===
    /// Reduced motion (no shake, no freeze-frames)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            hit_pause: true,
            shotgun_trigger: TriggerFeel::Held,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective hit-pause (respects reduced_motion)
    pub fn effective_hit_pause(&self) -> bool {
        self.hit_pause && !self.reduced_motion
    }

    /// Load settings from disk, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
