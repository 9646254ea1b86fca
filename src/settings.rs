//! Game settings and preferences
//!
//! Persisted separately from game saves. Every field has a serde default so
//! settings written by older builds still load.

use serde::{Deserialize, Serialize};

use crate::platform::{KeyValueStore, StorageError};
use crate::sim::Tuning;

/// Default number of journal entries kept on screen and in storage
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pause automatically when the window loses focus
    pub pause_on_blur: bool,
    /// Periodically save the session so a reload can resume it
    pub autosave: bool,

    // === Visual Effects ===
    /// Expanding rings where pieces merged
    pub show_merge_effects: bool,
    /// Dashed line under the pending piece
    pub show_drop_guide: bool,

    // === Journal ===
    /// Maximum journal entries kept
    pub log_capacity: usize,

    /// Physics balance
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pause_on_blur: true,
            autosave: true,

            show_merge_effects: true,
            show_drop_guide: true,

            log_capacity: DEFAULT_LOG_CAPACITY,

            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "suika_settings";

    /// Load settings, falling back to defaults when missing or unreadable
    pub fn load(store: &impl KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &impl KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self).map_err(|e| StorageError {
            key: Self::STORAGE_KEY.to_string(),
            reason: e.to_string(),
        })?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Journal capacity, never zero
    pub fn effective_log_capacity(&self) -> usize {
        self.log_capacity.max(1)
    }
}
