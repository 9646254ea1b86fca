//! Session snapshots

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{AUTOSAVE_INTERVAL_MS, SAVE_MAX_AGE_MS};
use crate::platform::{KeyValueStore, StorageError};
use crate::sim::{GameState, PendingPiece, Piece};

/// Storage key for the in-progress session
pub const SAVE_KEY: &str = "suika_game_state";
/// Current snapshot format
pub const SAVE_VERSION: u32 = 1;

/// Why a stored session could not be resumed
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Not valid JSON, or fields out of range (e.g. an unknown rank)
    Corrupt(String),
    /// Written by a newer build
    UnsupportedVersion(u32),
    /// Older than the staleness window
    Stale { age_ms: f64 },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Corrupt(reason) => write!(f, "saved game is corrupt: {reason}"),
            LoadError::UnsupportedVersion(v) => write!(f, "unsupported save version: {v}"),
            LoadError::Stale { age_ms } => {
                write!(f, "saved game is {:.0} seconds old", age_ms / 1000.0)
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Everything needed to resume a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub pieces: Vec<Piece>,
    pub pending: Option<PendingPiece>,
    pub score: u64,
    /// Unix timestamp (ms) when written
    pub timestamp: f64,
}

fn default_version() -> u32 {
    SAVE_VERSION
}

impl SaveSnapshot {
    pub fn capture(state: &GameState, now_ms: f64) -> Self {
        Self {
            version: SAVE_VERSION,
            pieces: state.pieces.clone(),
            pending: state.pending,
            score: state.score,
            timestamp: now_ms,
        }
    }

    pub fn age_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.timestamp
    }

    pub fn is_stale(&self, now_ms: f64) -> bool {
        self.age_ms(now_ms) > SAVE_MAX_AGE_MS
    }

    /// Install this snapshot into `state` as a fresh playing session
    pub fn apply(self, state: &mut GameState) {
        state.restore(self.pieces, self.pending, self.score);
    }
}

/// Write the session; skipped (Ok(false)) once the game is over
pub fn save_game(
    store: &impl KeyValueStore,
    state: &GameState,
    now_ms: f64,
) -> Result<bool, StorageError> {
    if state.is_over() {
        return Ok(false);
    }
    let snapshot = SaveSnapshot::capture(state, now_ms);
    let json = serde_json::to_string(&snapshot).map_err(|e| StorageError {
        key: SAVE_KEY.to_string(),
        reason: e.to_string(),
    })?;
    store.set(SAVE_KEY, &json)?;
    Ok(true)
}

/// Read the stored session, if any
///
/// Unreadable or stale saves are removed from the store before the error
/// is returned, so the next start begins fresh.
pub fn load_game(store: &impl KeyValueStore, now_ms: f64) -> Result<Option<SaveSnapshot>, LoadError> {
    let Some(json) = store.get(SAVE_KEY) else {
        return Ok(None);
    };

    let snapshot: SaveSnapshot = match serde_json::from_str(&json) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            store.remove(SAVE_KEY);
            return Err(LoadError::Corrupt(e.to_string()));
        }
    };

    if snapshot.version > SAVE_VERSION {
        store.remove(SAVE_KEY);
        return Err(LoadError::UnsupportedVersion(snapshot.version));
    }
    if snapshot.is_stale(now_ms) {
        store.remove(SAVE_KEY);
        return Err(LoadError::Stale {
            age_ms: snapshot.age_ms(now_ms),
        });
    }

    Ok(Some(snapshot))
}

pub fn clear_game(store: &impl KeyValueStore) {
    store.remove(SAVE_KEY);
}

/// Tracks when the next periodic save is due
#[derive(Debug, Clone, Copy)]
pub struct Autosave {
    last_ms: f64,
}

impl Autosave {
    pub fn new(now_ms: f64) -> Self {
        Self { last_ms: now_ms }
    }

    /// True once per interval; the caller saves when it fires
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if now_ms - self.last_ms >= AUTOSAVE_INTERVAL_MS {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}
