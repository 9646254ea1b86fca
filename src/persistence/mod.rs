//! Save/load of in-progress sessions
//!
//! Features:
//! - Versioned JSON snapshot of the board, pending piece and score
//! - Staleness check (sessions older than five minutes are discarded)
//! - Corruption detection and recovery (bad saves are removed)
//! - Autosave cadence helper for the frame driver

pub mod snapshot;

pub use snapshot::{
    Autosave, LoadError, SAVE_KEY, SAVE_VERSION, SaveSnapshot, clear_game, load_game, save_game,
};
