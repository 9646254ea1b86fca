//! Suika Merge - a drop-and-merge puzzle game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, merges, game-over detection)
//! - `renderer`: Scene building and Canvas2D drawing
//! - `platform`: Browser/native platform abstraction (storage, time)
//! - `persistence`: Session snapshot save/load with staleness checks
//! - `journal`: Diagnostic log and persisted error reports

pub mod highscores;
pub mod journal;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use journal::{GameLog, Level, LogEntry};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one reference frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Container defaults
    pub const CONTAINER_WIDTH: f32 = 400.0;
    pub const CONTAINER_HEIGHT: f32 = 600.0;
    /// Height of the drop zone; a settled piece poking above it ends the game
    pub const DANGER_LINE_Y: f32 = 100.0;

    /// Vertical position of the pending piece
    pub const PENDING_Y: f32 = 50.0;

    /// Per-frame physics defaults
    pub const GRAVITY: f32 = 0.2;
    pub const RESTITUTION: f32 = 0.5;
    pub const DROP_SPEED: f32 = 1.0;
    /// A piece slower than this (vertically) counts as settled
    pub const SETTLE_SPEED: f32 = 0.2;

    /// Merge effect animation
    pub const EFFECT_GROWTH: f32 = 2.0;
    pub const EFFECT_FADE: f32 = 0.05;

    /// Pending pieces are drawn from the smallest ranks only
    pub const SPAWN_RANKS: u8 = 3;

    /// Saved sessions older than this are discarded (ms)
    pub const SAVE_MAX_AGE_MS: f64 = 5.0 * 60.0 * 1000.0;
    /// Autosave cadence while a session is active (ms)
    pub const AUTOSAVE_INTERVAL_MS: f64 = 5000.0;
}
