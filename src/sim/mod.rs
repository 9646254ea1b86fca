//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, piece IDs never reused)
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod events;
pub mod rank;
pub mod state;
pub mod tick;
pub mod tuning;

pub use collision::{Contact, circle_contact, resolve_walls, separate};
pub use events::{GameEvent, Level, PauseReason};
pub use rank::{RANKS, Rank, RankError, RankInfo};
pub use state::{Container, GamePhase, GameState, MergeEffect, PendingPiece, Piece, PieceId};
pub use tick::{TickInput, advance, step, tick};
pub use tuning::Tuning;
