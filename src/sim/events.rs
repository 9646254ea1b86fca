//! Events emitted by the simulation for logging and presentation

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rank::Rank;
use super::state::PieceId;

/// Severity of an event or journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

/// Why the session was paused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    /// Player pressed the pause key
    Manual,
    /// Window lost focus
    FocusLost,
}

/// Something noteworthy that happened during input handling or a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A new pending piece was generated
    NextPiece { rank: Rank },
    PieceDropped { id: PieceId, rank: Rank },
    /// Two pieces of equal rank combined
    Merged {
        parents: (PieceId, PieceId),
        merged: PieceId,
        /// Rank of the new piece
        rank: Rank,
        position: Vec2,
        points: u64,
    },
    /// A merge produced the terminal rank
    WinReached { id: PieceId },
    GameOver { score: u64 },
    NewHighScore { score: u64 },
    Paused { reason: PauseReason },
    Resumed,
    Restarted,
    /// A saved session was loaded back in
    Restored { pieces: usize, score: u64 },
}

impl GameEvent {
    pub fn level(&self) -> Level {
        match self {
            GameEvent::GameOver { .. } => Level::Warning,
            _ => Level::Info,
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::NextPiece { rank } => write!(f, "Next piece: {rank}"),
            GameEvent::PieceDropped { rank, .. } => write!(f, "Dropped {rank}"),
            GameEvent::Merged { rank, points, .. } => {
                let from = Rank::new(rank.index().saturating_sub(1)).unwrap_or(*rank);
                write!(f, "{from} + {from} merged into {rank}! (+{points})")
            }
            GameEvent::WinReached { .. } => {
                write!(f, "Congratulations! You made the {}!", Rank::TERMINAL)
            }
            GameEvent::GameOver { score } => write!(f, "Game over! Final score: {score}"),
            GameEvent::NewHighScore { score } => write!(f, "New high score: {score} points!"),
            GameEvent::Paused { reason: PauseReason::Manual } => write!(f, "Game paused"),
            GameEvent::Paused { reason: PauseReason::FocusLost } => {
                write!(f, "Game paused because the window lost focus")
            }
            GameEvent::Resumed => write!(f, "Game resumed"),
            GameEvent::Restarted => write!(f, "Game restarted"),
            GameEvent::Restored { pieces, score } => {
                write!(f, "Previous game restored ({pieces} pieces, score {score})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_levels() {
        assert_eq!(GameEvent::GameOver { score: 3 }.level(), Level::Warning);
        assert_eq!(GameEvent::Restarted.level(), Level::Info);
        assert_eq!(GameEvent::WinReached { id: PieceId(1) }.level(), Level::Info);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(Level::Warning.as_str(), "warning");
        assert_eq!(serde_json::to_string(&Level::Error).unwrap(), r#""error""#);
        assert_eq!(serde_json::from_str::<Level>(r#""info""#).unwrap(), Level::Info);
    }

    #[test]
    fn test_merge_message_names_both_ranks() {
        let event = GameEvent::Merged {
            parents: (PieceId(1), PieceId(2)),
            merged: PieceId(3),
            rank: Rank::new(1).unwrap(),
            position: Vec2::ZERO,
            points: 2,
        };
        assert_eq!(event.to_string(), "Puppy + Puppy merged into Small Dog! (+2)");
    }
}
