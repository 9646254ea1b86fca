//! Game state and core simulation types
//!
//! Everything a frame driver needs to draw a session, plus the input-side
//! operations (moving and dropping the pending piece, pausing, restarting).
//! All methods assume one caller at a time; nothing here is reentrant.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, PauseReason};
use super::rank::Rank;
use super::tuning::Tuning;
use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Physics and input frozen until resumed
    Paused,
    /// Terminal until an explicit reset
    GameOver,
}

/// Stable identity of an active piece, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

/// An active piece subject to physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub rank: Rank,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Set when the piece merged this frame; swept at the end of the tick
    #[serde(skip)]
    pub pending_removal: bool,
}

impl Piece {
    pub fn new(id: PieceId, rank: Rank, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            rank,
            pos,
            vel,
            pending_removal: false,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.rank.radius()
    }
}

/// The next piece to drop; positioned by input, not simulated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingPiece {
    pub rank: Rank,
    pub pos: Vec2,
}

impl PendingPiece {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.rank.radius()
    }
}

/// Expanding ring left behind by a merge (cosmetic only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeEffect {
    pub pos: Vec2,
    pub radius: f32,
    pub alpha: f32,
    /// Rank produced by the merge, for colouring
    pub rank: Rank,
}

impl MergeEffect {
    pub fn new(pos: Vec2, rank: Rank) -> Self {
        Self {
            pos,
            radius: rank.radius(),
            alpha: 1.0,
            rank,
        }
    }
}

/// Container walls, floor and danger line (screen coordinates, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    /// A settled piece whose top edge is above this y ends the session
    pub danger_line: f32,
}

impl Default for Container {
    fn default() -> Self {
        Self::new(CONTAINER_WIDTH, CONTAINER_HEIGHT)
    }
}

impl Container {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            right: width,
            bottom: height,
            danger_line: DANGER_LINE_Y,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Clamp a horizontal centre so a circle of `radius` stays between the walls
    pub fn clamp_x(&self, x: f32, radius: f32) -> f32 {
        let min = self.left + radius;
        let max = (self.right - radius).max(min);
        if x.is_nan() { min } else { x.clamp(min, max) }
    }
}

/// A complete game session
#[derive(Debug, Clone)]
pub struct GameState {
    pub container: Container,
    pub tuning: Tuning,
    /// Active pieces in insertion order
    pub pieces: Vec<Piece>,
    pub pending: Option<PendingPiece>,
    /// Last horizontal target requested by input
    pub pending_x: f32,
    pub score: u64,
    /// Best score ever observed; carried across resets
    pub high_score: u64,
    pub phase: GamePhase,
    /// Simulation frames run this session
    pub time_ticks: u64,
    /// Visual merge rings (not gameplay-affecting)
    pub effects: Vec<MergeEffect>,
    /// Undrained events, oldest first
    pub(crate) events: Vec<GameEvent>,
    /// Unsimulated time carried between `advance` calls (seconds)
    pub(crate) accumulator: f32,
    next_id: u32,
    rng: Pcg32,
}

impl GameState {
    /// Create a fresh session with the given seed
    pub fn new(seed: u64, container: Container) -> Self {
        let mut state = Self {
            container,
            tuning: Tuning::default(),
            pieces: Vec::new(),
            pending: None,
            pending_x: (container.left + container.right) / 2.0,
            score: 0,
            high_score: 0,
            phase: GamePhase::Playing,
            time_ticks: 0,
            effects: Vec::new(),
            events: Vec::new(),
            accumulator: 0.0,
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        };
        state.reset();
        state
    }

    /// Allocate a new piece ID
    pub fn next_piece_id(&mut self) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Clear the board and start over; the high score survives
    pub fn reset(&mut self) {
        self.pieces.clear();
        self.effects.clear();
        self.score = 0;
        self.phase = GamePhase::Playing;
        self.time_ticks = 0;
        self.accumulator = 0.0;
        self.generate_pending_piece();
    }

    /// Replace the pending piece with a random small rank at the input target
    pub fn generate_pending_piece(&mut self) {
        let rank = Rank::new(self.rng.random_range(0..SPAWN_RANKS)).unwrap_or(Rank::SMALLEST);
        let x = self.container.clamp_x(self.pending_x, rank.radius());
        self.pending = Some(PendingPiece {
            rank,
            pos: Vec2::new(x, PENDING_Y),
        });
        self.events.push(GameEvent::NextPiece { rank });
    }

    /// Slide the pending piece toward `target_x`, keeping it inside the walls
    pub fn move_pending_piece(&mut self, target_x: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let x = self.container.clamp_x(target_x, pending.radius());
        pending.pos.x = x;
        self.pending_x = x;
    }

    /// Release the pending piece into the container
    pub fn drop_piece(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };
        let id = self.next_piece_id();
        self.pieces.push(Piece::new(
            id,
            pending.rank,
            pending.pos,
            Vec2::new(0.0, self.tuning.drop_speed),
        ));
        self.events.push(GameEvent::PieceDropped {
            id,
            rank: pending.rank,
        });
        self.generate_pending_piece();
    }

    /// Pause a running session (no-op otherwise)
    pub fn pause(&mut self, reason: PauseReason) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            self.accumulator = 0.0;
            self.events.push(GameEvent::Paused { reason });
        }
    }

    /// Flip between playing and paused; ignored once the game is over
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.pause(PauseReason::Manual),
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::Resumed);
            }
            GamePhase::GameOver => {}
        }
    }

    /// The click/tap action: restart after game over, otherwise drop
    pub fn commit(&mut self) {
        match self.phase {
            GamePhase::GameOver => {
                self.events.push(GameEvent::Restarted);
                self.reset();
            }
            GamePhase::Playing => self.drop_piece(),
            GamePhase::Paused => {}
        }
    }

    /// Load a saved board into a fresh playing session
    ///
    /// Pieces get new IDs from this session's counter. Without a saved
    /// pending piece a new one is generated.
    pub fn restore(&mut self, pieces: Vec<Piece>, pending: Option<PendingPiece>, score: u64) {
        self.reset();
        for mut piece in pieces {
            piece.id = self.next_piece_id();
            piece.pending_removal = false;
            self.pieces.push(piece);
        }
        if let Some(mut pending) = pending {
            pending.pos.x = self.container.clamp_x(pending.pos.x, pending.radius());
            self.pending_x = pending.pos.x;
            self.pending = Some(pending);
        }
        self.score = score;
        self.events.push(GameEvent::Restored {
            pieces: self.pieces.len(),
            score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_small_pending_piece() {
        for seed in 0..50 {
            let state = GameState::new(seed, Container::default());
            let pending = state.pending.expect("pending piece");
            assert!(pending.rank.index() < SPAWN_RANKS);
            assert_eq!(pending.pos.y, PENDING_Y);
            assert_eq!(state.phase, GamePhase::Playing);
            assert_eq!(state.score, 0);
        }
    }

    #[test]
    fn test_same_seed_same_pending_sequence() {
        let mut a = GameState::new(777, Container::default());
        let mut b = GameState::new(777, Container::default());
        for _ in 0..20 {
            assert_eq!(a.pending, b.pending);
            a.drop_piece();
            b.drop_piece();
        }
    }

    #[test]
    fn test_move_pending_clamps_to_walls() {
        let mut state = GameState::new(1, Container::new(300.0, 480.0));
        let r = state.pending.unwrap().radius();

        state.move_pending_piece(-1000.0);
        assert_eq!(state.pending.unwrap().pos.x, r);
        state.move_pending_piece(1.0e9);
        assert_eq!(state.pending.unwrap().pos.x, 300.0 - r);
        state.move_pending_piece(150.0);
        assert_eq!(state.pending.unwrap().pos.x, 150.0);
        assert_eq!(state.pending_x, 150.0);
    }

    #[test]
    fn test_move_pending_ignored_while_paused() {
        let mut state = GameState::new(1, Container::default());
        state.move_pending_piece(120.0);
        state.toggle_pause();
        state.move_pending_piece(300.0);
        assert_eq!(state.pending.unwrap().pos.x, 120.0);
    }

    #[test]
    fn test_drop_piece_appends_and_regenerates() {
        let mut state = GameState::new(5, Container::default());
        state.move_pending_piece(90.0);
        let pending = state.pending.unwrap();
        state.drain_events();

        state.drop_piece();
        assert_eq!(state.pieces.len(), 1);
        let piece = &state.pieces[0];
        assert_eq!(piece.rank, pending.rank);
        assert_eq!(piece.pos, pending.pos);
        assert_eq!(piece.vel, Vec2::new(0.0, DROP_SPEED));

        // Next pending piece appears at the last target (clamped to its own radius)
        let next = state.pending.unwrap();
        assert_eq!(next.pos.x, state.container.clamp_x(90.0, next.radius()));

        let events = state.drain_events();
        assert!(matches!(events[0], GameEvent::PieceDropped { .. }));
        assert!(matches!(events[1], GameEvent::NextPiece { .. }));
    }

    #[test]
    fn test_drop_ignored_when_paused_or_over() {
        let mut state = GameState::new(5, Container::default());
        state.toggle_pause();
        state.drop_piece();
        assert!(state.pieces.is_empty());

        state.toggle_pause();
        state.phase = GamePhase::GameOver;
        state.drop_piece();
        assert!(state.pieces.is_empty());
    }

    #[test]
    fn test_piece_ids_are_unique() {
        let mut state = GameState::new(9, Container::default());
        for _ in 0..10 {
            state.drop_piece();
        }
        let mut ids: Vec<_> = state.pieces.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_commit_restarts_only_after_game_over() {
        let mut state = GameState::new(3, Container::default());
        state.drop_piece();
        state.score = 42;
        state.high_score = 42;

        state.toggle_pause();
        state.commit();
        assert_eq!(state.pieces.len(), 1);

        state.toggle_pause();
        state.phase = GamePhase::GameOver;
        state.drain_events();
        state.commit();
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.pieces.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 42);

        // Restart is reported before the fresh pending piece
        let events = state.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], GameEvent::Restarted);
        assert!(matches!(events[1], GameEvent::NextPiece { .. }));
    }

    #[test]
    fn test_toggle_pause_ignored_when_over() {
        let mut state = GameState::new(3, Container::default());
        state.phase = GamePhase::GameOver;
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::GameOver);
        state.pause(PauseReason::FocusLost);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_restore_reassigns_ids_and_keeps_score() {
        let mut state = GameState::new(3, Container::default());
        let rank = Rank::new(4).unwrap();
        let saved = vec![
            Piece::new(PieceId(7), rank, Vec2::new(100.0, 500.0), Vec2::ZERO),
            Piece::new(PieceId(7), rank, Vec2::new(250.0, 500.0), Vec2::ZERO),
        ];
        let pending = PendingPiece {
            rank: Rank::SMALLEST,
            pos: Vec2::new(5000.0, PENDING_Y),
        };
        state.restore(saved, Some(pending), 31);

        assert_eq!(state.score, 31);
        assert_eq!(state.pieces.len(), 2);
        assert_ne!(state.pieces[0].id, state.pieces[1].id);
        assert_eq!(state.pending.unwrap().pos.x, CONTAINER_WIDTH - 20.0);
        assert!(matches!(
            state.drain_events().last(),
            Some(GameEvent::Restored { pieces: 2, score: 31 })
        ));
    }
}
