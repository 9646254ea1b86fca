//! Fixed timestep simulation tick
//!
//! `step` advances one reference frame: effects decay, gravity and motion,
//! boundary collisions, pairwise collisions with merging, removal of merged
//! pieces, then the game-over check. `advance` feeds real elapsed time into
//! a fixed-step accumulator so the game runs at the same speed regardless of
//! display refresh rate.

use super::collision::{circle_contact, resolve_walls, separate};
use super::events::GameEvent;
use super::state::{GamePhase, GameState, MergeEffect, Piece};
use crate::consts::*;

/// Input commands collected by the driver for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal target for the pending piece (pointer position)
    pub target_x: Option<f32>,
    /// Click/tap: drop, or restart after game over
    pub commit: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Apply one frame of input, then advance by `dt` seconds
///
/// Returns the number of simulation steps run.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> u32 {
    if input.pause {
        state.toggle_pause();
    }
    if let Some(x) = input.target_x {
        state.move_pending_piece(x);
    }
    if input.commit {
        state.commit();
    }
    advance(state, dt)
}

/// Run as many fixed steps as `dt` seconds of real time allow
pub fn advance(state: &mut GameState, dt: f32) -> u32 {
    if state.phase != GamePhase::Playing {
        state.accumulator = 0.0;
        return 0;
    }

    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
    state.accumulator += dt;

    let mut substeps = 0;
    while state.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        step(state);
        state.accumulator -= SIM_DT;
        substeps += 1;

        if state.phase != GamePhase::Playing {
            state.accumulator = 0.0;
            break;
        }
    }
    substeps
}

/// Advance the session by exactly one frame (no-op unless playing)
pub fn step(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.time_ticks += 1;
    let tuning = state.tuning;

    for effect in &mut state.effects {
        effect.radius += tuning.effect_growth;
        effect.alpha -= tuning.effect_fade;
    }
    state.effects.retain(|e| e.alpha > 0.0);

    for piece in &mut state.pieces {
        piece.vel.y += tuning.gravity;
        piece.pos += piece.vel;
        resolve_walls(piece, &state.container, tuning.restitution);
    }

    resolve_contacts(state);
    state.pieces.retain(|p| !p.pending_removal);

    check_game_over(state);
}

/// Pairwise collisions in (i, j) order, merging equal ranks
///
/// A piece already marked for removal is skipped, so each piece merges at
/// most once per frame. Merged pieces are appended to the list during the
/// scan and meet every later piece in the same frame, so merges can chain.
fn resolve_contacts(state: &mut GameState) {
    let mut i = 0;
    while i < state.pieces.len() {
        let mut j = i + 1;
        while j < state.pieces.len() {
            let (head, tail) = state.pieces.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];
            j += 1;
            if a.pending_removal || b.pending_removal {
                continue;
            }

            let Some(contact) = circle_contact(a.pos, a.radius(), b.pos, b.radius()) else {
                continue;
            };
            separate(a, b, &contact);

            if a.rank != b.rank {
                continue;
            }
            let Some(next) = a.rank.successor() else {
                continue;
            };

            a.pending_removal = true;
            b.pending_removal = true;
            let parents = (a.id, b.id);
            let position = (a.pos + b.pos) * 0.5;
            let velocity = (a.vel + b.vel) * 0.5;

            let id = state.next_piece_id();
            let points = next.points();
            state.score += points;
            state.pieces.push(Piece::new(id, next, position, velocity));
            state.effects.push(MergeEffect::new(position, next));
            state.events.push(GameEvent::Merged {
                parents,
                merged: id,
                rank: next,
                position,
                points,
            });
            if next.is_terminal() {
                state.events.push(GameEvent::WinReached { id });
            }
        }
        i += 1;
    }
}

/// End the session if any settled piece pokes above the danger line
fn check_game_over(state: &mut GameState) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    let danger_line = state.container.danger_line;
    let settle_speed = state.tuning.settle_speed;
    let topped_out = state
        .pieces
        .iter()
        .any(|p| p.pos.y - p.radius() < danger_line && p.vel.y.abs() < settle_speed);
    if !topped_out {
        return;
    }

    state.phase = GamePhase::GameOver;
    state.accumulator = 0.0;
    if state.score > state.high_score {
        state.high_score = state.score;
        state.events.push(GameEvent::NewHighScore { score: state.score });
    }
    state.events.push(GameEvent::GameOver { score: state.score });
}
