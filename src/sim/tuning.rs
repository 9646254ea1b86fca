//! Data-driven physics balance
//!
//! All values are per simulation frame (see `consts::SIM_DT`).

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration added to vy every frame
    pub gravity: f32,
    /// Fraction of speed kept after hitting a wall or the floor
    pub restitution: f32,
    /// Initial downward speed of a dropped piece
    pub drop_speed: f32,
    /// |vy| below this counts as settled for the game-over check
    pub settle_speed: f32,
    /// Merge effect ring growth per frame
    pub effect_growth: f32,
    /// Merge effect alpha loss per frame
    pub effect_fade: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            restitution: RESTITUTION,
            drop_speed: DROP_SPEED,
            settle_speed: SETTLE_SPEED,
            effect_growth: EFFECT_GROWTH,
            effect_fade: EFFECT_FADE,
        }
    }
}
