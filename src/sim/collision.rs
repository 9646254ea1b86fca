//! Collision detection and response for circular pieces
//!
//! Deliberately simple: walls and floor clamp and reflect with damping,
//! overlapping circles are pushed apart along the line between centres and
//! nudged with an impulse weighted by the other piece's radius (radius
//! stands in for mass).

use glam::Vec2;

use super::state::{Container, Piece};

/// Overlap between two circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the first centre toward the second
    pub normal: Vec2,
    /// How far the circles interpenetrate
    pub overlap: f32,
}

/// Keep a piece inside the container walls and above the floor
///
/// Returns true if any boundary was touched.
pub fn resolve_walls(piece: &mut Piece, container: &Container, restitution: f32) -> bool {
    let r = piece.radius();
    let mut hit = false;

    if piece.pos.x - r < container.left {
        piece.pos.x = container.left + r;
        piece.vel.x *= -restitution;
        hit = true;
    } else if piece.pos.x + r > container.right {
        piece.pos.x = container.right - r;
        piece.vel.x *= -restitution;
        hit = true;
    }

    if piece.pos.y + r > container.bottom {
        piece.pos.y = container.bottom - r;
        piece.vel.y *= -restitution;
        // Floor contact also bleeds off sideways speed
        piece.vel.x *= restitution;
        hit = true;
    }

    hit
}

/// Check whether two circles overlap
///
/// Coincident centres separate along +x.
pub fn circle_contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Option<Contact> {
    let delta = b_pos - a_pos;
    let distance = delta.length();
    let min_distance = a_radius + b_radius;
    if distance >= min_distance {
        return None;
    }
    let normal = if distance > 0.0 { delta / distance } else { Vec2::X };
    Some(Contact {
        normal,
        overlap: min_distance - distance,
    })
}

/// Push two overlapping pieces apart and exchange velocity
///
/// Each piece moves half the overlap. The impulse each receives equals the
/// separation vector scaled by the other piece's share of the combined radius.
pub fn separate(a: &mut Piece, b: &mut Piece, contact: &Contact) {
    let push = contact.normal * contact.overlap * 0.5;
    a.pos -= push;
    b.pos += push;

    let (ra, rb) = (a.radius(), b.radius());
    let total = ra + rb;
    a.vel -= push * rb / total;
    b.vel += push * ra / total;
}
