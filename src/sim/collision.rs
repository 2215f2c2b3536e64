//! Collision detection and response for round pegs and side walls
//!
//! Pegs and balls are both circles, so a hit is plain center distance against
//! the radius sum. The normal points from the peg toward the ball.

use glam::Vec2;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the peg surface (if hit)
    pub point: Vec2,
    /// Unit normal from the peg center toward the ball center
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a ball against a single peg
///
/// Touching exactly is not a hit. A ball centered on the peg is pushed out
/// along +X.
pub fn ball_peg_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    peg_pos: Vec2,
    peg_radius: f32,
) -> CollisionResult {
    let delta = ball_pos - peg_pos;
    let dist = delta.length();
    let reach = ball_radius + peg_radius;

    if dist >= reach {
        return CollisionResult::miss();
    }

    let normal = delta.normalize_or(Vec2::X);
    CollisionResult {
        hit: true,
        point: peg_pos + normal * peg_radius,
        normal,
        penetration: reach - dist,
    }
}

/// Clamp a ball to the side guards at `[left, right]`
///
/// Returns the corrected position and velocity. Leaving through a guard puts
/// the ball back on it and reverses `vel.x` scaled by `damping` (inelastic).
pub fn clamp_to_walls(
    pos: Vec2,
    vel: Vec2,
    left: f32,
    right: f32,
    damping: f32,
) -> (Vec2, Vec2, bool) {
    if pos.x < left {
        (Vec2::new(left, pos.y), Vec2::new(-vel.x * damping, vel.y), true)
    } else if pos.x > right {
        (Vec2::new(right, pos.y), Vec2::new(-vel.x * damping, vel.y), true)
    } else {
        (pos, vel, false)
    }
}

/// Velocity after a peg bounce: `speed * bounce` along the normal angle plus
/// a jitter (radians)
#[inline]
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, bounce: f32, jitter: f32) -> Vec2 {
    let speed = velocity.length() * bounce;
    let angle = normal.y.atan2(normal.x) + jitter;
    Vec2::from_angle(angle) * speed
}
