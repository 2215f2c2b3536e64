//! Per-tick ball integration
//!
//! `step` is a pure function of the ball's motion, the peg lattice and the
//! RNG. Randomness only enters through the collision jitter, one draw per peg
//! hit, so a fixed seed replays the same trajectory.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{BoardBounds, Peg};
use super::collision::{ball_peg_collision, bounce_velocity, clamp_to_walls};
use crate::settings::ConfigError;

/// Physics constants for one board preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Physics {
    /// Added to `vel.y` every tick
    pub gravity: f32,
    /// `vel.x` multiplier every tick
    pub friction: f32,
    /// Fraction of speed kept after a peg hit
    pub bounce: f32,
    /// Fraction of `vel.x` kept (and reversed) after a wall hit
    pub wall_damping: f32,
    /// Full width of the bounce angle jitter (radians)
    pub deflection: f32,
    pub ball_radius: f32,
    pub peg_radius: f32,
    /// Spawn height
    pub drop_y: f32,
    /// Full width of the spawn x jitter
    pub drop_x_jitter: f32,
    /// Full width of the spawn `vel.x` jitter
    pub drop_vx_jitter: f32,
}

impl Physics {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("gravity", self.gravity, 0.0, 10.0)?;
        check_range("friction", self.friction, 0.0, 1.0)?;
        check_range("bounce", self.bounce, 0.0, 1.0)?;
        check_range("wall_damping", self.wall_damping, 0.0, 1.0)?;
        check_range("ball_radius", self.ball_radius, 0.0, 100.0)?;
        check_range("peg_radius", self.peg_radius, 0.0, 100.0)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value > min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Position and velocity of a ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// What happened to a ball during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still on the board
    Falling,
    /// Below the bucket line, ready for payout
    CrossedBucketLine,
    /// Left the board without crossing the bucket line
    Overrun,
}

/// Uniform draw in `[-width/2, width/2)`
#[inline]
pub fn centered_jitter<R: Rng + ?Sized>(rng: &mut R, width: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * width
}

/// Advance one ball by one tick
pub fn step<R: Rng + ?Sized>(
    motion: Motion,
    pegs: &[Peg],
    bounds: &BoardBounds,
    physics: &Physics,
    rng: &mut R,
) -> (Motion, StepOutcome) {
    let Motion { mut pos, mut vel } = motion;

    vel.y += physics.gravity;
    vel.x *= physics.friction;
    pos += vel;

    let (left, right) = bounds.lane(pos.y);
    (pos, vel, _) = clamp_to_walls(pos, vel, left, right, physics.wall_damping);

    // Pegs are resolved in lattice order; a ball can hit several in one tick
    for peg in pegs {
        let hit = ball_peg_collision(pos, physics.ball_radius, peg.pos, physics.peg_radius);
        if !hit.hit {
            continue;
        }
        pos += hit.normal * hit.penetration;
        let jitter = centered_jitter(rng, physics.deflection);
        vel = bounce_velocity(vel, hit.normal, physics.bounce, jitter);
    }

    let motion = Motion { pos, vel };
    let outcome = if pos.y > bounds.bucket_line {
        StepOutcome::CrossedBucketLine
    } else if pos.y > bounds.height {
        StepOutcome::Overrun
    } else {
        StepOutcome::Falling
    };
    (motion, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BoardPreset, RowPolicy, Settings};
    use crate::sim::Board;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn classic_board() -> Board {
        Board::new(Settings::default().board_config()).unwrap()
    }

    #[test]
    fn test_free_fall_gravity_and_friction() {
        let board = classic_board();
        let mut rng = Pcg32::seed_from_u64(1);
        let start = Motion {
            pos: Vec2::new(400.0, 20.0),
            vel: Vec2::new(1.0, 0.0),
        };
        let (next, outcome) = step(start, &board.pegs, &board.bounds(), board.physics(), &mut rng);
        assert_eq!(outcome, StepOutcome::Falling);
        assert!((next.vel.y - 0.25).abs() < 1e-6);
        assert!((next.vel.x - 0.98).abs() < 1e-6);
        assert!((next.pos - Vec2::new(400.98, 20.25)).length() < 1e-4);
    }

    #[test]
    fn test_side_guard_reflection_is_damped() {
        let board = classic_board();
        let mut rng = Pcg32::seed_from_u64(1);
        // Above the lattice the guards sit on the first row's outer pegs
        let start = Motion {
            pos: Vec2::new(362.0, 20.0),
            vel: Vec2::new(-4.0, 0.0),
        };
        let (next, _) = step(start, &board.pegs, &board.bounds(), board.physics(), &mut rng);
        assert_eq!(next.pos.x, 360.0);
        // -4 * 0.98 = -3.92, reflected at half speed
        assert!((next.vel.x - 1.96).abs() < 1e-5);
    }

    #[test]
    fn test_peg_hit_pushes_out_and_slows() {
        let board = classic_board();
        let physics = *board.physics();
        let mut rng = Pcg32::seed_from_u64(3);
        let peg = board.pegs[1].pos; // top row center (400, 60)
        let start = Motion {
            pos: peg + Vec2::new(0.0, -12.0),
            vel: Vec2::new(0.0, 2.0),
        };
        let (next, outcome) = step(start, &board.pegs, &board.bounds(), &physics, &mut rng);
        assert_eq!(outcome, StepOutcome::Falling);
        // No longer overlapping the peg
        let reach = physics.ball_radius + physics.peg_radius;
        assert!(next.pos.distance(peg) >= reach - 1e-4);
        // Speed scaled by restitution: incoming speed 2.25
        assert!((next.vel.length() - 2.25 * physics.bounce).abs() < 1e-4);
        // Bounced upward within the jitter cone
        assert!(next.vel.y < 0.0);
    }

    #[test]
    fn test_crossing_bucket_line() {
        let board = classic_board();
        let mut rng = Pcg32::seed_from_u64(1);
        let start = Motion {
            pos: Vec2::new(400.0, board.bucket_line() - 1.0),
            vel: Vec2::new(0.0, 5.0),
        };
        let (_, outcome) = step(start, &board.pegs, &board.bounds(), board.physics(), &mut rng);
        assert_eq!(outcome, StepOutcome::CrossedBucketLine);
    }

    #[test]
    fn test_overrun_only_with_misconfigured_bounds() {
        let board = classic_board();
        let mut rng = Pcg32::seed_from_u64(1);
        // Bucket line placed below the board bottom
        let bounds = BoardBounds {
            width: 800.0,
            height: 100.0,
            bucket_line: 200.0,
            top: 0.0,
            spacing: 40.0,
            rows: 1,
        };
        let start = Motion {
            pos: Vec2::new(400.0, 99.0),
            vel: Vec2::new(0.0, 5.0),
        };
        let (_, outcome) = step(start, &[], &bounds, board.physics(), &mut rng);
        assert_eq!(outcome, StepOutcome::Overrun);
    }

    /// Drop `count` balls with the usual spawn jitter; returns the x at which
    /// each one crossed the bucket line
    fn landing_xs(board: &Board, count: usize, seed: u64) -> Vec<f32> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let physics = board.physics();
        let bounds = board.bounds();
        (0..count)
            .map(|_| {
                let x = centered_jitter(&mut rng, physics.drop_x_jitter);
                let vx = centered_jitter(&mut rng, physics.drop_vx_jitter);
                let mut motion = Motion {
                    pos: board.drop_origin() + Vec2::new(x, 0.0),
                    vel: Vec2::new(vx, 0.0),
                };
                for _ in 0..20_000 {
                    let (next, outcome) = step(motion, &board.pegs, &bounds, physics, &mut rng);
                    motion = next;
                    match outcome {
                        StepOutcome::Falling => {}
                        StepOutcome::CrossedBucketLine => return motion.pos.x,
                        StepOutcome::Overrun => panic!("ball overran the board"),
                    }
                }
                panic!("ball never reached the bucket line");
            })
            .collect()
    }

    #[test]
    fn test_balls_only_cross_over_buckets() {
        for preset in [BoardPreset::Classic, BoardPreset::Compact] {
            for rows in [14, 16] {
                let settings = Settings {
                    rows: RowPolicy::fixed(rows),
                    ..Settings::from_preset(preset)
                };
                let board = Board::new(settings.board_config()).unwrap();
                let spacing = board.config.layout.spacing;
                let start = board.bucket_row_start_x();
                let end = start + board.bucket_count() as f32 * spacing;
                for x in landing_xs(&board, 200, rows as u64) {
                    assert!(
                        (start..=end).contains(&x),
                        "{}/{rows}: crossed at x={x} outside [{start}, {end}]",
                        preset.as_str()
                    );
                }
            }
        }
    }

    #[test]
    fn test_step_deterministic() {
        let board = classic_board();
        let start = Motion {
            pos: board.drop_origin() + Vec2::new(1.5, 0.0),
            vel: Vec2::new(0.3, 0.0),
        };
        let run = |seed: u64| {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut motion = start;
            let mut path = Vec::new();
            for _ in 0..300 {
                let (next, outcome) =
                    step(motion, &board.pegs, &board.bounds(), board.physics(), &mut rng);
                motion = next;
                path.push((motion.pos.x.to_bits(), motion.pos.y.to_bits()));
                if outcome != StepOutcome::Falling {
                    break;
                }
            }
            path
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_physics_validation() {
        let mut physics = *classic_board().physics();
        physics.validate().unwrap();
        physics.bounce = 1.5;
        assert!(matches!(
            physics.validate(),
            Err(ConfigError::OutOfRange { field: "bounce", .. })
        ));
    }
}
