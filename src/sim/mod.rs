//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by ball ID)
//! - No rendering or platform dependencies; the wallet is injected

pub mod board;
pub mod collision;
pub mod multipliers;
pub mod payout;
pub mod physics;
pub mod state;
pub mod tick;

pub use board::{Board, BoardBounds, BoardConfig, Layout, Peg, generate_pegs, peg_count};
pub use collision::{CollisionResult, ball_peg_collision};
pub use multipliers::{Multiplier, RiskTier, bucket_color, expected_value, multipliers_for};
pub use payout::{Payout, bucket_index, resolve};
pub use physics::{Motion, Physics, StepOutcome, step};
pub use state::{
    Ball, BallState, BallView, BucketLabel, DropError, GameEvent, PendingCredit, PlinkoState,
    SessionStats, Snapshot, StopReason,
};
pub use tick::{TickInput, tick};
