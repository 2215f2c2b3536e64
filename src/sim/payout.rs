//! Bucket resolution and winnings

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::multipliers::Multiplier;
use crate::Cents;

/// Bucket under a horizontal position, clamped to the outermost buckets
pub fn bucket_index(board: &Board, x: f32) -> usize {
    let spacing = board.config.layout.spacing;
    let last = board.bucket_count().saturating_sub(1);
    let raw = ((x - board.bucket_row_start_x()) / spacing).floor();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        (raw as usize).min(last)
    }
}

/// One resolved ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub ball_id: u32,
    pub bucket: usize,
    pub multiplier: Multiplier,
    pub stake: Cents,
    pub winnings: Cents,
}

/// Work out the payout for a ball that crossed the bucket line at `x`
pub fn resolve(board: &Board, ball_id: u32, stake: Cents, x: f32) -> Payout {
    let bucket = bucket_index(board, x);
    let multiplier = board.multipliers[bucket];
    Payout {
        ball_id,
        bucket,
        multiplier,
        stake,
        winnings: multiplier.apply(stake),
    }
}
