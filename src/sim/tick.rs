//! Fixed timestep simulation tick
//!
//! Core loop that advances the board deterministically. Wallet calls happen
//! outside the physics pass, and a failed credit never holds up other balls.

use std::sync::Arc;

use super::payout::{self, Payout};
use super::physics::{StepOutcome, step};
use super::state::{BallState, DropError, GameEvent, PendingCredit, PlinkoState, StopReason};
use crate::wallet::Wallet;

/// One-shot commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Manual drop (bet button)
    pub drop: bool,
    /// Start auto-play
    pub start_auto: bool,
    /// Stop auto-play before its next drop
    pub stop_auto: bool,
}

/// Advance the simulation by one tick
///
/// Returns everything that happened since the previous tick, including events
/// raised by setters in between.
pub fn tick<W: Wallet + ?Sized>(
    state: &mut PlinkoState,
    input: &TickInput,
    wallet: &mut W,
) -> Vec<GameEvent> {
    let mut events = std::mem::take(&mut state.events);

    retry_credits(state, wallet, &mut events);

    if input.stop_auto {
        state.stop_auto_play();
    }
    if input.start_auto {
        state.start_auto_play();
    }
    if input.drop {
        try_drop(state, wallet, &mut events, false);
    }

    let auto_due = match state.auto.as_mut() {
        Some(auto) if auto.countdown == 0 => {
            auto.countdown = auto.interval_ticks.saturating_sub(1);
            true
        }
        Some(auto) => {
            auto.countdown -= 1;
            false
        }
        None => false,
    };
    if auto_due {
        try_drop(state, wallet, &mut events, true);
    }

    // Setters above may have raised events of their own
    events.append(&mut state.events);

    // Physics pass, creation order
    let mut landed: Vec<Payout> = Vec::new();
    for ball in state.balls.iter_mut() {
        if !ball.is_active() {
            continue;
        }
        let board = Arc::clone(&ball.board);
        let (motion, outcome) = step(
            ball.motion,
            &board.pegs,
            &board.bounds(),
            board.physics(),
            &mut state.rng,
        );
        ball.motion = motion;

        match outcome {
            StepOutcome::Falling => {}
            StepOutcome::CrossedBucketLine => {
                ball.state = BallState::Resolved;
                landed.push(payout::resolve(&board, ball.id, ball.stake, motion.pos.x));
            }
            StepOutcome::Overrun => {
                ball.state = BallState::Discarded;
                state.stats.discarded += 1;
                log::warn!(
                    "Ball {} left the board at ({:.1}, {:.1}) without reaching the buckets",
                    ball.id,
                    motion.pos.x,
                    motion.pos.y
                );
                events.push(GameEvent::BallDiscarded {
                    ball_id: ball.id,
                    stake: ball.stake,
                });
            }
        }
    }
    state.balls.retain(|b| b.is_active());

    for payout in landed {
        settle(state, wallet, payout, &mut events);
    }

    state.time_ticks += 1;
    events
}

fn try_drop<W: Wallet + ?Sized>(
    state: &mut PlinkoState,
    wallet: &mut W,
    events: &mut Vec<GameEvent>,
    auto: bool,
) {
    let stake = state.bet;
    match state.drop_ball(wallet) {
        Ok(ball_id) => events.push(GameEvent::BallDropped { ball_id, stake }),
        Err(e) => {
            log::info!("Drop rejected: {e}");
            let (balance, reason) = match e {
                DropError::InsufficientFunds { balance, .. } => {
                    (Some(balance), StopReason::InsufficientFunds)
                }
                DropError::Wallet(_) => (None, StopReason::WalletUnavailable),
            };
            events.push(GameEvent::DropRejected { stake, balance });
            if auto {
                state.halt_auto_play(reason);
            }
        }
    }
}

/// Credit a landed ball; a failed credit is queued, never lost
fn settle<W: Wallet + ?Sized>(
    state: &mut PlinkoState,
    wallet: &mut W,
    payout: Payout,
    events: &mut Vec<GameEvent>,
) {
    state.stats.resolved += 1;
    state.stats.paid_out = state.stats.paid_out.saturating_add(payout.winnings);
    state.last_win = Some(payout.winnings);
    log::debug!(
        "Ball {} landed in bucket {} ({}) winning {}",
        payout.ball_id,
        payout.bucket,
        payout.multiplier,
        payout.winnings
    );
    events.push(GameEvent::Payout(payout));

    if payout.winnings == 0 {
        return;
    }
    let credit = PendingCredit {
        ball_id: payout.ball_id,
        amount: payout.winnings,
    };
    // Keep credits in order behind anything already queued
    if !state.pending_credits.is_empty() {
        queue_credit(state, credit, events);
        return;
    }
    if let Err(e) = wallet.credit(credit.amount) {
        log::warn!("Credit for ball {} failed: {e}", credit.ball_id);
        queue_credit(state, credit, events);
    }
}

fn queue_credit(state: &mut PlinkoState, credit: PendingCredit, events: &mut Vec<GameEvent>) {
    state.pending_credits.push_back(credit);
    events.push(GameEvent::CreditQueued {
        ball_id: credit.ball_id,
        amount: credit.amount,
    });
}

/// Retry queued credits oldest first, stopping at the first failure
fn retry_credits<W: Wallet + ?Sized>(
    state: &mut PlinkoState,
    wallet: &mut W,
    events: &mut Vec<GameEvent>,
) {
    while let Some(credit) = state.pending_credits.front().copied() {
        if let Err(e) = wallet.credit(credit.amount) {
            log::debug!("Credit retry for ball {} failed: {e}", credit.ball_id);
            break;
        }
        state.pending_credits.pop_front();
        events.push(GameEvent::CreditSettled {
            ball_id: credit.ball_id,
            amount: credit.amount,
        });
    }
}
