//! Simulation state and the drop scheduler
//!
//! The state owns the live ball list. Balls are only created by
//! [`PlinkoState::drop_ball`] after the stake has been debited, and only moved
//! by the tick.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{Board, BoardConfig, Peg};
use super::multipliers::{Multiplier, RiskTier, bucket_color};
use super::payout::Payout;
use super::physics::{Motion, centered_jitter};
use crate::Cents;
use crate::settings::{ConfigError, Settings};
use crate::wallet::{Wallet, WalletError};

/// Ball lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// On the board, stepped every tick
    Falling,
    /// Crossed the bucket line and paid out
    Resolved,
    /// Left the board without reaching the bucket line
    Discarded,
}

/// A ball in play
#[derive(Debug, Clone)]
pub struct Ball {
    pub(crate) id: u32,
    pub(crate) motion: Motion,
    pub(crate) stake: Cents,
    pub(crate) state: BallState,
    /// Board the ball was dropped on; later config changes don't reach it
    pub(crate) board: Arc<Board>,
}

impl Ball {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn pos(&self) -> Vec2 {
        self.motion.pos
    }

    pub fn vel(&self) -> Vec2 {
        self.motion.vel
    }

    pub fn stake(&self) -> Cents {
        self.stake
    }

    pub fn state(&self) -> BallState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == BallState::Falling
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }
}

#[derive(Debug, Error)]
pub enum DropError {
    #[error("insufficient funds: stake {stake} exceeds balance {balance}")]
    InsufficientFunds { balance: Cents, stake: Cents },
    #[error("wallet debit failed")]
    Wallet(#[source] WalletError),
}

/// Why auto-play ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Requested,
    InsufficientFunds,
    WalletUnavailable,
    RiskChanged,
}

/// Something the render layer or log may care about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BallDropped { ball_id: u32, stake: Cents },
    /// Auto-play drop refused; `balance` is unknown when the wallet failed
    DropRejected { stake: Cents, balance: Option<Cents> },
    Payout(Payout),
    BallDiscarded { ball_id: u32, stake: Cents },
    /// Credit failed and will be retried
    CreditQueued { ball_id: u32, amount: Cents },
    /// A queued credit went through
    CreditSettled { ball_id: u32, amount: Cents },
    AutoPlayStopped { reason: StopReason },
    BoardChanged { risk: RiskTier, rows: u32 },
}

/// Timed auto-play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPlay {
    pub interval_ticks: u32,
    /// Ticks until the next drop (0 = drop this tick)
    pub countdown: u32,
}

/// Winnings owed to the player that the wallet has not accepted yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCredit {
    pub ball_id: u32,
    pub amount: Cents,
}

/// Running session totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub drops: u64,
    pub resolved: u64,
    pub discarded: u64,
    pub wagered: Cents,
    pub paid_out: Cents,
}

/// Read-only view of a ball
#[derive(Debug, Clone, Serialize)]
pub struct BallView {
    pub id: u32,
    pub pos: Vec2,
    pub stake: Cents,
}

/// Bucket label for the render layer
#[derive(Debug, Clone, Serialize)]
pub struct BucketLabel {
    pub multiplier: Multiplier,
    pub label: String,
    pub color: &'static str,
}

/// Everything the render layer draws for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub risk: RiskTier,
    pub rows: u32,
    pub bet: Cents,
    pub pegs: Vec<Peg>,
    pub balls: Vec<BallView>,
    pub buckets: Vec<BucketLabel>,
    pub last_win: Option<Cents>,
    pub auto_play: bool,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct PlinkoState {
    /// Run seed for reproducibility
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) settings: Settings,
    /// Current board; replaced wholesale on config changes
    pub(crate) board: Arc<Board>,
    /// Live balls in creation order
    pub(crate) balls: Vec<Ball>,
    pub(crate) bet: Cents,
    pub(crate) auto: Option<AutoPlay>,
    pub(crate) pending_credits: VecDeque<PendingCredit>,
    /// Events raised between ticks, handed out by the next tick
    pub(crate) events: Vec<GameEvent>,
    pub(crate) last_win: Option<Cents>,
    pub(crate) stats: SessionStats,
    pub(crate) time_ticks: u64,
    next_id: u32,
}

impl PlinkoState {
    /// Create a session; the seed comes from settings or entropy
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        Self::with_seed(settings, seed)
    }

    /// Create a session with an explicit seed
    pub fn with_seed(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let board = Board::new(settings.board_config())?;
        log::info!(
            "New session: seed={seed} risk={} rows={} preset={}",
            board.risk(),
            board.rows(),
            settings.preset.as_str()
        );
        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            bet: settings.bet,
            settings,
            board: Arc::new(board),
            balls: Vec::new(),
            auto: None,
            pending_credits: VecDeque::new(),
            events: Vec::new(),
            last_win: None,
            stats: SessionStats::default(),
            time_ticks: 0,
            next_id: 1,
        })
    }

    /// Allocate a new ball ID
    fn next_ball_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Debit the bet and put a new ball at the top of the board
    ///
    /// Nothing changes unless the debit succeeds.
    pub fn drop_ball<W: Wallet + ?Sized>(&mut self, wallet: &mut W) -> Result<u32, DropError> {
        let stake = self.bet;
        match wallet.debit(stake) {
            Ok(_) => {}
            Err(WalletError::Insufficient { balance, requested }) => {
                return Err(DropError::InsufficientFunds {
                    balance,
                    stake: requested,
                });
            }
            Err(e) => return Err(DropError::Wallet(e)),
        }

        let id = self.next_ball_id();
        let board = Arc::clone(&self.board);
        let physics = board.physics();
        let x_jitter = centered_jitter(&mut self.rng, physics.drop_x_jitter);
        let vx = centered_jitter(&mut self.rng, physics.drop_vx_jitter);
        let motion = Motion {
            pos: board.drop_origin() + Vec2::new(x_jitter, 0.0),
            vel: Vec2::new(vx, 0.0),
        };

        self.balls.push(Ball {
            id,
            motion,
            stake,
            state: BallState::Falling,
            board,
        });
        self.stats.drops += 1;
        self.stats.wagered = self.stats.wagered.saturating_add(stake);
        log::debug!("Dropped ball {id} stake={stake}");
        Ok(id)
    }

    pub fn start_auto_play(&mut self) {
        if self.auto.is_none() {
            log::info!("Auto-play started");
            self.auto = Some(AutoPlay {
                interval_ticks: self.settings.auto_interval_ticks,
                countdown: 0,
            });
        }
    }

    /// Stop auto-play before its next drop; balls in flight are unaffected
    pub fn stop_auto_play(&mut self) {
        self.halt_auto_play(StopReason::Requested);
    }

    pub(crate) fn halt_auto_play(&mut self, reason: StopReason) {
        if self.auto.take().is_some() {
            log::info!("Auto-play stopped: {reason:?}");
            self.events.push(GameEvent::AutoPlayStopped { reason });
        }
    }

    /// Switch risk tier; uses the tier's row count and stops auto-play
    pub fn set_risk_tier(&mut self, risk: RiskTier) -> Result<(), ConfigError> {
        let rows = self.settings.rows.rows_for(risk);
        self.replace_board(risk, rows)?;
        self.halt_auto_play(StopReason::RiskChanged);
        Ok(())
    }

    /// Change the row count for the current tier
    ///
    /// Recorded in the row policy, so switching away and back to this tier
    /// keeps the new count.
    pub fn set_row_count(&mut self, rows: u32) -> Result<(), ConfigError> {
        let risk = self.board.risk();
        self.replace_board(risk, rows)?;
        self.settings.rows.set_rows_for(risk, rows);
        Ok(())
    }

    fn replace_board(&mut self, risk: RiskTier, rows: u32) -> Result<(), ConfigError> {
        let config = BoardConfig {
            risk,
            rows,
            ..self.board.config
        };
        let board = Board::new(config)?;
        log::info!("Board changed: risk={risk} rows={rows}");
        self.board = Arc::new(board);
        self.events.push(GameEvent::BoardChanged { risk, rows });
        Ok(())
    }

    /// Set the stake for future drops
    pub fn set_bet(&mut self, bet: Cents) -> Result<(), ConfigError> {
        if bet < self.settings.min_bet {
            return Err(ConfigError::BetBelowMinimum {
                bet,
                min: self.settings.min_bet,
            });
        }
        self.bet = bet;
        Ok(())
    }

    /// Halve the bet, rounding half a cent up, never below the minimum bet
    pub fn halve_bet(&mut self) {
        self.bet = self.bet.div_ceil(2).max(self.settings.min_bet);
    }

    pub fn double_bet(&mut self) {
        self.bet = self.bet.saturating_mul(2);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn bet(&self) -> Cents {
        self.bet
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn is_auto_playing(&self) -> bool {
        self.auto.is_some()
    }

    pub fn last_win(&self) -> Option<Cents> {
        self.last_win
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn pending_credits(&self) -> impl Iterator<Item = &PendingCredit> {
        self.pending_credits.iter()
    }

    /// Whether anything is still owed or in flight
    pub fn is_idle(&self) -> bool {
        self.balls.is_empty() && self.pending_credits.is_empty()
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> Snapshot {
        let board = &self.board;
        Snapshot {
            tick: self.time_ticks,
            risk: board.risk(),
            rows: board.rows(),
            bet: self.bet,
            pegs: board.pegs.clone(),
            balls: self
                .balls
                .iter()
                .map(|b| BallView {
                    id: b.id,
                    pos: b.motion.pos,
                    stake: b.stake,
                })
                .collect(),
            buckets: board
                .multipliers
                .iter()
                .map(|&multiplier| BucketLabel {
                    multiplier,
                    label: multiplier.to_string(),
                    color: bucket_color(multiplier),
                })
                .collect(),
            last_win: self.last_win,
            auto_play: self.auto.is_some(),
        }
    }
}
