//! Plinko Table - a deterministic Plinko board
//!
//! Core modules:
//! - `sim`: Deterministic simulation (peg lattice, ball physics, payouts)
//! - `wallet`: Balance register boundary (in-memory, JSON wire, ledger)
//! - `settings`: Board presets and session configuration

pub mod settings;
pub mod sim;
pub mod wallet;

pub use settings::{BoardPreset, ConfigError, RowPolicy, Settings};
pub use wallet::{InMemoryWallet, Wallet, WalletError};

/// Money in integer cents
pub type Cents = u64;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation rate (one tick per animation frame)
    pub const SIM_HZ: u32 = 60;
    /// Auto-play drop interval (200 ms at 60 Hz)
    pub const AUTO_DROP_INTERVAL_TICKS: u32 = 12;

    /// Canonical row count used for every risk tier
    pub const DEFAULT_ROWS: u32 = 14;
    /// Pegs in the first row
    pub const FIRST_ROW_PEGS: u32 = 3;

    /// Starting balance for a fresh session ($1000)
    pub const STARTING_BALANCE: u64 = 100_000;
    /// Default and minimum bet ($1)
    pub const MIN_BET: u64 = 100;

    /// Wall reflection keeps half the horizontal speed
    pub const WALL_DAMPING: f32 = 0.5;
}

/// Format cents as a dollar string (`$12.30`)
pub fn format_cents(cents: Cents) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Dollars (wire format) to cents, rounding to the nearest cent
pub fn dollars_to_cents(dollars: f64) -> Option<Cents> {
    if !dollars.is_finite() || dollars < 0.0 {
        return None;
    }
    Some((dollars * 100.0).round() as Cents)
}

/// Cents to dollars (wire format)
pub fn cents_to_dollars(cents: Cents) -> f64 {
    cents as f64 / 100.0
}
