//! Payout multiplier tables
//!
//! One table per (risk tier, row count). Multipliers are exact hundredths so
//! the label shown on a bucket and the amount paid out never disagree.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Cents;
use crate::settings::ConfigError;

/// Risk tier selecting a multiplier table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(RiskTier::Low),
            "medium" | "med" => Some(RiskTier::Medium),
            "high" => Some(RiskTier::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payout factor in hundredths (`20` is 0.2x, `1300` is 13x)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multiplier(u32);

impl Multiplier {
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Winnings for a stake, rounded down to the cent
    pub fn apply(self, stake: Cents) -> Cents {
        let scaled = stake as u128 * self.0 as u128 / 100;
        scaled.min(Cents::MAX as u128) as Cents
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{whole}x")
        } else if frac % 10 == 0 {
            write!(f, "{whole}.{}x", frac / 10)
        } else {
            write!(f, "{whole}.{frac:02}x")
        }
    }
}

const fn m(hundredths: u32) -> Multiplier {
    Multiplier::from_hundredths(hundredths)
}

#[rustfmt::skip]
const LOW_14: [Multiplier; 15] = [
    m(710), m(400), m(190), m(140), m(130), m(110), m(100), m(50),
    m(100), m(110), m(130), m(140), m(190), m(400), m(710),
];
#[rustfmt::skip]
const MEDIUM_14: [Multiplier; 15] = [
    m(1300), m(300), m(130), m(70), m(40), m(20), m(20), m(20),
    m(20), m(20), m(40), m(70), m(130), m(300), m(1300),
];
#[rustfmt::skip]
const HIGH_14: [Multiplier; 15] = [
    m(11000), m(2500), m(1200), m(600), m(300), m(150), m(50), m(20),
    m(50), m(150), m(300), m(600), m(1200), m(2500), m(11000),
];

#[rustfmt::skip]
const LOW_16: [Multiplier; 17] = [
    m(1600), m(900), m(200), m(140), m(140), m(120), m(110), m(100), m(50),
    m(100), m(110), m(120), m(140), m(140), m(200), m(900), m(1600),
];
#[rustfmt::skip]
const MEDIUM_16: [Multiplier; 17] = [
    m(11000), m(4100), m(1000), m(500), m(300), m(150), m(100), m(50), m(30),
    m(50), m(100), m(150), m(300), m(500), m(1000), m(4100), m(11000),
];
#[rustfmt::skip]
const HIGH_16: [Multiplier; 17] = [
    m(100000), m(13000), m(2600), m(900), m(400), m(200), m(20), m(20), m(20),
    m(20), m(20), m(200), m(400), m(900), m(2600), m(13000), m(100000),
];

/// Row counts with a defined table
pub const SUPPORTED_ROWS: [u32; 2] = [14, 16];

/// Look up the multiplier table for a risk tier and row count
pub fn multipliers_for(risk: RiskTier, rows: u32) -> Result<&'static [Multiplier], ConfigError> {
    let table: &'static [Multiplier] = match (risk, rows) {
        (RiskTier::Low, 14) => &LOW_14,
        (RiskTier::Medium, 14) => &MEDIUM_14,
        (RiskTier::High, 14) => &HIGH_14,
        (RiskTier::Low, 16) => &LOW_16,
        (RiskTier::Medium, 16) => &MEDIUM_16,
        (RiskTier::High, 16) => &HIGH_16,
        _ => return Err(ConfigError::NoMultiplierTable { risk, rows }),
    };

    let buckets = rows as usize + 1;
    if table.len() != buckets {
        return Err(ConfigError::TableLengthMismatch {
            risk,
            rows,
            expected: buckets,
            got: table.len(),
        });
    }
    Ok(table)
}

/// Label color for a bucket (hex RGB)
pub fn bucket_color(multiplier: Multiplier) -> &'static str {
    match multiplier.hundredths() {
        1000.. => "#ef4444",
        300.. => "#f97316",
        100.. => "#eab308",
        _ => "#facc15",
    }
}

/// Theoretical return per unit stake under a binomial landing distribution
///
/// Bucket `k` of an `n`-row board is reached with probability `C(n, k) / 2^n`.
pub fn expected_value(table: &[Multiplier]) -> f64 {
    let Some(n) = table.len().checked_sub(1) else {
        return 0.0;
    };
    let total = 2f64.powi(n as i32);
    let mut coeff = 1f64;
    let mut ev = 0.0;
    for (k, mult) in table.iter().enumerate() {
        ev += coeff / total * mult.as_f64();
        coeff = coeff * (n - k) as f64 / (k + 1) as f64;
    }
    ev
}
