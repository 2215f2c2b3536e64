//! Session settings and board presets
//!
//! Stored as JSON. Every board the session builds comes from here, so a bad
//! file is rejected before the first drop.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Cents;
use crate::consts::{
    AUTO_DROP_INTERVAL_TICKS, DEFAULT_ROWS, MIN_BET, STARTING_BALANCE, WALL_DAMPING,
};
use crate::sim::{Board, BoardConfig, Layout, Physics, RiskTier};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no multiplier table for {risk} risk with {rows} rows")]
    NoMultiplierTable { risk: RiskTier, rows: u32 },
    #[error("{risk}/{rows} table has {got} multipliers, board has {expected} buckets")]
    TableLengthMismatch {
        risk: RiskTier,
        rows: u32,
        expected: usize,
        got: usize,
    },
    #[error("row count must be > 0 (got {rows})")]
    InvalidRowCount { rows: u32 },
    #[error("bottom row needs {needed} units but board is {width} wide")]
    BoardTooNarrow { needed: f32, width: f32 },
    #[error("peg gap {gap} cannot pass a ball of diameter {diameter}")]
    PegGapTooSmall { gap: f32, diameter: f32 },
    #[error("bucket line offset {offset} must be below bottom margin {margin}")]
    BucketLineBelowBoard { offset: f32, margin: f32 },
    #[error("{field} must be in ({min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("bet {bet} is below the minimum bet {min}")]
    BetBelowMinimum { bet: Cents, min: Cents },
    #[error("auto_interval_ticks must be > 0")]
    ZeroAutoInterval,
    #[error("failed to read settings {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings json")]
    Parse(#[from] serde_json::Error),
}

/// Board variants
///
/// `Classic` is the full-size desktop board; `Compact` is the scaled-down
/// mobile board with lighter gravity to keep the same feel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoardPreset {
    #[default]
    Classic,
    Compact,
}

impl BoardPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardPreset::Classic => "classic",
            BoardPreset::Compact => "compact",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "desktop" => Some(BoardPreset::Classic),
            "compact" | "mobile" => Some(BoardPreset::Compact),
            _ => None,
        }
    }

    pub fn layout(&self) -> Layout {
        match self {
            BoardPreset::Classic => Layout {
                spacing: 40.0,
                width: 800.0,
                top_margin: 60.0,
                bottom_margin: 60.0,
                bucket_offset: 20.0,
            },
            BoardPreset::Compact => Layout {
                spacing: 28.0,
                width: 560.0,
                top_margin: 42.0,
                bottom_margin: 42.0,
                bucket_offset: 14.0,
            },
        }
    }

    /// Physics constants for the preset
    ///
    /// Restitution is set so landings follow the binomial spread the
    /// multiplier tables are priced on.
    pub fn physics(&self) -> Physics {
        match self {
            BoardPreset::Classic => Physics {
                gravity: 0.25,
                friction: 0.98,
                bounce: 0.35,
                wall_damping: WALL_DAMPING,
                deflection: 1.5,
                ball_radius: 7.0,
                peg_radius: 4.0,
                drop_y: 20.0,
                drop_x_jitter: 10.0,
                drop_vx_jitter: 2.0,
            },
            BoardPreset::Compact => Physics {
                gravity: 0.18,
                friction: 0.99,
                bounce: 0.3,
                wall_damping: WALL_DAMPING,
                deflection: 1.5,
                ball_radius: 5.0,
                peg_radius: 3.0,
                drop_y: 14.0,
                drop_x_jitter: 7.0,
                drop_vx_jitter: 1.4,
            },
        }
    }
}

/// Row count per risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowPolicy {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl Default for RowPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_ROWS)
    }
}

impl RowPolicy {
    /// Same row count for every tier
    pub fn fixed(rows: u32) -> Self {
        Self {
            low: rows,
            medium: rows,
            high: rows,
        }
    }

    pub fn rows_for(&self, risk: RiskTier) -> u32 {
        match risk {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
        }
    }

    pub fn set_rows_for(&mut self, risk: RiskTier, rows: u32) {
        match risk {
            RiskTier::Low => self.low = rows,
            RiskTier::Medium => self.medium = rows,
            RiskTier::High => self.high = rows,
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board size and physics variant
    pub preset: BoardPreset,
    /// Initial risk tier
    pub risk: RiskTier,
    /// Initial bet in cents
    pub bet: Cents,
    /// Smallest accepted bet in cents
    pub min_bet: Cents,
    /// Row count for each tier
    pub rows: RowPolicy,
    /// Ticks between auto-play drops
    pub auto_interval_ticks: u32,
    /// RNG seed (entropy when absent)
    pub seed: Option<u64>,
    /// Balance for a fresh wallet in cents
    pub starting_balance: Cents,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: BoardPreset::Classic,
            risk: RiskTier::Medium,
            bet: MIN_BET,
            min_bet: MIN_BET,
            rows: RowPolicy::default(),
            auto_interval_ticks: AUTO_DROP_INTERVAL_TICKS,
            seed: None,
            starting_balance: STARTING_BALANCE,
        }
    }
}

impl Settings {
    /// Create settings from a board preset
    pub fn from_preset(preset: BoardPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Board configuration for a risk tier under these settings
    pub fn board_config_for(&self, risk: RiskTier) -> BoardConfig {
        BoardConfig {
            risk,
            rows: self.rows.rows_for(risk),
            layout: self.preset.layout(),
            physics: self.preset.physics(),
        }
    }

    /// Board configuration for the initial risk tier
    pub fn board_config(&self) -> BoardConfig {
        self.board_config_for(self.risk)
    }

    /// Check every tier's board plus the bet and scheduling fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        for risk in RiskTier::ALL {
            Board::new(self.board_config_for(risk))?;
        }
        if self.bet < self.min_bet {
            return Err(ConfigError::BetBelowMinimum {
                bet: self.bet,
                min: self.min_bet,
            });
        }
        if self.auto_interval_ticks == 0 {
            return Err(ConfigError::ZeroAutoInterval);
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        Settings::default().validate().unwrap();
        Settings::from_preset(BoardPreset::Compact).validate().unwrap();
    }

    #[test]
    fn test_default_rows_fixed_for_all_tiers() {
        let settings = Settings::default();
        for risk in RiskTier::ALL {
            assert_eq!(settings.board_config_for(risk).rows, 14);
        }
    }

    #[test]
    fn test_wide_high_tier_policy() {
        let settings = Settings {
            rows: RowPolicy {
                high: 16,
                ..RowPolicy::default()
            },
            ..Settings::default()
        };
        settings.validate().unwrap();
        assert_eq!(settings.board_config_for(RiskTier::High).rows, 16);
        assert_eq!(settings.board_config_for(RiskTier::Low).rows, 14);
    }

    #[test]
    fn test_json_round_trip_and_partial() {
        let settings = Settings {
            risk: RiskTier::High,
            bet: 1_000,
            seed: Some(7),
            ..Settings::default()
        };
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.risk, RiskTier::High);
        assert_eq!(back.bet, 1_000);
        assert_eq!(back.seed, Some(7));

        // Missing fields fall back to defaults
        let partial = Settings::from_json(r#"{"risk":"low","preset":"compact"}"#).unwrap();
        assert_eq!(partial.risk, RiskTier::Low);
        assert_eq!(partial.preset, BoardPreset::Compact);
        assert_eq!(partial.bet, MIN_BET);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = Settings::from_json(r#"{"rows":{"low":12,"medium":14,"high":14}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoMultiplierTable { rows: 12, .. }));

        let err = Settings::from_json(r#"{"bet":50}"#).unwrap_err();
        assert!(matches!(err, ConfigError::BetBelowMinimum { bet: 50, .. }));

        let err = Settings::from_json(r#"{"auto_interval_ticks":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroAutoInterval));

        assert!(matches!(Settings::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_save_and_load() {
        let name = format!("plinko-settings-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        let settings = Settings {
            risk: RiskTier::Low,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.risk, RiskTier::Low);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(BoardPreset::from_str("Mobile"), Some(BoardPreset::Compact));
        assert_eq!(BoardPreset::from_str("classic"), Some(BoardPreset::Classic));
        assert_eq!(BoardPreset::from_str("tv"), None);
    }
}
