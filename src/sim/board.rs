//! Peg lattice and board geometry
//!
//! Row `r` holds `r + 3` pegs, so the bottom row of an `n`-row board has
//! `n + 2` pegs and the `n + 1` gaps between them are the buckets.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::multipliers::{Multiplier, RiskTier, multipliers_for};
use super::physics::Physics;
use crate::consts::FIRST_ROW_PEGS;
use crate::settings::ConfigError;

/// A fixed peg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
}

/// Board layout in board units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Distance between neighbouring pegs (and bucket width)
    pub spacing: f32,
    pub width: f32,
    /// Space above the first peg row
    pub top_margin: f32,
    /// Space below the last peg row
    pub bottom_margin: f32,
    /// Distance from the last peg row to the bucket line
    pub bucket_offset: f32,
}

/// Everything needed to build a board
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub risk: RiskTier,
    pub rows: u32,
    pub layout: Layout,
    pub physics: Physics,
}

/// Extents used by the physics step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardBounds {
    pub width: f32,
    pub height: f32,
    /// Balls below this line are paid out
    pub bucket_line: f32,
    /// Y of the first peg row
    pub top: f32,
    pub spacing: f32,
    pub rows: u32,
}

impl BoardBounds {
    /// Horizontal span a ball may occupy at height `y`
    ///
    /// The side guards run through the outermost peg of every row. Above the
    /// first row they match the first row; from the last row down they match
    /// the bucket row, so a ball can only cross the bucket line over a bucket.
    pub fn lane(&self, y: f32) -> (f32, f32) {
        let last_row = self.rows.saturating_sub(1) as f32;
        let row = ((y - self.top) / self.spacing).clamp(0.0, last_row);
        let half_span = (row + (FIRST_ROW_PEGS - 1) as f32) * self.spacing / 2.0;
        let center = self.width / 2.0;
        (center - half_span, center + half_span)
    }
}

/// Generate the triangular peg lattice, row by row, left to right
pub fn generate_pegs(rows: u32, spacing: f32, board_width: f32, top_margin: f32) -> Vec<Peg> {
    let mut pegs = Vec::with_capacity(peg_count(rows));
    for row in 0..rows {
        let pegs_in_row = row + FIRST_ROW_PEGS;
        let row_width = (pegs_in_row - 1) as f32 * spacing;
        let start_x = (board_width - row_width) / 2.0;
        let y = top_margin + row as f32 * spacing;
        for col in 0..pegs_in_row {
            pegs.push(Peg {
                pos: Vec2::new(start_x + col as f32 * spacing, y),
            });
        }
    }
    pegs
}

/// Total pegs on an `rows`-row board
pub fn peg_count(rows: u32) -> usize {
    let rows = rows as usize;
    rows * (rows + 2 * FIRST_ROW_PEGS as usize - 1) / 2
}

/// An immutable board: pegs plus the payout table, shared by every ball
/// dropped on it
#[derive(Debug, Clone)]
pub struct Board {
    pub config: BoardConfig,
    pub pegs: Vec<Peg>,
    pub multipliers: &'static [Multiplier],
}

impl Board {
    /// Build and validate a board
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        let BoardConfig {
            risk,
            rows,
            layout,
            physics,
        } = config;

        if rows == 0 {
            return Err(ConfigError::InvalidRowCount { rows });
        }
        physics.validate()?;

        let multipliers = multipliers_for(risk, rows)?;

        let needed = (rows + 1) as f32 * layout.spacing;
        if needed > layout.width {
            return Err(ConfigError::BoardTooNarrow {
                needed,
                width: layout.width,
            });
        }

        let gap = layout.spacing - 2.0 * physics.peg_radius;
        let diameter = 2.0 * physics.ball_radius;
        if gap <= diameter {
            return Err(ConfigError::PegGapTooSmall { gap, diameter });
        }

        if layout.bucket_offset <= 0.0 || layout.bucket_offset >= layout.bottom_margin {
            return Err(ConfigError::BucketLineBelowBoard {
                offset: layout.bucket_offset,
                margin: layout.bottom_margin,
            });
        }

        let pegs = generate_pegs(rows, layout.spacing, layout.width, layout.top_margin);
        Ok(Self {
            config,
            pegs,
            multipliers,
        })
    }

    pub fn rows(&self) -> u32 {
        self.config.rows
    }

    pub fn risk(&self) -> RiskTier {
        self.config.risk
    }

    pub fn physics(&self) -> &Physics {
        &self.config.physics
    }

    pub fn height(&self) -> f32 {
        let l = &self.config.layout;
        l.top_margin + self.rows() as f32 * l.spacing + l.bottom_margin
    }

    /// Y coordinate of the bucket line
    pub fn bucket_line(&self) -> f32 {
        let l = &self.config.layout;
        l.top_margin + self.rows() as f32 * l.spacing + l.bucket_offset
    }

    /// X of the first peg in the bottom row (left edge of bucket 0)
    pub fn bucket_row_start_x(&self) -> f32 {
        let l = &self.config.layout;
        (l.width - self.bucket_count() as f32 * l.spacing) / 2.0
    }

    pub fn bucket_count(&self) -> usize {
        self.multipliers.len()
    }

    /// Horizontal center of a bucket
    pub fn bucket_center_x(&self, index: usize) -> f32 {
        let spacing = self.config.layout.spacing;
        self.bucket_row_start_x() + index as f32 * spacing + spacing / 2.0
    }

    /// Drop point at the top center
    pub fn drop_origin(&self) -> Vec2 {
        Vec2::new(self.config.layout.width / 2.0, self.config.physics.drop_y)
    }

    pub fn bounds(&self) -> BoardBounds {
        BoardBounds {
            width: self.config.layout.width,
            height: self.height(),
            bucket_line: self.bucket_line(),
            top: self.config.layout.top_margin,
            spacing: self.config.layout.spacing,
            rows: self.rows(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BoardPreset, Settings};
    use proptest::prelude::*;

    fn classic(risk: RiskTier) -> Board {
        Board::new(Settings::default().board_config_for(risk)).unwrap()
    }

    #[test]
    fn test_five_rows_peg_counts() {
        let pegs = generate_pegs(5, 40.0, 800.0, 60.0);
        assert_eq!(pegs.len(), 25);

        let mut per_row = Vec::new();
        for row in 0..5 {
            let y = 60.0 + row as f32 * 40.0;
            per_row.push(pegs.iter().filter(|p| p.pos.y == y).count());
        }
        assert_eq!(per_row, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_rows_centered() {
        let pegs = generate_pegs(3, 40.0, 800.0, 60.0);
        // Row 0: 360, 400, 440
        assert_eq!(pegs[0].pos, Vec2::new(360.0, 60.0));
        assert_eq!(pegs[1].pos, Vec2::new(400.0, 60.0));
        assert_eq!(pegs[2].pos, Vec2::new(440.0, 60.0));
        // Row 1 is offset by half a spacing
        assert_eq!(pegs[3].pos, Vec2::new(340.0, 100.0));
    }

    #[test]
    fn test_classic_geometry() {
        let board = classic(RiskTier::Medium);
        assert_eq!(board.pegs.len(), peg_count(14));
        assert_eq!(board.bucket_count(), 15);
        assert_eq!(board.bucket_line(), 640.0);
        assert_eq!(board.height(), 680.0);
        assert_eq!(board.bucket_row_start_x(), 100.0);
        assert_eq!(board.bucket_center_x(7), 400.0);
    }

    #[test]
    fn test_bottom_row_bounds_buckets() {
        // The bottom peg row's first and last pegs bracket the bucket row
        let board = classic(RiskTier::High);
        let last_row_y = board.pegs.last().unwrap().pos.y;
        let bottom: Vec<f32> = board
            .pegs
            .iter()
            .filter(|p| p.pos.y == last_row_y)
            .map(|p| p.pos.x)
            .collect();
        assert_eq!(bottom.len(), board.bucket_count() + 1);
        assert_eq!(bottom[0], board.bucket_row_start_x());
        let spacing = board.config.layout.spacing;
        for (i, pair) in bottom.windows(2).enumerate() {
            let center = (pair[0] + pair[1]) / 2.0;
            assert_eq!(center, board.bucket_center_x(i));
            assert_eq!(pair[1] - pair[0], spacing);
        }
    }

    #[test]
    fn test_lane_follows_outer_pegs() {
        let board = classic(RiskTier::Medium);
        let bounds = board.bounds();

        // Above the lattice: the first row's outer pegs
        assert_eq!(bounds.lane(20.0), (360.0, 440.0));
        assert_eq!(bounds.lane(60.0), (360.0, 440.0));
        // Halfway between rows 0 and 1
        assert_eq!(bounds.lane(80.0), (350.0, 450.0));

        // Every row's guard passes through its outer pegs
        for row in 0..board.rows() {
            let y = 60.0 + row as f32 * 40.0;
            let xs: Vec<f32> = board
                .pegs
                .iter()
                .filter(|p| p.pos.y == y)
                .map(|p| p.pos.x)
                .collect();
            assert_eq!(bounds.lane(y), (xs[0], xs[xs.len() - 1]));
        }

        // From the last row down: exactly the bucket row
        let start = board.bucket_row_start_x();
        let end = start + board.bucket_count() as f32 * 40.0;
        assert_eq!(bounds.lane(board.bucket_line()), (start, end));
        assert_eq!(bounds.lane(board.height() + 100.0), (100.0, 700.0));
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let mut config = Settings::default().board_config();
        config.layout.width = 500.0;
        assert!(matches!(Board::new(config), Err(ConfigError::BoardTooNarrow { .. })));

        let mut config = Settings::default().board_config();
        config.physics.ball_radius = 20.0;
        assert!(matches!(Board::new(config), Err(ConfigError::PegGapTooSmall { .. })));

        let mut config = Settings::default().board_config();
        config.layout.bucket_offset = 80.0;
        assert!(matches!(
            Board::new(config),
            Err(ConfigError::BucketLineBelowBoard { .. })
        ));

        let mut config = Settings::default().board_config();
        config.rows = 0;
        assert!(matches!(Board::new(config), Err(ConfigError::InvalidRowCount { .. })));
    }

    #[test]
    fn test_compact_preset_builds() {
        let settings = Settings::from_preset(BoardPreset::Compact);
        let board = Board::new(settings.board_config()).unwrap();
        assert_eq!(board.bucket_count(), 15);
        assert!(board.bucket_line() < board.height());
    }

    proptest! {
        #[test]
        fn prop_peg_count_triangular(rows in 0u32..40) {
            let pegs = generate_pegs(rows, 40.0, 2000.0, 60.0);
            let expected: u32 = (0..rows).map(|r| r + 3).sum();
            prop_assert_eq!(pegs.len(), expected as usize);
            prop_assert_eq!(peg_count(rows), expected as usize);
        }
    }
}
