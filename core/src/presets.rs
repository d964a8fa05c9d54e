use serde::{Deserialize, Serialize};

use crate::{BoardConfig, Coord, Coord2, DEFAULT_BOMB_PROBABILITY};

/// Edge length of one tile, in the same length units as the difficulty
/// dimensions.
pub const TILE_SIZE: Coord = 20;

/// Difficulty presets offered by the start menu. Dimensions are kept in the
/// menu's length units and converted to tile counts through [`TILE_SIZE`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Board dimensions in length units.
    pub const fn board_units(self) -> Coord2 {
        match self {
            Self::Easy => (80, 80),
            Self::Medium => (240, 240),
            Self::Hard => (600, 400),
        }
    }

    /// Board dimensions in tiles.
    pub const fn board_size(self) -> Coord2 {
        let (width, height) = self.board_units();
        (width / TILE_SIZE, height / TILE_SIZE)
    }

    /// Board configuration for this preset at the default bomb density.
    pub fn config(self) -> BoardConfig {
        let (width, height) = self.board_size();
        BoardConfig::new_unchecked(width, height, DEFAULT_BOMB_PROBABILITY)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl Default for Difficulty {
    /// The board shown before any difficulty is picked has the `Hard`
    /// dimensions.
    fn default() -> Self {
        Self::Hard
    }
}
