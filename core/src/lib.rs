use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use presets::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod generator;
mod presets;
mod types;

/// Per-cell bomb density used when no explicit probability is configured.
pub const DEFAULT_BOMB_PROBABILITY: f64 = 0.2;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: Coord,
    pub height: Coord,
    pub bomb_probability: f64,
}

impl BoardConfig {
    pub const fn new_unchecked(width: Coord, height: Coord, bomb_probability: f64) -> Self {
        Self {
            width,
            height,
            bomb_probability,
        }
    }

    pub fn new(width: Coord, height: Coord, bomb_probability: f64) -> Result<Self> {
        let config = Self::new_unchecked(width, height, bomb_probability);
        config.validate()?;
        Ok(config)
    }

    /// Both dimensions must be positive and the bomb probability must lie in
    /// `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidConfiguration);
        }
        if !(0.0..1.0).contains(&self.bomb_probability) {
            return Err(GameError::InvalidConfiguration);
        }
        Ok(())
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }
}

/// Fixed bomb placement of one board, with adjacency counts derived once at
/// construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BombLayout {
    bomb_mask: Array2<bool>,
    adjacent: Array2<u8>,
    bomb_count: CellCount,
}

impl BombLayout {
    pub fn from_bomb_mask(bomb_mask: Array2<bool>) -> Self {
        let bomb_count = bomb_mask
            .iter()
            .filter(|&&is_bomb| is_bomb)
            .count()
            .try_into()
            .unwrap();

        let mut adjacent: Array2<u8> = Array2::default(bomb_mask.raw_dim());
        for ((x, y), count) in adjacent.indexed_iter_mut() {
            let coords: Coord2 = (x.try_into().unwrap(), y.try_into().unwrap());
            *count = bomb_mask
                .iter_neighbors(coords)
                .filter(|&pos| bomb_mask[pos.to_nd_index()])
                .count()
                .try_into()
                .unwrap();
        }

        Self {
            bomb_mask,
            adjacent,
            bomb_count,
        }
    }

    pub fn from_bomb_coords(size: Coord2, bomb_coords: &[Coord2]) -> Result<Self> {
        let mut bomb_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in bomb_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::OutOfBounds);
            }
            bomb_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_bomb_mask(bomb_mask))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.bomb_mask.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.bomb_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.bomb_mask.len().try_into().unwrap()
    }

    pub fn bomb_count(&self) -> CellCount {
        self.bomb_count
    }

    pub fn contains_bomb(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// Bombs among the up-to-8 in-bounds neighbors. Out-of-bounds neighbors
    /// are absent from the count, not treated as bomb-free placeholders.
    pub fn adjacent_bomb_count(&self, coords: Coord2) -> u8 {
        self.adjacent[coords.to_nd_index()]
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.bomb_mask.iter_neighbors(coords)
    }
}

impl Index<Coord2> for BombLayout {
    type Output = bool;

    fn index(&self, (x, y): Coord2) -> &Self::Output {
        &self.bomb_mask[(x as usize, y as usize)]
    }
}

/// Outcome of a single reveal call, used by the presentation layer to decide
/// what to redraw or announce.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The session had already ended; the board was left untouched.
    AlreadyTerminal,
    /// The target cell was already open; the board was left untouched.
    NoChange,
    /// This call newly opened the given number of safe cells.
    Revealed(CellCount),
    Won,
    Lost,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the board.
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            AlreadyTerminal => false,
            NoChange => false,
            Revealed(_) => true,
            Won => true,
            Lost => true,
        }
    }
}
