use serde::{Deserialize, Serialize};

/// Player-visible state of a single board cell.
///
/// `Open` carries the adjacent-bomb count of a revealed safe cell. `Bomb` is
/// only ever the revealed bomb that ended the session; hidden bombs stay
/// `Hidden`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Hidden,
    Open(u8),
    Bomb,
}

impl Cell {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Whether the cell has been revealed, bomb or not. A revealed cell never
    /// reverts to hidden.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open(_) | Self::Bomb)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Hidden
    }
}
