use std::collections::{HashSet, VecDeque};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Session state of one board.
///
/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> Lost
///
/// Won and Lost are terminal; only constructing a new [`Board`] starts a new
/// session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    InProgress,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::InProgress
    }
}

/// Board engine: owns the bomb layout, the per-cell revealed state, the
/// revealed-safe counter, and the session state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    layout: BombLayout,
    grid: Array2<Cell>,
    revealed_safe_count: CellCount,
    state: SessionState,
    triggered_bomb: Option<Coord2>,
}

impl Board {
    /// Builds a board with a freshly generated random layout. Fails only on
    /// an invalid width, height, or bomb probability.
    pub fn create(config: BoardConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let layout = BernoulliLayoutGenerator::new(seed).generate(config);
        Ok(Self::new(layout))
    }

    /// Builds a board over an explicit layout.
    pub fn new(layout: BombLayout) -> Self {
        let size = layout.size();
        Self {
            layout,
            grid: Array2::default(size.to_nd_index()),
            revealed_safe_count: 0,
            state: Default::default(),
            triggered_bomb: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.layout.size()
    }

    pub fn total_bombs(&self) -> CellCount {
        self.layout.bomb_count()
    }

    /// Number of safe cells revealed so far, the status-line score. Increases
    /// monotonically; equals `total cells - total bombs` exactly when the
    /// session is won.
    pub fn score(&self) -> CellCount {
        self.revealed_safe_count
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.grid[coords.to_nd_index()]
    }

    pub fn has_bomb_at(&self, coords: Coord2) -> bool {
        self.layout.contains_bomb(coords)
    }

    /// The bomb that ended a lost session, if any.
    pub fn triggered_bomb(&self) -> Option<Coord2> {
        self.triggered_bomb
    }

    /// The up-to-8 in-bounds neighbors of `coords`, in row-major order.
    pub fn neighbors(&self, coords: Coord2) -> Result<NeighborIter> {
        let coords = self.layout.validate_coords(coords)?;
        Ok(self.layout.iter_neighbors(coords))
    }

    /// Reveals the cell at `coords`.
    ///
    /// Out-of-bounds coordinates are a caller bug and fail with
    /// [`GameError::OutOfBounds`]; everything else is an ordinary
    /// [`RevealOutcome`]. The board is updated fully or not at all.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.layout.validate_coords(coords)?;

        if self.state.is_finished() {
            return Ok(RevealOutcome::AlreadyTerminal);
        }

        if self.grid[coords.to_nd_index()].is_open() {
            return Ok(RevealOutcome::NoChange);
        }

        if self.layout.contains_bomb(coords) {
            self.grid[coords.to_nd_index()] = Cell::Bomb;
            self.triggered_bomb = Some(coords);
            self.state = SessionState::Lost;
            log::debug!("Revealed bomb at {:?}, session lost", coords);
            return Ok(RevealOutcome::Lost);
        }

        let opened = self.open_cascading(coords);

        if self.revealed_safe_count == self.layout.safe_cell_count() {
            self.state = SessionState::Won;
            log::debug!("All {} safe cells revealed, session won", self.revealed_safe_count);
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Revealed(opened))
        }
    }

    /// Opens one safe cell and, when its count is zero, flood-fills the
    /// connected clear region over an explicit worklist. Returns the number
    /// of cells opened.
    ///
    /// Only neighbors of zero-count cells are enqueued, and a zero-count cell
    /// has no bomb neighbors, so the worklist never holds a bomb. The visited
    /// set admits each cell once, which bounds the loop by the cell count.
    fn open_cascading(&mut self, coords: Coord2) -> CellCount {
        let count = self.layout.adjacent_bomb_count(coords);
        self.grid[coords.to_nd_index()] = Cell::Open(count);
        self.revealed_safe_count += 1;
        let mut opened = 1;
        log::debug!("Open cell at {:?}, bomb count: {}", coords, count);

        if count == 0 {
            let mut visited = HashSet::from([coords]);
            let mut to_visit: VecDeque<_> = self
                .layout
                .iter_neighbors(coords)
                .filter(|&pos| self.grid[pos.to_nd_index()].is_hidden())
                .collect();
            log::trace!(
                "Starting flood fill from {:?}, initial neighbors: {:?}",
                coords,
                to_visit
            );

            while let Some(visit_coords) = to_visit.pop_front() {
                if !visited.insert(visit_coords) {
                    continue;
                }

                if self.grid[visit_coords.to_nd_index()].is_open() {
                    continue;
                }

                let visit_count = self.layout.adjacent_bomb_count(visit_coords);
                self.grid[visit_coords.to_nd_index()] = Cell::Open(visit_count);
                self.revealed_safe_count += 1;
                opened += 1;
                log::trace!(
                    "Flood opened cell at {:?}, bomb count: {}",
                    visit_coords,
                    visit_count
                );

                if visit_count == 0 {
                    to_visit.extend(
                        self.layout
                            .iter_neighbors(visit_coords)
                            .filter(|&pos| self.grid[pos.to_nd_index()].is_hidden())
                            .filter(|pos| !visited.contains(pos)),
                    );
                }
            }
        }

        opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord2, bombs: &[Coord2]) -> BombLayout {
        BombLayout::from_bomb_coords(size, bombs).unwrap()
    }

    #[test]
    fn reveal_hits_bomb_and_loses_the_session() {
        let mut board = Board::new(layout((2, 2), &[(0, 0)]));

        let outcome = board.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Lost);
        assert_eq!(board.state(), SessionState::Lost);
        assert_eq!(board.cell_at((0, 0)), Cell::Bomb);
        assert_eq!(board.triggered_bomb(), Some((0, 0)));
        // no other cell was altered
        assert_eq!(board.cell_at((1, 0)), Cell::Hidden);
        assert_eq!(board.cell_at((0, 1)), Cell::Hidden);
        assert_eq!(board.cell_at((1, 1)), Cell::Hidden);
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn reveal_after_terminal_state_is_ignored() {
        let mut board = Board::new(layout((2, 2), &[(0, 0)]));

        board.reveal((0, 0)).unwrap();

        assert_eq!(board.reveal((1, 1)).unwrap(), RevealOutcome::AlreadyTerminal);
        assert_eq!(board.cell_at((1, 1)), Cell::Hidden);
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn revealing_an_open_cell_again_changes_nothing() {
        let mut board = Board::new(layout((3, 3), &[(0, 0), (2, 0), (0, 2)]));

        assert_eq!(board.reveal((1, 1)).unwrap(), RevealOutcome::Revealed(1));
        assert_eq!(board.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(board.score(), 1);
        assert_eq!(board.state(), SessionState::InProgress);
    }

    #[test]
    fn reveal_outside_board_is_an_error() {
        let mut board = Board::new(layout((3, 3), &[(0, 0)]));

        assert_eq!(board.reveal((3, 0)), Err(GameError::OutOfBounds));
        assert_eq!(board.reveal((0, 3)), Err(GameError::OutOfBounds));
        assert_eq!(board.state(), SessionState::InProgress);
    }

    #[test]
    fn neighbors_query_validates_coords() {
        let board = Board::new(layout((3, 3), &[]));

        let collected: Vec<_> = board.neighbors((0, 0)).unwrap().collect();
        assert_eq!(collected, vec![(1, 0), (0, 1), (1, 1)]);

        assert!(matches!(board.neighbors((3, 3)), Err(GameError::OutOfBounds)));
    }

    #[test]
    fn corner_reveal_cascades_across_the_clear_region() {
        // bomb in one corner, reveal from the opposite corner: the clear
        // region spans the whole rest of the board
        let mut board = Board::new(layout((3, 3), &[(0, 0)]));

        let outcome = board.reveal((2, 2)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(board.state(), SessionState::Won);
        assert_eq!(board.score(), 8);
        assert_eq!(board.cell_at((0, 0)), Cell::Hidden);
        assert_eq!(board.cell_at((1, 1)), Cell::Open(1));
        assert_eq!(board.cell_at((2, 2)), Cell::Open(0));
        assert_eq!(board.cell_at((2, 0)), Cell::Open(0));
        assert_eq!(board.cell_at((1, 0)), Cell::Open(1));
    }

    #[test]
    fn cascade_stops_at_numbered_boundary() {
        // bombs fence off the right column; flood fill from the left must
        // open the boundary numbers but not cross them
        let mut board = Board::new(layout((4, 3), &[(3, 0), (3, 1), (3, 2)]));

        let outcome = board.reveal((0, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(board.cell_at((2, 1)), Cell::Open(3));
        assert_eq!(board.cell_at((3, 0)), Cell::Hidden);
        assert_eq!(board.cell_at((3, 1)), Cell::Hidden);
        assert_eq!(board.cell_at((3, 2)), Cell::Hidden);
    }

    #[test]
    fn bomb_free_board_is_fully_opened_by_one_reveal() {
        let mut board = Board::new(layout((8, 8), &[]));

        let outcome = board.reveal((4, 4)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(board.score(), 64);
        for x in 0..8 {
            for y in 0..8 {
                assert_eq!(board.cell_at((x, y)), Cell::Open(0));
            }
        }
    }

    #[test]
    fn single_cell_bomb_free_board_wins_immediately() {
        let mut board = Board::create(BoardConfig::new(1, 1, 0.0).unwrap(), 0).unwrap();

        assert_eq!(board.total_bombs(), 0);
        assert_eq!(board.reveal((0, 0)).unwrap(), RevealOutcome::Won);
    }

    #[test]
    fn create_rejects_invalid_configuration() {
        assert_eq!(
            Board::create(BoardConfig::new_unchecked(0, 5, 0.2), 0),
            Err(GameError::InvalidConfiguration)
        );
        assert_eq!(
            Board::create(BoardConfig::new_unchecked(5, 5, 1.0), 0),
            Err(GameError::InvalidConfiguration)
        );
    }

    #[test]
    fn win_happens_exactly_on_the_last_safe_cell() {
        // isolated safe cells, no cascade: three reveals to win
        let mut board = Board::new(layout((2, 2), &[(0, 0)]));

        assert_eq!(board.reveal((1, 0)).unwrap(), RevealOutcome::Revealed(1));
        assert_eq!(board.state(), SessionState::InProgress);
        assert_eq!(board.reveal((0, 1)).unwrap(), RevealOutcome::Revealed(1));
        assert_eq!(board.state(), SessionState::InProgress);
        assert_eq!(board.reveal((1, 1)).unwrap(), RevealOutcome::Won);
        assert_eq!(board.state(), SessionState::Won);
        assert_eq!(board.reveal((0, 0)).unwrap(), RevealOutcome::AlreadyTerminal);
    }

    #[test]
    fn revealed_outcome_reports_cells_opened_by_the_cascade() {
        // clear 2x2 block in the corner, fenced by bombs: the cascade opens
        // exactly that block plus its numbered rim
        let bombs = [(3, 0), (3, 1), (0, 3), (1, 3), (2, 3), (3, 3)];
        let mut board = Board::new(layout((4, 4), &bombs));

        let outcome = board.reveal((0, 0)).unwrap();

        let RevealOutcome::Revealed(opened) = outcome else {
            panic!("expected Revealed, got {outcome:?}");
        };
        assert_eq!(opened, board.score());
        assert!(board.cell_at((0, 0)).is_open());
        assert_eq!(board.cell_at((3, 2)), Cell::Hidden);
    }

    #[test]
    fn saved_board_round_trips_through_json() {
        let mut board = Board::new(layout((3, 3), &[(0, 0)]));
        board.reveal((1, 1)).unwrap();

        let saved = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&saved).unwrap();

        assert_eq!(restored, board);
        assert_eq!(restored.state(), SessionState::InProgress);
        assert_eq!(restored.score(), 1);
    }
}
