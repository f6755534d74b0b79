use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Point-in-time copy of a session for renderers and UI. Holds no reference back into the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub size: Coord2,
    pub cells: Array2<BoardCell>,
    pub mirrors_placed: CellCount,
    pub max_mirrors: CellCount,
    pub moves_used: u32,
    pub beam: BeamPath,
    pub state: SessionState,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl Snapshot {
    pub fn from_session(session: &Session) -> Self {
        let board = session.board();
        let size = board.size();
        let mut cells = Array2::from_elem(size.to_nd_index(), BoardCell::Empty);
        for coords in iter_coords(size) {
            cells[coords.to_nd_index()] = board.cell_at(coords);
        }

        Self {
            size,
            cells,
            mirrors_placed: board.mirrors_placed(),
            max_mirrors: board.max_mirrors(),
            moves_used: board.moves_used(),
            beam: session.beam().clone(),
            state: session.state(),
            can_undo: session.history().can_undo(),
            can_redo: session.history().can_redo(),
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> BoardCell {
        self.cells[coords.to_nd_index()]
    }
}
