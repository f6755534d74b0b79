use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Serialized form of a [`Board`]: the level and its placed mirrors.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct BoardData {
    level: Level,
    mirrors: Vec<(Coord2, Mirror)>,
    moves_used: u32,
}

impl From<Board> for BoardData {
    fn from(board: Board) -> Self {
        Self {
            mirrors: board.iter_mirrors().collect(),
            moves_used: board.moves_used,
            level: board.level,
        }
    }
}

impl TryFrom<BoardData> for Board {
    type Error = GameError;

    fn try_from(data: BoardData) -> Result<Self> {
        let mut board = Self::new(data.level);
        for (coords, mirror) in data.mirrors {
            board.place_mirror(coords, mirror)?;
        }
        board.moves_used = data.moves_used;
        Ok(board)
    }
}

/// Mutable puzzle state for one attempt: the level plus the player's mirror layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "BoardData", try_from = "BoardData")]
pub struct Board {
    level: Level,
    mirrors: Array2<Option<Mirror>>,
    mirrors_placed: CellCount,
    moves_used: u32,
}

impl Board {
    pub fn new(level: Level) -> Self {
        let size = level.size();
        Self {
            level,
            mirrors: Array2::default(size.to_nd_index()),
            mirrors_placed: 0,
            moves_used: 0,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn size(&self) -> Coord2 {
        self.level.size()
    }

    pub fn max_mirrors(&self) -> CellCount {
        self.level.max_mirrors()
    }

    pub fn mirrors_placed(&self) -> CellCount {
        self.mirrors_placed
    }

    pub fn mirrors_left(&self) -> CellCount {
        self.max_mirrors().saturating_sub(self.mirrors_placed)
    }

    pub fn is_budget_exhausted(&self) -> bool {
        self.mirrors_placed >= self.max_mirrors()
    }

    pub fn moves_used(&self) -> u32 {
        self.moves_used
    }

    pub fn mirror_at(&self, coords: Coord2) -> Option<Mirror> {
        self.mirrors.get(coords.to_nd_index()).copied().flatten()
    }

    pub fn cell_at(&self, coords: Coord2) -> BoardCell {
        if let Some(mirror) = self.mirror_at(coords) {
            return BoardCell::Mirror(mirror);
        }
        match self.level[coords] {
            LevelCell::Empty => BoardCell::Empty,
            LevelCell::Wall => BoardCell::Wall,
            LevelCell::Lamp => BoardCell::Lamp(self.level.lamp().direction),
            LevelCell::Target => BoardCell::Target,
        }
    }

    pub fn can_place_at(&self, coords: Coord2) -> bool {
        in_bounds(coords, self.size())
            && self.level[coords].accepts_mirror()
            && self.mirror_at(coords).is_none()
            && !self.is_budget_exhausted()
    }

    /// Placed mirrors in row-major order.
    pub fn iter_mirrors(&self) -> impl Iterator<Item = (Coord2, Mirror)> + '_ {
        iter_coords(self.size()).filter_map(|coords| Some((coords, self.mirror_at(coords)?)))
    }

    pub fn place_mirror(&mut self, coords: Coord2, mirror: Mirror) -> Result<()> {
        let coords = self.level.validate_coords(coords)?;

        if !self.level[coords].accepts_mirror() || self.mirror_at(coords).is_some() {
            return Err(GameError::CellOccupied);
        }
        if self.is_budget_exhausted() {
            return Err(GameError::BudgetExceeded);
        }

        self.mirrors[coords.to_nd_index()] = Some(mirror);
        self.mirrors_placed += 1;
        Ok(())
    }

    pub fn remove_mirror(&mut self, coords: Coord2) -> Result<Mirror> {
        let coords = self.level.validate_coords(coords)?;

        let mirror = self.mirrors[coords.to_nd_index()]
            .take()
            .ok_or(GameError::NoMirrorHere)?;
        self.mirrors_placed -= 1;
        Ok(mirror)
    }

    /// Swaps the orientation of a placed mirror, returning the new orientation.
    pub fn flip_mirror(&mut self, coords: Coord2) -> Result<Mirror> {
        let coords = self.level.validate_coords(coords)?;

        let slot = self.mirrors[coords.to_nd_index()]
            .as_mut()
            .ok_or(GameError::NoMirrorHere)?;
        *slot = slot.flipped();
        Ok(*slot)
    }

    pub(crate) fn count_move(&mut self) {
        self.moves_used = self.moves_used.saturating_add(1);
    }
}
