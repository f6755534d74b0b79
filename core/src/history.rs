use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Player request, as produced by the input layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Place { position: Coord2, mirror: Mirror },
    Remove { position: Coord2 },
    Flip { position: Coord2 },
}

/// Applied move with enough information to reverse it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEntry {
    Placed { position: Coord2, mirror: Mirror },
    Removed { position: Coord2, mirror: Mirror },
    Flipped { position: Coord2, from: Mirror },
}

impl HistoryEntry {
    pub const fn position(self) -> Coord2 {
        match self {
            Self::Placed { position, .. }
            | Self::Removed { position, .. }
            | Self::Flipped { position, .. } => position,
        }
    }

    pub const fn inverse(self) -> Self {
        match self {
            Self::Placed { position, mirror } => Self::Removed { position, mirror },
            Self::Removed { position, mirror } => Self::Placed { position, mirror },
            Self::Flipped { position, from } => Self::Flipped {
                position,
                from: from.flipped(),
            },
        }
    }

    fn replay(self, board: &mut Board) -> Result<()> {
        match self {
            Self::Placed { position, mirror } => board.place_mirror(position, mirror),
            Self::Removed { position, .. } => board.remove_mirror(position).map(drop),
            Self::Flipped { position, .. } => board.flip_mirror(position).map(drop),
        }
    }
}

/// Linear undo/redo stacks over a [`Board`].
///
/// Only [`History::apply`] counts as a move; undo and redo rewrite the mirror
/// layer without touching `moves_used`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, board: &mut Board, mv: Move) -> Result<HistoryEntry> {
        let entry = match mv {
            Move::Place { position, mirror } => {
                board.place_mirror(position, mirror)?;
                HistoryEntry::Placed { position, mirror }
            }
            Move::Remove { position } => {
                let mirror = board.remove_mirror(position)?;
                HistoryEntry::Removed { position, mirror }
            }
            Move::Flip { position } => {
                let to = board.flip_mirror(position)?;
                HistoryEntry::Flipped {
                    position,
                    from: to.flipped(),
                }
            }
        };

        board.count_move();
        self.undo.push(entry);
        self.redo.clear();
        log::debug!("Applied {entry:?}");
        Ok(entry)
    }

    pub fn undo(&mut self, board: &mut Board) -> Result<HistoryEntry> {
        let entry = *self.undo.last().ok_or(GameError::NothingToUndo)?;
        entry.inverse().replay(board)?;
        self.undo.pop();
        self.redo.push(entry);
        log::debug!("Undid {entry:?}");
        Ok(entry)
    }

    pub fn redo(&mut self, board: &mut Board) -> Result<HistoryEntry> {
        let entry = *self.redo.last().ok_or(GameError::NothingToRedo)?;
        entry.replay(board)?;
        self.redo.pop();
        self.undo.push(entry);
        log::debug!("Redid {entry:?}");
        Ok(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Applied entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.undo
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
