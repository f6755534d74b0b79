use alloc::string::String;
use thiserror::Error;

use crate::ValidationReport;

/// Rejected player actions. The board is left unchanged whenever one of these is returned.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates are outside the grid")]
    OutOfBounds,
    #[error("Cell cannot hold a mirror")]
    CellOccupied,
    #[error("Mirror budget exhausted")]
    BudgetExceeded,
    #[error("No mirror at these coordinates")]
    NoMirrorHere,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("Session already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Reasons a level text or in-memory level was refused. Line and column numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedLevel {
    #[error("Expected `key: value` on line {line}")]
    BadHeaderLine { line: usize },
    #[error("Missing `{0}` in level header")]
    MissingKey(&'static str),
    #[error("Duplicate `{key}` on line {line}")]
    DuplicateKey { key: &'static str, line: usize },
    #[error("Invalid value {value:?} for `{key}` on line {line}")]
    InvalidValue {
        key: &'static str,
        value: String,
        line: usize,
    },
    #[error("Unknown symbol {symbol:?} at line {line}, column {column}")]
    UnknownSymbol {
        line: usize,
        column: usize,
        symbol: char,
    },
    #[error("Row on line {line} is {found} cells wide, expected {expected}")]
    NonRectangular {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Level has no grid rows")]
    EmptyGrid,
    #[error("Grid of {width}x{height} exceeds the 255x255 limit")]
    GridTooLarge { width: usize, height: usize },
    #[error("Level failed validation: {0}")]
    Invalid(ValidationReport),
}
