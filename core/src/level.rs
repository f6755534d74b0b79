use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Easy, Self::Medium, Self::Hard, Self::Expert]
            .into_iter()
            .find(|difficulty| difficulty.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the beam starts and which way it initially travels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lamp {
    pub position: Coord2,
    pub direction: Direction,
}

/// A single broken level invariant.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    #[error("level has no lamp")]
    MissingLamp,
    #[error("level has {count} lamps, expected one")]
    MultipleLamps { count: CellCount },
    #[error("level has no target")]
    MissingTarget,
    #[error("level has {count} targets, expected one")]
    MultipleTargets { count: CellCount },
    #[error("level name is empty")]
    EmptyName,
    #[error("level name has surrounding whitespace or control characters")]
    UnwritableName,
    #[error("lamp position does not hold the lamp cell")]
    LampMismatch,
    #[error("target position does not hold the target cell")]
    TargetMismatch,
}

/// Every invariant a level breaks, in a stable order. Empty means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }

    pub fn into_result(self) -> core::result::Result<(), MalformedLevel> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(MalformedLevel::Invalid(self))
        }
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    fn check_markers(&mut self, cells: &Array2<LevelCell>) {
        let count = |kind: LevelCell| -> CellCount {
            cells
                .iter()
                .filter(|&&cell| cell == kind)
                .count()
                .try_into()
                .unwrap_or(CellCount::MAX)
        };

        match count(LevelCell::Lamp) {
            0 => self.push(Violation::MissingLamp),
            1 => {}
            count => self.push(Violation::MultipleLamps { count }),
        }
        match count(LevelCell::Target) {
            0 => self.push(Violation::MissingTarget),
            1 => {}
            count => self.push(Violation::MultipleTargets { count }),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return f.write_str("no violations");
        }
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Serialized form of a [`Level`]. Deserializing goes back through [`Level::new`].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct LevelData {
    name: String,
    difficulty: Difficulty,
    max_mirrors: CellCount,
    cells: Array2<LevelCell>,
    lamp_direction: Direction,
}

impl From<Level> for LevelData {
    fn from(level: Level) -> Self {
        Self {
            name: level.name,
            difficulty: level.difficulty,
            max_mirrors: level.max_mirrors,
            cells: level.cells,
            lamp_direction: level.lamp.direction,
        }
    }
}

impl TryFrom<LevelData> for Level {
    type Error = MalformedLevel;

    fn try_from(data: LevelData) -> core::result::Result<Self, Self::Error> {
        Self::new(
            data.name,
            data.difficulty,
            data.max_mirrors,
            data.cells,
            data.lamp_direction,
        )
    }
}

/// Immutable puzzle definition, produced once by the loader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "LevelData", try_from = "LevelData")]
pub struct Level {
    name: String,
    difficulty: Difficulty,
    max_mirrors: CellCount,
    cells: Array2<LevelCell>,
    lamp: Lamp,
    target: Coord2,
}

impl Level {
    /// Builds a level from an in-memory grid indexed `[x, y]`, deriving the lamp and target
    /// positions.
    pub fn new(
        name: impl Into<String>,
        difficulty: Difficulty,
        max_mirrors: CellCount,
        cells: Array2<LevelCell>,
        lamp_direction: Direction,
    ) -> core::result::Result<Self, MalformedLevel> {
        let (width, height) = cells.dim();
        if width == 0 || height == 0 {
            return Err(MalformedLevel::EmptyGrid);
        }
        if width > usize::from(Coord::MAX) || height > usize::from(Coord::MAX) {
            return Err(MalformedLevel::GridTooLarge { width, height });
        }

        let mut report = ValidationReport::default();
        report.check_markers(&cells);
        if !report.is_valid() {
            return Err(MalformedLevel::Invalid(report));
        }

        let size = (width as Coord, height as Coord);
        let find = |kind: LevelCell| {
            iter_coords(size).find(|&coords| cells[coords.to_nd_index()] == kind)
        };
        let (Some(lamp), Some(target)) = (find(LevelCell::Lamp), find(LevelCell::Target)) else {
            return Err(MalformedLevel::Invalid(report));
        };

        let level = Self {
            name: name.into(),
            difficulty,
            max_mirrors,
            cells,
            lamp: Lamp {
                position: lamp,
                direction: lamp_direction,
            },
            target,
        };
        level.validate().into_result()?;

        let empty_cells = level.empty_cell_count();
        if level.max_mirrors > empty_cells {
            log::warn!(
                "Level {:?} allows {} mirrors but has only {empty_cells} empty cells",
                level.name,
                level.max_mirrors
            );
        }
        Ok(level)
    }

    /// Checks every level invariant without stopping at the first failure.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.name.trim().is_empty() {
            report.push(Violation::EmptyName);
        } else if !is_writable_name(&self.name) {
            report.push(Violation::UnwritableName);
        }

        report.check_markers(&self.cells);

        if self.get(self.lamp.position) != Some(LevelCell::Lamp) {
            report.push(Violation::LampMismatch);
        }
        if self.get(self.target) != Some(LevelCell::Target) {
            report.push(Violation::TargetMismatch);
        }

        report
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn max_mirrors(&self) -> CellCount {
        self.max_mirrors
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.cells.dim();
        // dimensions are capped at construction
        (width as Coord, height as Coord)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn lamp(&self) -> Lamp {
        self.lamp
    }

    pub fn target(&self) -> Coord2 {
        self.target
    }

    pub fn cells(&self) -> &Array2<LevelCell> {
        &self.cells
    }

    pub fn get(&self, coords: Coord2) -> Option<LevelCell> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn empty_cell_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.accepts_mirror())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }
}

/// A name survives the text header only without surrounding whitespace or line breaks.
fn is_writable_name(name: &str) -> bool {
    name.trim() == name && !name.chars().any(char::is_control)
}

impl Index<Coord2> for Level {
    type Output = LevelCell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(glyphs: &str) -> Array2<LevelCell> {
        let mut grid = Array2::default([glyphs.len(), 1]);
        for (x, glyph) in glyphs.chars().enumerate() {
            grid[[x, 0]] = match glyph {
                'L' => LevelCell::Lamp,
                'T' => LevelCell::Target,
                'X' => LevelCell::Wall,
                _ => LevelCell::Empty,
            };
        }
        grid
    }

    #[test]
    fn new_derives_lamp_and_target() {
        let level = Level::new(
            "row",
            Difficulty::Easy,
            1,
            row("L.T"),
            Direction::Right,
        )
        .unwrap();

        assert_eq!(level.size(), (3, 1));
        assert_eq!(level.lamp().position, (0, 0));
        assert_eq!(level.lamp().direction, Direction::Right);
        assert_eq!(level.target(), (2, 0));
        assert!(level.validate().is_valid());
    }

    #[test]
    fn new_rejects_missing_markers() {
        let err = Level::new("row", Difficulty::Easy, 0, row(".X"), Direction::Up)
            .unwrap_err();

        let MalformedLevel::Invalid(report) = err else {
            panic!("expected validation failure, got {err:?}");
        };
        assert_eq!(
            report.violations(),
            [Violation::MissingLamp, Violation::MissingTarget]
        );
    }

    #[test]
    fn new_rejects_duplicate_targets() {
        let err = Level::new(
            "row",
            Difficulty::Easy,
            0,
            row("LTT"),
            Direction::Right,
        )
        .unwrap_err();

        assert_eq!(
            err,
            MalformedLevel::Invalid(ValidationReport {
                violations: alloc::vec![Violation::MultipleTargets { count: 2 }],
            })
        );
    }

    #[test]
    fn validate_reports_every_violation() {
        let mut level = Level::new(
            "row",
            Difficulty::Hard,
            1,
            row("L.T"),
            Direction::Right,
        )
        .unwrap();
        level.name = String::from("  ");
        level.max_mirrors = 4;
        level.target = (1, 0);

        let report = level.validate();

        assert!(report.contains(&Violation::EmptyName));
        assert!(report.contains(&Violation::TargetMismatch));
        assert!(!report.contains(&Violation::LampMismatch));
        assert_eq!(report, level.validate());
    }

    #[test]
    fn budget_may_exceed_empty_cells() {
        let level = Level::new("row", Difficulty::Easy, 3, row("L.T"), Direction::Right).unwrap();

        assert_eq!(level.max_mirrors(), 3);
        assert_eq!(level.empty_cell_count(), 1);
        assert!(level.validate().is_valid());
    }

    #[test]
    fn names_must_survive_the_text_header() {
        for name in [" padded", "padded ", "two\nlines", "tab\there"] {
            let err = Level::new(name, Difficulty::Easy, 0, row("LT"), Direction::Right)
                .unwrap_err();
            assert_eq!(
                err,
                MalformedLevel::Invalid(ValidationReport {
                    violations: alloc::vec![Violation::UnwritableName],
                }),
                "{name:?}"
            );
        }

        let level = Level::new("a: b # c", Difficulty::Easy, 0, row("LT"), Direction::Right);
        assert!(level.is_ok());
    }

    #[test]
    fn deserializing_checks_invariants() {
        let level = Level::new("row", Difficulty::Medium, 1, row("L.T"), Direction::Left).unwrap();
        let json = serde_json::to_string(&level).unwrap();
        let back: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(back, level);

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["name"] = serde_json::Value::from(" padded");
        assert!(serde_json::from_value::<Level>(value).is_err());

        let bad = serde_json::to_string(&LevelData {
            name: String::from("row"),
            difficulty: Difficulty::Easy,
            max_mirrors: 0,
            cells: row("..T"),
            lamp_direction: Direction::Up,
        })
        .unwrap();
        assert!(serde_json::from_str::<Level>(&bad).is_err());
    }

    #[test]
    fn difficulty_names_are_case_insensitive() {
        assert_eq!(Difficulty::from_name("Expert"), Some(Difficulty::Expert));
        assert_eq!(Difficulty::from_name("medium"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_name("nightmare"), None);
    }
}
