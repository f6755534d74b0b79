use serde::{Deserialize, Serialize};

use crate::Direction;

/// Static cell kind as authored in a level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelCell {
    Empty,
    Wall,
    Lamp,
    Target,
}

impl LevelCell {
    pub const fn accepts_mirror(self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Default for LevelCell {
    fn default() -> Self {
        Self::Empty
    }
}

/// Diagonal mirror a player can place on an empty cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mirror {
    /// `/`
    ForwardSlash,
    /// `\`
    BackSlash,
}

impl Mirror {
    pub const fn reflect(self, heading: Direction) -> Direction {
        use Direction::*;
        match (self, heading) {
            (Self::ForwardSlash, Right) => Up,
            (Self::ForwardSlash, Up) => Right,
            (Self::ForwardSlash, Left) => Down,
            (Self::ForwardSlash, Down) => Left,
            (Self::BackSlash, Right) => Down,
            (Self::BackSlash, Down) => Right,
            (Self::BackSlash, Left) => Up,
            (Self::BackSlash, Up) => Left,
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Self::ForwardSlash => Self::BackSlash,
            Self::BackSlash => Self::ForwardSlash,
        }
    }

    pub const fn glyph(self) -> char {
        match self {
            Self::ForwardSlash => '/',
            Self::BackSlash => '\\',
        }
    }

    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '/' => Some(Self::ForwardSlash),
            '\\' => Some(Self::BackSlash),
            _ => None,
        }
    }
}

/// Combined view of a cell during play: the level layer with the mirror layer on top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardCell {
    Empty,
    Wall,
    Lamp(Direction),
    Target,
    Mirror(Mirror),
}

impl Default for BoardCell {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    #[test]
    fn forward_slash_reflection_table() {
        let mirror = Mirror::ForwardSlash;
        assert_eq!(mirror.reflect(Right), Up);
        assert_eq!(mirror.reflect(Up), Right);
        assert_eq!(mirror.reflect(Left), Down);
        assert_eq!(mirror.reflect(Down), Left);
    }

    #[test]
    fn back_slash_reflection_table() {
        let mirror = Mirror::BackSlash;
        assert_eq!(mirror.reflect(Right), Down);
        assert_eq!(mirror.reflect(Down), Right);
        assert_eq!(mirror.reflect(Left), Up);
        assert_eq!(mirror.reflect(Up), Left);
    }

    #[test]
    fn reflection_is_reversible() {
        for mirror in [Mirror::ForwardSlash, Mirror::BackSlash] {
            for heading in Direction::ALL {
                let out = mirror.reflect(heading);
                assert_eq!(mirror.reflect(out.opposite()), heading.opposite());
            }
        }
    }

    #[test]
    fn only_empty_cells_accept_mirrors() {
        assert!(LevelCell::Empty.accepts_mirror());
        assert!(!LevelCell::Wall.accepts_mirror());
        assert!(!LevelCell::Lamp.accepts_mirror());
        assert!(!LevelCell::Target.accepts_mirror());
    }
}
