use alloc::vec::Vec;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;

/// How the beam stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    HitTarget,
    HitWall,
    ExitedBounds,
    InfiniteLoop,
}

impl Outcome {
    pub const fn is_win(self) -> bool {
        matches!(self, Self::HitTarget)
    }
}

/// One traversed cell. `entry` is the heading the beam arrived with, `exit` the heading it
/// leaves with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamStep {
    pub position: Coord2,
    pub entry: Direction,
    pub exit: Direction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamPath {
    steps: Vec<BeamStep>,
    outcome: Outcome,
}

impl BeamPath {
    pub fn steps(&self) -> &[BeamStep] {
        &self.steps
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.steps.iter().any(|step| step.position == coords)
    }

    pub fn last_position(&self) -> Option<Coord2> {
        self.steps.last().map(|step| step.position)
    }
}

/// Upper bound on distinct `(position, heading)` states for a grid.
pub fn max_beam_states((width, height): Coord2) -> usize {
    usize::from(width) * usize::from(height) * Direction::ALL.len()
}

/// Follows the beam from the lamp until it stops or starts repeating itself.
pub fn trace(board: &Board) -> BeamPath {
    let size = board.size();
    let lamp = board.level().lamp();
    let limit = max_beam_states(size);

    let mut steps = Vec::new();
    let mut visited: HashSet<(Coord2, Direction)> = HashSet::new();

    let mut position = lamp.position;
    let mut heading = lamp.direction;
    steps.push(BeamStep {
        position,
        entry: heading,
        exit: heading,
    });
    visited.insert((position, heading));

    let outcome = loop {
        let Some(next) = heading.step(position, size) else {
            break Outcome::ExitedBounds;
        };

        let exit = match board.cell_at(next) {
            BoardCell::Wall => break Outcome::HitWall,
            BoardCell::Target => {
                steps.push(BeamStep {
                    position: next,
                    entry: heading,
                    exit: heading,
                });
                break Outcome::HitTarget;
            }
            BoardCell::Mirror(mirror) => mirror.reflect(heading),
            BoardCell::Empty | BoardCell::Lamp(_) => heading,
        };

        if !visited.insert((next, exit)) || steps.len() >= limit {
            break Outcome::InfiniteLoop;
        }

        steps.push(BeamStep {
            position: next,
            entry: heading,
            exit,
        });
        position = next;
        heading = exit;
    };

    log::trace!(
        "Beam from {:?} ended with {outcome:?} after {} cells",
        lamp.position,
        steps.len()
    );

    BeamPath { steps, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(grid: &str, max_mirrors: CellCount) -> Board {
        let text = alloc::format!(
            "name: t\ndifficulty: easy\nmax_mirrors: {max_mirrors}\n---\n{grid}"
        );
        Board::new(format::parse(&text).unwrap())
    }

    fn positions(path: &BeamPath) -> Vec<Coord2> {
        path.steps().iter().map(|step| step.position).collect()
    }

    #[test]
    fn straight_beam_hits_target() {
        let path = trace(&board(">.*\n", 0));

        assert_eq!(path.outcome(), Outcome::HitTarget);
        assert_eq!(positions(&path), [(0, 0), (1, 0), (2, 0)]);
        assert!(path.outcome().is_win());
    }

    #[test]
    fn beam_stops_before_walls() {
        let path = trace(&board(">.X\n..*\n", 0));

        assert_eq!(path.outcome(), Outcome::HitWall);
        assert_eq!(path.last_position(), Some((1, 0)));
        assert!(!path.contains((2, 0)));
    }

    #[test]
    fn beam_exits_bounds() {
        let path = trace(&board("^..\n..*\n", 0));

        assert_eq!(path.outcome(), Outcome::ExitedBounds);
        assert_eq!(positions(&path), [(0, 0)]);
    }

    #[test]
    fn back_slash_turns_right_into_down() {
        let mut board = board(">..\n...\n..*\n", 1);
        board.place_mirror((2, 0), Mirror::BackSlash).unwrap();

        let path = trace(&board);

        assert_eq!(path.outcome(), Outcome::HitTarget);
        assert_eq!(positions(&path), [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]);
        let turn = path.steps()[2];
        assert_eq!(turn.entry, Direction::Right);
        assert_eq!(turn.exit, Direction::Down);
    }

    #[test]
    fn forward_slash_turns_down_into_left() {
        let mut board = board("..v\n...\n*..\n", 1);
        board.place_mirror((2, 2), Mirror::ForwardSlash).unwrap();

        let path = trace(&board);

        assert_eq!(path.outcome(), Outcome::HitTarget);
        assert_eq!(path.steps()[2].exit, Direction::Left);
        assert_eq!(path.last_position(), Some((0, 2)));
    }

    #[test]
    fn beam_passes_back_through_its_lamp() {
        let mut board = board(".>.\n...\n*..\n", 3);
        board.place_mirror((2, 0), Mirror::BackSlash).unwrap();
        board.place_mirror((2, 1), Mirror::ForwardSlash).unwrap();
        board.place_mirror((1, 1), Mirror::BackSlash).unwrap();

        let path = trace(&board);

        assert_eq!(path.outcome(), Outcome::ExitedBounds);
        assert_eq!(
            positions(&path),
            [(1, 0), (2, 0), (2, 1), (1, 1), (1, 0)]
        );
        assert_eq!(path.steps()[4].exit, Direction::Up);
    }

    #[test]
    fn closed_mirror_cycle_is_detected() {
        let mut board = board(".>.\n...\n.*.\n", 4);
        board.place_mirror((2, 0), Mirror::BackSlash).unwrap();
        board.place_mirror((2, 1), Mirror::ForwardSlash).unwrap();
        board.place_mirror((0, 1), Mirror::BackSlash).unwrap();
        board.place_mirror((0, 0), Mirror::ForwardSlash).unwrap();

        let path = trace(&board);

        assert_eq!(path.outcome(), Outcome::InfiniteLoop);
        assert!(path.len() <= max_beam_states(board.size()));
        assert_eq!(
            positions(&path),
            [(1, 0), (2, 0), (2, 1), (1, 1), (0, 1), (0, 0)]
        );
    }

    #[test]
    fn trace_is_deterministic() {
        let mut board = board(">...\n.X..\n...*\n", 2);
        board.place_mirror((3, 0), Mirror::BackSlash).unwrap();

        assert_eq!(trace(&board), trace(&board));
    }
}
