use lightpath_core::format::{FLOOR_GLYPH, TARGET_GLYPH, WALL_GLYPH};
use lightpath_core::*;

#[derive(Copy, Clone, Default)]
struct Lit {
    horizontal: bool,
    vertical: bool,
}

impl Lit {
    fn mark(&mut self, direction: Direction) {
        match direction {
            Direction::Left | Direction::Right => self.horizontal = true,
            Direction::Up | Direction::Down => self.vertical = true,
        }
    }

    fn glyph(self) -> Option<char> {
        match (self.horizontal, self.vertical) {
            (true, true) => Some('+'),
            (true, false) => Some('-'),
            (false, true) => Some('|'),
            (false, false) => None,
        }
    }
}

fn cell_glyph(cell: BoardCell) -> char {
    match cell {
        BoardCell::Empty => FLOOR_GLYPH,
        BoardCell::Wall => WALL_GLYPH,
        BoardCell::Target => TARGET_GLYPH,
        BoardCell::Lamp(direction) => direction.glyph(),
        BoardCell::Mirror(mirror) => mirror.glyph(),
    }
}

/// Draws the board with the beam over empty cells, followed by a status line.
pub fn render(snapshot: &Snapshot) -> String {
    let (width, height) = snapshot.size;
    let mut lit = vec![Lit::default(); usize::from(width) * usize::from(height)];
    for step in snapshot.beam.steps() {
        let (x, y) = step.position;
        let cell = &mut lit[usize::from(y) * usize::from(width) + usize::from(x)];
        cell.mark(step.entry);
        cell.mark(step.exit);
    }

    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            let cell = snapshot.cell_at((x, y));
            let glyph = match cell {
                BoardCell::Empty => lit[usize::from(y) * usize::from(width) + usize::from(x)]
                    .glyph()
                    .unwrap_or(FLOOR_GLYPH),
                _ => cell_glyph(cell),
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "outcome: {:?}  state: {:?}  mirrors: {}/{}  moves: {}\n",
        snapshot.beam.outcome(),
        snapshot.state,
        snapshot.mirrors_placed,
        snapshot.max_mirrors,
        snapshot.moves_used,
    ));
    out
}
