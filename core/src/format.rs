//! Level text format.
//!
//! A level is a `key: value` header followed by a character grid:
//!
//! ```text
//! # comment
//! name: First Light
//! difficulty: easy
//! max_mirrors: 1
//! ---
//! >.X
//! ...
//! ..*
//! ```
//!
//! The header ends at a blank line or the `---` sentinel. Grid rows use `.` for
//! floor, `X` for walls, `*` for the target, and one of `^ > v <` for the lamp
//! facing that way. Trailing whitespace on a row is padding and is ignored.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Write};
use core::str::FromStr;
use ndarray::Array2;

use crate::*;

pub const HEADER_SENTINEL: &str = "---";
pub const COMMENT_PREFIX: char = '#';
pub const FLOOR_GLYPH: char = '.';
pub const WALL_GLYPH: char = 'X';
pub const TARGET_GLYPH: char = '*';

const KEY_NAME: &str = "name";
const KEY_DIFFICULTY: &str = "difficulty";
const KEY_MAX_MIRRORS: &str = "max_mirrors";

type ParseResult<T> = core::result::Result<T, MalformedLevel>;

#[derive(Default)]
struct Header {
    name: Option<String>,
    difficulty: Option<Difficulty>,
    max_mirrors: Option<CellCount>,
}

impl Header {
    fn set<T>(
        slot: &mut Option<T>,
        key: &'static str,
        line: usize,
        value: T,
    ) -> ParseResult<()> {
        if slot.is_some() {
            return Err(MalformedLevel::DuplicateKey { key, line });
        }
        *slot = Some(value);
        Ok(())
    }

    fn apply(&mut self, line: usize, key: &str, value: &str) -> ParseResult<()> {
        let invalid = |key: &'static str| MalformedLevel::InvalidValue {
            key,
            value: value.to_string(),
            line,
        };

        if key.eq_ignore_ascii_case(KEY_NAME) {
            if value.is_empty() {
                return Err(invalid(KEY_NAME));
            }
            Self::set(&mut self.name, KEY_NAME, line, value.to_string())
        } else if key.eq_ignore_ascii_case(KEY_DIFFICULTY) {
            let difficulty = Difficulty::from_name(value).ok_or_else(|| invalid(KEY_DIFFICULTY))?;
            Self::set(&mut self.difficulty, KEY_DIFFICULTY, line, difficulty)
        } else if key.eq_ignore_ascii_case(KEY_MAX_MIRRORS) {
            let max_mirrors = value
                .parse::<CellCount>()
                .map_err(|_| invalid(KEY_MAX_MIRRORS))?;
            Self::set(&mut self.max_mirrors, KEY_MAX_MIRRORS, line, max_mirrors)
        } else {
            log::warn!("Ignoring unknown level header key {key:?} on line {line}");
            Ok(())
        }
    }
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_PREFIX)
}

/// Parses one level from its text form, validating it on the way out.
pub fn parse(text: &str) -> ParseResult<Level> {
    let mut lines = text.lines().enumerate().map(|(index, line)| (index + 1, line));

    let mut header = Header::default();
    let mut seen_metadata = false;
    for (number, line) in lines.by_ref() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if seen_metadata {
                break;
            }
            continue;
        }
        if is_comment(trimmed) {
            continue;
        }
        if trimmed == HEADER_SENTINEL {
            break;
        }
        let (key, value) = trimmed
            .split_once(':')
            .ok_or(MalformedLevel::BadHeaderLine { line: number })?;
        header.apply(number, key.trim(), value.trim())?;
        seen_metadata = true;
    }

    let name = header.name.ok_or(MalformedLevel::MissingKey(KEY_NAME))?;
    let difficulty = header
        .difficulty
        .ok_or(MalformedLevel::MissingKey(KEY_DIFFICULTY))?;
    let max_mirrors = header
        .max_mirrors
        .ok_or(MalformedLevel::MissingKey(KEY_MAX_MIRRORS))?;

    let mut rows: Vec<Vec<LevelCell>> = Vec::new();
    let mut lamp_direction = None;
    for (number, line) in lines {
        let row = line.trim_end();
        if row.is_empty() || is_comment(row) {
            continue;
        }

        let mut cells = Vec::with_capacity(row.len());
        for (index, symbol) in row.chars().enumerate() {
            let cell = match symbol {
                FLOOR_GLYPH => LevelCell::Empty,
                WALL_GLYPH => LevelCell::Wall,
                TARGET_GLYPH => LevelCell::Target,
                _ => match Direction::from_glyph(symbol) {
                    Some(direction) => {
                        lamp_direction.get_or_insert(direction);
                        LevelCell::Lamp
                    }
                    None => {
                        return Err(MalformedLevel::UnknownSymbol {
                            line: number,
                            column: index + 1,
                            symbol,
                        });
                    }
                },
            };
            cells.push(cell);
        }

        if let Some(first) = rows.first() {
            if first.len() != cells.len() {
                return Err(MalformedLevel::NonRectangular {
                    line: number,
                    expected: first.len(),
                    found: cells.len(),
                });
            }
        }
        rows.push(cells);
    }

    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if height == 0 {
        return Err(MalformedLevel::EmptyGrid);
    }

    let mut grid = Array2::default([width, height]);
    for (y, row) in rows.into_iter().enumerate() {
        for (x, cell) in row.into_iter().enumerate() {
            grid[[x, y]] = cell;
        }
    }

    // The direction only matters when a lamp exists; otherwise validation rejects the level.
    Level::new(
        name,
        difficulty,
        max_mirrors,
        grid,
        lamp_direction.unwrap_or(Direction::Right),
    )
}

pub fn level_glyph(level: &Level, coords: Coord2) -> char {
    match level[coords] {
        LevelCell::Empty => FLOOR_GLYPH,
        LevelCell::Wall => WALL_GLYPH,
        LevelCell::Target => TARGET_GLYPH,
        LevelCell::Lamp => level.lamp().direction.glyph(),
    }
}

/// Renders the canonical text form of a level. [`parse`] reads it back unchanged.
pub fn write(level: &Level) -> String {
    level.to_string()
}

fn write_into(out: &mut impl Write, level: &Level) -> fmt::Result {
    writeln!(out, "{KEY_NAME}: {}", level.name())?;
    writeln!(out, "{KEY_DIFFICULTY}: {}", level.difficulty())?;
    writeln!(out, "{KEY_MAX_MIRRORS}: {}", level.max_mirrors())?;
    writeln!(out, "{HEADER_SENTINEL}")?;

    let (width, height) = level.size();
    for y in 0..height {
        for x in 0..width {
            out.write_char(level_glyph(level, (x, y)))?;
        }
        out.write_char('\n')?;
    }
    Ok(())
}

impl FromStr for Level {
    type Err = MalformedLevel;

    fn from_str(text: &str) -> ParseResult<Self> {
        parse(text)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_into(f, self)
    }
}
