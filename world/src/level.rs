//! Level loader that turns textual maps into [`LevelLayout`] values.
//!
//! Each non-blank line is one row of single-character tiles:
//!
//! | Tile | Meaning |
//! |------|---------|
//! | `X`  | wall |
//! | `O`  | open floor |
//! | `P`  | player spawn (exactly one) |
//! | `T`  | treasure spawn |
//! | `E`  | enemy spawn |
//!
//! Levels carry no dedicated exit tile. The exit is placed on the last open
//! floor tile in row-major order, which for a walled maze is normally the gap
//! left in its bottom edge.

use labyrinth_core::{CellCoord, LevelLayout};
use thiserror::Error;

/// Reasons a level map is rejected by the loader.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The map contains no rows.
    #[error("level map is empty")]
    Empty,
    /// A row is shorter or longer than the first row.
    #[error("row {row} has {found} tiles but the first row has {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width established by the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A tile character is not part of the level alphabet.
    #[error("unknown tile {tile:?} at column {column}, row {row}")]
    UnknownTile {
        /// Zero-based row of the tile.
        row: u32,
        /// Zero-based column of the tile.
        column: u32,
        /// Offending character.
        tile: char,
    },
    /// No `P` tile was found.
    #[error("level has no player spawn")]
    MissingPlayerSpawn,
    /// More than one `P` tile was found.
    #[error("level has a second player spawn at {second:?} (first at {first:?})")]
    MultiplePlayerSpawns {
        /// First spawn in scan order.
        first: CellCoord,
        /// Second spawn in scan order.
        second: CellCoord,
    },
    /// No `O` tile was found, so there is nowhere to place the exit.
    #[error("level has no open floor to host the exit")]
    MissingExit,
}

/// Parses a textual level map.
pub fn parse_level(source: &str) -> Result<LevelLayout, LevelError> {
    let rows: Vec<&str> = source
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();

    let Some(first) = rows.first() else {
        return Err(LevelError::Empty);
    };
    let expected = count_tiles(first);

    let mut walls = Vec::new();
    let mut treasures = Vec::new();
    let mut enemies = Vec::new();
    let mut player: Option<CellCoord> = None;
    let mut exit: Option<CellCoord> = None;

    for (row_index, line) in rows.iter().enumerate() {
        let row = to_u32(row_index);
        let found = count_tiles(line);
        if found != expected {
            return Err(LevelError::RaggedRow {
                row,
                expected,
                found,
            });
        }

        for (column_index, tile) in line.chars().enumerate() {
            let cell = CellCoord::new(to_u32(column_index), row);
            match tile {
                'X' => walls.push(cell),
                'O' => exit = Some(cell),
                'T' => treasures.push(cell),
                'E' => enemies.push(cell),
                'P' => {
                    if let Some(first) = player {
                        return Err(LevelError::MultiplePlayerSpawns {
                            first,
                            second: cell,
                        });
                    }
                    player = Some(cell);
                }
                other => {
                    return Err(LevelError::UnknownTile {
                        row,
                        column: cell.column(),
                        tile: other,
                    })
                }
            }
        }
    }

    let player = player.ok_or(LevelError::MissingPlayerSpawn)?;
    let exit = exit.ok_or(LevelError::MissingExit)?;

    Ok(LevelLayout::new(
        expected,
        to_u32(rows.len()),
        walls,
        player,
        treasures,
        enemies,
        exit,
    ))
}

fn count_tiles(line: &str) -> u32 {
    to_u32(line.chars().count())
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
