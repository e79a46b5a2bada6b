//! Scripted inputs for headless runs.

use anyhow::{bail, Result};
use labyrinth_core::PlayerInput;

/// Parses one input per character: `U`, `D`, `L`, `R`, `A`, or `.` for a
/// tick without input. Whitespace is ignored and letters are case
/// insensitive.
pub(crate) fn parse_script(script: &str) -> Result<Vec<Option<PlayerInput>>> {
    let mut inputs = Vec::with_capacity(script.len());
    for (index, symbol) in script.chars().enumerate() {
        let input = match symbol.to_ascii_uppercase() {
            'U' => Some(PlayerInput::MoveUp),
            'D' => Some(PlayerInput::MoveDown),
            'L' => Some(PlayerInput::MoveLeft),
            'R' => Some(PlayerInput::MoveRight),
            'A' => Some(PlayerInput::Attack),
            '.' => None,
            other if other.is_whitespace() => continue,
            other => bail!("unknown script input {other:?} at position {index}"),
        };
        inputs.push(input);
    }
    Ok(inputs)
}
