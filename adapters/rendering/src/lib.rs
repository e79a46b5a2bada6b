#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Labyrinth adapters.
//!
//! Two [`Display`] implementations live here: [`FrameRecorder`], which keeps
//! the draw calls of the last presented frame for backends that repaint every
//! screen refresh, and [`TextDisplay`], a character framebuffer used by the
//! headless command-line mode.

use std::{collections::BTreeMap, time::Duration};

use anyhow::Result as AnyResult;
use glam::Vec2;
use labyrinth_core::{CellCoord, Display, EntityKind, Lattice, PlayerInput};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Fill color associated with an entity kind.
#[must_use]
pub fn entity_color(kind: EntityKind) -> Color {
    match kind {
        EntityKind::Wall => Color::from_rgb_u8(0x8b, 0x6f, 0x47),
        EntityKind::Treasure => Color::from_rgb_u8(0xd4, 0xaf, 0x37),
        EntityKind::Enemy => Color::from_rgb_u8(0xc0, 0x1c, 0x28),
        EntityKind::Exit => Color::from_rgb_u8(0x1c, 0x71, 0xd8),
        EntityKind::Player {
            attacking: true, ..
        } => Color::from_rgb_u8(0x98, 0xfb, 0x98),
        EntityKind::Player { .. } => Color::from_rgb_u8(0x00, 0x64, 0x00),
    }
}

/// Character used by [`TextDisplay`] for an entity kind.
#[must_use]
pub const fn entity_glyph(kind: EntityKind) -> char {
    match kind {
        EntityKind::Wall => '#',
        EntityKind::Treasure => '$',
        EntityKind::Enemy => 'E',
        EntityKind::Exit => '>',
        EntityKind::Player {
            attacking: true, ..
        } => 'A',
        EntityKind::Player { .. } => '@',
    }
}

/// Input snapshot gathered by adapters before advancing the game.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Discrete inputs pressed since the previous frame, in press order.
    pub inputs: Vec<PlayerInput>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Mapping between cells and the render plane.
    pub lattice: Lattice,
    /// Simulated time advanced per frame.
    pub frame_interval: Duration,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        clear_color: Color,
        lattice: Lattice,
        frame_interval: Duration,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            lattice,
            frame_interval,
        }
    }
}

/// Rendering backend capable of presenting Labyrinth frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update` closure receives the simulated frame delta and
    /// the input captured by the adapter, and redraws the frame through the
    /// provided [`FrameRecorder`].
    fn run<F>(self, presentation: Presentation, update: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut FrameRecorder) + 'static;
}

/// Single draw call captured by a [`FrameRecorder`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Entity drawn centred on a render-plane position.
    Entity {
        /// What to draw.
        kind: EntityKind,
        /// Where to draw it.
        position: Vec2,
    },
    /// Text anchored at a render-plane position.
    Text {
        /// Anchor of the text.
        position: Vec2,
        /// Content to write.
        text: String,
    },
}

/// [`Display`] that keeps the draw calls of the last refreshed frame.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    pending: Vec<DrawCommand>,
    presented: Vec<DrawCommand>,
    frames: u64,
}

impl FrameRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls of the most recently refreshed frame.
    #[must_use]
    pub fn presented(&self) -> &[DrawCommand] {
        &self.presented
    }

    /// Number of frames refreshed so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Display for FrameRecorder {
    fn clear_layer(&mut self) {
        self.pending.clear();
    }

    fn draw_entity(&mut self, kind: EntityKind, position: Vec2) {
        self.pending.push(DrawCommand::Entity { kind, position });
    }

    fn write_text(&mut self, position: Vec2, text: &str) {
        self.pending.push(DrawCommand::Text {
            position,
            text: text.to_owned(),
        });
    }

    fn refresh_frame(&mut self) {
        self.presented.clone_from(&self.pending);
        self.frames = self.frames.saturating_add(1);
    }
}

/// [`Display`] that renders frames as text, one character per cell.
///
/// Cells that nothing was drawn on are shown as floor. Text lines are
/// appended below the grid in the order they were written. Positions that do
/// not map onto the lattice are ignored.
#[derive(Clone, Debug)]
pub struct TextDisplay {
    lattice: Lattice,
    cells: BTreeMap<CellCoord, char>,
    lines: Vec<String>,
    frame: String,
    frames: u64,
}

impl TextDisplay {
    /// Glyph used for cells nothing was drawn on.
    pub const FLOOR: char = '.';

    /// Creates a framebuffer that maps positions through `lattice`.
    #[must_use]
    pub fn new(lattice: Lattice) -> Self {
        Self {
            lattice,
            cells: BTreeMap::new(),
            lines: Vec::new(),
            frame: String::new(),
            frames: 0,
        }
    }

    /// Text of the most recently refreshed frame.
    #[must_use]
    pub fn frame(&self) -> &str {
        &self.frame
    }

    /// Number of frames refreshed so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn render(&self) -> String {
        let columns = self
            .cells
            .keys()
            .map(|cell| cell.column() + 1)
            .max()
            .unwrap_or(0);
        let rows = self
            .cells
            .keys()
            .map(|cell| cell.row() + 1)
            .max()
            .unwrap_or(0);

        let mut frame = String::new();
        for row in 0..rows {
            for column in 0..columns {
                let glyph = self
                    .cells
                    .get(&CellCoord::new(column, row))
                    .copied()
                    .unwrap_or(Self::FLOOR);
                frame.push(glyph);
            }
            frame.push('\n');
        }
        for line in &self.lines {
            frame.push_str(line);
            frame.push('\n');
        }
        frame
    }
}

impl Default for TextDisplay {
    fn default() -> Self {
        Self::new(Lattice::default())
    }
}

impl Display for TextDisplay {
    fn clear_layer(&mut self) {
        self.cells.clear();
        self.lines.clear();
    }

    fn draw_entity(&mut self, kind: EntityKind, position: Vec2) {
        if let Some(cell) = self.lattice.to_cell(position) {
            let _ = self.cells.insert(cell, entity_glyph(kind));
        }
    }

    fn write_text(&mut self, _position: Vec2, text: &str) {
        self.lines.push(text.to_owned());
    }

    fn refresh_frame(&mut self) {
        self.frame = self.render();
        self.frames = self.frames.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use labyrinth_core::Facing;

    use super::*;

    fn at(lattice: Lattice, column: u32, row: u32) -> Vec2 {
        lattice.to_world(CellCoord::new(column, row))
    }

    #[test]
    fn text_display_renders_glyphs_and_floor() {
        let lattice = Lattice::default();
        let mut display = TextDisplay::new(lattice);

        display.clear_layer();
        display.draw_entity(EntityKind::Wall, at(lattice, 0, 0));
        display.draw_entity(EntityKind::Wall, at(lattice, 2, 0));
        display.draw_entity(EntityKind::Treasure, at(lattice, 1, 1));
        display.draw_entity(
            EntityKind::Player {
                facing: Facing::Left,
                attacking: false,
            },
            at(lattice, 2, 1),
        );
        display.write_text(Vec2::new(300.0, 300.0), "Player Souls: 0");
        display.refresh_frame();

        assert_eq!(display.frame(), "#.#\n.$@\nPlayer Souls: 0\n");
        assert_eq!(display.frames(), 1);
    }

    #[test]
    fn later_draws_cover_earlier_ones() {
        let lattice = Lattice::default();
        let mut display = TextDisplay::new(lattice);

        display.draw_entity(EntityKind::Treasure, at(lattice, 0, 0));
        display.draw_entity(EntityKind::Enemy, at(lattice, 0, 0));
        display.refresh_frame();

        assert_eq!(display.frame(), "E\n");
    }

    #[test]
    fn clear_layer_discards_pending_content_only() {
        let lattice = Lattice::default();
        let mut display = TextDisplay::new(lattice);

        display.draw_entity(EntityKind::Exit, at(lattice, 0, 0));
        display.refresh_frame();
        display.clear_layer();

        assert_eq!(display.frame(), ">\n");
        display.refresh_frame();
        assert_eq!(display.frame(), "");
    }

    #[test]
    fn off_lattice_positions_are_ignored() {
        let mut display = TextDisplay::default();

        display.draw_entity(EntityKind::Wall, Vec2::new(-1_000.0, 1_000.0));
        display.refresh_frame();

        assert_eq!(display.frame(), "");
    }

    #[test]
    fn attacking_player_has_its_own_glyph() {
        assert_eq!(
            entity_glyph(EntityKind::Player {
                facing: Facing::Right,
                attacking: true,
            }),
            'A'
        );
        assert_eq!(
            entity_glyph(EntityKind::Player {
                facing: Facing::Right,
                attacking: false,
            }),
            '@'
        );
    }

    #[test]
    fn recorder_presents_only_refreshed_frames() {
        let mut recorder = FrameRecorder::new();

        recorder.draw_entity(EntityKind::Enemy, Vec2::ZERO);
        assert!(recorder.presented().is_empty());

        recorder.refresh_frame();
        recorder.clear_layer();
        recorder.write_text(Vec2::ZERO, "GAME OVER");

        assert_eq!(
            recorder.presented(),
            &[DrawCommand::Entity {
                kind: EntityKind::Enemy,
                position: Vec2::ZERO,
            }]
        );
        assert_eq!(recorder.frames(), 1);
    }
}
