#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the Labyrinth.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The game draws through a [`FrameRecorder`]; the backend repaints the last
//! refreshed frame on every screen refresh and advances the game with a fixed
//! step, so simulation speed does not depend on the monitor's refresh rate.

use std::time::{Duration, Instant};

use anyhow::Result;
use glam::Vec2;
use labyrinth_core::{EntityKind, Facing, PlayerInput};
use labyrinth_rendering::{
    entity_color, Color, DrawCommand, FrameInput, FrameRecorder, Presentation, RenderingBackend,
};
use macroquad::input::{is_key_pressed, KeyCode};

/// Upper bound on simulation steps run to catch up after a slow frame.
const MAX_STEPS_PER_FRAME: u32 = 4;

/// Render-plane extent that must stay visible on both axes.
const VISIBLE_EXTENT: f32 = 720.0;

/// Font size of text written by the game, in render units.
const FONT_SIZE: f32 = 28.0;

/// Fraction of a cell covered by an entity square.
const ENTITY_FILL: f32 = 0.9;

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut FrameRecorder) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            lattice,
            frame_interval,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 960,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let background = to_macroquad_color(clear_color);
            let mut recorder = FrameRecorder::new();
            let mut clock = FixedStep::new(frame_interval);
            let mut pending = FrameInput::default();
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    break;
                }
                pending.inputs.extend(poll_inputs(is_key_pressed).inputs);

                let elapsed = Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                let simulation_start = Instant::now();
                for _ in 0..clock.advance(elapsed) {
                    update(frame_interval, std::mem::take(&mut pending), &mut recorder);
                }
                let simulation = simulation_start.elapsed();

                macroquad::window::clear_background(background);
                let mapping = ScreenMapping::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_frame(recorder.presented(), &mapping, lattice.step());

                if let Some(fps) = fps_counter.record_frame(elapsed, simulation) {
                    if show_fps {
                        println!(
                            "FPS: {:.2} | sim: {:>6.2}ms",
                            fps.per_second,
                            fps.avg_simulation.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps the keys pressed this frame onto player inputs, in a fixed order.
fn poll_inputs<P>(pressed: P) -> FrameInput
where
    P: Fn(KeyCode) -> bool,
{
    const BINDINGS: [(KeyCode, PlayerInput); 5] = [
        (KeyCode::Up, PlayerInput::MoveUp),
        (KeyCode::Down, PlayerInput::MoveDown),
        (KeyCode::Left, PlayerInput::MoveLeft),
        (KeyCode::Right, PlayerInput::MoveRight),
        (KeyCode::Space, PlayerInput::Attack),
    ];

    FrameInput {
        inputs: BINDINGS
            .iter()
            .filter(|(key, _)| pressed(*key))
            .map(|(_, input)| *input)
            .collect(),
    }
}

/// Converts variable frame times into a whole number of fixed steps.
#[derive(Clone, Copy, Debug)]
struct FixedStep {
    interval: Duration,
    accumulated: Duration,
}

impl FixedStep {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Returns how many steps are due after `elapsed`. Time beyond
    /// [`MAX_STEPS_PER_FRAME`] steps is dropped.
    fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }

        self.accumulated = self.accumulated.saturating_add(elapsed);
        let mut steps = 0;
        while self.accumulated >= self.interval && steps < MAX_STEPS_PER_FRAME {
            self.accumulated -= self.interval;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_FRAME {
            self.accumulated = self.accumulated.min(self.interval);
        }
        steps
    }
}

/// Transform from the render plane (y up, origin centred) to screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScreenMapping {
    scale: f32,
    center: Vec2,
}

impl ScreenMapping {
    fn new(screen_width: f32, screen_height: f32) -> Self {
        let scale = (screen_width.min(screen_height) / VISIBLE_EXTENT).max(f32::EPSILON);
        Self {
            scale,
            center: Vec2::new(screen_width / 2.0, screen_height / 2.0),
        }
    }

    fn to_screen(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            self.center.x + position.x * self.scale,
            self.center.y - position.y * self.scale,
        )
    }
}

fn draw_frame(commands: &[DrawCommand], mapping: &ScreenMapping, cell_size: f32) {
    for command in commands {
        match command {
            DrawCommand::Entity { kind, position } => {
                draw_entity(*kind, mapping.to_screen(*position), cell_size * mapping.scale);
            }
            DrawCommand::Text { position, text } => {
                draw_centered_text(text, mapping.to_screen(*position), mapping.scale);
            }
        }
    }
}

fn draw_entity(kind: EntityKind, center: Vec2, cell_size: f32) {
    let side = cell_size * ENTITY_FILL;
    let color = to_macroquad_color(entity_color(kind));
    macroquad::shapes::draw_rectangle(
        center.x - side / 2.0,
        center.y - side / 2.0,
        side,
        side,
        color,
    );

    if let EntityKind::Player { facing, .. } = kind {
        let eye = side / 5.0;
        let offset = match facing {
            Facing::Left => -side / 4.0,
            Facing::Right => side / 4.0,
        };
        macroquad::shapes::draw_rectangle(
            center.x + offset - eye / 2.0,
            center.y - side / 4.0,
            eye,
            eye,
            macroquad::color::WHITE,
        );
    }
}

fn draw_centered_text(text: &str, anchor: Vec2, scale: f32) {
    let font_size = (FONT_SIZE * scale).round().clamp(8.0, 96.0) as u16;
    let dimensions = macroquad::text::measure_text(text, None, font_size, 1.0);
    macroquad::text::draw_text(
        text,
        anchor.x - dimensions.width / 2.0,
        anchor.y + dimensions.offset_y / 2.0,
        f32::from(font_size),
        macroquad::color::WHITE,
    );
}

#[derive(Debug, Default)]
struct FpsCounter {
    window: Duration,
    frames: u32,
    simulation: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f64,
    avg_simulation: Duration,
}

impl FpsCounter {
    fn record_frame(&mut self, elapsed: Duration, simulation: Duration) -> Option<FpsMetrics> {
        self.window = self.window.saturating_add(elapsed);
        self.frames = self.frames.saturating_add(1);
        self.simulation = self.simulation.saturating_add(simulation);

        if self.window < Duration::from_secs(1) {
            return None;
        }

        let metrics = FpsMetrics {
            per_second: f64::from(self.frames) / self.window.as_secs_f64(),
            avg_simulation: self.simulation / self.frames.max(1),
        };
        *self = Self::default();
        Some(metrics)
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
