#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step game loop that ties the world, enemy navigation and the display
//! collaborator together.
//!
//! Every call to [`TickOrchestrator::tick`] runs the same pipeline: player
//! inputs, world time, one navigation pass, the ordered interaction checks
//! and finally a full redraw. Level transitions pause the simulation for a
//! short message, mirroring the original game's interstitial screens.

pub mod campaign;
pub mod config;

use std::time::Duration;

use glam::Vec2;
use labyrinth_core::{Command, Display, EntityKind, Event, GameStatus, PlayerInput};
use labyrinth_system_navigation::Navigation;
use labyrinth_world::{self as world, query, World};
use tracing::{debug, info, warn};

use crate::{
    campaign::Campaign,
    config::{ConfigError, GameConfig},
};

/// Message shown between two levels.
pub const LEVEL_COMPLETED_MESSAGE: &str = "LEVEL COMPLETED!";
/// Message shown after the last level is finished.
pub const VICTORY_MESSAGE: &str = "CONGRATULATIONS! YOU WIN!";
/// Message shown once an enemy catches the player.
pub const GAME_OVER_MESSAGE: &str = "GAME OVER";
/// Render-plane anchor of centred messages.
pub const MESSAGE_POSITION: Vec2 = Vec2::new(0.0, 0.0);
/// Render-plane anchor of the score line.
pub const SCORE_POSITION: Vec2 = Vec2::new(300.0, 300.0);

/// Formats the score line shown in the corner of the screen.
#[must_use]
pub fn score_line(score: u32) -> String {
    format!("Player Souls: {score}")
}

/// Owns a game session and advances it one frame at a time.
#[derive(Debug)]
pub struct TickOrchestrator {
    config: GameConfig,
    campaign: Campaign,
    world: World,
    navigation: Navigation,
    level_index: usize,
    stage: Stage,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl TickOrchestrator {
    /// Validates the configuration and loads the first level.
    pub fn new(config: GameConfig, campaign: Campaign) -> Result<Self, ConfigError> {
        config.validate()?;
        let world = World::with_config(config.world_config());
        let mut orchestrator = Self {
            config,
            campaign,
            world,
            navigation: Navigation::new(),
            level_index: 0,
            stage: Stage::Playing,
            events: Vec::new(),
            commands: Vec::new(),
        };
        orchestrator.load_level(0);
        Ok(orchestrator)
    }

    /// Advances the session by `dt`, applying `inputs` first, and redraws the
    /// whole scene on `display`.
    ///
    /// Once the session has ended the world is left untouched and only the
    /// final screen is redrawn.
    pub fn tick<D>(&mut self, dt: Duration, inputs: &[PlayerInput], display: &mut D) -> GameStatus
    where
        D: Display + ?Sized,
    {
        match self.stage {
            Stage::Playing => self.simulate(dt, inputs),
            Stage::Interlude {
                next_level,
                remaining,
            } => {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    self.stage = Stage::Playing;
                    self.load_level(next_level);
                } else {
                    self.stage = Stage::Interlude {
                        next_level,
                        remaining,
                    };
                }
            }
            Stage::Lost | Stage::Won => {}
        }

        self.present(display);
        self.status()
    }

    /// Current state of the session.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        match self.stage {
            Stage::Playing | Stage::Interlude { .. } => GameStatus::Playing,
            Stage::Lost => GameStatus::GameOver,
            Stage::Won => GameStatus::Victory,
        }
    }

    /// Message currently shown on top of the scene, if any.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        match self.stage {
            Stage::Playing => None,
            Stage::Interlude { .. } => Some(LEVEL_COMPLETED_MESSAGE),
            Stage::Lost => Some(GAME_OVER_MESSAGE),
            Stage::Won => Some(VICTORY_MESSAGE),
        }
    }

    /// Zero-based index of the level being played.
    #[must_use]
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    /// Souls collected so far.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::player(&self.world).score
    }

    /// Rules the session runs with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to enemy navigation.
    #[must_use]
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    fn load_level(&mut self, index: usize) {
        let Some(layout) = self.campaign.level(index).cloned() else {
            warn!(level = index + 1, "campaign has no such level");
            return;
        };
        self.level_index = index;
        self.events.clear();
        world::apply(&mut self.world, Command::LoadLevel { layout }, &mut self.events);
        self.dispatch_navigation();
        info!(level = index + 1, of = self.campaign.len(), "level started");
    }

    fn simulate(&mut self, dt: Duration, inputs: &[PlayerInput]) {
        self.events.clear();
        for input in inputs {
            world::apply(&mut self.world, input.to_command(), &mut self.events);
        }
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        self.dispatch_navigation();
        world::apply(
            &mut self.world,
            Command::ResolveInteractions,
            &mut self.events,
        );
        debug!(
            tick = query::tick_index(&self.world),
            events = self.events.len(),
            "frame simulated"
        );

        self.react();
    }

    /// Lets navigation observe the pending events and applies the steps it
    /// proposes. The resulting events are appended to the same buffer.
    fn dispatch_navigation(&mut self) {
        let enemy_view = query::enemy_view(&self.world);
        self.commands.clear();
        self.navigation.handle(
            &self.events,
            &enemy_view,
            query::player_cell(&self.world),
            query::grid_world(&self.world),
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn react(&mut self) {
        if let Some(enemy) = self.events.iter().find_map(|event| match event {
            Event::PlayerCaught { enemy } => Some(*enemy),
            _ => None,
        }) {
            info!(enemy = enemy.get(), score = self.score(), "game over");
            self.stage = Stage::Lost;
            return;
        }

        if !self
            .events
            .iter()
            .any(|event| matches!(event, Event::ExitReached))
        {
            return;
        }

        let next_level = self.level_index + 1;
        if next_level < self.campaign.len() {
            info!(level = self.level_index + 1, score = self.score(), "level completed");
            self.stage = Stage::Interlude {
                next_level,
                remaining: self.config.message_duration(),
            };
        } else {
            info!(score = self.score(), "campaign completed");
            self.stage = Stage::Won;
        }
    }

    fn present<D>(&self, display: &mut D)
    where
        D: Display + ?Sized,
    {
        display.clear_layer();

        if matches!(self.stage, Stage::Playing | Stage::Lost) {
            self.draw_level(display);
        }
        if let Some(message) = self.message() {
            display.write_text(MESSAGE_POSITION, message);
        }
        display.write_text(SCORE_POSITION, &score_line(self.score()));

        display.refresh_frame();
    }

    fn draw_level<D>(&self, display: &mut D)
    where
        D: Display + ?Sized,
    {
        let lattice = query::lattice(&self.world);

        for wall in query::grid_world(&self.world).walls() {
            display.draw_entity(EntityKind::Wall, lattice.to_world(wall));
        }
        for (_, cell) in query::treasures(&self.world) {
            display.draw_entity(EntityKind::Treasure, lattice.to_world(cell));
        }
        if let Some((cell, true)) = query::exit(&self.world) {
            display.draw_entity(EntityKind::Exit, lattice.to_world(cell));
        }
        for enemy in query::enemy_view(&self.world).iter() {
            display.draw_entity(EntityKind::Enemy, lattice.to_world(enemy.cell));
        }

        let player = query::player(&self.world);
        display.draw_entity(
            EntityKind::Player {
                facing: player.facing,
                attacking: player.attacking,
            },
            lattice.to_world(player.cell),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Playing,
    Interlude {
        next_level: usize,
        remaining: Duration,
    },
    Lost,
    Won,
}
