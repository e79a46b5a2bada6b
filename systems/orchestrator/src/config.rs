//! Tunable game rules loaded from TOML.

use std::time::Duration;

use glam::Vec2;
use labyrinth_core::{Lattice, DEFAULT_LATTICE_ORIGIN, DEFAULT_LATTICE_STEP};
use labyrinth_world::{
    collision::DEFAULT_COLLISION_THRESHOLD, WorldConfig, DEFAULT_ENEMY_VALUE, DEFAULT_SPEED_BONUS,
    DEFAULT_TREASURE_VALUE,
};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value was parsed but cannot be used.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Game rules, every field optional in the TOML source.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Distance between adjacent cells in render units.
    pub lattice_step: f32,
    /// Render-plane x coordinate of the upper-left cell.
    pub origin_x: f32,
    /// Render-plane y coordinate of the upper-left cell.
    pub origin_y: f32,
    /// Distance below which two entities touch.
    pub collision_threshold: f32,
    /// Distance below which an attack hits an enemy.
    pub attack_reach: f32,
    /// Milliseconds an enemy waits between two steps.
    pub enemy_step_ms: u64,
    /// Milliseconds the attack animation lasts.
    pub attack_duration_ms: u64,
    /// Milliseconds between two frames of the game loop.
    pub frame_interval_ms: u64,
    /// Milliseconds a level transition message stays on screen.
    pub message_duration_ms: u64,
    /// Souls credited per treasure.
    pub treasure_value: u32,
    /// Souls credited per defeated enemy.
    pub enemy_value: u32,
    /// Speed multiplier gained per treasure.
    pub speed_bonus: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lattice_step: DEFAULT_LATTICE_STEP,
            origin_x: DEFAULT_LATTICE_ORIGIN.x,
            origin_y: DEFAULT_LATTICE_ORIGIN.y,
            collision_threshold: DEFAULT_COLLISION_THRESHOLD,
            attack_reach: DEFAULT_COLLISION_THRESHOLD,
            enemy_step_ms: 100,
            attack_duration_ms: 300,
            frame_interval_ms: 16,
            message_duration_ms: 2_000,
            treasure_value: DEFAULT_TREASURE_VALUE,
            enemy_value: DEFAULT_ENEMY_VALUE,
            speed_bonus: DEFAULT_SPEED_BONUS,
        }
    }
}

impl GameConfig {
    /// Parses and validates a TOML document. Missing fields keep their
    /// defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.lattice_step.is_finite() && self.lattice_step > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "lattice_step",
                reason: "must be a positive number",
            });
        }
        if !(self.collision_threshold.is_finite() && self.collision_threshold > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "collision_threshold",
                reason: "must be a positive number",
            });
        }
        if !(self.attack_reach.is_finite() && self.attack_reach >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "attack_reach",
                reason: "must not be negative",
            });
        }
        if self.enemy_step_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "enemy_step_ms",
                reason: "must be at least one millisecond",
            });
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "frame_interval_ms",
                reason: "must be at least one millisecond",
            });
        }
        Ok(())
    }

    /// Lattice described by the step and origin fields.
    #[must_use]
    pub fn lattice(&self) -> Lattice {
        Lattice::new(self.lattice_step, Vec2::new(self.origin_x, self.origin_y))
    }

    /// Rules handed to the world.
    #[must_use]
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            lattice: self.lattice(),
            collision_threshold: self.collision_threshold,
            attack_reach: self.attack_reach,
            enemy_step: Duration::from_millis(self.enemy_step_ms),
            attack_duration: Duration::from_millis(self.attack_duration_ms),
            treasure_value: self.treasure_value,
            enemy_value: self.enemy_value,
            speed_bonus: self.speed_bonus,
        }
    }

    /// Simulated time advanced by one frame of the game loop.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// How long a level transition message pauses the game.
    #[must_use]
    pub fn message_duration(&self) -> Duration {
        Duration::from_millis(self.message_duration_ms)
    }
}
