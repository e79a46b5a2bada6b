#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Labyrinth.
//!
//! The world owns everything that belongs to the active level: the obstacle
//! map, the player, treasures, enemies and the exit. It is only ever mutated
//! through [`apply`], and only ever read through the [`query`] module.

pub mod collision;
pub mod grid;
pub mod level;

use std::time::Duration;

use labyrinth_core::{
    CellCoord, Command, Direction, EnemyId, Event, Facing, Lattice, LevelLayout, TreasureId,
};
use tracing::{debug, info, warn};

use crate::{collision::is_colliding, grid::GridWorld};

/// Soul value credited for every collected treasure.
pub const DEFAULT_TREASURE_VALUE: u32 = 10;
/// Soul value credited for every defeated enemy.
pub const DEFAULT_ENEMY_VALUE: u32 = 1;
/// Speed multiplier gained for every collected treasure.
pub const DEFAULT_SPEED_BONUS: f32 = 0.1;
/// Simulated time an enemy needs between two steps.
pub const DEFAULT_ENEMY_STEP: Duration = Duration::from_millis(100);
/// Length of the attack animation.
pub const DEFAULT_ATTACK_DURATION: Duration = Duration::from_millis(300);

/// Tunable rules applied by the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    /// Mapping between cells and the render plane.
    pub lattice: Lattice,
    /// Distance below which the player touches treasures, enemies and the exit.
    pub collision_threshold: f32,
    /// Distance below which an attack hits an enemy.
    pub attack_reach: f32,
    /// Simulated time an enemy accumulates before it may step.
    pub enemy_step: Duration,
    /// Length of the attack animation.
    pub attack_duration: Duration,
    /// Souls credited per treasure.
    pub treasure_value: u32,
    /// Souls credited per defeated enemy.
    pub enemy_value: u32,
    /// Speed multiplier gained per treasure.
    pub speed_bonus: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            lattice: Lattice::default(),
            collision_threshold: collision::DEFAULT_COLLISION_THRESHOLD,
            attack_reach: collision::DEFAULT_COLLISION_THRESHOLD,
            enemy_step: DEFAULT_ENEMY_STEP,
            attack_duration: DEFAULT_ATTACK_DURATION,
            treasure_value: DEFAULT_TREASURE_VALUE,
            enemy_value: DEFAULT_ENEMY_VALUE,
            speed_bonus: DEFAULT_SPEED_BONUS,
        }
    }
}

/// Represents the authoritative Labyrinth world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    grid: GridWorld,
    player: Player,
    treasures: Vec<Treasure>,
    enemies: Vec<Enemy>,
    exit: Option<Exit>,
    next_enemy_id: u32,
    next_treasure_id: u32,
    tick_index: u64,
}

impl World {
    /// Creates an empty world using the default rules.
    ///
    /// No level is loaded; every cell is blocked until [`Command::LoadLevel`]
    /// is applied.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates an empty world using the provided rules.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            config,
            grid: GridWorld::default(),
            player: Player::default(),
            treasures: Vec::new(),
            enemies: Vec::new(),
            exit: None,
            next_enemy_id: 0,
            next_treasure_id: 0,
            tick_index: 0,
        }
    }

    fn load_level(&mut self, layout: &LevelLayout, out_events: &mut Vec<Event>) {
        self.grid = GridWorld::from_layout(layout);
        self.player.cell = layout.player();
        self.player.attack_remaining = None;

        self.treasures = layout
            .treasures()
            .iter()
            .map(|&cell| {
                let id = TreasureId::new(self.next_treasure_id);
                self.next_treasure_id = self.next_treasure_id.wrapping_add(1);
                Treasure { id, cell }
            })
            .collect();

        self.enemies = layout
            .enemies()
            .iter()
            .map(|&cell| {
                let id = EnemyId::new(self.next_enemy_id);
                self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
                Enemy {
                    id,
                    cell,
                    accumulator: Duration::ZERO,
                }
            })
            .collect();

        self.exit = Some(Exit {
            cell: layout.exit(),
            revealed: false,
        });

        info!(
            columns = layout.columns(),
            rows = layout.rows(),
            treasures = self.treasures.len(),
            enemies = self.enemies.len(),
            "level loaded"
        );
        out_events.push(Event::LevelLoaded {
            columns: layout.columns(),
            rows: layout.rows(),
            enemies: self.enemies.iter().map(|enemy| enemy.id).collect(),
        });
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.player.cell;
        let Some(to) = from
            .neighbor(direction)
            .filter(|cell| !self.grid.is_blocked(*cell))
        else {
            out_events.push(Event::PlayerBlocked { direction });
            return;
        };

        match direction {
            Direction::East => self.player.facing = Facing::Right,
            Direction::West => self.player.facing = Facing::Left,
            Direction::North | Direction::South => {}
        }
        self.player.cell = to;
        out_events.push(Event::PlayerMoved { from, to });
    }

    fn attack(&mut self, out_events: &mut Vec<Event>) {
        if self.player.attack_remaining.is_some() {
            debug!("attack ignored while another is in progress");
            return;
        }

        self.player.attack_remaining = Some(self.config.attack_duration);
        out_events.push(Event::AttackStarted);

        let lattice = self.config.lattice;
        let reach = self.config.attack_reach;
        let player_position = lattice.to_world(self.player.cell);
        let mut defeated = Vec::new();
        self.enemies.retain(|enemy| {
            if is_colliding(player_position, lattice.to_world(enemy.cell), reach) {
                defeated.push(enemy.id);
                false
            } else {
                true
            }
        });

        for enemy in defeated {
            self.player.score = self.player.score.saturating_add(self.config.enemy_value);
            debug!(enemy = enemy.get(), score = self.player.score, "enemy defeated");
            out_events.push(Event::EnemyDefeated {
                enemy,
                score: self.player.score,
            });
        }
    }

    fn advance_time(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        let step = self.config.enemy_step;
        for enemy in &mut self.enemies {
            enemy.accumulator = enemy.accumulator.saturating_add(dt).min(step);
        }

        if let Some(remaining) = self.player.attack_remaining {
            let remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                self.player.attack_remaining = None;
                out_events.push(Event::AttackEnded);
            } else {
                self.player.attack_remaining = Some(remaining);
            }
        }
    }

    fn step_enemy(&mut self, enemy_id: EnemyId, direction: Direction, out_events: &mut Vec<Event>) {
        let step = self.config.enemy_step;
        let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id == enemy_id) else {
            warn!(
                enemy = enemy_id.get(),
                "ignoring step for an enemy that is no longer in play"
            );
            return;
        };

        if enemy.accumulator < step {
            debug!(enemy = enemy_id.get(), "enemy step requested before it was ready");
            return;
        }

        let from = enemy.cell;
        let Some(to) = from
            .neighbor(direction)
            .filter(|cell| !self.grid.is_blocked(*cell))
        else {
            warn!(enemy = enemy_id.get(), ?direction, "enemy step blocked");
            return;
        };

        enemy.cell = to;
        enemy.accumulator = enemy.accumulator.saturating_sub(step);
        out_events.push(Event::EnemyAdvanced {
            enemy: enemy_id,
            from,
            to,
        });
    }

    fn resolve_interactions(&mut self, out_events: &mut Vec<Event>) {
        let lattice = self.config.lattice;
        let threshold = self.config.collision_threshold;
        let player_position = lattice.to_world(self.player.cell);

        let mut collected = Vec::new();
        self.treasures.retain(|treasure| {
            if is_colliding(player_position, lattice.to_world(treasure.cell), threshold) {
                collected.push(treasure.id);
                false
            } else {
                true
            }
        });
        for treasure in collected {
            self.player.score = self
                .player
                .score
                .saturating_add(self.config.treasure_value);
            self.player.speed_multiplier += self.config.speed_bonus;
            debug!(
                treasure = treasure.get(),
                score = self.player.score,
                "treasure collected"
            );
            out_events.push(Event::TreasureCollected {
                treasure,
                score: self.player.score,
            });
        }

        if let Some(enemy) = self
            .enemies
            .iter()
            .find(|enemy| is_colliding(player_position, lattice.to_world(enemy.cell), threshold))
        {
            info!(enemy = enemy.id.get(), "player caught");
            out_events.push(Event::PlayerCaught { enemy: enemy.id });
            return;
        }

        let Some(exit) = self.exit.as_mut() else {
            return;
        };

        if !exit.revealed && self.treasures.is_empty() {
            exit.revealed = true;
            out_events.push(Event::ExitRevealed { cell: exit.cell });
        }

        if exit.revealed && is_colliding(player_position, lattice.to_world(exit.cell), threshold) {
            info!("exit reached");
            out_events.push(Event::ExitReached);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { layout } => world.load_level(&layout, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::Attack => world.attack(out_events),
        Command::Tick { dt } => world.advance_time(dt, out_events),
        Command::StepEnemy { enemy, direction } => world.step_enemy(enemy, direction, out_events),
        Command::ResolveInteractions => world.resolve_interactions(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use labyrinth_core::{
        CellCoord, EnemySnapshot, EnemyView, Lattice, PlayerSnapshot, TreasureId,
    };

    use super::{GridWorld, World, WorldConfig};

    /// Rules the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Mapping between cells and the render plane.
    #[must_use]
    pub fn lattice(world: &World) -> Lattice {
        world.config.lattice
    }

    /// Provides read-only access to the obstacle map of the active level.
    #[must_use]
    pub fn grid_world(world: &World) -> &GridWorld {
        &world.grid
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: world.player.cell,
            facing: world.player.facing,
            attacking: world.player.attack_remaining.is_some(),
            score: world.player.score,
            speed_multiplier: world.player.speed_multiplier,
        }
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player_cell(world: &World) -> CellCoord {
        world.player.cell
    }

    /// Captures a read-only view of the enemies inhabiting the level.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let step = world.config.enemy_step;
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    cell: enemy.cell,
                    ready_for_step: enemy.accumulator >= step,
                    accumulated: enemy.accumulator,
                })
                .collect(),
        )
    }

    /// Treasures still waiting to be collected.
    #[must_use]
    pub fn treasures(world: &World) -> Vec<(TreasureId, CellCoord)> {
        world
            .treasures
            .iter()
            .map(|treasure| (treasure.id, treasure.cell))
            .collect()
    }

    /// Exit cell and whether it has been revealed, if a level is loaded.
    #[must_use]
    pub fn exit(world: &World) -> Option<(CellCoord, bool)> {
        world.exit.map(|exit| (exit.cell, exit.revealed))
    }

    /// Reports whether a level has been loaded.
    #[must_use]
    pub fn is_level_loaded(world: &World) -> bool {
        world.exit.is_some()
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Debug)]
struct Player {
    cell: CellCoord,
    facing: Facing,
    attack_remaining: Option<Duration>,
    score: u32,
    speed_multiplier: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            cell: CellCoord::new(0, 0),
            facing: Facing::Right,
            attack_remaining: None,
            score: 0,
            speed_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Treasure {
    id: TreasureId,
    cell: CellCoord,
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    cell: CellCoord,
    accumulator: Duration,
}

#[derive(Clone, Copy, Debug)]
struct Exit {
    cell: CellCoord,
    revealed: bool,
}
