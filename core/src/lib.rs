#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Labyrinth engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. The [`Display`] trait is the
//! only contract that flows outward, towards whichever adapter draws frames.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Title shown by adapters that open a window.
pub const WINDOW_TITLE: &str = "The Labyrinth Of Soul";

/// Distance between adjacent lattice cells expressed in render units.
pub const DEFAULT_LATTICE_STEP: f32 = 22.0;

/// Render-plane location of the upper-left cell of every level.
pub const DEFAULT_LATTICE_ORIGIN: Vec2 = Vec2::new(-325.0, 325.0);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Discards the current level and rebuilds the world from the layout.
    LoadLevel {
        /// Parsed level describing walls and spawn cells.
        layout: LevelLayout,
    },
    /// Requests that the player advance a single lattice step.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the player start an attack.
    Attack,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an enemy advance a single step in the specified direction.
    StepEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Runs the ordered end-of-tick checks: treasure pickup, enemy contact,
    /// exit reveal and exit use.
    ResolveInteractions,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a fresh level replaced the previous one.
    LevelLoaded {
        /// Number of columns in the new level.
        columns: u32,
        /// Number of rows in the new level.
        rows: u32,
        /// Enemies spawned into the level, in spawn order.
        enemies: Vec<EnemyId>,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Reports that a player step was refused by a wall or the grid edge.
    PlayerBlocked {
        /// Direction of the refused step.
        direction: Direction,
    },
    /// Confirms that the player started an attack.
    AttackStarted,
    /// Confirms that the attack animation finished.
    AttackEnded,
    /// Confirms that an enemy successfully moved between two cells.
    EnemyAdvanced {
        /// Identifier of the enemy that advanced.
        enemy: EnemyId,
        /// Cell the enemy occupied before moving.
        from: CellCoord,
        /// Cell the enemy occupies after completing the move.
        to: CellCoord,
    },
    /// Reports that an attack removed an enemy from the level.
    EnemyDefeated {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
        /// Player score after crediting the enemy.
        score: u32,
    },
    /// Reports that the player picked up a treasure.
    TreasureCollected {
        /// Identifier of the collected treasure.
        treasure: TreasureId,
        /// Player score after crediting the treasure.
        score: u32,
    },
    /// Announces that every treasure is collected and the exit is visible.
    ExitRevealed {
        /// Cell that hosts the exit.
        cell: CellCoord,
    },
    /// Reports that the player stepped onto the revealed exit.
    ExitReached,
    /// Reports that an enemy touched the player.
    PlayerCaught {
        /// Identifier of the enemy that made contact.
        enemy: EnemyId,
    },
}

/// Overall state of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// The current level is in progress.
    Playing,
    /// An enemy caught the player. Terminal.
    GameOver,
    /// The player left the last level through its exit. Terminal.
    Victory,
}

impl GameStatus {
    /// Returns `true` when no further ticks will change the session.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

/// Cardinal movement directions available on the lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

/// Horizontal orientation of the player sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Player last moved towards decreasing columns.
    Left,
    /// Player last moved towards increasing columns.
    #[default]
    Right,
}

/// Discrete input events delivered by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerInput {
    /// Step one cell up.
    MoveUp,
    /// Step one cell down.
    MoveDown,
    /// Step one cell left.
    MoveLeft,
    /// Step one cell right.
    MoveRight,
    /// Swing at enemies within reach.
    Attack,
}

impl PlayerInput {
    /// Maps the input onto the world command it requests.
    #[must_use]
    pub fn to_command(self) -> Command {
        match self {
            Self::MoveUp => Command::MovePlayer {
                direction: Direction::North,
            },
            Self::MoveDown => Command::MovePlayer {
                direction: Direction::South,
            },
            Self::MoveLeft => Command::MovePlayer {
                direction: Direction::West,
            },
            Self::MoveRight => Command::MovePlayer {
                direction: Direction::East,
            },
            Self::Attack => Command::Attack,
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a treasure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreasureId(u32);

impl TreasureId {
    /// Creates a new treasure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Two cells are equal iff both coordinates match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the straight-line distance between two cell coordinates.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f64 {
        let dx = f64::from(self.column().abs_diff(other.column()));
        let dy = f64::from(self.row().abs_diff(other.row()));
        (dx * dx + dy * dy).sqrt()
    }

    /// Cell adjacent in the provided direction, or `None` when the step would
    /// leave the non-negative quadrant.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self
                .row
                .checked_sub(1)
                .map(|row| CellCoord::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| CellCoord::new(column, self.row)),
            Direction::South => self
                .row
                .checked_add(1)
                .map(|row| CellCoord::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| CellCoord::new(column, self.row)),
        }
    }

    /// Direction that leads from `self` to an orthogonally adjacent `other`.
    #[must_use]
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        let column_diff = self.column.abs_diff(other.column);
        let row_diff = self.row.abs_diff(other.row);
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if other.column > self.column {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if other.row > self.row {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Parsed contents of a level map.
///
/// Produced by the level loader, consumed by the world when a level is
/// (re)built. Every list is in row-major scan order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    columns: u32,
    rows: u32,
    walls: Vec<CellCoord>,
    player: CellCoord,
    treasures: Vec<CellCoord>,
    enemies: Vec<CellCoord>,
    exit: CellCoord,
}

impl LevelLayout {
    /// Assembles a layout from already validated parts.
    #[must_use]
    pub fn new(
        columns: u32,
        rows: u32,
        walls: Vec<CellCoord>,
        player: CellCoord,
        treasures: Vec<CellCoord>,
        enemies: Vec<CellCoord>,
        exit: CellCoord,
    ) -> Self {
        Self {
            columns,
            rows,
            walls,
            player,
            treasures,
            enemies,
            exit,
        }
    }

    /// Number of columns in the level.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the level.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cells occupied by walls.
    #[must_use]
    pub fn walls(&self) -> &[CellCoord] {
        &self.walls
    }

    /// Player spawn cell.
    #[must_use]
    pub const fn player(&self) -> CellCoord {
        self.player
    }

    /// Treasure spawn cells.
    #[must_use]
    pub fn treasures(&self) -> &[CellCoord] {
        &self.treasures
    }

    /// Enemy spawn cells.
    #[must_use]
    pub fn enemies(&self) -> &[CellCoord] {
        &self.enemies
    }

    /// Cell hosting the exit once it is revealed.
    #[must_use]
    pub const fn exit(&self) -> CellCoord {
        self.exit
    }
}

/// Mapping between lattice cells and the continuous render plane.
///
/// Columns grow towards positive x and rows grow towards negative y:
/// `x = origin.x + column * step`, `y = origin.y - row * step`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lattice {
    step: f32,
    origin: Vec2,
}

impl Lattice {
    /// Creates a lattice with the provided cell spacing and origin.
    #[must_use]
    pub const fn new(step: f32, origin: Vec2) -> Self {
        Self { step, origin }
    }

    /// Distance between adjacent cells in render units.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Render-plane position of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Render-plane position of the provided cell.
    #[must_use]
    pub fn to_world(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            self.origin.x + cell.column() as f32 * self.step,
            self.origin.y - cell.row() as f32 * self.step,
        )
    }

    /// Cell nearest to the provided render-plane position, if it lies in the
    /// non-negative quadrant of the lattice.
    #[must_use]
    pub fn to_cell(&self, position: Vec2) -> Option<CellCoord> {
        if self.step <= 0.0 {
            return None;
        }

        let column = ((position.x - self.origin.x) / self.step).round();
        let row = ((self.origin.y - position.y) / self.step).round();
        if column < 0.0 || row < 0.0 || column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }
}

impl Default for Lattice {
    fn default() -> Self {
        Self::new(DEFAULT_LATTICE_STEP, DEFAULT_LATTICE_ORIGIN)
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Grid cell currently occupied by the enemy.
    pub cell: CellCoord,
    /// Indicates whether the enemy accrued enough time to advance.
    pub ready_for_step: bool,
    /// Duration accumulated toward the next step.
    pub accumulated: Duration,
}

/// Read-only snapshot describing all enemies within the level.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Grid cell currently occupied by the player.
    pub cell: CellCoord,
    /// Orientation used to choose the player sprite.
    pub facing: Facing,
    /// Whether an attack animation is in progress.
    pub attacking: bool,
    /// Souls collected so far.
    pub score: u32,
    /// Movement multiplier raised by every collected treasure.
    pub speed_multiplier: f32,
}

/// Kinds of entity the display collaborator knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Impassable maze wall.
    Wall,
    /// Collectable treasure.
    Treasure,
    /// Pursuing enemy.
    Enemy,
    /// Revealed level exit.
    Exit,
    /// The player character.
    Player {
        /// Sprite orientation.
        facing: Facing,
        /// Whether the attack sprite should be used.
        attacking: bool,
    },
}

/// Rendering collaborator that draws entities at render-plane positions.
///
/// Implementations own all presentation concerns; the game only describes
/// what is where.
pub trait Display {
    /// Discards everything drawn since the last clear.
    fn clear_layer(&mut self);

    /// Draws an entity centred on the provided render-plane position.
    fn draw_entity(&mut self, kind: EntityKind, position: Vec2);

    /// Writes a line of text anchored at the provided render-plane position.
    fn write_text(&mut self, position: Vec2, text: &str);

    /// Presents everything drawn since the last clear.
    fn refresh_frame(&mut self);
}
