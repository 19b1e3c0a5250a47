#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Escape engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. The maze itself is described by [`Grid`], which the generation
//! system produces once per session and the world owns afterwards.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod grid;

pub use grid::{Grid, GridError, TileKind};

/// Side length of a single square tile expressed in world units.
pub const TILE_SIZE: f32 = 64.0;

/// Footprint shared by the player and every enemy, in world units.
pub const ACTOR_SIZE: Vec2 = Vec2::new(48.0, 64.0);

/// Simulated duration of a single tick when the host runs at 60Hz.
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// Location of a single grid cell expressed as column and row coordinates.
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

    /// World-space position of the cell's top-left corner.
    #[must_use]
    pub fn origin(self) -> Vec2 {
        Vec2::new(self.column as f32 * TILE_SIZE, self.row as f32 * TILE_SIZE)
    }

    /// World-space position of the cell's center.
    #[must_use]
    pub fn center(self) -> Vec2 {
        self.origin() + Vec2::splat(TILE_SIZE * 0.5)
    }
}

/// Facing directions available to every moving entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a stable order, used for uniform random picks.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector pointing along the direction in world space.
    #[must_use]
    pub fn unit_vector(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Direction of the dominant axis of the provided motion vector.
    ///
    /// Ties resolve to the vertical axis, and a zero vector faces up.
    #[must_use]
    pub fn dominant(delta: Vec2) -> Self {
        if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 {
                Self::Right
            } else {
                Self::Left
            }
        } else if delta.y > 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }
}

/// Difficulty tier selected for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Shortcuts are opened and enemies move slower.
    Easy,
    /// Unmodified perfect maze.
    Medium,
    /// Extra walls are inserted and enemies move faster.
    Hard,
}

impl Difficulty {
    /// Resolves the numeric difficulty level used by external callers (0, 1 or 2).
    pub fn from_level(level: u8) -> Result<Self, ConfigError> {
        match level {
            0 => Ok(Self::Easy),
            1 => Ok(Self::Medium),
            2 => Ok(Self::Hard),
            other => Err(ConfigError::InvalidDifficulty(other)),
        }
    }

    /// Numeric level matching [`Difficulty::from_level`].
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    /// Number of life potions the generator attempts to place.
    #[must_use]
    pub const fn life_potion_count(self) -> usize {
        match self {
            Self::Easy => 5,
            Self::Medium => 3,
            Self::Hard => 2,
        }
    }

    /// Number of enemies a session attempts to spawn by default.
    #[must_use]
    pub const fn enemy_count(self) -> usize {
        match self {
            Self::Easy => 15,
            Self::Medium => 25,
            Self::Hard => 40,
        }
    }

    /// Multiplier applied to every enemy's base speed.
    #[must_use]
    pub const fn enemy_speed_multiplier(self) -> f32 {
        match self {
            Self::Easy => 0.8,
            Self::Medium => 1.0,
            Self::Hard => 1.2,
        }
    }
}

/// Playable character chosen at session creation.
///
/// Characters differ only in presentation, so the core keeps the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterKind(u8);

impl CharacterKind {
    /// Number of selectable characters.
    pub const COUNT: u8 = 3;

    /// Validates a character index chosen by the player.
    pub fn new(index: u8) -> Result<Self, ConfigError> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(ConfigError::InvalidCharacter(index))
        }
    }

    /// Zero-based index of the character.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl Default for CharacterKind {
    fn default() -> Self {
        Self(0)
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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

/// Variants of hostile entities. Kinds are data, not behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Balanced enemy.
    Basic,
    /// Fragile enemy with the widest chase range.
    Fast,
    /// Slow, durable enemy that hits twice as hard.
    Strong,
}

impl EnemyKind {
    /// Every enemy kind in a stable order.
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Strong];

    /// Base movement speed in world units per tick, before difficulty scaling.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            Self::Basic => 2.0,
            Self::Fast => 3.0,
            Self::Strong => 1.5,
        }
    }

    /// Health the enemy spawns with.
    #[must_use]
    pub const fn max_health(self) -> u32 {
        match self {
            Self::Basic => 3,
            Self::Fast => 2,
            Self::Strong => 5,
        }
    }

    /// Contact damage rating of the enemy.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::Basic | Self::Fast => 1,
            Self::Strong => 2,
        }
    }

    /// Distance between centers at which the enemy starts chasing.
    #[must_use]
    pub const fn chase_range(self) -> f32 {
        match self {
            Self::Basic => 250.0,
            Self::Fast => 350.0,
            Self::Strong => 200.0,
        }
    }

    /// Shards granted to the player for defeating the enemy.
    #[must_use]
    pub const fn kill_bounty(self) -> u32 {
        match self {
            Self::Basic => 5,
            Self::Fast => 8,
            Self::Strong => 12,
        }
    }
}

/// Behavioral mode of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyMode {
    /// Roams slowly in a random facing.
    Wander,
    /// Heads straight for the player.
    Chase,
}

/// Projectile variants the player can throw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Thrown blade, the default projectile.
    Melee,
    /// Spell unlocked through an upgrade.
    Ranged,
}

impl ProjectileKind {
    /// Full footprint of the projectile.
    #[must_use]
    pub const fn size(self) -> Vec2 {
        match self {
            Self::Melee => Vec2::splat(32.0),
            Self::Ranged => Vec2::splat(64.0),
        }
    }

    /// Size of the centered box used for wall tests.
    ///
    /// Ranged projectiles probe with a smaller box so they do not hit the
    /// surrounding walls the moment they leave the player's tile.
    #[must_use]
    pub const fn wall_probe_size(self) -> Vec2 {
        Vec2::splat(32.0)
    }

    /// Damage dealt on hit.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::Melee => 1,
            Self::Ranged => 2,
        }
    }
}

/// Upgrades purchasable with shards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    /// Doubles the player's movement speed.
    SpeedBoost,
    /// Switches thrown projectiles to [`ProjectileKind::Ranged`].
    RangedProjectiles,
    /// Grants the labyrinth map and starts tracking explored tiles.
    LabyrinthMap,
}

impl Upgrade {
    /// Price of the upgrade in shards.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::SpeedBoost => 250,
            Self::RangedProjectiles | Self::LabyrinthMap => 180,
        }
    }
}

/// Upgrades currently owned by the player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Upgrades {
    /// Multiplier applied to the player's base speed.
    pub speed_multiplier: f32,
    /// Kind of projectile produced by throws.
    pub projectile_kind: ProjectileKind,
    /// Whether the player owns the labyrinth map.
    pub has_map: bool,
}

impl Upgrades {
    /// Reports whether the provided upgrade is already active.
    #[must_use]
    pub fn owns(&self, upgrade: Upgrade) -> bool {
        match upgrade {
            Upgrade::SpeedBoost => self.speed_multiplier > 1.0,
            Upgrade::RangedProjectiles => self.projectile_kind == ProjectileKind::Ranged,
            Upgrade::LabyrinthMap => self.has_map,
        }
    }
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            projectile_kind: ProjectileKind::Melee,
            has_map: false,
        }
    }
}

/// Reasons a purchase request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseError {
    /// The player cannot afford the upgrade.
    InsufficientShards,
    /// The upgrade is already active.
    AlreadyOwned,
}

/// Directional key state sampled by the host for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputState {
    /// Up key held.
    pub up: bool,
    /// Down key held.
    pub down: bool,
    /// Left key held.
    pub left: bool,
    /// Right key held.
    pub right: bool,
}

impl InputState {
    /// Input with every key released.
    pub const IDLE: InputState = InputState {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Input holding a single direction.
    #[must_use]
    pub const fn holding(direction: Direction) -> Self {
        let mut input = Self::IDLE;
        match direction {
            Direction::Up => input.up = true,
            Direction::Down => input.down = true,
            Direction::Left => input.left = true,
            Direction::Right => input.right = true,
        }
        input
    }

    /// Reports whether any directional key is held.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Where a thrown projectile should travel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Aim {
    /// Along the player's current facing.
    Facing,
    /// Toward a world-space point, typically the cursor.
    Toward(Vec2),
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// The player reached the exit.
    Won,
    /// The player ran out of lives.
    Lost,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Places the player on the start tile and marks the session as running.
    StartSession,
    /// Advances the simulation by one tick.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Directional keys held during the tick.
        input: InputState,
    },
    /// Requests that the player throw a projectile.
    ThrowProjectile {
        /// Direction or target of the throw.
        aim: Aim,
    },
    /// Pauses or resumes the simulation.
    SetPaused {
        /// Whether ticks should be ignored.
        paused: bool,
    },
    /// Spends shards on an upgrade.
    PurchaseUpgrade {
        /// Upgrade requested by the player.
        upgrade: Upgrade,
    },
    /// Inserts an enemy into the maze.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
        /// Top-left corner of the enemy footprint.
        position: Vec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms the session is running with the player on the start tile.
    SessionStarted {
        /// Top-left corner of the player footprint.
        position: Vec2,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the pause flag changed.
    PauseChanged {
        /// New value of the pause flag.
        paused: bool,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the new enemy.
        kind: EnemyKind,
        /// Top-left corner of the enemy footprint.
        position: Vec2,
    },
    /// Reports that an enemy touched the player outside the grace window.
    PlayerDamaged {
        /// Enemy responsible for the hit.
        enemy: EnemyId,
        /// Lives left after the hit.
        lives_remaining: u32,
    },
    /// Confirms that a projectile left the player's hands.
    ProjectileThrown {
        /// Kind of the thrown projectile.
        kind: ProjectileKind,
        /// Initial velocity of the projectile.
        velocity: Vec2,
    },
    /// Reports that a projectile damaged an enemy that survived.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health left after the hit.
        health: u32,
    },
    /// Reports that an enemy's health reached zero.
    EnemyDefeated {
        /// Enemy that was defeated.
        enemy: EnemyId,
        /// Kind of the defeated enemy.
        kind: EnemyKind,
        /// Shards awarded for the kill.
        bounty: u32,
    },
    /// Confirms that a treasure tile was consumed.
    TreasureCollected {
        /// Cell that held the treasure.
        cell: CellCoord,
    },
    /// Confirms that a life potion tile was consumed.
    LifePotionCollected {
        /// Cell that held the potion.
        cell: CellCoord,
    },
    /// Confirms that an upgrade was bought.
    UpgradePurchased {
        /// Upgrade that became active.
        upgrade: Upgrade,
        /// Shards spent on it.
        cost: u32,
    },
    /// Reports that a purchase request was rejected.
    PurchaseRejected {
        /// Upgrade that was requested.
        upgrade: Upgrade,
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
    /// Announces that the session reached a terminal state.
    SessionEnded {
        /// Whether the player escaped or died.
        outcome: SessionOutcome,
    },
}

/// Errors raised while validating construction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The numeric difficulty is outside 0..=2.
    #[error("difficulty level {0} is not one of 0, 1 or 2")]
    InvalidDifficulty(u8),
    /// The character index does not name a playable character.
    #[error("character index {0} is out of range")]
    InvalidCharacter(u8),
}

/// Errors raised by the maze generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The requested grid cannot hold a bordered maze.
    #[error("maze must be at least 3x3 tiles, got {width}x{height}")]
    GridTooSmall {
        /// Requested width in tiles.
        width: u32,
        /// Requested height in tiles.
        height: u32,
    },
    /// Carving produced a single cell, so no exit can be distinct from the start.
    #[error("a {width}x{height} maze has no room for an exit apart from the start")]
    NoExitCandidate {
        /// Requested width in tiles.
        width: u32,
        /// Requested height in tiles.
        height: u32,
    },
}

/// Errors raised while creating a session from a grid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The grid violates a structural invariant.
    #[error("grid is not playable: {0}")]
    InvalidGrid(#[from] GridError),
    /// The exit cannot be reached from the start.
    #[error("exit is unreachable from the start tile")]
    UnreachableExit,
}
