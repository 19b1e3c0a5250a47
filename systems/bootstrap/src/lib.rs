#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares and drives Maze Escape sessions.
//!
//! [`Bootstrap`] is the single entry point adapters talk to: it generates
//! mazes, seeds sessions with enemies, steps the simulation and moves sessions
//! in and out of snapshot blobs. Observation goes through
//! [`maze_escape_world::query`].

use std::time::Duration;

use maze_escape_core::{
    Aim, CharacterKind, Command, Difficulty, Event, GenerationError, Grid, InputState,
    SessionError, Upgrade, ACTOR_SIZE,
};
use maze_escape_system_generation::{GenerationConfig, MazeGenerator};
use maze_escape_system_spawning::{Config as SpawningConfig, Spawning};
use maze_escape_world::{self as world, query, CollisionQuery, SnapshotError, World};
use serde::{Deserialize, Serialize};

/// Salt separating the spawning stream from the session stream of one seed.
const SPAWN_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Tunables applied when a session is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of enemies to place; `None` uses the difficulty default.
    pub enemy_count: Option<usize>,
    /// Seed driving enemy placement and every random decision of the session.
    pub seed: u64,
}

impl SessionConfig {
    /// Creates a configuration with the provided seed and the default enemy count.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            enemy_count: None,
            seed,
        }
    }

    fn resolved_enemy_count(&self, difficulty: Difficulty) -> usize {
        self.enemy_count.unwrap_or(difficulty.enemy_count())
    }
}

/// Facade that wires generation, spawning and the world together.
#[derive(Clone, Debug, Default)]
pub struct Bootstrap {
    generator: MazeGenerator,
}

impl Bootstrap {
    /// Creates a bootstrap that generates mazes with the provided configuration.
    #[must_use]
    pub fn with_generation(config: GenerationConfig) -> Self {
        Self {
            generator: MazeGenerator::new(config),
        }
    }

    /// Generates a solvable maze for the requested dimensions and difficulty.
    pub fn generate_maze(
        &self,
        width: u32,
        height: u32,
        difficulty: Difficulty,
        seed: u64,
    ) -> Result<Grid, GenerationError> {
        self.generator.generate(width, height, difficulty, seed)
    }

    /// Creates a running session over `grid` populated with enemies.
    ///
    /// The player is placed on the start tile and the session is started, so
    /// the next [`Bootstrap::step`] already advances the simulation.
    pub fn create_session(
        &self,
        grid: Grid,
        character: CharacterKind,
        difficulty: Difficulty,
        config: &SessionConfig,
    ) -> Result<World, SessionError> {
        let mut world = World::new(grid, character, difficulty, config.seed)?;
        let count = config.resolved_enemy_count(difficulty);

        let mut commands = Vec::new();
        {
            let grid = query::grid(&world);
            let collision = CollisionQuery::new(grid);
            let mut spawning = Spawning::new(SpawningConfig::new(config.seed ^ SPAWN_SEED_SALT));
            let _ = spawning.handle(
                difficulty,
                count,
                grid,
                &[],
                |position| collision.is_blocked(position, ACTOR_SIZE),
                &mut commands,
            );
        }
        commands.push(Command::StartSession);

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        log::debug!(
            "session created with {} of {count} requested enemies",
            query::enemy_view(&world).len()
        );

        Ok(world)
    }

    /// Advances the session by one tick and returns the events it produced.
    #[must_use]
    pub fn step(&self, world: &mut World, input: InputState, dt: Duration) -> Vec<Event> {
        self.dispatch(world, Command::Tick { dt, input })
    }

    /// Throws a projectile if the player is able to.
    #[must_use]
    pub fn throw_projectile(&self, world: &mut World, aim: Aim) -> Vec<Event> {
        self.dispatch(world, Command::ThrowProjectile { aim })
    }

    /// Pauses or resumes the simulation.
    #[must_use]
    pub fn set_paused(&self, world: &mut World, paused: bool) -> Vec<Event> {
        self.dispatch(world, Command::SetPaused { paused })
    }

    /// Attempts to buy an upgrade with the player's shards.
    #[must_use]
    pub fn purchase_upgrade(&self, world: &mut World, upgrade: Upgrade) -> Vec<Event> {
        self.dispatch(world, Command::PurchaseUpgrade { upgrade })
    }

    /// Serializes the session into an opaque snapshot blob.
    pub fn save(&self, world: &World) -> Result<Vec<u8>, SnapshotError> {
        world::encode_snapshot(&world.snapshot())
    }

    /// Rebuilds a session from a blob produced by [`Bootstrap::save`].
    pub fn load(&self, bytes: &[u8]) -> Result<World, SnapshotError> {
        World::from_snapshot(world::decode_snapshot(bytes)?)
    }

    fn dispatch(&self, world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(world, command, &mut events);
        events
    }
}
