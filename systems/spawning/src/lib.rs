#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use glam::Vec2;
use maze_escape_core::{Command, Difficulty, EnemyKind, Grid, ACTOR_SIZE, TILE_SIZE};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_ATTEMPTS_PER_ENEMY: usize = 20;
const DEFAULT_MIN_SEPARATION: f32 = 50.0;
const FREE_POSITION_PERIOD: usize = 3;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    attempts_per_enemy: usize,
    min_separation: f32,
}

impl Config {
    /// Creates a new configuration using the provided seed and default spacing rules.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            attempts_per_enemy: DEFAULT_ATTEMPTS_PER_ENEMY,
            min_separation: DEFAULT_MIN_SEPARATION,
        }
    }

    /// Overrides how many sampling attempts each requested enemy contributes.
    #[must_use]
    pub const fn with_attempts_per_enemy(mut self, attempts: usize) -> Self {
        self.attempts_per_enemy = attempts;
        self
    }

    /// Overrides the minimum distance kept between enemy positions.
    #[must_use]
    pub const fn with_min_separation(mut self, distance: f32) -> Self {
        self.min_separation = distance;
        self
    }
}

/// Pure system that rejection-samples enemy positions and kinds.
#[derive(Debug)]
pub struct Spawning {
    attempts_per_enemy: usize,
    min_separation: f32,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            attempts_per_enemy: config.attempts_per_enemy,
            min_separation: config.min_separation,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Emits up to `count` spawn commands for free positions within the grid.
    ///
    /// Every third attempt samples an arbitrary position inside the maze, the
    /// others sample tile origins. Positions rejected by `is_blocked` or closer
    /// than the minimum separation to `existing` or already emitted enemies are
    /// skipped. Returns the number of commands emitted.
    pub fn handle<F>(
        &mut self,
        difficulty: Difficulty,
        count: usize,
        grid: &Grid,
        existing: &[Vec2],
        mut is_blocked: F,
        out: &mut Vec<Command>,
    ) -> usize
    where
        F: FnMut(Vec2) -> bool,
    {
        if count == 0 || grid.width() == 0 || grid.height() == 0 {
            return 0;
        }

        let max_attempts = count.saturating_mul(self.attempts_per_enemy);
        let mut occupied: Vec<Vec2> = existing.to_vec();
        let mut spawned = 0;

        for attempt in 0..max_attempts {
            if spawned == count {
                break;
            }

            let position = if attempt % FREE_POSITION_PERIOD == 0 {
                self.free_position(grid)
            } else {
                self.tile_origin(grid)
            };

            if is_blocked(position) || self.crowded(position, &occupied) {
                continue;
            }

            let kind = self.select_kind(difficulty);
            occupied.push(position);
            out.push(Command::SpawnEnemy { kind, position });
            spawned += 1;
        }

        if spawned < count {
            log::warn!("spawned {spawned} of {count} enemies after {max_attempts} attempts");
        }
        spawned
    }

    fn free_position(&mut self, grid: &Grid) -> Vec2 {
        let span_x = grid.width() as f32 * TILE_SIZE - ACTOR_SIZE.x;
        let span_y = grid.height() as f32 * TILE_SIZE - ACTOR_SIZE.y;
        Vec2::new(
            self.sample_whole_units(span_x),
            self.sample_whole_units(span_y),
        )
    }

    fn sample_whole_units(&mut self, span: f32) -> f32 {
        if span < 1.0 {
            return 0.0;
        }
        self.rng.gen_range(0..span as u32) as f32
    }

    fn tile_origin(&mut self, grid: &Grid) -> Vec2 {
        let column = self.rng.gen_range(0..grid.width());
        let row = self.rng.gen_range(0..grid.height());
        Vec2::new(column as f32 * TILE_SIZE, row as f32 * TILE_SIZE)
    }

    fn crowded(&self, position: Vec2, occupied: &[Vec2]) -> bool {
        occupied
            .iter()
            .any(|other| other.distance(position) < self.min_separation)
    }

    fn select_kind(&mut self, difficulty: Difficulty) -> EnemyKind {
        match difficulty {
            Difficulty::Easy => [EnemyKind::Basic, EnemyKind::Fast][self.rng.gen_range(0..2)],
            Difficulty::Medium => EnemyKind::ALL[self.rng.gen_range(0..EnemyKind::ALL.len())],
            Difficulty::Hard => match self.rng.gen_range(0..10) {
                0..=2 => EnemyKind::Basic,
                3..=5 => EnemyKind::Fast,
                _ => EnemyKind::Strong,
            },
        }
    }
}
