//! Hostile entities and their wander/chase controller.

use std::time::Duration;

use glam::Vec2;
use maze_escape_core::{Difficulty, Direction, EnemyId, EnemyKind, EnemyMode, ACTOR_SIZE};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    collision::CollisionQuery,
    entity::{self, WalkCycle},
};

const WALK_PERIOD: u32 = 8;
const WANDER_TURN_CHANCE: f64 = 0.02;
const WANDER_SPEED_FACTOR: f32 = 0.3;
pub(crate) const DAMAGE_FLASH: Duration = Duration::from_millis(200);

/// Two-state controller deciding how an enemy moves each tick.
///
/// The mode is recomputed from scratch every tick: the enemy chases while the
/// distance between centers is within its chase range and wanders otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EnemyBehavior {
    mode: EnemyMode,
    facing: Direction,
}

impl EnemyBehavior {
    pub(crate) const fn new(facing: Direction) -> Self {
        Self {
            mode: EnemyMode::Wander,
            facing,
        }
    }

    pub(crate) const fn mode(&self) -> EnemyMode {
        self.mode
    }

    pub(crate) const fn facing(&self) -> Direction {
        self.facing
    }

    /// Moves `position` for a single tick and reports whether the enemy walked.
    pub(crate) fn drive<R: Rng>(
        &mut self,
        position: &mut Vec2,
        speed: f32,
        chase_range: f32,
        target: Vec2,
        collision: &CollisionQuery<'_>,
        rng: &mut R,
    ) -> bool {
        let offset = target - entity::center(*position, ACTOR_SIZE);

        if offset.length() <= chase_range {
            self.mode = EnemyMode::Chase;
            let heading = offset.normalize_or_zero();
            self.facing = Direction::dominant(heading);

            let candidate = *position + heading * speed;
            if !collision.is_blocked(candidate, ACTOR_SIZE) {
                *position = candidate;
            }
            return true;
        }

        self.mode = EnemyMode::Wander;
        if rng.gen_bool(WANDER_TURN_CHANCE) {
            self.facing = random_direction(rng);
        }

        let candidate = *position + self.facing.unit_vector() * speed * WANDER_SPEED_FACTOR;
        if collision.is_blocked(candidate, ACTOR_SIZE) {
            self.facing = random_direction(rng);
            return false;
        }

        *position = candidate;
        true
    }
}

fn random_direction<R: Rng>(rng: &mut R) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) speed: f32,
    pub(crate) health: u32,
    pub(crate) behavior: EnemyBehavior,
    pub(crate) walk: WalkCycle,
    pub(crate) flash_until: Option<Duration>,
}

impl Enemy {
    pub(crate) fn new(
        id: EnemyId,
        kind: EnemyKind,
        position: Vec2,
        difficulty: Difficulty,
        facing: Direction,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            speed: kind.base_speed() * difficulty.enemy_speed_multiplier(),
            health: kind.max_health(),
            behavior: EnemyBehavior::new(facing),
            walk: WalkCycle::new(WALK_PERIOD),
            flash_until: None,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub(crate) fn is_flashing(&self, now: Duration) -> bool {
        self.flash_until.map_or(false, |deadline| now < deadline)
    }

    /// Runs the behavior controller and the walk animation for one tick.
    pub(crate) fn update<R: Rng>(
        &mut self,
        target: Vec2,
        collision: &CollisionQuery<'_>,
        rng: &mut R,
    ) {
        if !self.is_alive() {
            return;
        }

        let moving = self.behavior.drive(
            &mut self.position,
            self.speed,
            self.kind.chase_range(),
            target,
            collision,
            rng,
        );
        self.walk.advance(moving);
    }

    /// Applies damage, returning `true` when this hit defeated the enemy.
    ///
    /// Dead enemies ignore further damage.
    pub(crate) fn take_damage(&mut self, amount: u32, now: Duration) -> bool {
        if !self.is_alive() {
            return false;
        }

        self.health = self.health.saturating_sub(amount);
        self.flash_until = Some(now.saturating_add(DAMAGE_FLASH));
        !self.is_alive()
    }
}
