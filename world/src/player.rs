//! The player-controlled character.

use std::time::Duration;

use glam::Vec2;
use maze_escape_core::{Aim, CharacterKind, Direction, InputState, Upgrades, ACTOR_SIZE};
use serde::{Deserialize, Serialize};

use crate::{
    collision::CollisionQuery,
    entity::{self, WalkCycle},
    exploration::ExplorationMap,
    projectile::{Projectile, LAUNCH_OFFSET},
};

pub(crate) const BASE_SPEED: f32 = 4.0;
pub(crate) const STARTING_LIVES: u32 = 3;
pub(crate) const STARTING_SHARDS: u32 = 250;
pub(crate) const INVULNERABILITY_WINDOW: Duration = Duration::from_millis(2000);
pub(crate) const THROW_COOLDOWN: Duration = Duration::from_millis(500);
pub(crate) const TREASURE_SCORE: u32 = 100;
pub(crate) const TREASURE_SHARDS: u32 = 10;
pub(crate) const POTION_SCORE: u32 = 50;
const WALK_PERIOD: u32 = 6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Player {
    pub(crate) character: CharacterKind,
    pub(crate) position: Vec2,
    pub(crate) facing: Direction,
    pub(crate) walk: WalkCycle,
    pub(crate) lives: u32,
    pub(crate) treasures: u32,
    pub(crate) score: u32,
    pub(crate) shards: u32,
    pub(crate) invulnerable_until: Option<Duration>,
    pub(crate) last_throw: Option<Duration>,
    pub(crate) upgrades: Upgrades,
    pub(crate) exploration: Option<ExplorationMap>,
    pub(crate) projectiles: Vec<Projectile>,
}

impl Player {
    pub(crate) fn new(character: CharacterKind, position: Vec2) -> Self {
        Self {
            character,
            position,
            facing: Direction::Down,
            walk: WalkCycle::new(WALK_PERIOD),
            lives: STARTING_LIVES,
            treasures: 0,
            score: 0,
            shards: STARTING_SHARDS,
            invulnerable_until: None,
            last_throw: None,
            upgrades: Upgrades::default(),
            exploration: None,
            projectiles: Vec::new(),
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Whether the grace window opened by the last hit is still running at `now`.
    pub(crate) fn is_invulnerable(&self, now: Duration) -> bool {
        self.invulnerable_until.map_or(false, |deadline| now < deadline)
    }

    pub(crate) fn center(&self) -> Vec2 {
        entity::center(self.position, ACTOR_SIZE)
    }

    pub(crate) fn speed(&self) -> f32 {
        BASE_SPEED * self.upgrades.speed_multiplier
    }

    /// Clears the grace window once the clock reaches its deadline.
    pub(crate) fn expire_invulnerability(&mut self, now: Duration) {
        if self.invulnerable_until.map_or(false, |deadline| now >= deadline) {
            self.invulnerable_until = None;
        }
    }

    /// Moves along each held axis independently, vertical first.
    ///
    /// Facing follows the last held key in the order up, down, left, right.
    pub(crate) fn steer(&mut self, input: InputState, collision: &CollisionQuery<'_>) {
        let speed = self.speed();
        let mut delta = Vec2::ZERO;
        let mut moving = false;

        for (held, direction) in [
            (input.up, Direction::Up),
            (input.down, Direction::Down),
            (input.left, Direction::Left),
            (input.right, Direction::Right),
        ] {
            if held {
                delta += direction.unit_vector() * speed;
                self.facing = direction;
                moving = true;
            }
        }

        for step in [Vec2::new(0.0, delta.y), Vec2::new(delta.x, 0.0)] {
            if step == Vec2::ZERO {
                continue;
            }
            let candidate = self.position + step;
            if !collision.is_blocked(candidate, ACTOR_SIZE) {
                self.position = candidate;
            }
        }

        self.walk.advance(moving);
    }

    /// Records the tiles around the player when the map upgrade is owned.
    pub(crate) fn explore(&mut self, collision: &CollisionQuery<'_>) {
        let Some(cell) = collision.cell_at_center(self.position, ACTOR_SIZE) else {
            return;
        };
        if let Some(map) = self.exploration.as_mut() {
            map.mark_around(cell);
        }
    }

    /// Applies a single enemy hit, returning whether a life was lost.
    pub(crate) fn take_hit(&mut self, now: Duration) -> bool {
        if self.is_invulnerable(now) || !self.is_alive() {
            return false;
        }

        self.lives -= 1;
        self.invulnerable_until = Some(now.saturating_add(INVULNERABILITY_WINDOW));
        true
    }

    /// Creates a projectile unless the throw cooldown is still running.
    pub(crate) fn throw(&mut self, aim: Aim, now: Duration) -> Option<&Projectile> {
        let ready = self
            .last_throw
            .map_or(true, |last| now.saturating_sub(last) >= THROW_COOLDOWN);
        if !ready {
            return None;
        }

        let kind = self.upgrades.projectile_kind;
        let origin = self.center() + LAUNCH_OFFSET;
        let projectile = match aim {
            Aim::Facing => Projectile::along(kind, origin, self.facing),
            Aim::Toward(target) => Projectile::toward(kind, origin, target),
        };

        self.last_throw = Some(now);
        self.projectiles.push(projectile);
        self.projectiles.last()
    }

    pub(crate) fn collect_treasure(&mut self) {
        self.treasures += 1;
        self.score += TREASURE_SCORE;
        self.shards += TREASURE_SHARDS;
    }

    pub(crate) fn collect_life_potion(&mut self) {
        self.lives += 1;
        self.score += POTION_SCORE;
    }
}
