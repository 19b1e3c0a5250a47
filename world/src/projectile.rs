//! Projectiles thrown by the player.

use glam::Vec2;
use maze_escape_core::{Direction, ProjectileKind};
use serde::{Deserialize, Serialize};

use crate::collision::CollisionQuery;

/// Distance a projectile travels every tick.
pub(crate) const PROJECTILE_SPEED: f32 = 8.0;

/// Offset from the thrower's center to the projectile's top-left corner.
pub(crate) const LAUNCH_OFFSET: Vec2 = Vec2::new(-16.0, -16.0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Projectile {
    pub(crate) kind: ProjectileKind,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) active: bool,
}

impl Projectile {
    /// Launches a projectile along a facing.
    pub(crate) fn along(kind: ProjectileKind, position: Vec2, facing: Direction) -> Self {
        Self::launch(kind, position, facing.unit_vector() * PROJECTILE_SPEED)
    }

    /// Launches a projectile toward a point. A zero-length aim fires right.
    pub(crate) fn toward(kind: ProjectileKind, position: Vec2, target: Vec2) -> Self {
        let direction = (target - position).normalize_or_zero();
        let direction = if direction == Vec2::ZERO {
            Direction::Right.unit_vector()
        } else {
            direction
        };
        Self::launch(kind, position, direction * PROJECTILE_SPEED)
    }

    fn launch(kind: ProjectileKind, position: Vec2, velocity: Vec2) -> Self {
        Self {
            kind,
            position,
            velocity,
            active: true,
        }
    }

    /// Moves the projectile and deactivates it after leaving the maze or striking a wall.
    pub(crate) fn advance(&mut self, collision: &CollisionQuery<'_>, extent: Vec2) {
        if !self.active {
            return;
        }

        self.position += self.velocity;

        let size = self.kind.size();
        let probe = self.kind.wall_probe_size();
        let probe_position = self.position + (size - probe) * 0.5;
        let out_of_bounds = self.position.x < 0.0
            || self.position.y < 0.0
            || self.position.x > extent.x
            || self.position.y > extent.y;

        if out_of_bounds || collision.is_blocked(probe_position, probe) {
            self.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::Grid;

    fn open_room() -> Grid {
        Grid::from_ascii(&["#######", "#.....#", "#.....#", "#.....#", "#######"]).expect("grid")
    }

    #[test]
    fn targeted_throw_normalizes_velocity() {
        let projectile = Projectile::toward(
            ProjectileKind::Melee,
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 400.0),
        );
        assert_eq!(projectile.velocity, Vec2::new(0.0, PROJECTILE_SPEED));
    }

    #[test]
    fn zero_length_aim_fires_right() {
        let origin = Vec2::new(50.0, 50.0);
        let projectile = Projectile::toward(ProjectileKind::Ranged, origin, origin);
        assert_eq!(projectile.velocity, Vec2::new(PROJECTILE_SPEED, 0.0));
    }

    #[test]
    fn projectile_stops_at_walls() {
        let grid = open_room();
        let query = CollisionQuery::new(&grid);
        let extent = Vec2::new(7.0 * 64.0, 5.0 * 64.0);
        let mut projectile =
            Projectile::along(ProjectileKind::Melee, Vec2::new(80.0, 80.0), Direction::Right);

        let mut ticks = 0;
        while projectile.active && ticks < 100 {
            projectile.advance(&query, extent);
            ticks += 1;
        }

        assert!(!projectile.active);
        assert!(projectile.position.x + 32.0 > 6.0 * 64.0);
    }

    #[test]
    fn ranged_projectile_uses_the_smaller_wall_probe() {
        let grid = open_room();
        let query = CollisionQuery::new(&grid);
        let extent = Vec2::new(7.0 * 64.0, 5.0 * 64.0);
        let mut projectile = Projectile::along(
            ProjectileKind::Ranged,
            Vec2::new(48.0, 64.0 - PROJECTILE_SPEED),
            Direction::Down,
        );

        projectile.advance(&query, extent);
        assert!(projectile.active);
        assert!(query.is_blocked(projectile.position, ProjectileKind::Ranged.size()));
    }
}
