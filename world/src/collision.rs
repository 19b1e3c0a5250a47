//! Tile-granular collision tests shared by every moving entity.

use glam::Vec2;
use maze_escape_core::{CellCoord, Grid, TileKind, TILE_SIZE};

/// Inset applied to every footprint before it is tested against the tiles.
pub const COLLISION_MARGIN: f32 = 2.0;

/// Read-only view over a grid that answers footprint-versus-tile questions.
#[derive(Clone, Copy, Debug)]
pub struct CollisionQuery<'a> {
    grid: &'a Grid,
}

impl<'a> CollisionQuery<'a> {
    /// Creates a query borrowing the provided grid.
    #[must_use]
    pub const fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Reports whether a footprint placed at `position` touches a wall.
    ///
    /// The footprint is shrunk by [`COLLISION_MARGIN`] on every side, then every
    /// tile spanned by the remaining box is checked. Tiles outside the grid
    /// count as blocked.
    #[must_use]
    pub fn is_blocked(&self, position: Vec2, size: Vec2) -> bool {
        let min = position + Vec2::splat(COLLISION_MARGIN);
        let max = position + size - Vec2::splat(COLLISION_MARGIN);

        let first_column = tile_index(min.x);
        let last_column = tile_index(max.x);
        let first_row = tile_index(min.y);
        let last_row = tile_index(max.y);

        for row in first_row..=last_row {
            for column in first_column..=last_column {
                let Some(cell) = cell_from_indices(column, row) else {
                    return true;
                };
                if !self.grid.is_walkable(cell) {
                    return true;
                }
            }
        }

        false
    }

    /// Cell containing the center of the footprint, or `None` outside the grid.
    #[must_use]
    pub fn cell_at_center(&self, position: Vec2, size: Vec2) -> Option<CellCoord> {
        cell_containing(position + size * 0.5).filter(|cell| self.grid.contains(*cell))
    }

    /// Tile kind under the center of the footprint.
    #[must_use]
    pub fn tile_kind_at_center(&self, position: Vec2, size: Vec2) -> Option<TileKind> {
        self.cell_at_center(position, size)
            .and_then(|cell| self.grid.tile(cell))
    }
}

/// Strict axis-aligned overlap between two footprints.
#[must_use]
pub fn overlaps(a_position: Vec2, a_size: Vec2, b_position: Vec2, b_size: Vec2) -> bool {
    a_position.x < b_position.x + b_size.x
        && b_position.x < a_position.x + a_size.x
        && a_position.y < b_position.y + b_size.y
        && b_position.y < a_position.y + a_size.y
}

/// Cell containing a world-space point, if the point lies at non-negative coordinates.
#[must_use]
pub fn cell_containing(point: Vec2) -> Option<CellCoord> {
    cell_from_indices(tile_index(point.x), tile_index(point.y))
}

fn tile_index(coordinate: f32) -> i64 {
    (coordinate / TILE_SIZE).floor() as i64
}

fn cell_from_indices(column: i64, row: i64) -> Option<CellCoord> {
    let column = u32::try_from(column).ok()?;
    let row = u32::try_from(row).ok()?;
    Some(CellCoord::new(column, row))
}
