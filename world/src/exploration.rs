//! Tiles the player has seen since acquiring the labyrinth map.

use maze_escape_core::CellCoord;
use serde::{Deserialize, Serialize};

/// One flag per grid tile recording whether the player has explored it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationMap {
    width: u32,
    height: u32,
    explored: Vec<bool>,
}

impl ExplorationMap {
    /// Creates a map with nothing explored.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let cells = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            explored: vec![false; cells],
        }
    }

    /// Width of the map in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the map in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell has been explored. Cells outside the map never are.
    #[must_use]
    pub fn is_explored(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.explored.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of explored tiles.
    #[must_use]
    pub fn explored_count(&self) -> usize {
        self.explored.iter().filter(|explored| **explored).count()
    }

    /// Marks the cell and its eight surrounding tiles, clipped to the map.
    pub(crate) fn mark_around(&mut self, cell: CellCoord) {
        let first_row = cell.row().saturating_sub(1);
        let first_column = cell.column().saturating_sub(1);
        for row in first_row..=cell.row().saturating_add(1) {
            for column in first_column..=cell.column().saturating_add(1) {
                if let Some(index) = self.index(CellCoord::new(column, row)) {
                    if let Some(flag) = self.explored.get_mut(index) {
                        *flag = true;
                    }
                }
            }
        }
    }

    pub(crate) fn matches_dimensions(&self, width: u32, height: u32) -> bool {
        self.width == width
            && self.height == height
            && Some(self.explored.len())
                == usize::try_from(u64::from(width) * u64::from(height)).ok()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}
