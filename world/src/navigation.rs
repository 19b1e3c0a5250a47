//! Breadth-first reachability field over a maze grid.

use std::collections::VecDeque;

use maze_escape_core::{CellCoord, Grid};

const UNREACHABLE: u32 = u32::MAX;

/// Dense step-distance grid seeded from one or more origin cells.
///
/// Distances count 4-connected steps through walkable tiles. Cells the search
/// never reached report no distance, so callers can tell walls and sealed-off
/// pockets apart from traversable tiles. The field also remembers the order in
/// which cells were first reached, which exit placement relies on for
/// deterministic tie-breaking.
#[derive(Clone, Debug, Default)]
pub struct NavigationField {
    width: u32,
    height: u32,
    distances: Vec<u32>,
    visit_order: Vec<CellCoord>,
}

impl NavigationField {
    /// Runs a search from `origin` across the walkable tiles of `grid`.
    #[must_use]
    pub fn from_grid(grid: &Grid, origin: CellCoord) -> Self {
        let mut field = Self::default();
        field.rebuild_with(grid.width(), grid.height(), &[origin], |cell| {
            !grid.is_walkable(cell)
        });
        field
    }

    /// Rebuilds the distances using a breadth-first search from `origins`.
    pub fn rebuild_with<F>(
        &mut self,
        width: u32,
        height: u32,
        origins: &[CellCoord],
        mut is_blocked: F,
    ) where
        F: FnMut(CellCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        self.width = width;
        self.height = height;
        self.visit_order.clear();

        if cell_count == 0 {
            self.distances.clear();
            return;
        }

        if self.distances.len() != cell_count {
            self.distances = vec![UNREACHABLE; cell_count];
        } else {
            self.distances.fill(UNREACHABLE);
        }

        let mut queue = VecDeque::new();

        for &origin in origins {
            if is_blocked(origin) {
                continue;
            }

            let Some(index) = index(width_usize, height_usize, origin) else {
                continue;
            };
            if self.distances[index] == 0 {
                continue;
            }

            self.distances[index] = 0;
            queue.push_back(origin);
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = index(width_usize, height_usize, cell) else {
                continue;
            };
            self.visit_order.push(cell);
            let next_distance = self.distances[current_index].saturating_add(1);

            for neighbor in neighbors(cell, width, height) {
                if is_blocked(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = index(width_usize, height_usize, neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Width of the field in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the field in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Step distance to the cell, or `None` when it was never reached.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        let width = usize::try_from(self.width).ok()?;
        let height = usize::try_from(self.height).ok()?;
        index(width, height, cell)
            .and_then(|offset| self.distances.get(offset).copied())
            .filter(|distance| *distance != UNREACHABLE)
    }

    /// Reports whether the search reached the cell.
    #[must_use]
    pub fn is_reachable(&self, cell: CellCoord) -> bool {
        self.distance(cell).is_some()
    }

    /// Reached cells in the order the search first dequeued them.
    #[must_use]
    pub fn visit_order(&self) -> &[CellCoord] {
        &self.visit_order
    }

    /// Largest distance recorded by the search, or zero when nothing was reached.
    #[must_use]
    pub fn max_distance(&self) -> u32 {
        self.visit_order
            .last()
            .and_then(|cell| self.distance(*cell))
            .unwrap_or(0)
    }
}

fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, height: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    if column >= width || row >= height {
        return None;
    }
    row.checked_mul(width)?.checked_add(column)
}
