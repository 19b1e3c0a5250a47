//! Tile storage for a single maze.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCoord;

/// Semantic content of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Impassable tile.
    Wall,
    /// Empty walkable tile.
    Path,
    /// Tile the player spawns on.
    Start,
    /// Tile that ends the session when the player reaches it.
    Exit,
    /// Walkable tile holding a treasure pickup.
    Treasure,
    /// Walkable tile holding a life potion pickup.
    LifePotion,
}

impl TileKind {
    /// Reports whether entities may occupy the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// ASCII glyph used by the textual grid format.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Path => '.',
            Self::Start => 'S',
            Self::Exit => 'E',
            Self::Treasure => 'T',
            Self::LifePotion => 'L',
        }
    }

    /// Resolves a glyph produced by [`TileKind::glyph`].
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' => Some(Self::Wall),
            '.' => Some(Self::Path),
            'S' => Some(Self::Start),
            'E' => Some(Self::Exit),
            'T' => Some(Self::Treasure),
            'L' => Some(Self::LifePotion),
            _ => None,
        }
    }
}

/// Errors raised when a grid violates its structural invariants.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The textual description contained no tiles.
    #[error("grid has no tiles")]
    Empty,
    /// The textual description does not fit in 32-bit dimensions.
    #[error("grid dimensions exceed the supported range")]
    TooLarge,
    /// A textual row has a different length from the first row.
    #[error("row {row} does not match the width of the first row")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
    },
    /// A textual row contains a glyph that does not name a tile.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Glyph that failed to parse.
        glyph: char,
        /// Column of the glyph.
        column: u32,
        /// Row of the glyph.
        row: u32,
    },
    /// Stored tiles disagree with the declared dimensions.
    #[error("{width}x{height} grid stores {tiles} tiles")]
    DimensionMismatch {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Number of stored tiles.
        tiles: usize,
    },
    /// No tile is marked as the start.
    #[error("grid has no start tile")]
    MissingStart,
    /// More than one tile is marked as the start.
    #[error("grid has more than one start tile")]
    DuplicateStart,
    /// No tile is marked as the exit.
    #[error("grid has no exit tile")]
    MissingExit,
    /// More than one tile is marked as the exit.
    #[error("grid has more than one exit tile")]
    DuplicateExit,
    /// The recorded start or exit cell does not hold the matching tile.
    #[error("recorded start or exit does not match the stored tiles")]
    MarkerMismatch,
    /// The remaining pickup lists disagree with the stored tiles.
    #[error("pickup tracking disagrees with the stored tiles")]
    PickupMismatch,
}

/// Fixed-size, row-major tile storage with start, exit and pickup tracking.
///
/// Every write goes through [`Grid::set_tile`], which keeps the recorded start
/// and exit cells and the remaining treasure and potion lists in step with the
/// tiles themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<TileKind>,
    start: Option<CellCoord>,
    exit: Option<CellCoord>,
    treasures: Vec<CellCoord>,
    life_potions: Vec<CellCoord>,
}

impl Grid {
    /// Creates a grid where every tile is a wall.
    #[must_use]
    pub fn walled(width: u32, height: u32) -> Self {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        Self {
            width,
            height,
            tiles: vec![TileKind::Wall; cell_count],
            start: None,
            exit: None,
            treasures: Vec::new(),
            life_potions: Vec::new(),
        }
    }

    /// Parses the ASCII format produced by the [`fmt::Display`] implementation.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, GridError> {
        let Some(first) = rows.first() else {
            return Err(GridError::Empty);
        };
        let width = u32::try_from(first.chars().count()).map_err(|_| GridError::TooLarge)?;
        let height = u32::try_from(rows.len()).map_err(|_| GridError::TooLarge)?;
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut grid = Self::walled(width, height);
        for (row, line) in (0..height).zip(rows) {
            if line.chars().count() != first.chars().count() {
                return Err(GridError::RaggedRow { row });
            }

            for (column, glyph) in (0..width).zip(line.chars()) {
                let kind = TileKind::from_glyph(glyph).ok_or(GridError::UnknownGlyph {
                    glyph,
                    column,
                    row,
                })?;
                match kind {
                    TileKind::Start if grid.start.is_some() => {
                        return Err(GridError::DuplicateStart)
                    }
                    TileKind::Exit if grid.exit.is_some() => return Err(GridError::DuplicateExit),
                    _ => {}
                }
                let _ = grid.set_tile(CellCoord::new(column, row), kind);
            }
        }

        Ok(grid)
    }

    /// Width of the grid in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    /// Cell holding the start tile, if one has been marked.
    #[must_use]
    pub const fn start(&self) -> Option<CellCoord> {
        self.start
    }

    /// Cell holding the exit tile, if one has been marked.
    #[must_use]
    pub const fn exit(&self) -> Option<CellCoord> {
        self.exit
    }

    /// Treasure cells that have not been collected yet.
    #[must_use]
    pub fn treasures(&self) -> &[CellCoord] {
        &self.treasures
    }

    /// Life potion cells that have not been collected yet.
    #[must_use]
    pub fn life_potions(&self) -> &[CellCoord] {
        &self.life_potions
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Reports whether the cell lies inside the grid and off the border.
    #[must_use]
    pub const fn is_interior(&self, cell: CellCoord) -> bool {
        cell.column() > 0
            && cell.row() > 0
            && cell.column() < self.width.saturating_sub(1)
            && cell.row() < self.height.saturating_sub(1)
    }

    /// Tile stored at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether the cell exists and is not a wall.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.tile(cell).map_or(false, TileKind::is_walkable)
    }

    /// In-bounds 4-connected neighbors of a cell.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let mut candidates = [None; 4];
        let mut count = 0;

        if let Some(row) = cell.row().checked_sub(1) {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }

        if let Some(column) = cell.column().checked_add(1) {
            if column < self.width {
                candidates[count] = Some(CellCoord::new(column, cell.row()));
                count += 1;
            }
        }

        if let Some(row) = cell.row().checked_add(1) {
            if row < self.height {
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

    /// Number of 4-connected neighbors holding exactly the provided tile kind.
    #[must_use]
    pub fn count_neighbors(&self, cell: CellCoord, kind: TileKind) -> usize {
        self.neighbors(cell)
            .filter(|neighbor| self.tile(*neighbor) == Some(kind))
            .count()
    }

    /// Every cell paired with its tile, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, TileKind)> + '_ {
        let width = self.width;
        (0..self.height)
            .flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
            .zip(self.tiles.iter().copied())
    }

    /// Number of tiles holding the provided kind.
    #[must_use]
    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| **tile == kind).count()
    }

    /// Overwrites a tile, returning the previous kind or `None` outside the grid.
    ///
    /// Marking a second start or exit demotes the previous one to a path tile.
    pub fn set_tile(&mut self, cell: CellCoord, kind: TileKind) -> Option<TileKind> {
        let index = self.index(cell)?;
        let previous = self.tiles.get(index).copied()?;
        if previous == kind {
            return Some(previous);
        }

        self.forget(cell, previous);
        match kind {
            TileKind::Start => {
                if let Some(old) = self.start.replace(cell) {
                    self.reset_to_path(old);
                }
            }
            TileKind::Exit => {
                if let Some(old) = self.exit.replace(cell) {
                    self.reset_to_path(old);
                }
            }
            TileKind::Treasure => self.treasures.push(cell),
            TileKind::LifePotion => self.life_potions.push(cell),
            TileKind::Wall | TileKind::Path => {}
        }

        if let Some(tile) = self.tiles.get_mut(index) {
            *tile = kind;
        }
        Some(previous)
    }

    /// Consumes the treasure at the cell, returning whether one was present.
    pub fn collect_treasure(&mut self, cell: CellCoord) -> bool {
        self.collect(cell, TileKind::Treasure)
    }

    /// Consumes the life potion at the cell, returning whether one was present.
    pub fn collect_life_potion(&mut self, cell: CellCoord) -> bool {
        self.collect(cell, TileKind::LifePotion)
    }

    /// Checks the structural invariants every playable grid satisfies.
    ///
    /// Reachability of the exit is a graph property and is verified by the
    /// world's navigation field instead.
    pub fn validate(&self) -> Result<(), GridError> {
        let expected = usize::try_from(self.width)
            .ok()
            .and_then(|width| width.checked_mul(usize::try_from(self.height).ok()?));
        if expected != Some(self.tiles.len()) {
            return Err(GridError::DimensionMismatch {
                width: self.width,
                height: self.height,
                tiles: self.tiles.len(),
            });
        }

        match self.count(TileKind::Start) {
            0 => return Err(GridError::MissingStart),
            1 => {}
            _ => return Err(GridError::DuplicateStart),
        }
        match self.count(TileKind::Exit) {
            0 => return Err(GridError::MissingExit),
            1 => {}
            _ => return Err(GridError::DuplicateExit),
        }

        let start_matches = self
            .start
            .map_or(false, |cell| self.tile(cell) == Some(TileKind::Start));
        let exit_matches = self
            .exit
            .map_or(false, |cell| self.tile(cell) == Some(TileKind::Exit));
        if !start_matches || !exit_matches {
            return Err(GridError::MarkerMismatch);
        }

        if !self.tracks(&self.treasures, TileKind::Treasure)
            || !self.tracks(&self.life_potions, TileKind::LifePotion)
        {
            return Err(GridError::PickupMismatch);
        }

        Ok(())
    }

    fn collect(&mut self, cell: CellCoord, kind: TileKind) -> bool {
        if self.tile(cell) != Some(kind) {
            return false;
        }

        let _ = self.set_tile(cell, TileKind::Path);
        true
    }

    fn tracks(&self, tracked: &[CellCoord], kind: TileKind) -> bool {
        let mut recorded = tracked.to_vec();
        recorded.sort_unstable_by_key(|cell| (cell.row(), cell.column()));
        let actual: Vec<CellCoord> = self
            .cells()
            .filter(|(_, tile)| *tile == kind)
            .map(|(cell, _)| cell)
            .collect();
        recorded == actual
    }

    fn forget(&mut self, cell: CellCoord, previous: TileKind) {
        match previous {
            TileKind::Start if self.start == Some(cell) => self.start = None,
            TileKind::Exit if self.exit == Some(cell) => self.exit = None,
            TileKind::Treasure => self.treasures.retain(|tracked| *tracked != cell),
            TileKind::LifePotion => self.life_potions.retain(|tracked| *tracked != cell),
            _ => {}
        }
    }

    fn reset_to_path(&mut self, cell: CellCoord) {
        if let Some(tile) = self.index(cell).and_then(|index| self.tiles.get_mut(index)) {
            *tile = TileKind::Path;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::try_from(self.width).map_err(|_| fmt::Error)?;
        if width == 0 {
            return Ok(());
        }

        for row in self.tiles.chunks(width) {
            for tile in row {
                write!(f, "{}", tile.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
