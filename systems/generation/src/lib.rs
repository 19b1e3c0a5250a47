#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic maze generation system.
//!
//! A maze is carved as a perfect maze on a step-2 lattice, reshaped by a
//! difficulty-dependent mutation pass, and then furnished with a start, an
//! exit and pickups. The same seed always yields the same grid.

use maze_escape_core::{CellCoord, Difficulty, GenerationError, Grid, TileKind};
use maze_escape_world::NavigationField;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const START: CellCoord = CellCoord::new(1, 1);
const LATTICE_STEPS: [(i64, i64); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

/// Tunables controlling how a maze is mutated and furnished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationConfig {
    /// Chance that an eligible wall is opened on easy mazes.
    pub shortcut_chance: f64,
    /// Chance that a path tile is tentatively walled on hard mazes.
    pub extra_wall_chance: f64,
    /// Share of the farthest distance an exit candidate must reach.
    pub exit_distance_ratio: f64,
    /// One treasure is placed per this many tiles, with a minimum of one.
    pub tiles_per_treasure: u32,
    /// Sampling attempts allowed for each treasure.
    pub treasure_attempts: u32,
    /// Sampling attempts allowed for all life potions together.
    pub potion_attempts: u32,
    /// Minimum Manhattan distance between a pickup and both the start and the exit.
    pub pickup_clearance: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            shortcut_chance: 0.15,
            extra_wall_chance: 0.08,
            exit_distance_ratio: 0.7,
            tiles_per_treasure: 30,
            treasure_attempts: 100,
            potion_attempts: 200,
            pickup_clearance: 4,
        }
    }
}

/// Builds playable grids from a size, a difficulty and a seed.
#[derive(Clone, Debug, Default)]
pub struct MazeGenerator {
    config: GenerationConfig,
}

impl MazeGenerator {
    /// Creates a generator using the supplied tunables.
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Generates a maze whose exit is reachable from the start at (1, 1).
    ///
    /// Fails when the grid cannot hold a bordered maze, or when carving
    /// leaves the start as the only open cell.
    ///
    /// Hard mazes verify reachability after every extra wall, which dominates
    /// the running time on large grids.
    pub fn generate(
        &self,
        width: u32,
        height: u32,
        difficulty: Difficulty,
        seed: u64,
    ) -> Result<Grid, GenerationError> {
        if width < 3 || height < 3 {
            return Err(GenerationError::GridTooSmall { width, height });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = Grid::walled(width, height);

        carve(&mut grid, &mut rng);
        match difficulty {
            Difficulty::Easy => self.open_shortcuts(&mut grid, &mut rng),
            Difficulty::Medium => {}
            Difficulty::Hard => self.add_walls(&mut grid, &mut rng),
        }

        let _ = grid.set_tile(START, TileKind::Start);
        let exit = self
            .choose_exit(&grid)
            .ok_or(GenerationError::NoExitCandidate { width, height })?;
        let _ = grid.set_tile(exit, TileKind::Exit);

        let tiles = u64::from(width) * u64::from(height);
        let treasure_target =
            usize::try_from(tiles / u64::from(self.config.tiles_per_treasure.max(1)))
                .unwrap_or(usize::MAX)
                .max(1);
        let treasures = self.place_treasures(&mut grid, treasure_target, exit, &mut rng);
        if treasures < treasure_target {
            log::warn!("placed {treasures} of {treasure_target} treasures");
        }

        let potion_target = difficulty.life_potion_count();
        let potions = self.place_life_potions(&mut grid, potion_target, exit, &mut rng);
        if potions < potion_target {
            log::warn!("placed {potions} of {potion_target} life potions");
        }

        log::debug!(
            "generated {width}x{height} {difficulty:?} maze from seed {seed}: exit {exit:?}, {} open tiles",
            grid.tiles().len() - grid.count(TileKind::Wall)
        );

        Ok(grid)
    }

    fn open_shortcuts(&self, grid: &mut Grid, rng: &mut ChaCha8Rng) {
        for cell in interior_cells(grid) {
            if grid.tile(cell) != Some(TileKind::Wall) {
                continue;
            }

            if rng.gen_bool(self.config.shortcut_chance)
                && grid.count_neighbors(cell, TileKind::Path) <= 1
            {
                let _ = grid.set_tile(cell, TileKind::Path);
            }
        }
    }

    /// Closes random path cells while the farthest cell stays reachable.
    ///
    /// Every sampled candidate reruns a full breadth-first search, so the cost
    /// grows roughly with the square of the cell count. Grids a few hundred
    /// tiles wide take minutes in unoptimized builds.
    fn add_walls(&self, grid: &mut Grid, rng: &mut ChaCha8Rng) {
        let field = NavigationField::from_grid(grid, START);
        let Some(placeholder) = farthest(&field) else {
            return;
        };
        if placeholder == START {
            return;
        }

        for cell in interior_cells(grid) {
            if cell == START || cell == placeholder || grid.tile(cell) != Some(TileKind::Path) {
                continue;
            }

            if !rng.gen_bool(self.config.extra_wall_chance) {
                continue;
            }

            let _ = grid.set_tile(cell, TileKind::Wall);
            if !NavigationField::from_grid(grid, START).is_reachable(placeholder) {
                let _ = grid.set_tile(cell, TileKind::Path);
            }
        }
    }

    fn choose_exit(&self, grid: &Grid) -> Option<CellCoord> {
        let field = NavigationField::from_grid(grid, START);
        let max_distance = field.max_distance();
        if max_distance == 0 {
            return None;
        }

        let min_distance = grid.width().min(grid.height()) / 3;
        let threshold = f64::from(max_distance) * self.config.exit_distance_ratio;

        let mut candidates: Vec<(CellCoord, u32)> = field
            .visit_order()
            .iter()
            .filter_map(|&cell| field.distance(cell).map(|distance| (cell, distance)))
            .filter(|&(cell, distance)| {
                grid.tile(cell) == Some(TileKind::Path)
                    && distance >= min_distance
                    && f64::from(distance) >= threshold
                    && (near_edge(grid, cell) || grid.count_neighbors(cell, TileKind::Path) <= 1)
            })
            .collect();
        candidates.sort_by(|left, right| right.1.cmp(&left.1));

        if let Some(&(cell, _)) = candidates.get(2_usize.min(candidates.len().saturating_sub(1))) {
            return Some(cell);
        }

        farthest(&field).filter(|cell| *cell != START)
    }

    fn place_treasures(
        &self,
        grid: &mut Grid,
        target: usize,
        exit: CellCoord,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let mut placed = 0;
        for _ in 0..target {
            for _ in 0..self.config.treasure_attempts {
                let cell = random_interior_cell(grid, rng);
                if self.accepts_pickup(grid, cell, exit) {
                    let _ = grid.set_tile(cell, TileKind::Treasure);
                    placed += 1;
                    break;
                }
            }
        }
        placed
    }

    fn place_life_potions(
        &self,
        grid: &mut Grid,
        target: usize,
        exit: CellCoord,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let mut placed = 0;
        let mut attempts = 0;
        while placed < target && attempts < self.config.potion_attempts {
            attempts += 1;
            let cell = random_interior_cell(grid, rng);
            if self.accepts_pickup(grid, cell, exit) {
                let _ = grid.set_tile(cell, TileKind::LifePotion);
                placed += 1;
            }
        }
        placed
    }

    fn accepts_pickup(&self, grid: &Grid, cell: CellCoord, exit: CellCoord) -> bool {
        grid.tile(cell) == Some(TileKind::Path)
            && cell.manhattan_distance(START) >= self.config.pickup_clearance
            && cell.manhattan_distance(exit) >= self.config.pickup_clearance
    }
}

/// Generates a maze with the default tunables.
pub fn generate(
    width: u32,
    height: u32,
    difficulty: Difficulty,
    seed: u64,
) -> Result<Grid, GenerationError> {
    MazeGenerator::default().generate(width, height, difficulty, seed)
}

/// Carves a perfect maze from the start cell with an explicit depth-first stack.
fn carve(grid: &mut Grid, rng: &mut ChaCha8Rng) {
    struct Frame {
        cell: CellCoord,
        steps: [(i64, i64); 4],
        next: usize,
    }

    let _ = grid.set_tile(START, TileKind::Path);
    let mut stack = vec![Frame {
        cell: START,
        steps: shuffled_steps(rng),
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(&(dx, dy)) = frame.steps.get(frame.next) else {
            let _ = stack.pop();
            continue;
        };
        frame.next += 1;
        let from = frame.cell;

        let Some(target) = offset(from, dx, dy) else {
            continue;
        };
        if !grid.is_interior(target) || grid.tile(target) != Some(TileKind::Wall) {
            continue;
        }

        if let Some(between) = offset(from, dx / 2, dy / 2) {
            let _ = grid.set_tile(between, TileKind::Path);
        }
        let _ = grid.set_tile(target, TileKind::Path);
        stack.push(Frame {
            cell: target,
            steps: shuffled_steps(rng),
            next: 0,
        });
    }
}

fn shuffled_steps(rng: &mut ChaCha8Rng) -> [(i64, i64); 4] {
    let mut steps = LATTICE_STEPS;
    steps.shuffle(rng);
    steps
}

fn offset(cell: CellCoord, dx: i64, dy: i64) -> Option<CellCoord> {
    let column = u32::try_from(i64::from(cell.column()) + dx).ok()?;
    let row = u32::try_from(i64::from(cell.row()) + dy).ok()?;
    Some(CellCoord::new(column, row))
}

fn interior_cells(grid: &Grid) -> Vec<CellCoord> {
    let width = grid.width();
    (1..grid.height().saturating_sub(1))
        .flat_map(|row| (1..width.saturating_sub(1)).map(move |column| CellCoord::new(column, row)))
        .collect()
}

fn random_interior_cell(grid: &Grid, rng: &mut ChaCha8Rng) -> CellCoord {
    let column = rng.gen_range(1..grid.width() - 1);
    let row = rng.gen_range(1..grid.height() - 1);
    CellCoord::new(column, row)
}

fn near_edge(grid: &Grid, cell: CellCoord) -> bool {
    cell.column() <= 2
        || cell.row() <= 2
        || cell.column() >= grid.width().saturating_sub(3)
        || cell.row() >= grid.height().saturating_sub(3)
}

/// First cell reached at the greatest distance.
fn farthest(field: &NavigationField) -> Option<CellCoord> {
    let max_distance = field.max_distance();
    field
        .visit_order()
        .iter()
        .copied()
        .find(|cell| field.distance(*cell) == Some(max_distance))
}
