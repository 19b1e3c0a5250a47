use maze_escape_core::{CellCoord, Difficulty, GenerationError, Grid, TileKind};
use maze_escape_system_generation::{generate, GenerationConfig, MazeGenerator};
use maze_escape_world::NavigationField;

const DIFFICULTIES: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
const SIZES: [(u32, u32); 6] = [(5, 5), (7, 7), (9, 13), (15, 11), (21, 21), (31, 17)];

fn walkable_count(grid: &Grid) -> usize {
    grid.tiles().iter().filter(|tile| tile.is_walkable()).count()
}

fn walkable_edges(grid: &Grid) -> usize {
    grid.cells()
        .filter(|(_, tile)| tile.is_walkable())
        .map(|(cell, _)| {
            let right = CellCoord::new(cell.column() + 1, cell.row());
            let below = CellCoord::new(cell.column(), cell.row() + 1);
            usize::from(grid.is_walkable(right)) + usize::from(grid.is_walkable(below))
        })
        .sum()
}

#[test]
fn exit_is_reachable_for_every_seed_size_and_difficulty() {
    for (width, height) in SIZES {
        for difficulty in DIFFICULTIES {
            for seed in 0..25 {
                let grid = generate(width, height, difficulty, seed).unwrap_or_else(|error| {
                    panic!("{width}x{height} {difficulty:?} seed {seed} failed: {error}")
                });

                assert_eq!(grid.validate(), Ok(()));
                assert_eq!(grid.count(TileKind::Start), 1);
                assert_eq!(grid.count(TileKind::Exit), 1);
                assert_eq!(grid.start(), Some(CellCoord::new(1, 1)));

                let exit = grid.exit().expect("exit placed");
                let field = NavigationField::from_grid(&grid, CellCoord::new(1, 1));
                assert!(
                    field.is_reachable(exit),
                    "{width}x{height} {difficulty:?} seed {seed} has an unreachable exit"
                );
            }
        }
    }
}

#[test]
fn border_stays_walled() {
    for difficulty in DIFFICULTIES {
        let grid = generate(15, 11, difficulty, 8).expect("maze");
        for (cell, tile) in grid.cells() {
            if grid.is_interior(cell) {
                continue;
            }
            assert_eq!(tile, TileKind::Wall, "border cell {cell:?} is open");
        }
    }
}

#[test]
fn exit_sits_far_from_start() {
    for seed in 0..40 {
        let grid = generate(21, 15, Difficulty::Medium, seed).expect("maze");
        let start = grid.start().expect("start");
        let exit = grid.exit().expect("exit");

        let mut probe = grid.clone();
        let _ = probe.set_tile(exit, TileKind::Path);
        let field = NavigationField::from_grid(&probe, start);
        let exit_distance = field.distance(exit).expect("reachable exit");

        assert!(
            f64::from(exit_distance) >= f64::from(field.max_distance()) * 0.7,
            "seed {seed} exit at distance {exit_distance} of {}",
            field.max_distance()
        );
    }
}

#[test]
fn medium_mazes_are_perfect() {
    for seed in 0..20 {
        let grid = generate(17, 13, Difficulty::Medium, seed).expect("maze");
        assert_eq!(
            walkable_edges(&grid),
            walkable_count(&grid) - 1,
            "seed {seed} carved a loop"
        );
    }
}

#[test]
fn difficulty_only_adds_or_removes_openings() {
    for seed in 0..20 {
        let easy = generate(21, 21, Difficulty::Easy, seed).expect("easy");
        let medium = generate(21, 21, Difficulty::Medium, seed).expect("medium");
        let hard = generate(21, 21, Difficulty::Hard, seed).expect("hard");

        assert!(walkable_count(&easy) >= walkable_count(&medium));
        assert!(walkable_count(&hard) <= walkable_count(&medium));
        for (cell, tile) in hard.cells() {
            if tile.is_walkable() {
                assert!(medium.is_walkable(cell), "hard maze opened {cell:?}");
            }
        }
    }
}

#[test]
fn pickups_keep_their_distance() {
    for difficulty in DIFFICULTIES {
        for seed in 0..15 {
            let grid = generate(21, 21, difficulty, seed).expect("maze");
            let start = grid.start().expect("start");
            let exit = grid.exit().expect("exit");

            assert!(!grid.treasures().is_empty());
            assert!(grid.treasures().len() <= 441 / 30);
            assert!(grid.life_potions().len() <= difficulty.life_potion_count());

            for &cell in grid.treasures().iter().chain(grid.life_potions()) {
                assert!(grid.is_interior(cell));
                assert!(cell.manhattan_distance(start) >= 4);
                assert!(cell.manhattan_distance(exit) >= 4);
            }
        }
    }
}

#[test]
fn generation_is_deterministic_for_a_seed() {
    let first = generate(10, 10, Difficulty::Medium, 42).expect("maze");
    let second = generate(10, 10, Difficulty::Medium, 42).expect("maze");
    assert_eq!(first, second);

    let differs = (0..10).any(|seed| {
        generate(21, 21, Difficulty::Hard, seed).expect("maze")
            != generate(21, 21, Difficulty::Hard, seed + 100).expect("maze")
    });
    assert!(differs, "distinct seeds should yield distinct mazes");
}

#[test]
fn degenerate_sizes_are_rejected() {
    assert_eq!(
        generate(2, 10, Difficulty::Easy, 0),
        Err(GenerationError::GridTooSmall {
            width: 2,
            height: 10
        })
    );
    assert_eq!(
        generate(3, 3, Difficulty::Medium, 0),
        Err(GenerationError::NoExitCandidate {
            width: 3,
            height: 3
        })
    );
    assert_eq!(
        generate(4, 4, Difficulty::Hard, 0),
        Err(GenerationError::NoExitCandidate {
            width: 4,
            height: 4
        })
    );
    assert!(generate(4, 9, Difficulty::Medium, 0).is_ok());
}

#[test]
fn custom_config_can_disable_pickup_spacing() {
    let generator = MazeGenerator::new(GenerationConfig {
        pickup_clearance: 0,
        tiles_per_treasure: 10,
        ..GenerationConfig::default()
    });
    let grid = generator
        .generate(11, 11, Difficulty::Medium, 5)
        .expect("maze");

    assert!(grid.treasures().len() > 1);
    assert_eq!(grid.validate(), Ok(()));
}
