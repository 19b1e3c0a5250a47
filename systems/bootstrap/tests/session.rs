use std::time::Duration;

use glam::Vec2;
use maze_escape_core::{
    Aim, CellCoord, CharacterKind, Difficulty, Direction, Event, Grid, InputState,
    SessionOutcome, TileKind, Upgrade, DEFAULT_TICK,
};
use maze_escape_system_bootstrap::{Bootstrap, SessionConfig};
use maze_escape_world::{query, spawn_position, NavigationField, World};

const NO_ENEMIES: SessionConfig = SessionConfig {
    enemy_count: Some(0),
    seed: 7,
};

fn solution_path(grid: &Grid) -> Vec<CellCoord> {
    let start = grid.start().expect("start");
    let exit = grid.exit().expect("exit");
    let field = NavigationField::from_grid(grid, exit);

    let mut path = vec![start];
    let mut current = start;
    while current != exit {
        let distance = field.distance(current).expect("cell on the path is reachable");
        current = grid
            .neighbors(current)
            .find(|neighbor| field.distance(*neighbor) == Some(distance - 1))
            .expect("path continues toward the exit");
        path.push(current);
    }
    path
}

fn direction_between(from: CellCoord, to: CellCoord) -> Direction {
    match (
        i64::from(to.column()) - i64::from(from.column()),
        i64::from(to.row()) - i64::from(from.row()),
    ) {
        (1, 0) => Direction::Right,
        (-1, 0) => Direction::Left,
        (0, 1) => Direction::Down,
        (0, -1) => Direction::Up,
        other => panic!("cells are not adjacent: {other:?}"),
    }
}

fn walk(bootstrap: &Bootstrap, world: &mut World, path: &[CellCoord]) -> Vec<Event> {
    let mut events = Vec::new();
    for pair in path.windows(2) {
        let input = InputState::holding(direction_between(pair[0], pair[1]));
        let target = spawn_position(pair[1]);
        let mut ticks = 0;
        while query::player(world).position != target && query::outcome(world).is_none() {
            events.extend(bootstrap.step(world, input, DEFAULT_TICK));
            ticks += 1;
            assert!(ticks <= 32, "player got stuck walking toward {:?}", pair[1]);
        }
        if query::outcome(world).is_some() {
            break;
        }
    }
    events
}

#[test]
fn scripted_walk_along_the_unique_path_wins() {
    let bootstrap = Bootstrap::default();

    for seed in 0..10 {
        let grid = bootstrap
            .generate_maze(7, 7, Difficulty::Medium, seed)
            .expect("maze");
        let path = solution_path(&grid);
        let treasures_on_path = path
            .iter()
            .filter(|cell| grid.tile(**cell) == Some(TileKind::Treasure))
            .count();
        let potions_on_path = path
            .iter()
            .filter(|cell| grid.tile(**cell) == Some(TileKind::LifePotion))
            .count();

        let mut world = bootstrap
            .create_session(grid, CharacterKind::default(), Difficulty::Medium, &NO_ENEMIES)
            .expect("session");
        assert!(query::enemy_view(&world).is_empty());

        let events = walk(&bootstrap, &mut world, &path);

        assert_eq!(
            query::outcome(&world),
            Some(SessionOutcome::Won),
            "seed {seed} did not reach the exit"
        );
        assert!(!query::is_running(&world));
        assert!(events.contains(&Event::SessionEnded {
            outcome: SessionOutcome::Won
        }));

        let collected = events
            .iter()
            .filter(|event| matches!(event, Event::TreasureCollected { .. }))
            .count();
        assert_eq!(collected, treasures_on_path);
        assert_eq!(query::treasures_collected(&world) as usize, treasures_on_path);
        assert_eq!(
            query::score(&world) as usize,
            treasures_on_path * 100 + potions_on_path * 50
        );
        assert_eq!(query::lives(&world) as usize, 3 + potions_on_path);
    }
}

#[test]
fn finished_sessions_ignore_further_ticks() {
    let bootstrap = Bootstrap::default();
    let grid = bootstrap
        .generate_maze(7, 7, Difficulty::Medium, 2)
        .expect("maze");
    let path = solution_path(&grid);
    let mut world = bootstrap
        .create_session(grid, CharacterKind::default(), Difficulty::Medium, &NO_ENEMIES)
        .expect("session");
    let _ = walk(&bootstrap, &mut world, &path);

    let position = query::player(&world).position;
    let events = bootstrap.step(&mut world, InputState::holding(Direction::Left), DEFAULT_TICK);

    assert_eq!(events, vec![Event::TimeAdvanced { dt: DEFAULT_TICK }]);
    assert_eq!(query::player(&world).position, position);
}

#[test]
fn populated_sessions_survive_a_save_and_load() {
    let bootstrap = Bootstrap::default();
    let grid = bootstrap
        .generate_maze(21, 21, Difficulty::Hard, 13)
        .expect("maze");
    let mut world = bootstrap
        .create_session(
            grid,
            CharacterKind::default(),
            Difficulty::Hard,
            &SessionConfig::with_seed(13),
        )
        .expect("session");
    assert!(!query::enemy_view(&world).is_empty());

    for _ in 0..50 {
        let _ = bootstrap.step(&mut world, InputState::IDLE, DEFAULT_TICK);
    }

    let bytes = bootstrap.save(&world).expect("save");
    let mut restored = bootstrap.load(&bytes).expect("load");

    for _ in 0..100 {
        let original = bootstrap.step(&mut world, InputState::IDLE, DEFAULT_TICK);
        let replayed = bootstrap.step(&mut restored, InputState::IDLE, DEFAULT_TICK);
        assert_eq!(original, replayed);
    }
    assert_eq!(world.snapshot(), restored.snapshot());
}

#[test]
fn throws_respect_the_cooldown() {
    let bootstrap = Bootstrap::default();
    let grid = bootstrap
        .generate_maze(15, 15, Difficulty::Easy, 4)
        .expect("maze");
    let mut world = bootstrap
        .create_session(grid, CharacterKind::default(), Difficulty::Easy, &NO_ENEMIES)
        .expect("session");

    let first = bootstrap.throw_projectile(&mut world, Aim::Toward(Vec2::new(900.0, 88.0)));
    assert!(matches!(first.as_slice(), [Event::ProjectileThrown { .. }]));

    let second = bootstrap.throw_projectile(&mut world, Aim::Facing);
    assert!(second.is_empty(), "cooldown should block the second throw");

    for _ in 0..32 {
        let _ = bootstrap.step(&mut world, InputState::IDLE, Duration::from_millis(16));
    }
    let third = bootstrap.throw_projectile(&mut world, Aim::Facing);
    assert!(matches!(third.as_slice(), [Event::ProjectileThrown { .. }]));
}

#[test]
fn paused_sessions_only_advance_the_clock() {
    let bootstrap = Bootstrap::default();
    let grid = bootstrap
        .generate_maze(9, 9, Difficulty::Easy, 6)
        .expect("maze");
    let mut world = bootstrap
        .create_session(grid, CharacterKind::default(), Difficulty::Easy, &NO_ENEMIES)
        .expect("session");

    assert_eq!(
        bootstrap.set_paused(&mut world, true),
        vec![Event::PauseChanged { paused: true }]
    );
    let position = query::player(&world).position;
    for _ in 0..10 {
        let _ = bootstrap.step(&mut world, InputState::holding(Direction::Down), DEFAULT_TICK);
    }

    assert_eq!(query::player(&world).position, position);
    assert_eq!(query::clock(&world), DEFAULT_TICK * 10);
    assert!(bootstrap.set_paused(&mut world, true).is_empty());
}

#[test]
fn upgrades_are_bought_once() {
    let bootstrap = Bootstrap::default();
    let grid = bootstrap
        .generate_maze(9, 9, Difficulty::Medium, 1)
        .expect("maze");
    let mut world = bootstrap
        .create_session(grid, CharacterKind::default(), Difficulty::Medium, &NO_ENEMIES)
        .expect("session");

    let bought = bootstrap.purchase_upgrade(&mut world, Upgrade::LabyrinthMap);
    assert_eq!(
        bought,
        vec![Event::UpgradePurchased {
            upgrade: Upgrade::LabyrinthMap,
            cost: 180
        }]
    );
    assert_eq!(query::shards(&world), 70);
    assert!(query::exploration(&world).is_some());

    let again = bootstrap.purchase_upgrade(&mut world, Upgrade::LabyrinthMap);
    assert!(matches!(again.as_slice(), [Event::PurchaseRejected { .. }]));
    assert_eq!(query::shards(&world), 70);
}
