#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Maze Escape.
//!
//! The world owns the maze grid, the player, the enemies and the projectiles.
//! Every mutation flows through [`apply`], and every observation flows through
//! the [`query`] module, so adapters and systems never touch entity state
//! directly.

mod collision;
mod enemy;
mod entity;
mod exploration;
mod navigation;
mod player;
mod projectile;
mod snapshot;

use std::time::Duration;

use glam::Vec2;
use maze_escape_core::{
    Aim, CellCoord, CharacterKind, Command, Difficulty, Direction, EnemyId, EnemyKind, Event,
    Grid, GridError, InputState, ProjectileKind, PurchaseError, SessionError, SessionOutcome,
    TileKind, Upgrade, ACTOR_SIZE, TILE_SIZE,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use enemy::Enemy;
use player::Player;

pub use collision::{cell_containing, overlaps, CollisionQuery, COLLISION_MARGIN};
pub use exploration::ExplorationMap;
pub use navigation::NavigationField;
pub use snapshot::{
    decode_snapshot, encode_snapshot, SessionSnapshot, SnapshotError, SNAPSHOT_MAGIC,
    SNAPSHOT_VERSION,
};

/// Distance the player is pushed away from an enemy that hits them.
const KNOCKBACK_DISTANCE: f32 = 50.0;

/// Represents the authoritative Maze Escape session state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    difficulty: Difficulty,
    player: Player,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    clock: Duration,
    tick_index: u64,
    running: bool,
    paused: bool,
    outcome: Option<SessionOutcome>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a session over the provided grid with the player on the start tile.
    ///
    /// The session stays idle until [`Command::StartSession`] is applied. The
    /// seed drives every random decision the simulation makes afterwards.
    pub fn new(
        grid: Grid,
        character: CharacterKind,
        difficulty: Difficulty,
        seed: u64,
    ) -> Result<Self, SessionError> {
        let start = ensure_playable(&grid)?;

        Ok(Self {
            player: Player::new(character, spawn_position(start)),
            grid,
            difficulty,
            enemies: Vec::new(),
            next_enemy_id: 0,
            clock: Duration::ZERO,
            tick_index: 0,
            running: false,
            paused: false,
            outcome: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    fn extent(&self) -> Vec2 {
        Vec2::new(
            self.grid.width() as f32 * TILE_SIZE,
            self.grid.height() as f32 * TILE_SIZE,
        )
    }

    fn is_active(&self) -> bool {
        self.running && !self.paused && self.player.is_alive()
    }

    fn start_session(&mut self, out_events: &mut Vec<Event>) {
        if self.running || self.outcome.is_some() {
            return;
        }

        let Some(start) = self.grid.start() else {
            return;
        };

        self.player.position = spawn_position(start);
        self.running = true;
        log::info!(
            "session started on a {}x{} {:?} maze with {} enemies",
            self.grid.width(),
            self.grid.height(),
            self.difficulty,
            self.enemies.len()
        );
        out_events.push(Event::SessionStarted {
            position: self.player.position,
        });
    }

    fn tick(&mut self, dt: Duration, input: InputState, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });
        self.player.expire_invulnerability(self.clock);

        if !self.is_active() {
            return;
        }

        let extent = self.extent();
        let collision = CollisionQuery::new(&self.grid);
        self.player.steer(input, &collision);
        self.player.explore(&collision);
        for projectile in &mut self.player.projectiles {
            projectile.advance(&collision, extent);
        }

        self.update_enemies(out_events);
        self.resolve_projectile_hits(out_events);

        self.enemies.retain(Enemy::is_alive);
        self.player.projectiles.retain(|projectile| projectile.active);

        self.collect_pickups(out_events);
        self.resolve_outcome(out_events);
    }

    fn update_enemies(&mut self, out_events: &mut Vec<Event>) {
        let collision = CollisionQuery::new(&self.grid);

        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            enemy.update(self.player.center(), &collision, &mut self.rng);

            if !overlaps(enemy.position, ACTOR_SIZE, self.player.position, ACTOR_SIZE) {
                continue;
            }

            if !self.player.take_hit(self.clock) {
                continue;
            }

            out_events.push(Event::PlayerDamaged {
                enemy: enemy.id,
                lives_remaining: self.player.lives,
            });

            let push = (self.player.position - enemy.position).normalize_or_zero()
                * KNOCKBACK_DISTANCE;
            let candidate = self.player.position + push;
            if !collision.is_blocked(candidate, ACTOR_SIZE) {
                self.player.position = candidate;
            }
        }
    }

    fn resolve_projectile_hits(&mut self, out_events: &mut Vec<Event>) {
        for projectile in self
            .player
            .projectiles
            .iter_mut()
            .filter(|projectile| projectile.active)
        {
            let size = projectile.kind.size();
            let Some(enemy) = self.enemies.iter_mut().find(|enemy| {
                enemy.is_alive() && overlaps(projectile.position, size, enemy.position, ACTOR_SIZE)
            }) else {
                continue;
            };

            projectile.active = false;
            if enemy.take_damage(projectile.kind.damage(), self.clock) {
                let bounty = enemy.kind.kill_bounty();
                self.player.shards += bounty;
                out_events.push(Event::EnemyDefeated {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    bounty,
                });
            } else {
                out_events.push(Event::EnemyDamaged {
                    enemy: enemy.id,
                    health: enemy.health,
                });
            }
        }
    }

    fn collect_pickups(&mut self, out_events: &mut Vec<Event>) {
        let Some(cell) =
            CollisionQuery::new(&self.grid).cell_at_center(self.player.position, ACTOR_SIZE)
        else {
            return;
        };

        if self.grid.collect_treasure(cell) {
            self.player.collect_treasure();
            out_events.push(Event::TreasureCollected { cell });
        }

        if self.grid.collect_life_potion(cell) {
            self.player.collect_life_potion();
            out_events.push(Event::LifePotionCollected { cell });
        }
    }

    fn resolve_outcome(&mut self, out_events: &mut Vec<Event>) {
        let on_exit = CollisionQuery::new(&self.grid)
            .tile_kind_at_center(self.player.position, ACTOR_SIZE)
            == Some(TileKind::Exit);

        if self.player.is_alive() && on_exit {
            self.end_session(SessionOutcome::Won, out_events);
        } else if !self.player.is_alive() {
            self.end_session(SessionOutcome::Lost, out_events);
        }
    }

    fn end_session(&mut self, outcome: SessionOutcome, out_events: &mut Vec<Event>) {
        self.running = false;
        self.outcome = Some(outcome);
        log::info!(
            "session ended: {:?} after {} ticks with score {}",
            outcome,
            self.tick_index,
            self.player.score
        );
        out_events.push(Event::SessionEnded { outcome });
    }

    fn throw_projectile(&mut self, aim: Aim, out_events: &mut Vec<Event>) {
        if !self.is_active() {
            return;
        }

        if let Some(projectile) = self.player.throw(aim, self.clock) {
            out_events.push(Event::ProjectileThrown {
                kind: projectile.kind,
                velocity: projectile.velocity,
            });
        }
    }

    fn purchase(&mut self, upgrade: Upgrade, out_events: &mut Vec<Event>) {
        let cost = upgrade.cost();
        let rejection = if self.player.upgrades.owns(upgrade) {
            Some(PurchaseError::AlreadyOwned)
        } else if self.player.shards < cost {
            Some(PurchaseError::InsufficientShards)
        } else {
            None
        };

        if let Some(reason) = rejection {
            out_events.push(Event::PurchaseRejected { upgrade, reason });
            return;
        }

        self.player.shards -= cost;
        match upgrade {
            Upgrade::SpeedBoost => self.player.upgrades.speed_multiplier = 2.0,
            Upgrade::RangedProjectiles => {
                self.player.upgrades.projectile_kind = ProjectileKind::Ranged;
            }
            Upgrade::LabyrinthMap => {
                self.player.upgrades.has_map = true;
                self.player.exploration =
                    Some(ExplorationMap::new(self.grid.width(), self.grid.height()));
                let collision = CollisionQuery::new(&self.grid);
                self.player.explore(&collision);
            }
        }

        log::info!("purchased {upgrade:?} for {cost} shards");
        out_events.push(Event::UpgradePurchased { upgrade, cost });
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, position: Vec2, out_events: &mut Vec<Event>) {
        if CollisionQuery::new(&self.grid).is_blocked(position, ACTOR_SIZE) {
            log::debug!("ignoring {kind:?} spawn inside a wall at {position}");
            return;
        }

        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        let facing = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        self.enemies
            .push(Enemy::new(id, kind, position, self.difficulty, facing));
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession => world.start_session(out_events),
        Command::Tick { dt, input } => world.tick(dt, input, out_events),
        Command::ThrowProjectile { aim } => world.throw_projectile(aim, out_events),
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PauseChanged { paused });
            }
        }
        Command::PurchaseUpgrade { upgrade } => world.purchase(upgrade, out_events),
        Command::SpawnEnemy { kind, position } => world.spawn_enemy(kind, position, out_events),
    }
}

/// Top-left corner that centers an actor footprint on the provided cell.
#[must_use]
pub fn spawn_position(cell: CellCoord) -> Vec2 {
    cell.center() - ACTOR_SIZE * 0.5
}

fn ensure_playable(grid: &Grid) -> Result<CellCoord, SessionError> {
    grid.validate()?;
    let start = grid.start().ok_or(GridError::MissingStart)?;
    let exit = grid.exit().ok_or(GridError::MissingExit)?;

    if !NavigationField::from_grid(grid, start).is_reachable(exit) {
        return Err(SessionError::UnreachableExit);
    }

    Ok(start)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use maze_escape_core::{
        CharacterKind, Difficulty, Direction, EnemyId, EnemyKind, EnemyMode, Grid,
        ProjectileKind, SessionOutcome, Upgrades,
    };

    use super::{ExplorationMap, World};

    /// Provides read-only access to the maze grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Difficulty the session was created with.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Lives the player has left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.player.lives
    }

    /// Points scored by the player.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.player.score
    }

    /// Shards the player can spend.
    #[must_use]
    pub fn shards(world: &World) -> u32 {
        world.player.shards
    }

    /// Treasures collected so far.
    #[must_use]
    pub fn treasures_collected(world: &World) -> u32 {
        world.player.treasures
    }

    /// Terminal outcome of the session, once it has ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<SessionOutcome> {
        world.outcome
    }

    /// Reports whether the session is running.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.running
    }

    /// Reports whether the simulation is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Simulated time accumulated by ticks.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Tiles revealed by the labyrinth map, when the player owns it.
    #[must_use]
    pub fn exploration(world: &World) -> Option<&ExplorationMap> {
        world.player.exploration.as_ref()
    }

    /// Captures a read-only view of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let player = &world.player;
        PlayerSnapshot {
            character: player.character,
            position: player.position,
            facing: player.facing,
            frame: player.walk.frame(),
            lives: player.lives,
            score: player.score,
            shards: player.shards,
            treasures: player.treasures,
            alive: player.is_alive(),
            invulnerable: player.is_invulnerable(world.clock),
            upgrades: player.upgrades,
        }
    }

    /// Captures a read-only view of the enemies inhabiting the maze.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                position: enemy.position,
                health: enemy.health,
                max_health: enemy.kind.max_health(),
                alive: enemy.is_alive(),
                mode: enemy.behavior.mode(),
                facing: enemy.behavior.facing(),
                frame: enemy.walk.frame(),
                flashing: enemy.is_flashing(world.clock),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Captures the projectiles currently in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .player
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                kind: projectile.kind,
                position: projectile.position,
                velocity: projectile.velocity,
                size: projectile.kind.size(),
            })
            .collect()
    }

    /// Immutable representation of the player used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Character chosen for the session.
        pub character: CharacterKind,
        /// Top-left corner of the player footprint.
        pub position: Vec2,
        /// Direction the player faces.
        pub facing: Direction,
        /// Current walk animation frame.
        pub frame: u8,
        /// Lives left.
        pub lives: u32,
        /// Points scored.
        pub score: u32,
        /// Shards available to spend.
        pub shards: u32,
        /// Treasures collected.
        pub treasures: u32,
        /// Indicates whether the player has lives left.
        pub alive: bool,
        /// Indicates whether the post-hit grace window is running.
        pub invulnerable: bool,
        /// Upgrades owned by the player.
        pub upgrades: Upgrades,
    }

    /// Read-only snapshot describing all enemies within the maze.
    #[derive(Clone, Debug)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured enemy snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Number of enemies captured by the view.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether the view captured no enemies.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single enemy's state used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Unique identifier assigned to the enemy.
        pub id: EnemyId,
        /// Kind of the enemy.
        pub kind: EnemyKind,
        /// Top-left corner of the enemy footprint.
        pub position: Vec2,
        /// Remaining health.
        pub health: u32,
        /// Health the enemy spawned with.
        pub max_health: u32,
        /// Indicates whether the enemy still has health.
        pub alive: bool,
        /// Current behavioral mode.
        pub mode: EnemyMode,
        /// Direction the enemy faces.
        pub facing: Direction,
        /// Current walk animation frame.
        pub frame: u8,
        /// Indicates whether the damage flash is showing.
        pub flashing: bool,
    }

    /// Immutable representation of a projectile in flight.
    #[derive(Clone, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Kind of the projectile.
        pub kind: ProjectileKind,
        /// Top-left corner of the projectile footprint.
        pub position: Vec2,
        /// Distance travelled per tick.
        pub velocity: Vec2,
        /// Footprint of the projectile.
        pub size: Vec2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::{EnemyMode, Upgrades};

    const TICK: Duration = Duration::from_millis(16);

    fn open_room() -> Grid {
        Grid::from_ascii(&[
            "##########",
            "#S.......#",
            "#........#",
            "#........#",
            "#.......E#",
            "##########",
        ])
        .expect("grid")
    }

    fn started(grid: Grid) -> (World, Vec<Event>) {
        let mut world = World::new(grid, CharacterKind::default(), Difficulty::Medium, 11)
            .expect("playable grid");
        let mut events = Vec::new();
        apply(&mut world, Command::StartSession, &mut events);
        (world, events)
    }

    fn tick(world: &mut World, input: InputState) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Tick { dt: TICK, input }, &mut events);
        events
    }

    #[test]
    fn start_session_places_player_on_start_tile() {
        let (world, events) = started(open_room());

        assert_eq!(
            events,
            vec![Event::SessionStarted {
                position: Vec2::new(72.0, 64.0)
            }]
        );
        assert!(query::is_running(&world));
        assert_eq!(query::lives(&world), 3);
        assert_eq!(query::shards(&world), 250);
    }

    #[test]
    fn new_rejects_unreachable_exit() {
        let grid = Grid::from_ascii(&["#######", "#S.#.E#", "#######"]).expect("grid");
        let result = World::new(grid, CharacterKind::default(), Difficulty::Easy, 0);

        assert!(matches!(result, Err(SessionError::UnreachableExit)));
    }

    #[test]
    fn new_rejects_grid_without_exit() {
        let grid = Grid::from_ascii(&["#####", "#S..#", "#####"]).expect("grid");
        let result = World::new(grid, CharacterKind::default(), Difficulty::Easy, 0);

        assert!(matches!(
            result,
            Err(SessionError::InvalidGrid(GridError::MissingExit))
        ));
    }

    #[test]
    fn ticks_before_start_only_advance_the_clock() {
        let mut world = World::new(open_room(), CharacterKind::default(), Difficulty::Medium, 1)
            .expect("playable grid");

        let events = tick(&mut world, InputState::holding(Direction::Right));

        assert_eq!(events, vec![Event::TimeAdvanced { dt: TICK }]);
        assert_eq!(query::player(&world).position, Vec2::new(72.0, 64.0));
        assert_eq!(query::clock(&world), TICK);
    }

    #[test]
    fn paused_world_ignores_input() {
        let (mut world, _) = started(open_room());
        let mut events = Vec::new();
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        assert_eq!(events, vec![Event::PauseChanged { paused: true }]);

        let _ = tick(&mut world, InputState::holding(Direction::Right));
        assert_eq!(query::player(&world).position, Vec2::new(72.0, 64.0));

        apply(&mut world, Command::SetPaused { paused: false }, &mut events);
        let _ = tick(&mut world, InputState::holding(Direction::Right));
        assert_eq!(query::player(&world).position, Vec2::new(76.0, 64.0));
    }

    #[test]
    fn overlapping_enemy_costs_one_life_per_grace_window() {
        let (mut world, _) = started(open_room());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Strong,
                position: Vec2::new(72.0, 64.0),
            },
            &mut events,
        );

        let first = tick(&mut world, InputState::IDLE);
        assert!(first.contains(&Event::PlayerDamaged {
            enemy: EnemyId::new(0),
            lives_remaining: 2,
        }));
        assert!(query::player(&world).invulnerable);

        for _ in 0..124 {
            let _ = tick(&mut world, InputState::IDLE);
            assert_eq!(query::lives(&world), 2);
        }

        let after_window = tick(&mut world, InputState::IDLE);
        assert_eq!(query::lives(&world), 1);
        assert!(after_window.contains(&Event::PlayerDamaged {
            enemy: EnemyId::new(0),
            lives_remaining: 1,
        }));
        assert_eq!(
            query::enemy_view(&world).iter().next().map(|enemy| enemy.mode),
            Some(EnemyMode::Chase)
        );
    }

    #[test]
    fn losing_the_last_life_ends_the_session() {
        let (mut world, _) = started(open_room());
        world.player.lives = 1;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Basic,
                position: Vec2::new(72.0, 64.0),
            },
            &mut events,
        );

        let events = tick(&mut world, InputState::IDLE);

        assert_eq!(
            events.last(),
            Some(&Event::SessionEnded {
                outcome: SessionOutcome::Lost
            })
        );
        assert!(!query::is_running(&world));
        assert!(!query::player(&world).alive);
    }

    #[test]
    fn knockback_pushes_player_away_from_enemy() {
        let (mut world, _) = started(open_room());
        world.player.position = Vec2::new(264.0, 128.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Basic,
                position: Vec2::new(224.0, 128.0),
            },
            &mut events,
        );

        let _ = tick(&mut world, InputState::IDLE);

        let player = query::player(&world);
        assert_eq!(player.lives, 2);
        assert!(player.position.x > 264.0 + 40.0);
        assert_eq!(player.position.y, 128.0);
    }

    #[test]
    fn knockback_into_a_wall_is_rejected() {
        let grid = Grid::from_ascii(&["#####", "#S.E#", "#####"]).expect("grid");
        let (mut world, _) = started(grid);
        let before = query::player(&world).position;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Strong,
                position: Vec2::new(100.0, 64.0),
            },
            &mut events,
        );

        let events = tick(&mut world, InputState::IDLE);

        let player = query::player(&world);
        assert_eq!(player.lives, 2);
        assert_eq!(player.position, before);
        assert_eq!(before, Vec2::new(72.0, 64.0));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::PlayerDamaged { lives_remaining: 2, .. })));
    }

    #[test]
    fn projectiles_defeat_enemies_and_pay_bounty() {
        let (mut world, _) = started(open_room());
        world.player.position = Vec2::new(72.0, 128.0);
        world.player.facing = Direction::Right;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Fast,
                position: Vec2::new(328.0, 128.0),
            },
            &mut events,
        );

        let mut defeated = None;
        for _ in 0..200 {
            let mut events = Vec::new();
            apply(
                &mut world,
                Command::ThrowProjectile { aim: Aim::Facing },
                &mut events,
            );
            events.extend(tick(&mut world, InputState::IDLE));
            if let Some(event) = events
                .into_iter()
                .find(|event| matches!(event, Event::EnemyDefeated { .. }))
            {
                defeated = Some(event);
                break;
            }
        }

        assert_eq!(
            defeated,
            Some(Event::EnemyDefeated {
                enemy: EnemyId::new(0),
                kind: EnemyKind::Fast,
                bounty: 8,
            })
        );
        assert!(query::enemy_view(&world).is_empty());
        assert!(query::shards(&world) >= 258);
    }

    #[test]
    fn throws_are_ignored_while_idle() {
        let mut world = World::new(open_room(), CharacterKind::default(), Difficulty::Hard, 5)
            .expect("playable grid");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ThrowProjectile { aim: Aim::Facing },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn reaching_the_exit_wins() {
        let grid = Grid::from_ascii(&["#####", "#S.E#", "#####"]).expect("grid");
        let (mut world, _) = started(grid);

        let mut outcome = None;
        for _ in 0..64 {
            let events = tick(&mut world, InputState::holding(Direction::Right));
            if let Some(Event::SessionEnded { outcome: ended }) = events.last() {
                outcome = Some(*ended);
                break;
            }
        }

        assert_eq!(outcome, Some(SessionOutcome::Won));
        assert_eq!(query::outcome(&world), Some(SessionOutcome::Won));
    }

    #[test]
    fn pickups_are_collected_once() {
        let grid = Grid::from_ascii(&["######", "#STLE#", "######"]).expect("grid");
        let (mut world, _) = started(grid);

        let mut collected = Vec::new();
        for _ in 0..40 {
            for event in tick(&mut world, InputState::holding(Direction::Right)) {
                match event {
                    Event::TreasureCollected { .. } | Event::LifePotionCollected { .. } => {
                        collected.push(event)
                    }
                    _ => {}
                }
            }
            if query::outcome(&world).is_some() {
                break;
            }
        }

        assert_eq!(
            collected,
            vec![
                Event::TreasureCollected {
                    cell: CellCoord::new(2, 1)
                },
                Event::LifePotionCollected {
                    cell: CellCoord::new(3, 1)
                },
            ]
        );
        assert_eq!(query::score(&world), 150);
        assert_eq!(query::lives(&world), 4);
        assert_eq!(query::treasures_collected(&world), 1);
        assert_eq!(query::outcome(&world), Some(SessionOutcome::Won));
    }

    #[test]
    fn purchases_deduct_shards_once() {
        let (mut world, _) = started(open_room());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PurchaseUpgrade {
                upgrade: Upgrade::LabyrinthMap,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PurchaseUpgrade {
                upgrade: Upgrade::LabyrinthMap,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PurchaseUpgrade {
                upgrade: Upgrade::SpeedBoost,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::UpgradePurchased {
                    upgrade: Upgrade::LabyrinthMap,
                    cost: 180,
                },
                Event::PurchaseRejected {
                    upgrade: Upgrade::LabyrinthMap,
                    reason: PurchaseError::AlreadyOwned,
                },
                Event::PurchaseRejected {
                    upgrade: Upgrade::SpeedBoost,
                    reason: PurchaseError::InsufficientShards,
                },
            ]
        );
        assert_eq!(query::shards(&world), 70);
        assert_eq!(
            query::player(&world).upgrades,
            Upgrades {
                has_map: true,
                ..Upgrades::default()
            }
        );
        let explored = query::exploration(&world).map(ExplorationMap::explored_count);
        assert_eq!(explored, Some(9));
    }

    #[test]
    fn speed_boost_doubles_movement() {
        let (mut world, _) = started(open_room());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PurchaseUpgrade {
                upgrade: Upgrade::SpeedBoost,
            },
            &mut events,
        );

        let _ = tick(&mut world, InputState::holding(Direction::Right));

        assert_eq!(query::shards(&world), 0);
        assert_eq!(query::player(&world).position, Vec2::new(80.0, 64.0));
    }

    #[test]
    fn spawns_inside_walls_are_ignored() {
        let (mut world, _) = started(open_room());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Basic,
                position: Vec2::ZERO,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::enemy_view(&world).is_empty());
    }
}
