#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives headless Maze Escape sessions.

mod config;
mod script;
mod session_transfer;

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use maze_escape_core::{
    Aim, CharacterKind, Difficulty, Event, InputState, SessionOutcome, DEFAULT_TICK,
};
use maze_escape_system_bootstrap::{Bootstrap, SessionConfig};
use maze_escape_world::{query, World};

use config::FileConfig;
use script::ScriptStep;

const DEFAULT_WIDTH: u32 = 21;
const DEFAULT_HEIGHT: u32 = 21;
const DEFAULT_DIFFICULTY: u8 = 1;
const DEFAULT_TICKS: u32 = 600;

/// Headless driver for Maze Escape.
#[derive(Debug, Parser)]
#[command(name = "maze-escape", version, about)]
struct Cli {
    /// Optional TOML file providing defaults for maze and session parameters.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Generate a maze and print it as ASCII.
    Generate(MazeArgs),
    /// Run a session and print a summary.
    Simulate(SimulateArgs),
    /// Run a session and print it as a single-line transfer string.
    Export {
        #[command(flatten)]
        simulate: SimulateArgs,
        /// Write the transfer string to a file instead of stdout.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Decode a transfer string and print its summary.
    Import {
        /// Transfer string, or `-` to read it from stdin.
        value: String,
        /// Additional idle ticks to run after importing.
        #[arg(long, default_value_t = 0)]
        ticks: u32,
    },
}

#[derive(Debug, Args)]
struct MazeArgs {
    /// Maze width in tiles.
    #[arg(long)]
    width: Option<u32>,
    /// Maze height in tiles.
    #[arg(long)]
    height: Option<u32>,
    /// Difficulty level: 0 easy, 1 medium, 2 hard.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2))]
    difficulty: Option<u8>,
    /// Seed driving maze generation.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    #[command(flatten)]
    maze: MazeArgs,
    /// Character index.
    #[arg(long)]
    character: Option<u8>,
    /// Number of enemies; defaults to the difficulty's count.
    #[arg(long)]
    enemies: Option<usize>,
    /// Seed driving enemy placement and behaviour.
    #[arg(long)]
    session_seed: Option<u64>,
    /// Ticks to run idle when no script is given.
    #[arg(long, default_value_t = DEFAULT_TICKS)]
    ticks: u32,
    /// Movement script, for example `R16 D32 F W10`.
    #[arg(long)]
    script: Option<String>,
}

#[derive(Debug)]
struct MazeSettings {
    width: u32,
    height: u32,
    difficulty: Difficulty,
    seed: u64,
}

impl MazeSettings {
    fn resolve(args: &MazeArgs, file: &FileConfig) -> Result<Self> {
        let level = args
            .difficulty
            .or(file.maze.difficulty)
            .unwrap_or(DEFAULT_DIFFICULTY);
        Ok(Self {
            width: args.width.or(file.maze.width).unwrap_or(DEFAULT_WIDTH),
            height: args.height.or(file.maze.height).unwrap_or(DEFAULT_HEIGHT),
            difficulty: Difficulty::from_level(level)?,
            seed: args.seed.or(file.maze.seed).unwrap_or_default(),
        })
    }
}

/// Entry point for the Maze Escape command-line interface.
fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let bootstrap = Bootstrap::default();

    match cli.command {
        CliCommand::Generate(args) => {
            let settings = MazeSettings::resolve(&args, &file)?;
            let grid = bootstrap
                .generate_maze(
                    settings.width,
                    settings.height,
                    settings.difficulty,
                    settings.seed,
                )
                .context("failed to generate maze")?;
            print!("{grid}");
        }
        CliCommand::Simulate(args) => {
            let world = simulate(&bootstrap, &args, &file)?;
            print_summary(&world);
        }
        CliCommand::Export { simulate: args, output } => {
            let world = simulate(&bootstrap, &args, &file)?;
            let encoded = session_transfer::encode(&world.snapshot())
                .context("failed to encode session")?;
            match output {
                Some(path) => fs::write(&path, format!("{encoded}\n"))
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{encoded}"),
            }
        }
        CliCommand::Import { value, ticks } => {
            let value = if value == "-" {
                let mut buffer = String::new();
                let _ = io::stdin()
                    .read_to_string(&mut buffer)
                    .context("failed to read transfer string from stdin")?;
                buffer
            } else {
                value
            };
            let snapshot =
                session_transfer::decode(&value).context("failed to import session")?;
            let mut world = World::from_snapshot(snapshot).context("failed to restore session")?;
            for _ in 0..ticks {
                let _ = bootstrap.step(&mut world, InputState::IDLE, DEFAULT_TICK);
            }
            print_summary(&world);
        }
    }

    Ok(())
}

fn simulate(bootstrap: &Bootstrap, args: &SimulateArgs, file: &FileConfig) -> Result<World> {
    let settings = MazeSettings::resolve(&args.maze, file)?;
    let character = CharacterKind::new(args.character.or(file.maze.character).unwrap_or_default())?;
    let session = SessionConfig {
        enemy_count: args.enemies.or(file.session.enemy_count),
        seed: args.session_seed.unwrap_or(file.session.seed),
    };
    let steps = match &args.script {
        Some(script) => script::parse(script).context("failed to parse script")?,
        None => vec![ScriptStep::Hold {
            input: InputState::IDLE,
            ticks: args.ticks,
        }],
    };

    let grid = bootstrap
        .generate_maze(
            settings.width,
            settings.height,
            settings.difficulty,
            settings.seed,
        )
        .context("failed to generate maze")?;
    let mut world = bootstrap
        .create_session(grid, character, settings.difficulty, &session)
        .context("failed to create session")?;

    let mut events = Vec::new();
    for step in steps {
        match step {
            ScriptStep::Hold { input, ticks } => {
                for _ in 0..ticks {
                    events.extend(bootstrap.step(&mut world, input, DEFAULT_TICK));
                }
            }
            ScriptStep::Throw => events.extend(bootstrap.throw_projectile(&mut world, Aim::Facing)),
        }
    }

    for event in &events {
        log::debug!("{event:?}");
    }
    let defeated = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyDefeated { .. }))
        .count();
    log::info!("simulation produced {} events, {defeated} enemies defeated", events.len());

    Ok(world)
}

fn print_summary(world: &World) {
    let grid = query::grid(world);
    let status = match query::outcome(world) {
        Some(SessionOutcome::Won) => "won",
        Some(SessionOutcome::Lost) => "lost",
        None if query::is_paused(world) => "paused",
        None if query::is_running(world) => "running",
        None => "idle",
    };

    println!(
        "maze: {}x{} {:?}",
        grid.width(),
        grid.height(),
        query::difficulty(world)
    );
    println!(
        "status: {status} after {} ticks ({:.2}s)",
        query::tick_index(world),
        query::clock(world).as_secs_f32()
    );
    println!(
        "lives: {}  score: {}  shards: {}  treasures: {}",
        query::lives(world),
        query::score(world),
        query::shards(world),
        query::treasures_collected(world)
    );
    println!(
        "enemies: {}  projectiles: {}",
        query::enemy_view(world).len(),
        query::projectiles(world).len()
    );
}
