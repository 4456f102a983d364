#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the Rail Tycoon track engine.

mod config;
mod layout_transfer;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rail_tycoon_core::{Command, Event, LevelGoal, UpgradeKind};
use rail_tycoon_system_campaign::Campaign;
use rail_tycoon_system_idle::compute_offline_earnings;
use rail_tycoon_system_path::path_length;
use rail_tycoon_world::query;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use layout_transfer::TrackLayoutSnapshot;
use session::Session;

/// Command-line arguments accepted by the binary.
#[derive(Debug, Parser)]
#[command(name = "rail-tycoon", about = "Idle railway track engine")]
struct Cli {
    /// Optional TOML file overriding the game tunables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands exposed by the binary.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the layout string of a ring along the grid border.
    Sample {
        /// Edge length of the square grid.
        #[arg(long, default_value_t = 6)]
        size: u32,
        /// Number of stations placed on the ring.
        #[arg(long, default_value_t = 2)]
        stations: u32,
    },
    /// Validate a layout and report its loop and yield.
    Validate {
        /// Layout string produced by `sample` or a previous session.
        layout: String,
    },
    /// Run a layout for a number of simulated seconds.
    Simulate {
        /// Layout string produced by `sample` or a previous session.
        layout: String,
        /// Simulated seconds to run.
        #[arg(long, default_value_t = 60)]
        seconds: u64,
        /// Train speed upgrades bought before the run.
        #[arg(long, default_value_t = 0)]
        speed_upgrades: u32,
        /// Seconds spent away after the run, credited as offline earnings.
        #[arg(long)]
        away_seconds: Option<u64>,
    },
    /// Play a campaign level, buying a layout on its grid.
    Campaign {
        /// Identifier of the level to start.
        #[arg(long, default_value_t = 1)]
        level: u32,
        /// Layout to buy tile by tile at catalog prices.
        #[arg(long)]
        layout: Option<String>,
        /// Simulated seconds to run.
        #[arg(long, default_value_t = 60)]
        seconds: u64,
    },
    /// Compute the catch-up credited after time away.
    Offline {
        /// Seconds spent away from the game.
        #[arg(long)]
        seconds_away: f64,
        /// Income rate at the time the session stopped.
        #[arg(long)]
        money_per_second: f64,
    },
    /// List the campaign levels.
    Levels,
}

/// Entry point for the Rail Tycoon command-line interface.
fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = GameConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Sample { size, stations } => {
            let snapshot = TrackLayoutSnapshot::perimeter_ring(size, stations);
            println!("{}", snapshot.encode()?);
        }
        Commands::Validate { layout } => validate(&config, &layout)?,
        Commands::Simulate {
            layout,
            seconds,
            speed_upgrades,
            away_seconds,
        } => {
            let options = SimulateOptions {
                seconds,
                speed_upgrades,
                away: away_seconds.map(Duration::from_secs),
            };
            simulate(&config, &layout, &options)?;
        }
        Commands::Campaign {
            level,
            layout,
            seconds,
        } => play_level(&config, level, layout.as_deref(), seconds)?,
        Commands::Offline {
            seconds_away,
            money_per_second,
        } => {
            let earned = compute_offline_earnings(seconds_away, money_per_second, &config.idle);
            println!("offline earnings: {earned:.2}");
        }
        Commands::Levels => list_levels(),
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn restored_session(config: &GameConfig, layout: &str) -> Result<Session> {
    let snapshot = TrackLayoutSnapshot::decode(layout).context("failed to decode layout")?;
    let mut session = Session::new(config)?;
    let _ = session.submit(snapshot.restore_commands());
    Ok(session)
}

fn validate(config: &GameConfig, layout: &str) -> Result<()> {
    let session = restored_session(config, layout)?;
    let Some(result) = session.loop_result() else {
        println!("valid: false");
        return Ok(());
    };

    println!("valid: {}", result.is_valid());
    if let Some(fault) = result.fault() {
        println!("fault: {fault:?} ({:?})", fault.class());
    }
    println!("stations: {}", result.station_count());
    let cells: Vec<String> = result
        .ordered_path()
        .iter()
        .map(|cell| format!("({},{})", cell.column(), cell.row()))
        .collect();
    println!("path: {}", cells.join(" -> "));
    println!("dense length: {:.1}", path_length(session.dense_path()));
    println!(
        "yield: {:.2}/s",
        query::economy(session.world()).money_per_second()
    );
    Ok(())
}

/// Knobs of a `simulate` run.
#[derive(Debug)]
struct SimulateOptions {
    seconds: u64,
    speed_upgrades: u32,
    away: Option<Duration>,
}

fn simulate(config: &GameConfig, layout: &str, options: &SimulateOptions) -> Result<()> {
    let mut session = restored_session(config, layout)?;
    println!("{}", query::welcome_banner(session.world()));

    for _ in 0..options.speed_upgrades {
        let events = session.submit(vec![Command::PurchaseUpgrade {
            kind: UpgradeKind::TrainSpeed,
        }]);
        if events
            .iter()
            .any(|event| matches!(event, Event::UpgradeRejected { .. }))
        {
            println!("speed upgrade rejected");
            break;
        }
    }

    for _ in 0..options.seconds {
        let _ = session.advance(Duration::from_secs(1));
    }

    if let Some(away) = options.away {
        session.suspend();
        let credited = session.resume(away);
        println!("offline credit: {credited:.2}");
    }

    let world = session.world();
    let economy = query::economy(world);
    let train = query::train(world);
    println!("ticks: {}", query::tick_index(world));
    println!("train running: {}", train.running());
    println!("train speed: {:.1}", train.speed());
    print_train_position(&session);
    println!("money: {:.2}", economy.money());
    println!("money per second: {:.2}", economy.money_per_second());
    println!("total earnings: {:.2}", economy.total_earnings());

    let placed = TrackLayoutSnapshot::capture(
        query::placed_grid(world),
        query::depot(world),
        query::grid_size(world),
    );
    println!("layout: {}", placed.encode()?);
    Ok(())
}

fn print_train_position(session: &Session) {
    let movement = session.movement();
    match movement.position() {
        Some(position) => println!(
            "train position: ({:.1}, {:.1}) segment {} laps {}",
            position.x,
            position.y,
            movement.path_index(),
            movement.laps()
        ),
        None => println!("train position: parked"),
    }
}

fn play_level(config: &GameConfig, level: u32, layout: Option<&str>, seconds: u64) -> Result<()> {
    let mut session = Session::new(config)?;
    let _ = session.start_level(level)?;
    if let Some(current) = session.campaign().current_level() {
        println!("level {}: {}", current.id, current.name);
    }

    if let Some(layout) = layout {
        let snapshot = TrackLayoutSnapshot::decode(layout).context("failed to decode layout")?;
        let events = session.submit(snapshot.purchase_commands());
        let rejected = events
            .iter()
            .filter(|event| matches!(event, Event::TilePlacementRejected { .. }))
            .count();
        println!("rejected placements: {rejected}");
    }

    for _ in 0..seconds {
        let _ = session.advance(Duration::from_secs(1));
    }

    let campaign = session.campaign();
    if campaign.is_complete() {
        println!("campaign complete");
    } else if let Some(current) = campaign.current_level() {
        println!("current level: {} ({})", current.id, current.name);
        if let Some(progress) = campaign.progress(&session.goal_inputs()) {
            println!("goal progress: {:.0}%", progress.fraction * 100.0);
        }
    }
    println!("money: {:.2}", query::economy(session.world()).money());
    Ok(())
}

fn list_levels() {
    let campaign = Campaign::standard();
    for level in campaign.levels() {
        let goal = match level.goal {
            LevelGoal::Money(target) => format!("hold ${target:.0}"),
            LevelGoal::Stations(target) => format!("run a loop through {target} stations"),
            LevelGoal::MoneyPerSecond(target) => format!("earn ${target:.0}/s"),
        };
        println!(
            "{:>2}. {:<20} {}x{}  start ${:<6.0} goal: {}",
            level.id, level.name, level.grid_size, level.grid_size, level.starting_money, goal
        );
    }
}
