//! wave-runner: headless session driver for tuning wave and tower configs.
//!
//! Usage:
//!   wave-runner run --config session.json --seed 7 --max-secs 600
//!   wave-runner dump-default > session.json

use std::path::PathBuf;
use std::process;

use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bastion_core::commands::PlayerCommand;
use bastion_core::config::SessionConfig;
use bastion_core::constants::TICK_RATE;
use bastion_core::enums::GamePhase;
use bastion_core::error::ConfigurationError;
use bastion_core::events::GameEvent;
use bastion_sim::SimulationEngine;

/// End-of-run report, printed as JSON.
#[derive(Debug, Default, Serialize)]
struct RunSummary {
    seed: u64,
    outcome: GamePhase,
    ticks: u64,
    elapsed_secs: f64,
    hearts: i32,
    coins: i32,
    waves_reached: usize,
    total_waves: usize,
    kills: u32,
    leaks: u32,
    splits: u32,
    volleys: u32,
    upgrades: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "dump-default" => cmd_dump_default(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        "wave-runner: BASTION headless session driver\n\
         \n\
         Commands:\n\
         \n\
         run           Play a session with an upgrade-when-affordable policy\n\
         \n\
           --config <path>   Session config JSON (default: built-in session)\n\
           --seed <N>        Override the config seed\n\
           --max-secs <N>    Stop after N simulated seconds (default: 900)\n\
         \n\
         dump-default  Print the built-in session config as JSON\n\
         \n\
         Logging follows RUST_LOG (default: info).\n"
    );
}

fn parse_flag<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn cmd_dump_default() -> Result<(), ConfigurationError> {
    println!("{}", SessionConfig::default().to_json_pretty()?);
    Ok(())
}

fn cmd_run(args: &[String]) -> Result<(), ConfigurationError> {
    let mut config = match parse_flag(args, "--config") {
        Some(path) => SessionConfig::load(PathBuf::from(path))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = parse_flag(args, "--seed") {
        config.seed = seed
            .parse()
            .map_err(|_| ConfigurationError::invalid("--seed", "expected an unsigned integer"))?;
    }
    let max_secs: u64 = match parse_flag(args, "--max-secs") {
        Some(secs) => secs
            .parse()
            .map_err(|_| ConfigurationError::invalid("--max-secs", "expected an unsigned integer"))?,
        None => 900,
    };

    let seed = config.seed;
    let mut engine = SimulationEngine::new(config)?;
    info!(seed, waves = engine.total_waves(), "session started");
    engine.queue_command(PlayerCommand::StartWave);

    let mut summary = RunSummary {
        seed,
        total_waves: engine.total_waves(),
        ..Default::default()
    };

    let max_ticks = max_secs * u64::from(TICK_RATE);
    while engine.time().tick < max_ticks && !engine.phase().is_over() {
        queue_affordable_upgrades(&mut engine);
        let snapshot = engine.tick();
        for event in &snapshot.events {
            match event {
                GameEvent::EnemyKilled { .. } => summary.kills += 1,
                GameEvent::EnemyLeaked { .. } => summary.leaks += 1,
                GameEvent::SplitCompleted { .. } => summary.splits += 1,
                GameEvent::VolleyFired { .. } => summary.volleys += 1,
                GameEvent::TowerUpgraded { .. } => summary.upgrades += 1,
                _ => {}
            }
        }
    }

    summary.outcome = engine.phase();
    summary.ticks = engine.time().tick;
    summary.elapsed_secs = engine.time().elapsed_secs;
    summary.hearts = engine.hearts();
    summary.coins = engine.coins();
    summary.waves_reached = engine.current_wave();
    if summary.outcome == GamePhase::Active {
        info!(max_secs, "time limit reached");
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Upgrade the cheapest upgradable tower when coins allow. One per tick keeps
/// the spend order deterministic.
fn queue_affordable_upgrades(engine: &mut SimulationEngine) {
    let coins = engine.coins();
    let levels = engine.tower_levels();
    let candidate = engine
        .towers()
        .iter()
        .filter(|t| !t.is_rebuilding())
        .filter_map(|t| t.next_level(levels).map(|l| (t.id, l.cost)))
        .filter(|&(_, cost)| cost <= coins)
        .min_by_key(|&(id, cost)| (cost, id.0));

    if let Some((tower, _)) = candidate {
        engine.queue_command(PlayerCommand::UpgradeTower { tower });
    }
}
