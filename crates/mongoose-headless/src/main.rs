//! Headless runner for the mongoose ecosystem simulation.

mod autopilot;
mod telemetry;

use anyhow::{Context, Result};
use autopilot::Autopilot;
use clap::Parser;
use mongoose_core::{Position, Scoreboard, SimConfig, TICKS_PER_SECOND};
use mongoose_world::{Simulation, SimulationResult};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mongoose-headless", about = "Run the ecosystem simulation without a window")]
struct Args {
    /// JSON simulation config; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of ticks
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Override the random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run without a player
    #[arg(long)]
    no_player: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print the final result as JSON on stdout
    #[arg(long)]
    print_result: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    telemetry::init_telemetry(args.json_logs)?;

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        config.num_ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    info!(seed = config.seed, ticks = config.num_ticks, "Starting headless run");

    let mut sim = Simulation::new(config).context("invalid simulation config")?;
    let result = if args.no_player {
        sim.run()
    } else {
        run_with_player(&mut sim)?
    };

    if args.print_result {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

/// Step the simulation with the autopilot at the controls
fn run_with_player(sim: &mut Simulation) -> Result<SimulationResult> {
    let config = sim.config().clone();
    let world = &config.world;
    sim.spawn_player(Position::new(world.width / 2.0, world.height / 2.0))?;

    // Original game: one tile per 0.2 s of held key
    let pilot = Autopilot::new(5.0 / TICKS_PER_SECOND as f32, config.combat.attack_radius);
    let mut input_rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1));
    let mut scoreboard = Scoreboard::new();
    let mut total_events = 0;

    for _ in 0..config.num_ticks {
        if let Some(input) = pilot.next_input(sim.registry(), &mut input_rng) {
            sim.set_player_position(input.position)?;
            if input.attack {
                sim.queue_attack();
            }
        }

        let events = sim.step();
        total_events += events.len();
        scoreboard.record_all(&events);

        if sim.tick() % (10 * TICKS_PER_SECOND) == 0 {
            info!(
                tick = sim.tick(),
                live = autopilot::live_count(sim.registry()),
                score = scoreboard.player_score(),
                "Progress"
            );
        }
    }

    let result = SimulationResult {
        total_ticks: sim.tick(),
        total_events,
        populations: sim.populations(),
        scoreboard,
    };
    result.log_summary();
    Ok(result)
}
