//! Headless batch runner: load a scenario, run a planner, advance the
//! simulation, and emit the world snapshot as JSON.

use std::path::PathBuf;

use anyhow::Context;
use bevy_ecs::prelude::World;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fleet_core::clock::SimulationSpeed;
use fleet_core::planner::{run_planner, PlannerKind};
use fleet_core::runner::{run_tick, tick_schedule};
use fleet_core::scenario::{build_scenario, load_scenario_file, ScenarioParams};
use fleet_core::snapshot::capture_snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlannerArg {
    AstarSequence,
    Csp,
    Genetic,
}

impl From<PlannerArg> for PlannerKind {
    fn from(arg: PlannerArg) -> Self {
        match arg {
            PlannerArg::AstarSequence => Self::AstarSequence,
            PlannerArg::Csp => Self::Csp,
            PlannerArg::Genetic => Self::Genetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SpeedArg {
    Slow,
    Normal,
    Fast,
}

impl From<SpeedArg> for SimulationSpeed {
    fn from(arg: SpeedArg) -> Self {
        match arg {
            SpeedArg::Slow => Self::Slow,
            SpeedArg::Normal => Self::Normal,
            SpeedArg::Fast => Self::Fast,
        }
    }
}

/// Plan and simulate a drone delivery scenario.
#[derive(Debug, Parser)]
#[command(name = "fleet_cli", version, about)]
struct Arguments {
    /// Scenario document to load.
    scenario: PathBuf,

    /// Which planner decides the drone→delivery mapping.
    #[arg(long, value_enum, default_value = "astar-sequence")]
    planner: PlannerArg,

    /// Number of simulation ticks to advance after planning.
    #[arg(long, default_value_t = 12)]
    ticks: u64,

    /// Grid width and height.
    #[arg(long, default_value_t = 100.0)]
    grid: f64,

    /// Seed for the genetic planner.
    #[arg(long)]
    seed: Option<u64>,

    /// Pace ticks at the dispatcher period instead of running flat out.
    #[arg(long, value_enum)]
    speed: Option<SpeedArg>,

    /// Write the final snapshot here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Arguments::parse();

    let file = load_scenario_file(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario.display()))?;

    let mut params = ScenarioParams::default().with_grid(args.grid, args.grid);
    if let Some(seed) = args.seed {
        params = params.with_seed(seed);
    }

    let mut world = World::new();
    build_scenario(&mut world, &file, params).context("building the scenario world")?;

    let report = run_planner(&mut world, args.planner.into());
    info!(
        assigned = report.assigned,
        routed = report.routed,
        released = report.released,
        "planning finished"
    );

    let period = args
        .speed
        .map(|speed| SimulationSpeed::from(speed).period_ms());
    let mut schedule = tick_schedule();
    for _ in 0..args.ticks {
        run_tick(&mut world, &mut schedule);
        if let Some(period_ms) = period {
            std::thread::sleep(std::time::Duration::from_millis(period_ms));
        }
    }

    let snapshot = capture_snapshot(&mut world);
    let rendered = serde_json::to_string_pretty(&snapshot).context("serializing the snapshot")?;
    match args.output {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("writing snapshot to {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(())
}
