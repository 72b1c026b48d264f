//! # Fleet Planning & Simulation Core
//!
//! A planning and discrete-time simulation engine for multi-drone package
//! delivery on a bounded 2D grid with time-windowed no-fly zones.
//!
//! ## Overview
//!
//! This crate provides the planning and simulation core, including:
//!
//! - **Grid Routing**: energy-gated weighted A* with zone penalties
//! - **Sequencing**: priority/time-window itineraries per drone
//! - **Assignment**: exact CSP backtracking and a genetic algorithm
//! - **Simulation**: a fixed-increment clock stepping routes waypoint by
//!   waypoint
//! - **Scenario I/O**: JSON documents in, world snapshots out
//!
//! ## Key Concepts
//!
//! - **Single executor**: one `bevy_ecs::World` owns all state; planners
//!   observe snapshots and never mutate on failure
//! - **Serialized ticks**: a tick completes before the next is accepted
//! - **Deterministic**: stable orderings throughout; the GA is reproducible
//!   under a fixed seed
//!
//! ## Example
//!
//! ```rust,no_run
//! use bevy_ecs::prelude::World;
//! use fleet_core::planner::{run_planner, PlannerKind};
//! use fleet_core::runner::{run_ticks, tick_schedule};
//! use fleet_core::scenario::{build_scenario, load_scenario_file, ScenarioParams};
//! use fleet_core::snapshot::capture_snapshot;
//!
//! let file = load_scenario_file("scenario.json").expect("readable scenario");
//! let mut world = World::new();
//! build_scenario(&mut world, &file, ScenarioParams::default()).expect("valid scenario");
//!
//! let report = run_planner(&mut world, PlannerKind::AstarSequence);
//! println!("routed {} deliveries", report.routed);
//!
//! let mut schedule = tick_schedule();
//! run_ticks(&mut world, &mut schedule, 12);
//! let snapshot = capture_snapshot(&mut world);
//! ```

pub mod clock;
pub mod geometry;
pub mod planner;
pub mod router;
pub mod runner;
pub mod scenario;
pub mod sequencer;
pub mod snapshot;
pub mod systems;
pub mod telemetry;
pub mod world;
