#![allow(dead_code)]

use bevy_ecs::prelude::World;
use chrono::{DateTime, TimeZone, Utc};

use fleet_core::clock::SimulationClock;
use fleet_core::planner::{GaConfig, GaSettings};
use fleet_core::router::GridRouter;
use fleet_core::telemetry::SimTelemetry;
use fleet_core::world::{NoFlyZone, NoFlyZones};

/// Fixed instant used as simulation time 0 in integration tests.
pub fn test_epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// Builder configuration for reproducible test worlds.
#[derive(Clone, Debug)]
pub struct TestWorldConfig {
    pub epoch: DateTime<Utc>,
    pub grid_width: f64,
    pub grid_height: f64,
    pub resolution: f64,
    pub tick_ms: Option<u64>,
    pub zones: Vec<NoFlyZone>,
    pub ga_config: GaConfig,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            epoch: test_epoch(),
            grid_width: 20.0,
            grid_height: 20.0,
            resolution: 1.0,
            tick_ms: None,
            zones: Vec::new(),
            ga_config: GaConfig {
                seed: Some(42),
                ..GaConfig::default()
            },
        }
    }
}

/// Helper that populates the ECS world with the shared resources used in
/// integration tests.
#[derive(Debug, Default)]
pub struct TestWorldBuilder {
    config: TestWorldConfig,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.config.epoch = epoch;
        self
    }

    pub fn with_grid(mut self, width: f64, height: f64) -> Self {
        self.config.grid_width = width;
        self.config.grid_height = height;
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.config.resolution = resolution;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.config.tick_ms = Some(tick_ms);
        self
    }

    pub fn with_zone(mut self, zone: NoFlyZone) -> Self {
        self.config.zones.push(zone);
        self
    }

    pub fn with_ga_config(mut self, ga_config: GaConfig) -> Self {
        self.config.ga_config = ga_config;
        self
    }

    pub fn build(self) -> World {
        let TestWorldConfig {
            epoch,
            grid_width,
            grid_height,
            resolution,
            tick_ms,
            zones,
            ga_config,
        } = self.config;

        let mut world = World::new();
        let mut clock = SimulationClock::with_epoch(epoch);
        if let Some(tick_ms) = tick_ms {
            clock = clock.with_tick_ms(tick_ms);
        }
        world.insert_resource(clock);
        world.insert_resource(GridRouter::with_resolution(
            grid_width,
            grid_height,
            resolution,
        ));
        world.insert_resource(SimTelemetry::default());
        world.insert_resource(NoFlyZones(zones));
        world.insert_resource(GaSettings(ga_config));
        world
    }
}
