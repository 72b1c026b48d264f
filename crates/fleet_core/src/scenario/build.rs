use bevy_ecs::prelude::World;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::clock::{SimulationClock, DEFAULT_TICK_MS};
use crate::planner::{GaConfig, GaSettings};
use crate::router::GridRouter;
use crate::scenario::file::{validate, ScenarioError, ScenarioFile};
use crate::scenario::{DeliverySpec, DroneSpec, ZoneSpec};
use crate::telemetry::SimTelemetry;
use crate::world::{Delivery, Drone, NoFlyZone, NoFlyZones};

/// Default grid extent on both axes.
const DEFAULT_GRID_EXTENT: f64 = 100.0;

/// Parameters for building a simulation world around a scenario document.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub grid_width: f64,
    pub grid_height: f64,
    pub resolution: f64,
    pub tick_ms: u64,
    /// Wall-clock instant mapped to simulation time 0. Captured from the
    /// system clock when absent.
    pub epoch: Option<DateTime<Utc>>,
    /// Seed handed to the GA configuration for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_EXTENT,
            grid_height: DEFAULT_GRID_EXTENT,
            resolution: 1.0,
            tick_ms: DEFAULT_TICK_MS,
            epoch: None,
            seed: None,
        }
    }
}

impl ScenarioParams {
    pub fn with_grid(mut self, width: f64, height: f64) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// Pin simulation time 0 to a known instant (tests and replays).
    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Validate `file` and populate the world: clock, router, telemetry, zones
/// as resources; drones and deliveries as entities in input order, with
/// their initial-state defaults. A validation failure leaves the world
/// untouched.
pub fn build_scenario(
    world: &mut World,
    file: &ScenarioFile,
    params: ScenarioParams,
) -> Result<(), ScenarioError> {
    validate(file)?;

    let epoch = params.epoch.unwrap_or_else(Utc::now);
    world.insert_resource(SimulationClock::with_epoch(epoch).with_tick_ms(params.tick_ms));
    world.insert_resource(GridRouter::with_resolution(
        params.grid_width,
        params.grid_height,
        params.resolution,
    ));
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(GaSettings(GaConfig {
        seed: params.seed,
        ..GaConfig::default()
    }));

    let zones: Vec<NoFlyZone> = file
        .no_fly_zones
        .iter()
        .map(|zone| {
            NoFlyZone::new(
                zone.id.clone(),
                zone.polygon_coordinates.clone(),
                zone.active_time_start,
                zone.active_time_end,
            )
        })
        .collect();
    world.insert_resource(NoFlyZones(zones));

    for spec in &file.drones {
        world.spawn(Drone::new(
            spec.id.clone(),
            spec.max_weight,
            spec.battery_capacity,
            spec.speed,
            spec.start_position,
        ));
    }
    for spec in &file.deliveries {
        world.spawn(Delivery::new(
            spec.id.clone(),
            spec.position,
            spec.weight,
            spec.priority,
            spec.time_window_start,
            spec.time_window_end,
        ));
    }

    info!(
        drones = file.drones.len(),
        deliveries = file.deliveries.len(),
        zones = file.no_fly_zones.len(),
        "scenario built"
    );
    Ok(())
}

/// Export the world back into a scenario document (schema fields only, so a
/// save/load cycle reproduces the world modulo default-initialized mutable
/// state).
pub fn save_scenario(world: &mut World) -> ScenarioFile {
    let drones: Vec<DroneSpec> = {
        let mut query = world.query::<&Drone>();
        query
            .iter(world)
            .map(|drone| DroneSpec {
                id: drone.id.clone(),
                max_weight: drone.max_weight,
                battery_capacity: drone.battery_capacity,
                speed: drone.speed,
                start_position: drone.start_position,
            })
            .collect()
    };
    let deliveries: Vec<DeliverySpec> = {
        let mut query = world.query::<&Delivery>();
        query
            .iter(world)
            .map(|delivery| DeliverySpec {
                id: delivery.id.clone(),
                position: delivery.position,
                weight: delivery.weight,
                priority: delivery.priority,
                time_window_start: delivery.time_window_start,
                time_window_end: delivery.time_window_end,
            })
            .collect()
    };
    let no_fly_zones: Vec<ZoneSpec> = world
        .get_resource::<NoFlyZones>()
        .map(|zones| {
            zones
                .0
                .iter()
                .map(|zone| ZoneSpec {
                    id: zone.id.clone(),
                    polygon_coordinates: zone.polygon.vertices().to_vec(),
                    active_time_start: zone.active_time_start,
                    active_time_end: zone.active_time_end,
                })
                .collect()
        })
        .unwrap_or_default();

    ScenarioFile {
        drones,
        deliveries,
        no_fly_zones,
    }
}
