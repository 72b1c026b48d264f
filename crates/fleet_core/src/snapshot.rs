//! Snapshot sink: the world state in the dictionary form the
//! rendering/reporting collaborator consumes.

use bevy_ecs::prelude::World;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::SimulationClock;
use crate::telemetry::{CompletedDeliveryRecord, SimTelemetry};
use crate::world::{Delivery, Drone, NoFlyZone, NoFlyZones};

/// Everything a collaborator needs to render or report on the world:
/// entities in their full dictionary form (schema fields plus mutable
/// state) and the telemetry collected so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub captured_at: DateTime<Utc>,
    pub tick: u64,
    pub drones: Vec<Drone>,
    pub deliveries: Vec<Delivery>,
    pub no_fly_zones: Vec<NoFlyZone>,
    pub completed_deliveries: Vec<CompletedDeliveryRecord>,
}

/// Capture the current world state. Read-only: the world is unchanged.
pub fn capture_snapshot(world: &mut World) -> WorldSnapshot {
    let clock = world.resource::<SimulationClock>();
    let captured_at = clock.now_utc();
    let tick = clock.ticks();

    let drones: Vec<Drone> = {
        let mut query = world.query::<&Drone>();
        query.iter(world).cloned().collect()
    };
    let deliveries: Vec<Delivery> = {
        let mut query = world.query::<&Delivery>();
        query.iter(world).cloned().collect()
    };
    let no_fly_zones = world
        .get_resource::<NoFlyZones>()
        .map(|zones| zones.0.clone())
        .unwrap_or_default();
    let completed_deliveries = world
        .get_resource::<SimTelemetry>()
        .map(|telemetry| telemetry.completed_deliveries.clone())
        .unwrap_or_default();

    WorldSnapshot {
        captured_at,
        tick,
        drones,
        deliveries,
        no_fly_zones,
        completed_deliveries,
    }
}
