//! Movement system: advances each drone one route waypoint per tick.
//!
//! Drones step in world-insertion order. A drone whose route holds a single
//! element idles. After a drone moves, any in-progress delivery of its that
//! now lies within one grid resolution completes: the delivery time is
//! stamped, the payload is dropped, and a telemetry record is appended.

use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::debug;

use crate::clock::SimulationClock;
use crate::geometry::distance;
use crate::router::GridRouter;
use crate::telemetry::{CompletedDeliveryRecord, SimTelemetry};
use crate::world::{Delivery, DeliveryStatus, Drone};

pub fn movement_system(
    clock: Res<SimulationClock>,
    router: Res<GridRouter>,
    mut telemetry: ResMut<SimTelemetry>,
    mut drones: Query<&mut Drone>,
    mut deliveries: Query<&mut Delivery>,
) {
    let now = clock.now_utc();

    for mut drone in &mut drones {
        let Some(position) = drone.advance_waypoint() else {
            continue;
        };
        debug!(drone = %drone.id, x = position.x, y = position.y, "moved");

        for mut delivery in &mut deliveries {
            if delivery.status != DeliveryStatus::InProgress {
                continue;
            }
            if delivery.assigned_drone.as_deref() != Some(drone.id.as_str()) {
                continue;
            }
            if distance(position, delivery.position) >= router.resolution() {
                continue;
            }
            delivery.complete(now);
            drone.unload_package(delivery.weight);
            telemetry.completed_deliveries.push(CompletedDeliveryRecord {
                delivery_id: delivery.id.clone(),
                drone_id: drone.id.clone(),
                completed_at: now,
            });
            debug!(drone = %drone.id, delivery = %delivery.id, "delivery completed");
        }
    }
}
