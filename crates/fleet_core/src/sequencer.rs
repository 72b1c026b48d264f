//! Sequencer: turns an unordered set of deliveries into an ordered,
//! prefix-feasible itinerary for a single drone.
//!
//! Candidates are stably sorted by `(priority, window_start)` and walked
//! with a cursor at the drone's position, keeping running battery and
//! payload estimates. Each surviving candidate is validated against an
//! actual router path; acceptance debits the straight-line energy estimate,
//! so simulation may still fail a leg whose real path is longer than the
//! accounting used here.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::geometry::{distance, Point};
use crate::planner::types::DeliverySnapshot;
use crate::router::GridRouter;
use crate::world::{energy_for, Drone, NoFlyZone};

/// One accepted leg of an itinerary: the delivery it serves, the router
/// path from the previous cursor, and that path's summed segment length.
#[derive(Debug, Clone)]
pub struct PlannedLeg {
    pub delivery_id: String,
    pub path: Vec<Point>,
    pub distance: f64,
}

/// Order `candidates` into a feasible itinerary for `drone`.
///
/// Deliveries whose window does not contain `now`, that the router cannot
/// reach, or that would overrun the running payload or battery estimates are
/// skipped; the rest come back in service order with their paths.
pub fn plan_sequence(
    router: &GridRouter,
    drone: &Drone,
    candidates: &[DeliverySnapshot],
    zones: &[NoFlyZone],
    now: DateTime<Utc>,
) -> Vec<PlannedLeg> {
    let mut ordered: Vec<&DeliverySnapshot> = candidates.iter().collect();
    ordered.sort_by_key(|d| (d.priority, d.window_start));

    let mut legs = Vec::new();
    let mut cursor = drone.current_position;
    let mut battery_estimate = drone.current_battery;
    let mut payload_estimate = drone.current_weight;

    for delivery in ordered {
        if !(delivery.window_start <= now && now <= delivery.window_end) {
            continue;
        }

        let path = router.find_path(cursor, delivery.position, drone, zones, now);
        if path.is_empty() {
            continue;
        }

        let total: f64 = path.windows(2).map(|pair| distance(pair[0], pair[1])).sum();

        if payload_estimate + delivery.weight > drone.max_weight {
            continue;
        }
        let energy = energy_for(total, drone.speed, payload_estimate);
        if energy > battery_estimate {
            continue;
        }

        battery_estimate -= energy;
        payload_estimate += delivery.weight;
        cursor = delivery.position;
        debug!(
            drone = %drone.id,
            delivery = %delivery.delivery_id,
            distance = total,
            "leg accepted"
        );
        legs.push(PlannedLeg {
            delivery_id: delivery.delivery_id.clone(),
            path,
            distance: total,
        });
    }

    legs
}
