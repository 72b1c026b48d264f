//! Read-only snapshots the planners work on, and the assignment pairs they
//! produce. Planners never hold references into the world; the commit step
//! in [`crate::planner::run`] is the only writer.

use chrono::{DateTime, Utc};

use crate::geometry::Point;
use crate::world::{Delivery, Drone};

/// Planner-facing view of one drone.
#[derive(Debug, Clone, PartialEq)]
pub struct DroneSnapshot {
    pub drone_id: String,
    pub max_weight: f64,
    pub battery_capacity: f64,
    pub speed: f64,
    pub start_position: Point,
    pub position: Point,
    pub battery: f64,
    pub payload: f64,
}

impl From<&Drone> for DroneSnapshot {
    fn from(drone: &Drone) -> Self {
        Self {
            drone_id: drone.id.clone(),
            max_weight: drone.max_weight,
            battery_capacity: drone.battery_capacity,
            speed: drone.speed,
            start_position: drone.start_position,
            position: drone.current_position,
            battery: drone.current_battery,
            payload: drone.current_weight,
        }
    }
}

/// Planner-facing view of one delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverySnapshot {
    pub delivery_id: String,
    pub position: Point,
    pub weight: f64,
    pub priority: u8,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl DeliverySnapshot {
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        self.window_start <= now && now <= self.window_end
    }
}

impl From<&Delivery> for DeliverySnapshot {
    fn from(delivery: &Delivery) -> Self {
        Self {
            delivery_id: delivery.id.clone(),
            position: delivery.position,
            weight: delivery.weight,
            priority: delivery.priority,
            window_start: delivery.time_window_start,
            window_end: delivery.time_window_end,
        }
    }
}

/// One delivery→drone decision produced by a planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPair {
    pub delivery_id: String,
    pub drone_id: String,
}
