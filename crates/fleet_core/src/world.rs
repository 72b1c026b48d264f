//! World model: components and state enums for drones, deliveries, and
//! no-fly zones.
//!
//! Drones and deliveries are entities in the ECS world; zones are immutable
//! after scenario build and live in the [`NoFlyZones`] resource. Field names
//! follow the external scenario schema so the serde derives double as the
//! dictionary forms handed to the reporting collaborator.

use bevy_ecs::prelude::{Component, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::{distance, Point, Polygon};

/// Battery units consumed by moving `distance` at `speed` while carrying
/// `payload` kilograms.
pub fn energy_for(distance: f64, speed: f64, payload: f64) -> f64 {
    (distance / speed) * (1.0 + 0.1 * payload)
}

// ---------------------------------------------------------------------------
// Drones
// ---------------------------------------------------------------------------

/// A delivery drone. Immutable identity and limits plus mutable flight state.
///
/// Mutation goes through the methods below: the router commit extends the
/// route, the simulator consumes it one waypoint per tick, and `reset`
/// restores the initial state.
#[derive(Debug, Clone, PartialEq, Component, Serialize, Deserialize)]
pub struct Drone {
    pub id: String,
    pub max_weight: f64,
    pub battery_capacity: f64,
    pub speed: f64,
    pub start_position: Point,
    pub current_position: Point,
    pub current_battery: f64,
    pub current_weight: f64,
    pub route: Vec<Point>,
}

impl Drone {
    /// New drone with initial-state defaults: at its start position, full
    /// battery, empty, route holding only the start position.
    pub fn new(
        id: impl Into<String>,
        max_weight: f64,
        battery_capacity: f64,
        speed: f64,
        start_position: Point,
    ) -> Self {
        Self {
            id: id.into(),
            max_weight,
            battery_capacity,
            speed,
            start_position,
            current_position: start_position,
            current_battery: battery_capacity,
            current_weight: 0.0,
            route: vec![start_position],
        }
    }

    /// Whether the drone can take on `weight` more kilograms.
    pub fn can_carry(&self, weight: f64) -> bool {
        self.current_weight + weight <= self.max_weight
    }

    /// Whether the current battery covers `required_distance` at the current
    /// payload.
    pub fn has_sufficient_battery(&self, required_distance: f64) -> bool {
        self.current_battery >= energy_for(required_distance, self.speed, self.current_weight)
    }

    fn debit_battery(&mut self, amount: f64) {
        self.current_battery -= amount;
        if self.current_battery < 0.0 {
            debug_assert!(
                false,
                "drone {} battery drained below zero",
                self.id
            );
            warn!(drone = %self.id, "battery clamped to zero");
            self.current_battery = 0.0;
        }
    }

    /// Commit granularity: append a planned waypoint, move onto it, and debit
    /// the battery for `leg_distance` at the current payload. After this,
    /// `current_position == route[last]`.
    pub fn extend_route(&mut self, waypoint: Point, leg_distance: f64) {
        self.current_position = waypoint;
        self.route.push(waypoint);
        let consumption = energy_for(leg_distance, self.speed, self.current_weight);
        self.debit_battery(consumption);
    }

    /// Simulator granularity: move onto `route[1]`, debit the consumed edge,
    /// and drop the waypoint left behind. Returns the new position, or
    /// `None` when the route has nothing left to consume. After this,
    /// `current_position == route[0]`.
    pub fn advance_waypoint(&mut self) -> Option<Point> {
        if self.route.len() <= 1 {
            return None;
        }
        let step = distance(self.route[0], self.route[1]);
        let next = self.route[1];
        let consumption = energy_for(step, self.speed, self.current_weight);
        self.debit_battery(consumption);
        self.current_position = next;
        self.route.remove(0);
        Some(next)
    }

    /// Take a package on board. Capacity is checked by the planners before
    /// this is called; a violation here is a bug.
    pub fn load_package(&mut self, weight: f64) {
        self.current_weight += weight;
        if self.current_weight > self.max_weight {
            debug_assert!(
                false,
                "drone {} overloaded past its capacity",
                self.id
            );
            warn!(drone = %self.id, "payload clamped to capacity");
            self.current_weight = self.max_weight;
        }
    }

    /// Drop a delivered package.
    pub fn unload_package(&mut self, weight: f64) {
        self.current_weight = (self.current_weight - weight).max(0.0);
    }

    /// Back to the initial state: start position, full battery, empty,
    /// single-element route.
    pub fn reset(&mut self) {
        self.current_position = self.start_position;
        self.current_battery = self.battery_capacity;
        self.current_weight = 0.0;
        self.route = vec![self.start_position];
    }
}

// ---------------------------------------------------------------------------
// Deliveries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// A delivery request: target, payload weight, priority (1 is most urgent),
/// and a closed service time window.
#[derive(Debug, Clone, PartialEq, Component, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub position: Point,
    pub weight: f64,
    pub priority: u8,
    pub time_window_start: DateTime<Utc>,
    pub time_window_end: DateTime<Utc>,
    #[serde(default)]
    pub assigned_drone: Option<String>,
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default)]
    pub actual_delivery_time: Option<DateTime<Utc>>,
}

impl Delivery {
    pub fn new(
        id: impl Into<String>,
        position: Point,
        weight: f64,
        priority: u8,
        time_window_start: DateTime<Utc>,
        time_window_end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            weight,
            priority,
            time_window_start,
            time_window_end,
            assigned_drone: None,
            status: DeliveryStatus::Pending,
            actual_delivery_time: None,
        }
    }

    /// Closed-interval window check.
    pub fn is_within_time_window(&self, now: DateTime<Utc>) -> bool {
        self.time_window_start <= now && now <= self.time_window_end
    }

    pub fn is_late(&self, now: DateTime<Utc>) -> bool {
        now > self.time_window_end
    }

    /// `pending → in_progress`, recording the serving drone.
    pub fn assign_to(&mut self, drone_id: &str) {
        self.assigned_drone = Some(drone_id.to_owned());
        self.status = DeliveryStatus::InProgress;
    }

    /// `in_progress → completed`, stamping the delivery time.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = DeliveryStatus::Completed;
        self.actual_delivery_time = Some(at);
    }

    /// `in_progress → pending`: an in-flight failure releases the drone link
    /// and makes the delivery eligible for replanning.
    pub fn release(&mut self) {
        self.status = DeliveryStatus::Pending;
        self.assigned_drone = None;
    }

    /// `pending → failed`: the window passed with nobody serving it.
    pub fn expire(&mut self) {
        self.status = DeliveryStatus::Failed;
    }
}

// ---------------------------------------------------------------------------
// No-fly zones
// ---------------------------------------------------------------------------

/// Penalty magnitude for points inside the buffer around a zone.
const ZONE_PENALTY_SCALE: f64 = 1000.0;
/// Buffer width around a zone within which proximity is penalized.
const ZONE_NEAR_RADIUS: f64 = 1.0;
/// Keeps the proximity penalty finite on the boundary.
const ZONE_PENALTY_SOFTENING: f64 = 0.1;

/// A polygonal no-fly zone, forbidden while its activity window contains the
/// current time. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoFlyZone {
    pub id: String,
    #[serde(rename = "polygon_coordinates")]
    pub polygon: Polygon,
    pub active_time_start: DateTime<Utc>,
    pub active_time_end: DateTime<Utc>,
}

impl NoFlyZone {
    pub fn new(
        id: impl Into<String>,
        vertices: Vec<Point>,
        active_time_start: DateTime<Utc>,
        active_time_end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            polygon: Polygon::new(vertices),
            active_time_start,
            active_time_end,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.active_time_start <= now && now <= self.active_time_end
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.polygon.contains(p)
    }

    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        self.polygon.intersects_segment(a, b)
    }

    /// Time-free penalty field: infinite strictly inside, `1000 / (d + 0.1)`
    /// within one unit of the boundary, zero elsewhere.
    pub fn penalty_at(&self, p: Point) -> f64 {
        if self.polygon.contains(p) {
            return f64::INFINITY;
        }
        let d = self.polygon.distance_to(p);
        if d < ZONE_NEAR_RADIUS {
            ZONE_PENALTY_SCALE / (d + ZONE_PENALTY_SOFTENING)
        } else {
            0.0
        }
    }

    /// Penalty at `p`, zero whenever the zone is inactive at `now`.
    pub fn penalty(&self, p: Point, now: DateTime<Utc>) -> f64 {
        if self.is_active(now) {
            self.penalty_at(p)
        } else {
            0.0
        }
    }
}

/// All zones of the loaded scenario, in input order.
#[derive(Debug, Clone, Default, Resource)]
pub struct NoFlyZones(pub Vec<NoFlyZone>);
