//! Exact assignment: chronological backtracking over the delivery→drone
//! domain.
//!
//! Variables are deliveries in input order, domains are the drones in input
//! order, and consistency is a short-circuit conjunction over a vector of
//! typed constraints. Constraints see the partial assignment plus a borrowed
//! [`PlanningContext`]; nothing is closed over.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::geometry::distance;
use crate::planner::types::{AssignmentPair, DeliverySnapshot, DroneSnapshot};
use crate::world::energy_for;

/// The world view a constraint evaluates against.
pub struct PlanningContext<'a> {
    pub drones: &'a [DroneSnapshot],
    pub deliveries: &'a [DeliverySnapshot],
    pub now: DateTime<Utc>,
}

/// A partial assignment: `(delivery index, drone index)` pairs in
/// chronological assignment order.
pub type PartialAssignment = [(usize, usize)];

/// Predicate signature for user-supplied constraints.
pub type ConstraintFn = dyn Fn(&PartialAssignment, &PlanningContext) -> bool + Send + Sync;

/// The constraint vocabulary: the three built-in families plus arbitrary
/// user predicates.
pub enum CspConstraint {
    /// Per drone, the summed weight of its deliveries stays within
    /// `max_weight`.
    Capacity,
    /// Every assigned delivery's window contains the current time.
    TimeWindow,
    /// Replaying each drone's deliveries in assignment order, the
    /// straight-line energy estimate stays within its battery.
    Battery,
    Custom(Box<ConstraintFn>),
}

impl CspConstraint {
    fn is_satisfied(&self, partial: &PartialAssignment, ctx: &PlanningContext) -> bool {
        match self {
            Self::Capacity => capacity_ok(partial, ctx),
            Self::TimeWindow => time_window_ok(partial, ctx),
            Self::Battery => battery_ok(partial, ctx),
            Self::Custom(predicate) => predicate(partial, ctx),
        }
    }
}

fn capacity_ok(partial: &PartialAssignment, ctx: &PlanningContext) -> bool {
    let mut loads = vec![0.0_f64; ctx.drones.len()];
    for &(delivery_idx, drone_idx) in partial {
        loads[drone_idx] += ctx.deliveries[delivery_idx].weight;
        if loads[drone_idx] > ctx.drones[drone_idx].max_weight {
            return false;
        }
    }
    true
}

fn time_window_ok(partial: &PartialAssignment, ctx: &PlanningContext) -> bool {
    partial
        .iter()
        .all(|&(delivery_idx, _)| ctx.deliveries[delivery_idx].window_contains(ctx.now))
}

fn battery_ok(partial: &PartialAssignment, ctx: &PlanningContext) -> bool {
    // Running (position, battery, payload) per drone, seeded from the
    // snapshot's current state.
    let mut states: Vec<_> = ctx
        .drones
        .iter()
        .map(|d| (d.position, d.battery, d.payload))
        .collect();
    for &(delivery_idx, drone_idx) in partial {
        let delivery = &ctx.deliveries[delivery_idx];
        let drone = &ctx.drones[drone_idx];
        let (position, battery, payload) = &mut states[drone_idx];
        let leg = distance(*position, delivery.position);
        let energy = energy_for(leg, drone.speed, *payload);
        if energy > *battery {
            return false;
        }
        *battery -= energy;
        *payload += delivery.weight;
        *position = delivery.position;
    }
    true
}

/// Backtracking CSP solver over delivery→drone assignments.
pub struct CspSolver {
    constraints: Vec<CspConstraint>,
}

impl CspSolver {
    /// Solver with the three built-in constraints registered.
    pub fn new() -> Self {
        Self {
            constraints: vec![
                CspConstraint::Capacity,
                CspConstraint::TimeWindow,
                CspConstraint::Battery,
            ],
        }
    }

    /// Solver with no constraints; callers register their own.
    pub fn unconstrained() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    pub fn add_constraint(&mut self, constraint: CspConstraint) -> &mut Self {
        self.constraints.push(constraint);
        self
    }

    fn is_consistent(&self, partial: &PartialAssignment, ctx: &PlanningContext) -> bool {
        self.constraints
            .iter()
            .all(|constraint| constraint.is_satisfied(partial, ctx))
    }

    /// Solve for a total assignment, or `None` when none exists. The
    /// returned pairs follow the delivery input order.
    pub fn solve(
        &self,
        drones: &[DroneSnapshot],
        deliveries: &[DeliverySnapshot],
        now: DateTime<Utc>,
    ) -> Option<Vec<AssignmentPair>> {
        if deliveries.is_empty() {
            return Some(Vec::new());
        }
        if drones.is_empty() {
            return None;
        }

        let ctx = PlanningContext {
            drones,
            deliveries,
            now,
        };
        let mut partial = Vec::with_capacity(deliveries.len());
        if !self.backtrack(&ctx, &mut partial) {
            debug!(
                deliveries = deliveries.len(),
                drones = drones.len(),
                "no consistent assignment exists"
            );
            return None;
        }

        Some(
            partial
                .into_iter()
                .map(|(delivery_idx, drone_idx)| AssignmentPair {
                    delivery_id: deliveries[delivery_idx].delivery_id.clone(),
                    drone_id: drones[drone_idx].drone_id.clone(),
                })
                .collect(),
        )
    }

    fn backtrack(&self, ctx: &PlanningContext, partial: &mut Vec<(usize, usize)>) -> bool {
        if partial.len() == ctx.deliveries.len() {
            return true;
        }
        let variable = partial.len();
        for drone_idx in 0..ctx.drones.len() {
            partial.push((variable, drone_idx));
            if self.is_consistent(partial, ctx) && self.backtrack(ctx, partial) {
                return true;
            }
            partial.pop();
        }
        false
    }
}

impl Default for CspSolver {
    fn default() -> Self {
        Self::new()
    }
}
