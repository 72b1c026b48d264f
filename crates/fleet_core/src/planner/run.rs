//! Planner dispatch and world commit.
//!
//! `run_planner` is the only place planner output mutates the world, and it
//! only does so with validated results: assignments set `pending →
//! in_progress`, committed routes extend drone state, and assigned
//! deliveries the router cannot serve are released back to pending.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, World};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::SimulationClock;
use crate::geometry::distance;
use crate::planner::types::{AssignmentPair, DeliverySnapshot, DroneSnapshot};
use crate::planner::{AssignmentPlanner, CspSolver, GaSettings, GaSolver, PlannerKind};
use crate::router::GridRouter;
use crate::sequencer::{plan_sequence, PlannedLeg};
use crate::world::{Delivery, DeliveryStatus, Drone, NoFlyZone, NoFlyZones};

/// What a planning run did to the world, for the reporting collaborator.
/// Infeasibility shows up as zero assignments, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub planner: PlannerKind,
    /// Deliveries whose assignment was committed.
    pub assigned: usize,
    /// Deliveries whose route legs were committed onto a drone.
    pub routed: usize,
    /// Assigned deliveries released back to pending because no route
    /// served them.
    pub released: usize,
    /// Best fitness, for planners that score candidates.
    pub fitness: Option<f64>,
}

/// Run the selected planner against the current world state and commit its
/// output.
pub fn run_planner(world: &mut World, kind: PlannerKind) -> PlanReport {
    let now = world.resource::<SimulationClock>().now_utc();
    let zones = world.resource::<NoFlyZones>().0.clone();

    let report = match kind {
        PlannerKind::AstarSequence => run_astar_sequence(world, &zones, now),
        PlannerKind::Csp => {
            let solver = CspSolver::new();
            run_assignment(world, &zones, now, kind, &solver)
        }
        PlannerKind::Genetic => {
            let config = world
                .get_resource::<GaSettings>()
                .map(|settings| settings.0.clone())
                .unwrap_or_default();
            let solver = GaSolver::new(config);
            run_assignment(world, &zones, now, kind, &solver)
        }
    };

    info!(
        planner = ?report.planner,
        assigned = report.assigned,
        routed = report.routed,
        released = report.released,
        "plan committed"
    );
    report
}

fn drone_entities(world: &mut World) -> Vec<Entity> {
    let mut query = world.query::<(Entity, &Drone)>();
    query.iter(world).map(|(entity, _)| entity).collect()
}

fn delivery_index(world: &mut World) -> HashMap<String, Entity> {
    let mut query = world.query::<(Entity, &Delivery)>();
    query
        .iter(world)
        .map(|(entity, delivery)| (delivery.id.clone(), entity))
        .collect()
}

fn pending_snapshots(world: &mut World) -> Vec<DeliverySnapshot> {
    let mut query = world.query::<&Delivery>();
    query
        .iter(world)
        .filter(|delivery| delivery.status == DeliveryStatus::Pending)
        .map(DeliverySnapshot::from)
        .collect()
}

/// Greedy planner: each drone in world-insertion order restarts from its
/// initial state, claims what it can serve out of the still-pending
/// deliveries, and commits routes as it goes.
fn run_astar_sequence(world: &mut World, zones: &[NoFlyZone], now: DateTime<Utc>) -> PlanReport {
    let entities = drone_entities(world);
    let index = delivery_index(world);
    let mut routed = 0usize;

    world.resource_scope(|world, router: bevy_ecs::world::Mut<GridRouter>| {
        for entity in entities {
            let Some(component) = world.get::<Drone>(entity) else {
                continue;
            };
            let mut drone = component.clone();
            drone.reset();

            let candidates = pending_snapshots(world);
            let legs = plan_sequence(&router, &drone, &candidates, zones, now);
            routed += commit_legs(world, &mut drone, &legs, &index);

            if let Some(mut component) = world.get_mut::<Drone>(entity) {
                *component = drone;
            }
        }
    });

    PlanReport {
        planner: PlannerKind::AstarSequence,
        assigned: routed,
        routed,
        released: 0,
        fitness: None,
    }
}

/// Assignment-first planners: commit the solver's pairs, then sequence and
/// route each drone's own share; pairs the router cannot serve are released.
fn run_assignment(
    world: &mut World,
    zones: &[NoFlyZone],
    now: DateTime<Utc>,
    kind: PlannerKind,
    planner: &dyn AssignmentPlanner,
) -> PlanReport {
    let drones: Vec<DroneSnapshot> = {
        let mut query = world.query::<&Drone>();
        query.iter(world).map(DroneSnapshot::from).collect()
    };
    let deliveries = pending_snapshots(world);

    let Some(outcome) = planner.assign(&drones, &deliveries, zones, now) else {
        debug!(planner = ?kind, "no feasible assignment");
        return PlanReport {
            planner: kind,
            assigned: 0,
            routed: 0,
            released: 0,
            fitness: None,
        };
    };

    let index = delivery_index(world);
    for pair in &outcome.pairs {
        let Some(&entity) = index.get(&pair.delivery_id) else {
            continue;
        };
        if let Some(mut delivery) = world.get_mut::<Delivery>(entity) {
            delivery.assign_to(&pair.drone_id);
        }
    }
    let assigned = outcome.pairs.len();

    let entities = drone_entities(world);
    let mut routed = 0usize;
    let mut released = 0usize;

    world.resource_scope(|world, router: bevy_ecs::world::Mut<GridRouter>| {
        for entity in entities {
            let Some(component) = world.get::<Drone>(entity) else {
                continue;
            };
            let mut drone = component.clone();

            let share: Vec<&AssignmentPair> = outcome
                .pairs
                .iter()
                .filter(|pair| pair.drone_id == drone.id)
                .collect();
            if share.is_empty() {
                continue;
            }

            let candidates: Vec<DeliverySnapshot> = share
                .iter()
                .filter_map(|pair| {
                    let entity = index.get(&pair.delivery_id)?;
                    world.get::<Delivery>(*entity).map(DeliverySnapshot::from)
                })
                .collect();

            let legs = plan_sequence(&router, &drone, &candidates, zones, now);
            routed += commit_legs(world, &mut drone, &legs, &index);

            // Anything assigned to this drone that no leg serves goes back
            // to pending.
            for pair in share {
                if legs.iter().any(|leg| leg.delivery_id == pair.delivery_id) {
                    continue;
                }
                let Some(&entity) = index.get(&pair.delivery_id) else {
                    continue;
                };
                if let Some(mut delivery) = world.get_mut::<Delivery>(entity) {
                    delivery.release();
                    released += 1;
                }
            }

            if let Some(mut component) = world.get_mut::<Drone>(entity) {
                *component = drone;
            }
        }
    });

    PlanReport {
        planner: kind,
        assigned,
        routed,
        released,
        fitness: outcome.fitness,
    }
}

/// Commit planned legs onto a drone: take each package on board, mark its
/// delivery in progress, and extend the route segment by segment.
fn commit_legs(
    world: &mut World,
    drone: &mut Drone,
    legs: &[PlannedLeg],
    index: &HashMap<String, Entity>,
) -> usize {
    let mut committed = 0usize;
    for leg in legs {
        let Some(&entity) = index.get(&leg.delivery_id) else {
            continue;
        };
        let Some(mut delivery) = world.get_mut::<Delivery>(entity) else {
            continue;
        };
        let weight = delivery.weight;
        delivery.assign_to(&drone.id);

        drone.load_package(weight);
        let Some(&first) = leg.path.first() else {
            continue;
        };
        let mut previous = first;
        for &waypoint in &leg.path[1..] {
            drone.extend_route(waypoint, distance(previous, waypoint));
            previous = waypoint;
        }
        committed += 1;
        debug!(
            drone = %drone.id,
            delivery = %leg.delivery_id,
            waypoints = leg.path.len(),
            "route committed"
        );
    }
    committed
}
