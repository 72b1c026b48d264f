//! Assignment planners: pluggable strategies for deciding which drone
//! serves which delivery.
//!
//! Three planners are recognized, selected by [`PlannerKind`]:
//!
//! - **`astar-sequence`**: greedy per-drone sequencing validated against the
//!   grid router; assignment and routing happen together.
//! - **`csp`**: exact backtracking over the delivery→drone domain.
//! - **`genetic`**: population-based search over chromosomes of drone
//!   indices.
//!
//! The pure solvers implement [`AssignmentPlanner`] over read-only
//! snapshots; [`run::run_planner`] dispatches a kind, commits the winning
//! assignment into the world, and routes each drone's share.

pub mod csp;
pub mod genetic;
pub mod run;
pub mod types;

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use csp::{CspConstraint, CspSolver, PlanningContext};
pub use genetic::{GaConfig, GaOutcome, GaSolver, Individual, Toolbox};
pub use run::{run_planner, PlanReport};
pub use types::{AssignmentPair, DeliverySnapshot, DroneSnapshot};

use crate::world::NoFlyZone;

/// Recognized optimizer-selection values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlannerKind {
    #[default]
    AstarSequence,
    Csp,
    Genetic,
}

/// A solved assignment plus whatever score the strategy can attach.
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub pairs: Vec<AssignmentPair>,
    pub fitness: Option<f64>,
}

/// A pure assignment strategy: a function of world snapshots, never of the
/// world itself. Infeasibility is `None`, not an error.
pub trait AssignmentPlanner: Send + Sync {
    fn assign(
        &self,
        drones: &[DroneSnapshot],
        deliveries: &[DeliverySnapshot],
        zones: &[NoFlyZone],
        now: DateTime<Utc>,
    ) -> Option<AssignmentOutcome>;
}

impl AssignmentPlanner for CspSolver {
    fn assign(
        &self,
        drones: &[DroneSnapshot],
        deliveries: &[DeliverySnapshot],
        _zones: &[NoFlyZone],
        now: DateTime<Utc>,
    ) -> Option<AssignmentOutcome> {
        self.solve(drones, deliveries, now).map(|pairs| AssignmentOutcome {
            pairs,
            fitness: None,
        })
    }
}

impl AssignmentPlanner for GaSolver {
    fn assign(
        &self,
        drones: &[DroneSnapshot],
        deliveries: &[DeliverySnapshot],
        zones: &[NoFlyZone],
        _now: DateTime<Utc>,
    ) -> Option<AssignmentOutcome> {
        self.optimize(drones, deliveries, zones)
            .map(|outcome| AssignmentOutcome {
                pairs: outcome.pairs,
                fitness: Some(outcome.fitness),
            })
    }
}

/// World-level override for the GA configuration; [`run::run_planner`]
/// falls back to [`GaConfig::default`] when absent.
#[derive(Debug, Clone, Default, Resource)]
pub struct GaSettings(pub GaConfig);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planner_kinds_use_the_recognized_wire_values() {
        let parsed: PlannerKind =
            serde_json::from_str("\"astar-sequence\"").expect("parse astar-sequence");
        assert_eq!(parsed, PlannerKind::AstarSequence);
        let parsed: PlannerKind = serde_json::from_str("\"csp\"").expect("parse csp");
        assert_eq!(parsed, PlannerKind::Csp);
        let parsed: PlannerKind = serde_json::from_str("\"genetic\"").expect("parse genetic");
        assert_eq!(parsed, PlannerKind::Genetic);
    }
}
