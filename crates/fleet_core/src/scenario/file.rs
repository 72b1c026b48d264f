//! The on-disk scenario document: three arrays of entity specs, positions
//! as 2-tuples, timestamps as ISO-8601 strings.
//!
//! Validation happens before anything touches the world; a rejected
//! document leaves the world exactly as it was.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point;

/// Lower and upper bounds of the recognized priority range.
pub const PRIORITY_MIN: u8 = 1;
pub const PRIORITY_MAX: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneSpec {
    pub id: String,
    pub max_weight: f64,
    pub battery_capacity: f64,
    pub speed: f64,
    pub start_position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySpec {
    pub id: String,
    pub position: Point,
    pub weight: f64,
    pub priority: u8,
    pub time_window_start: DateTime<Utc>,
    pub time_window_end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub id: String,
    pub polygon_coordinates: Vec<Point>,
    pub active_time_start: DateTime<Utc>,
    pub active_time_end: DateTime<Utc>,
}

/// A complete scenario bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub drones: Vec<DroneSpec>,
    pub deliveries: Vec<DeliverySpec>,
    pub no_fly_zones: Vec<ZoneSpec>,
}

/// Input validation failures. Raised by the loader; the world remains
/// untouched.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("drone `{id}`: {field} must be positive")]
    NonPositiveValue { id: String, field: &'static str },
    #[error("delivery `{id}`: weight must not be negative")]
    NegativeWeight { id: String },
    #[error("delivery `{id}`: priority {priority} outside {PRIORITY_MIN}..={PRIORITY_MAX}")]
    PriorityOutOfRange { id: String, priority: u8 },
    #[error("{kind} `{id}`: time window ends before it starts")]
    InvertedWindow { kind: &'static str, id: String },
    #[error("no-fly zone `{id}`: polygon needs at least 3 vertices, got {count}")]
    DegeneratePolygon { id: String, count: usize },
}

fn check_unique<'a>(
    kind: &'static str,
    seen: &mut HashSet<&'a str>,
    id: &'a str,
) -> Result<(), ScenarioError> {
    if !seen.insert(id) {
        return Err(ScenarioError::DuplicateId {
            kind,
            id: id.to_owned(),
        });
    }
    Ok(())
}

/// Validate a scenario document against the schema's invariants.
pub fn validate(file: &ScenarioFile) -> Result<(), ScenarioError> {
    let mut drone_ids = HashSet::new();
    for drone in &file.drones {
        check_unique("drone", &mut drone_ids, &drone.id)?;
        for (field, value) in [
            ("max_weight", drone.max_weight),
            ("battery_capacity", drone.battery_capacity),
            ("speed", drone.speed),
        ] {
            if value <= 0.0 {
                return Err(ScenarioError::NonPositiveValue {
                    id: drone.id.clone(),
                    field,
                });
            }
        }
    }

    let mut delivery_ids = HashSet::new();
    for delivery in &file.deliveries {
        check_unique("delivery", &mut delivery_ids, &delivery.id)?;
        if delivery.weight < 0.0 {
            return Err(ScenarioError::NegativeWeight {
                id: delivery.id.clone(),
            });
        }
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&delivery.priority) {
            return Err(ScenarioError::PriorityOutOfRange {
                id: delivery.id.clone(),
                priority: delivery.priority,
            });
        }
        if delivery.time_window_end < delivery.time_window_start {
            return Err(ScenarioError::InvertedWindow {
                kind: "delivery",
                id: delivery.id.clone(),
            });
        }
    }

    let mut zone_ids = HashSet::new();
    for zone in &file.no_fly_zones {
        check_unique("no-fly zone", &mut zone_ids, &zone.id)?;
        if zone.polygon_coordinates.len() < 3 {
            return Err(ScenarioError::DegeneratePolygon {
                id: zone.id.clone(),
                count: zone.polygon_coordinates.len(),
            });
        }
        if zone.active_time_end < zone.active_time_start {
            return Err(ScenarioError::InvertedWindow {
                kind: "no-fly zone",
                id: zone.id.clone(),
            });
        }
    }

    Ok(())
}

/// Read and validate a scenario document.
pub fn load_scenario_file(path: impl AsRef<Path>) -> Result<ScenarioFile, ScenarioError> {
    let data = fs::read_to_string(path)?;
    let file: ScenarioFile = serde_json::from_str(&data)?;
    validate(&file)?;
    Ok(file)
}

/// Write a scenario document as pretty-printed JSON.
pub fn write_scenario_file(
    path: impl AsRef<Path>,
    file: &ScenarioFile,
) -> Result<(), ScenarioError> {
    let data = serde_json::to_string_pretty(file)?;
    fs::write(path, data)?;
    Ok(())
}
