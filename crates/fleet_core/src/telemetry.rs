//! Telemetry: records completed deliveries for analysis and reporting.

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed delivery, recorded when the serving drone reaches the
/// target during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedDeliveryRecord {
    pub delivery_id: String,
    pub drone_id: String,
    pub completed_at: DateTime<Utc>,
}

/// Collects simulation telemetry. Inserted at scenario build.
#[derive(Debug, Clone, Default, Resource)]
pub struct SimTelemetry {
    pub completed_deliveries: Vec<CompletedDeliveryRecord>,
}
