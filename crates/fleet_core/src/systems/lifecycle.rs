//! Delivery lifecycle housekeeping: pending deliveries whose window has
//! passed with nobody serving them fail terminally.

use bevy_ecs::prelude::{Query, Res};
use tracing::debug;

use crate::clock::SimulationClock;
use crate::world::{Delivery, DeliveryStatus};

pub fn delivery_expiry_system(clock: Res<SimulationClock>, mut deliveries: Query<&mut Delivery>) {
    let now = clock.now_utc();
    for mut delivery in &mut deliveries {
        if delivery.status == DeliveryStatus::Pending && delivery.is_late(now) {
            delivery.expire();
            debug!(delivery = %delivery.id, "window passed unserved, delivery failed");
        }
    }
}
