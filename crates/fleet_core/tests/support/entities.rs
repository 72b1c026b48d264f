#![allow(dead_code)]

use bevy_ecs::prelude::{Entity, World};
use chrono::Duration;

use fleet_core::geometry::Point;
use fleet_core::world::{Delivery, Drone};

use super::world::test_epoch;

/// Spawn a drone with the given limits at `start`.
pub fn spawn_drone(
    world: &mut World,
    id: &str,
    max_weight: f64,
    battery_capacity: f64,
    speed: f64,
    start: Point,
) -> Entity {
    world
        .spawn(Drone::new(id, max_weight, battery_capacity, speed, start))
        .id()
}

/// Spawn a pending delivery whose window comfortably covers the test epoch
/// and a few ticks after it.
pub fn spawn_delivery(
    world: &mut World,
    id: &str,
    position: Point,
    weight: f64,
    priority: u8,
) -> Entity {
    let delivery = Delivery::new(
        id,
        position,
        weight,
        priority,
        test_epoch() - Duration::hours(1),
        test_epoch() + Duration::hours(6),
    );
    world.spawn(delivery).id()
}

pub fn drone(world: &World, entity: Entity) -> Drone {
    world.get::<Drone>(entity).expect("drone component").clone()
}

pub fn delivery(world: &World, entity: Entity) -> Delivery {
    world
        .get::<Delivery>(entity)
        .expect("delivery component")
        .clone()
}
