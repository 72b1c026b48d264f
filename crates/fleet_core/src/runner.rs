//! Simulation runner: advances the clock and runs the tick schedule.
//!
//! Clock progression happens here, outside systems: each tick advances the
//! logical time one increment, then runs the schedule once. Ticks are
//! serialized; a tick completes before the next is accepted.

use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;
use chrono::{DateTime, Utc};

use crate::clock::SimulationClock;
use crate::systems::lifecycle::delivery_expiry_system;
use crate::systems::movement::movement_system;

/// Builds the tick schedule: movement first, then lifecycle housekeeping.
pub fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((movement_system, delivery_expiry_system).chain());
    schedule
}

/// Advance the clock one increment and run the schedule once. Returns the
/// new current instant.
pub fn run_tick(world: &mut World, schedule: &mut Schedule) -> DateTime<Utc> {
    let now = world.resource_mut::<SimulationClock>().advance();
    schedule.run(world);
    now
}

/// Run `count` ticks back to back. Returns the instant after the last tick.
pub fn run_ticks(world: &mut World, schedule: &mut Schedule, count: u64) -> DateTime<Utc> {
    let mut now = world.resource::<SimulationClock>().now_utc();
    for _ in 0..count {
        now = run_tick(world, schedule);
    }
    now
}
