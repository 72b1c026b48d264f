//! Minimal end-to-end run: build a scenario in memory, plan with the greedy
//! sequencer, advance a few ticks, and print the world snapshot.
//!
//! ```sh
//! cargo run --example plan_and_tick
//! ```

use bevy_ecs::prelude::World;
use chrono::{Duration, Utc};

use fleet_core::geometry::Point;
use fleet_core::planner::{run_planner, PlannerKind};
use fleet_core::runner::{run_ticks, tick_schedule};
use fleet_core::scenario::{
    build_scenario, DeliverySpec, DroneSpec, ScenarioFile, ScenarioParams, ZoneSpec,
};
use fleet_core::snapshot::capture_snapshot;

fn main() {
    let now = Utc::now();
    let file = ScenarioFile {
        drones: vec![DroneSpec {
            id: "D1".into(),
            max_weight: 10.0,
            battery_capacity: 1000.0,
            speed: 10.0,
            start_position: Point::new(0.0, 0.0),
        }],
        deliveries: vec![
            DeliverySpec {
                id: "P1".into(),
                position: Point::new(8.0, 3.0),
                weight: 2.0,
                priority: 1,
                time_window_start: now - Duration::hours(1),
                time_window_end: now + Duration::hours(6),
            },
            DeliverySpec {
                id: "P2".into(),
                position: Point::new(12.0, 12.0),
                weight: 3.0,
                priority: 4,
                time_window_start: now - Duration::hours(1),
                time_window_end: now + Duration::hours(6),
            },
        ],
        no_fly_zones: vec![ZoneSpec {
            id: "Z1".into(),
            polygon_coordinates: vec![
                Point::new(4.0, 1.0),
                Point::new(6.0, 1.0),
                Point::new(6.0, 5.0),
                Point::new(4.0, 5.0),
            ],
            active_time_start: now - Duration::hours(1),
            active_time_end: now + Duration::hours(2),
        }],
    };

    let mut world = World::new();
    build_scenario(&mut world, &file, ScenarioParams::default().with_epoch(now))
        .expect("valid scenario");

    let report = run_planner(&mut world, PlannerKind::AstarSequence);
    println!(
        "planned: {} assigned, {} routed",
        report.assigned, report.routed
    );

    let mut schedule = tick_schedule();
    run_ticks(&mut world, &mut schedule, 12);

    let snapshot = capture_snapshot(&mut world);
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).expect("serializable snapshot")
    );
}
