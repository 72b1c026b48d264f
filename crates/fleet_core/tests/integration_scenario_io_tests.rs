mod support;

use bevy_ecs::prelude::World;
use chrono::{Duration, TimeZone, Utc};
use fleet_core::clock::SimulationClock;
use fleet_core::geometry::Point;
use fleet_core::scenario::{
    build_scenario, load_scenario_file, save_scenario, write_scenario_file, DeliverySpec,
    DroneSpec, ScenarioError, ScenarioFile, ScenarioParams, ZoneSpec,
};
use fleet_core::snapshot::capture_snapshot;
use fleet_core::world::{Delivery, DeliveryStatus, Drone};

use support::world::test_epoch;

fn sample_file() -> ScenarioFile {
    let window_start = test_epoch() - Duration::hours(1);
    let window_end = test_epoch() + Duration::hours(6);
    ScenarioFile {
        drones: vec![
            DroneSpec {
                id: "D1".into(),
                max_weight: 10.0,
                battery_capacity: 1000.0,
                speed: 10.0,
                start_position: Point::new(0.0, 0.0),
            },
            DroneSpec {
                id: "D2".into(),
                max_weight: 4.0,
                battery_capacity: 800.0,
                speed: 8.0,
                start_position: Point::new(10.0, 10.0),
            },
        ],
        deliveries: vec![DeliverySpec {
            id: "X".into(),
            position: Point::new(5.0, 0.0),
            weight: 1.0,
            priority: 2,
            time_window_start: window_start,
            time_window_end: window_end,
        }],
        no_fly_zones: vec![ZoneSpec {
            id: "Z1".into(),
            polygon_coordinates: vec![
                Point::new(2.0, 2.0),
                Point::new(4.0, 2.0),
                Point::new(4.0, 4.0),
                Point::new(2.0, 4.0),
            ],
            active_time_start: window_start,
            active_time_end: window_end,
        }],
    }
}

#[test]
fn scenario_files_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("scenario.json");

    let original = sample_file();
    write_scenario_file(&path, &original).expect("write");
    let loaded = load_scenario_file(&path).expect("load");
    assert_eq!(loaded, original);
}

#[test]
fn building_then_saving_reproduces_the_document() {
    let file = sample_file();
    let mut world = World::new();
    build_scenario(
        &mut world,
        &file,
        ScenarioParams::default().with_epoch(test_epoch()),
    )
    .expect("valid scenario");

    let saved = save_scenario(&mut world);
    assert_eq!(saved, file);
}

#[test]
fn built_entities_carry_initial_state_defaults() {
    let file = sample_file();
    let mut world = World::new();
    build_scenario(
        &mut world,
        &file,
        ScenarioParams::default().with_epoch(test_epoch()),
    )
    .expect("valid scenario");

    let mut drones = world.query::<&Drone>();
    for drone in drones.iter(&world) {
        assert_eq!(drone.current_position, drone.start_position);
        assert_eq!(drone.current_battery, drone.battery_capacity);
        assert_eq!(drone.current_weight, 0.0);
        assert_eq!(drone.route, vec![drone.start_position]);
    }

    let mut deliveries = world.query::<&Delivery>();
    for delivery in deliveries.iter(&world) {
        assert_eq!(delivery.status, DeliveryStatus::Pending);
        assert!(delivery.assigned_drone.is_none());
        assert!(delivery.actual_delivery_time.is_none());
    }

    let clock = world.resource::<SimulationClock>();
    assert_eq!(clock.now_utc(), test_epoch());
}

#[test]
fn a_rejected_document_leaves_the_world_untouched() {
    let mut file = sample_file();
    file.no_fly_zones[0].polygon_coordinates.truncate(2);

    let mut world = World::new();
    let result = build_scenario(&mut world, &file, ScenarioParams::default());
    assert!(matches!(result, Err(ScenarioError::DegeneratePolygon { .. })));
    assert!(world.get_resource::<SimulationClock>().is_none());
    assert_eq!(world.entities().len(), 0);
}

#[test]
fn malformed_documents_surface_as_loader_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").expect("write");

    assert!(matches!(
        load_scenario_file(&path),
        Err(ScenarioError::Malformed(_))
    ));
}

#[test]
fn entity_serialization_round_trips() {
    let mut drone = Drone::new("D1", 10.0, 1000.0, 10.0, Point::new(0.0, 0.0));
    drone.extend_route(Point::new(1.0, 0.0), 1.0);
    drone.load_package(2.5);

    let json = serde_json::to_string(&drone).expect("serialize drone");
    let back: Drone = serde_json::from_str(&json).expect("deserialize drone");
    assert_eq!(back, drone);

    let mut delivery = Delivery::new(
        "X",
        Point::new(5.0, 0.0),
        1.0,
        2,
        Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        Utc.timestamp_opt(1_700_010_000, 0).unwrap(),
    );
    delivery.assign_to("D1");
    delivery.complete(Utc.timestamp_opt(1_700_005_000, 0).unwrap());

    let json = serde_json::to_string(&delivery).expect("serialize delivery");
    let back: Delivery = serde_json::from_str(&json).expect("deserialize delivery");
    assert_eq!(back, delivery);
}

#[test]
fn schema_form_deliveries_materialize_unset_optionals() {
    let json = r#"{
        "id": "X",
        "position": [5.0, 0.0],
        "weight": 1.0,
        "priority": 2,
        "time_window_start": "2026-08-01T00:00:00Z",
        "time_window_end": "2026-08-01T06:00:00Z"
    }"#;
    let delivery: Delivery = serde_json::from_str(json).expect("deserialize");
    assert_eq!(delivery.status, DeliveryStatus::Pending);
    assert!(delivery.assigned_drone.is_none());
    assert!(delivery.actual_delivery_time.is_none());
}

#[test]
fn snapshots_expose_the_full_world_state() {
    let file = sample_file();
    let mut world = World::new();
    build_scenario(
        &mut world,
        &file,
        ScenarioParams::default().with_epoch(test_epoch()),
    )
    .expect("valid scenario");

    let snapshot = capture_snapshot(&mut world);
    assert_eq!(snapshot.tick, 0);
    assert_eq!(snapshot.captured_at, test_epoch());
    assert_eq!(snapshot.drones.len(), 2);
    assert_eq!(snapshot.deliveries.len(), 1);
    assert_eq!(snapshot.no_fly_zones.len(), 1);
    assert!(snapshot.completed_deliveries.is_empty());

    // The snapshot is itself a serializable document.
    let json = serde_json::to_string(&snapshot).expect("serialize snapshot");
    assert!(json.contains("\"current_battery\""));
    assert!(json.contains("\"polygon_coordinates\""));
}
