mod support;

use chrono::Duration;
use fleet_core::geometry::{distance, Point};
use fleet_core::router::GridRouter;
use fleet_core::world::{Drone, NoFlyZone};

use support::world::test_epoch;

fn active_zone(vertices: Vec<Point>) -> NoFlyZone {
    NoFlyZone::new(
        "Z",
        vertices,
        test_epoch() - Duration::hours(1),
        test_epoch() + Duration::hours(1),
    )
}

fn test_drone() -> Drone {
    Drone::new("D1", 10.0, 1000.0, 10.0, Point::new(0.0, 0.0))
}

#[test]
fn straight_shot_returns_a_six_point_path() {
    let router = GridRouter::new(20.0, 20.0);
    let drone = test_drone();
    let path = router.find_path(
        Point::new(0.0, 0.0),
        Point::new(5.0, 0.0),
        &drone,
        &[],
        test_epoch(),
    );
    assert_eq!(path.len(), 6);
    assert_eq!(path[0], Point::new(0.0, 0.0));
    assert_eq!(path[path.len() - 1], Point::new(5.0, 0.0));
}

#[test]
fn every_returned_path_starts_at_start_and_steps_between_neighbors() {
    let router = GridRouter::new(20.0, 20.0);
    let drone = test_drone();
    let start = Point::new(1.0, 2.0);
    let path = router.find_path(start, Point::new(9.0, 11.0), &drone, &[], test_epoch());
    assert!(!path.is_empty());
    assert_eq!(path[0], start);
    for pair in path.windows(2) {
        let dx = (pair[1].x - pair[0].x).abs();
        let dy = (pair[1].y - pair[0].y).abs();
        assert!(dx <= 1.0 + 1e-9 && dy <= 1.0 + 1e-9, "non-adjacent step");
        assert!(dx + dy > 0.0, "path repeats a point");
    }
}

#[test]
fn zone_detour_avoids_the_interior_and_lengthens_the_path() {
    let router = GridRouter::new(20.0, 20.0);
    let drone = test_drone();
    let zone = active_zone(vec![
        Point::new(2.0, -1.0),
        Point::new(2.0, 1.0),
        Point::new(4.0, 1.0),
        Point::new(4.0, -1.0),
    ]);
    let zones = vec![zone.clone()];

    let path = router.find_path(
        Point::new(0.0, 0.0),
        Point::new(5.0, 0.0),
        &drone,
        &zones,
        test_epoch(),
    );
    assert!(!path.is_empty());
    for point in &path {
        assert!(
            !zone.contains_point(*point),
            "path enters the active zone at ({}, {})",
            point.x,
            point.y
        );
    }
    let total: f64 = path.windows(2).map(|w| distance(w[0], w[1])).sum();
    assert!(total > 5.0, "detour length {total} should exceed the straight shot");
}

#[test]
fn inactive_zones_do_not_deflect_the_route() {
    let router = GridRouter::new(20.0, 20.0);
    let drone = test_drone();
    let mut zone = active_zone(vec![
        Point::new(2.0, -1.0),
        Point::new(2.0, 1.0),
        Point::new(4.0, 1.0),
        Point::new(4.0, -1.0),
    ]);
    zone.active_time_start = test_epoch() + Duration::hours(2);
    zone.active_time_end = test_epoch() + Duration::hours(3);

    let path = router.find_path(
        Point::new(0.0, 0.0),
        Point::new(5.0, 0.0),
        &drone,
        &[zone],
        test_epoch(),
    );
    assert_eq!(path.len(), 6, "dormant zone must not force a detour");
}

#[test]
fn energy_pruning_returns_the_empty_sentinel() {
    let router = GridRouter::new(20.0, 20.0);
    let mut drone = test_drone();
    // Exactly three unit steps at speed 10 and zero payload.
    drone.current_battery = 0.3;
    let path = router.find_path(
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        &drone,
        &[],
        test_epoch(),
    );
    assert!(path.is_empty());
}

#[test]
fn repeated_queries_are_deterministic() {
    let router = GridRouter::new(20.0, 20.0);
    let drone = test_drone();
    let zone = active_zone(vec![
        Point::new(3.0, 2.0),
        Point::new(6.0, 2.0),
        Point::new(6.0, 6.0),
        Point::new(3.0, 6.0),
    ]);
    let zones = vec![zone];

    let first = router.find_path(
        Point::new(0.0, 0.0),
        Point::new(9.0, 9.0),
        &drone,
        &zones,
        test_epoch(),
    );
    let second = router.find_path(
        Point::new(0.0, 0.0),
        Point::new(9.0, 9.0),
        &drone,
        &zones,
        test_epoch(),
    );
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn fully_walled_goal_is_unreachable() {
    let router = GridRouter::new(20.0, 20.0);
    let drone = test_drone();
    // A ring of forbidden interior around the goal: the goal cell itself is
    // inside, so every node near it carries infinite penalty.
    let zone = active_zone(vec![
        Point::new(8.0, 8.0),
        Point::new(12.0, 8.0),
        Point::new(12.0, 12.0),
        Point::new(8.0, 12.0),
    ]);
    let path = router.find_path(
        Point::new(0.0, 0.0),
        Point::new(10.0, 10.0),
        &drone,
        &[zone],
        test_epoch(),
    );
    assert!(path.is_empty());
}
