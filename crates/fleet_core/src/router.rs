//! Grid router: energy-gated weighted A* over an 8-connected lattice with
//! time-windowed no-fly-zone penalties.
//!
//! The lattice is anchored at the query's start point with spacing
//! `resolution`; the search stops once a node within one resolution of the
//! goal is expanded. Edge cost is the Euclidean step plus the summed penalty
//! of the zones active at query time; a node strictly inside an active zone
//! is forbidden outright. Successors whose running cost from the origin
//! would outrun the drone's battery at its current payload are pruned.
//!
//! The zone-penalty field depends only on the point and the set of active
//! zones, so evaluations are memoized in an LRU cache keyed by the point's
//! bit pattern and a fingerprint of that set.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BinaryHeap, HashMap};
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Mutex;

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Utc};
use lru::LruCache;

use crate::geometry::{distance, Point};
use crate::world::{Drone, NoFlyZone};

/// Lattice offsets in fixed expansion order: N, E, S, W, NE, NW, SE, SW.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Entries kept in the penalty-field cache.
const PENALTY_CACHE_CAPACITY: usize = 16_384;

/// Frontier entry: min-heap on f-score, ties broken by insertion order.
struct Candidate {
    f_score: f64,
    seq: u64,
    node: (i32, i32),
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: invert so the smallest f-score pops
        // first, earliest insertion first among equals.
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Weighted A* router over the bounded grid `[0, width) × [0, height)`.
#[derive(Resource)]
pub struct GridRouter {
    width: f64,
    height: f64,
    resolution: f64,
    penalty_cache: Mutex<LruCache<(u64, u64, u64), f64>>,
}

impl GridRouter {
    /// Router over `[0, width) × [0, height)` with the default resolution 1.0.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_resolution(width, height, 1.0)
    }

    pub fn with_resolution(width: f64, height: f64, resolution: f64) -> Self {
        assert!(resolution > 0.0, "grid resolution must be positive");
        Self {
            width,
            height,
            resolution,
            penalty_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(PENALTY_CACHE_CAPACITY).expect("cache capacity must be > 0"),
            )),
        }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    fn in_bounds(&self, p: Point) -> bool {
        0.0 <= p.x && p.x < self.width && 0.0 <= p.y && p.y < self.height
    }

    fn point_at(&self, start: Point, node: (i32, i32)) -> Point {
        Point::new(
            start.x + f64::from(node.0) * self.resolution,
            start.y + f64::from(node.1) * self.resolution,
        )
    }

    /// Summed penalty of the active zones at `p`, memoized.
    fn zone_penalty(&self, p: Point, active: &[&NoFlyZone], fingerprint: u64) -> f64 {
        let key = (p.x.to_bits(), p.y.to_bits(), fingerprint);
        if let Ok(mut cache) = self.penalty_cache.lock() {
            if let Some(&cached) = cache.get(&key) {
                return cached;
            }
        }
        let penalty: f64 = active.iter().map(|zone| zone.penalty_at(p)).sum();
        if let Ok(mut cache) = self.penalty_cache.lock() {
            cache.put(key, penalty);
        }
        penalty
    }

    /// Find a path from `start` toward `goal` for `drone`, avoiding the
    /// zones active at `now`.
    ///
    /// A non-empty result begins exactly at `start`, steps between
    /// 8-connected lattice neighbors, and ends within one resolution of
    /// `goal`. The empty vector is the sentinel for "unreachable under
    /// current constraints": no in-bounds route exists, the battery envelope
    /// prunes every approach, or the goal does not sit on the lattice
    /// anchored at `start`.
    pub fn find_path(
        &self,
        start: Point,
        goal: Point,
        drone: &Drone,
        zones: &[NoFlyZone],
        now: DateTime<Utc>,
    ) -> Vec<Point> {
        let active: Vec<&NoFlyZone> = zones.iter().filter(|zone| zone.is_active(now)).collect();
        let fingerprint = active_set_fingerprint(&active);

        let origin = (0i32, 0i32);
        let mut frontier = BinaryHeap::new();
        let mut came_from: HashMap<(i32, i32), (i32, i32)> = HashMap::new();
        let mut cost_so_far: HashMap<(i32, i32), f64> = HashMap::new();
        let mut seq: u64 = 0;

        frontier.push(Candidate {
            f_score: 0.0,
            seq,
            node: origin,
        });
        cost_so_far.insert(origin, 0.0);

        while let Some(Candidate { node: current, .. }) = frontier.pop() {
            let current_point = self.point_at(start, current);
            if distance(current_point, goal) < self.resolution {
                break;
            }

            let current_cost = cost_so_far[&current];
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let next = (current.0 + dx, current.1 + dy);
                let next_point = self.point_at(start, next);
                if !self.in_bounds(next_point) {
                    continue;
                }

                let penalty = self.zone_penalty(next_point, &active, fingerprint);
                if penalty.is_infinite() {
                    continue;
                }

                let new_cost = current_cost + distance(current_point, next_point) + penalty;
                if !drone.has_sufficient_battery(new_cost) {
                    continue;
                }

                if cost_so_far.get(&next).map_or(true, |&c| new_cost < c) {
                    cost_so_far.insert(next, new_cost);
                    came_from.insert(next, current);
                    seq += 1;
                    frontier.push(Candidate {
                        f_score: new_cost + distance(next_point, goal),
                        seq,
                        node: next,
                    });
                }
            }
        }

        self.reconstruct(start, goal, &came_from)
    }

    /// Walk parents back from the goal's lattice node. A reconstruction that
    /// does not reach `start` yields the empty sentinel.
    fn reconstruct(
        &self,
        start: Point,
        goal: Point,
        came_from: &HashMap<(i32, i32), (i32, i32)>,
    ) -> Vec<Point> {
        let gi = ((goal.x - start.x) / self.resolution).round();
        let gj = ((goal.y - start.y) / self.resolution).round();
        if !gi.is_finite() || !gj.is_finite() || gi.abs() > i32::MAX as f64 || gj.abs() > i32::MAX as f64
        {
            return Vec::new();
        }
        let goal_node = (gi as i32, gj as i32);
        if self.point_at(start, goal_node) != goal {
            return Vec::new();
        }

        let mut reversed = vec![goal_node];
        let mut current = goal_node;
        while let Some(&parent) = came_from.get(&current) {
            current = parent;
            reversed.push(parent);
        }

        let path: Vec<Point> = reversed
            .into_iter()
            .rev()
            .map(|node| self.point_at(start, node))
            .collect();
        if path.first() != Some(&start) {
            return Vec::new();
        }
        path
    }
}

/// Order-sensitive fingerprint of the active zone set (ids and vertices), so
/// penalty-cache entries never alias across differing sets.
fn active_set_fingerprint(active: &[&NoFlyZone]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for zone in active {
        zone.id.hash(&mut hasher);
        for vertex in zone.polygon.vertices() {
            vertex.x.to_bits().hash(&mut hasher);
            vertex.y.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}
