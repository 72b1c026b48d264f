//! Planar geometry: points, polygons, and the predicates the router and
//! zone model are built on.
//!
//! All functions are pure and deterministic. Degenerate polygons (collinear
//! vertices, self-intersections) are not validated; callers own that risk.
//! Boundary semantics follow the usual geometric-library convention: a point
//! on a polygon edge is *not* contained.

use serde::{Deserialize, Serialize};

/// Tolerance for on-boundary and collinearity checks.
const EPSILON: f64 = 1e-9;

/// A position on the planar grid. Serializes as a 2-element array `[x, y]`
/// to match the scenario document schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// A simple polygon given as an ordered vertex list. Closure is implicit:
/// the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Strict containment: boundary points are outside. A polygon with fewer
    /// than 3 vertices (including one collapsed to a line) contains nothing.
    pub fn contains(&self, p: Point) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }
        for (a, b) in self.edges() {
            if point_segment_distance(p, a, b) < EPSILON {
                return false;
            }
        }
        // Even-odd ray crossing toward +x.
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Shortest distance from `p` to the polygon boundary; `0.0` when `p`
    /// lies inside.
    pub fn distance_to(&self, p: Point) -> f64 {
        if self.contains(p) {
            return 0.0;
        }
        self.edges()
            .map(|(a, b)| point_segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether the segment `a`–`b` intersects the polygon: it crosses or
    /// touches an edge, or an endpoint lies inside.
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        if self.contains(a) || self.contains(b) {
            return true;
        }
        self.edges()
            .any(|(p, q)| segments_intersect(a, b, p, q))
    }
}

/// Distance from a point to a closed segment.
fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len_sq = abx * abx + aby * aby;
    if len_sq < EPSILON * EPSILON {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    distance(p, Point::new(a.x + t * abx, a.y + t * aby))
}

/// Signed area orientation of the triple (a, b, c).
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

/// Closed-segment intersection test, including collinear overlap and
/// endpoint touches.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    if ((d1 > EPSILON && d2 < -EPSILON) || (d1 < -EPSILON && d2 > EPSILON))
        && ((d3 > EPSILON && d4 < -EPSILON) || (d3 < -EPSILON && d4 > EPSILON))
    {
        return true;
    }

    (d1.abs() <= EPSILON && on_segment(p1, p3, p4))
        || (d2.abs() <= EPSILON && on_segment(p2, p3, p4))
        || (d3.abs() <= EPSILON && on_segment(p3, p1, p2))
        || (d4.abs() <= EPSILON && on_segment(p4, p1, p2))
}
