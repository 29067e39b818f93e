use std::collections::HashSet;

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    intersection::{intersect, Intersection, LayerIndex},
    mesh::Mesh,
    Point,
};

/// Hashable form of a point, equal exactly when the coordinates are.
pub type PointKey = [OrderedFloat<f32>; 2];

/// A piece of a layer's outline, where one triangle crosses the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn reversed(self) -> Self {
        Self::new(self.b, self.a)
    }

    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }

    /// Equality ignoring direction.
    pub fn same_edge(&self, other: &Segment) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }

    /// Key that is the same for a segment and its reverse.
    pub fn key(&self) -> (PointKey, PointKey) {
        let (a, b) = (point_key(&self.a), point_key(&self.b));
        (a.min(b), a.max(b))
    }
}

pub fn point_key(point: &Point) -> PointKey {
    [OrderedFloat(point.x), OrderedFloat(point.y)]
}

/// Intersects every triangle of the mesh with the plane at `height`. Only
/// triangles that cross the plane along a line contribute. Degenerate and
/// duplicate (in either direction) segments are dropped, the rest stay in
/// mesh order.
pub fn collect(mesh: &Mesh, height: f32) -> Vec<Segment> {
    dedup(mesh.triangles().iter().map(|x| intersect(x, height)))
}

/// Same as [`collect`] but only visits the triangles the index returns for
/// this height. The output is identical.
pub fn collect_indexed(mesh: &Mesh, index: &LayerIndex, height: f32) -> Vec<Segment> {
    let faces = index.faces(height).iter();
    dedup(faces.map(|&x| intersect(mesh.triangle(x), height)))
}

fn dedup(intersections: impl Iterator<Item = Intersection>) -> Vec<Segment> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for intersection in intersections {
        let Intersection::Segment([a, b]) = intersection else {
            continue;
        };

        let segment = Segment::new(a, b);
        if !segment.is_degenerate() && seen.insert(segment.key()) {
            out.push(segment);
        }
    }

    out
}
