use crate::{mesh::Triangle, Point, Pos};

pub mod layer_index;
pub use layer_index::LayerIndex;

/// Where a horizontal plane meets a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The plane doesn't touch the triangle.
    Miss,
    /// The plane only touches a single vertex.
    Vertex(Point),
    /// The plane crosses the triangle, or contains exactly one of its edges.
    Segment([Point; 2]),
    /// All three vertices lie in the plane. The edges of such a triangle are
    /// already reported by the neighbouring triangles that cross the plane.
    Coplanar,
}

/// Intersects the plane `z = height` with a triangle. Vertices are compared
/// to the plane with exact float equality.
pub fn intersect(triangle: &Triangle, height: f32) -> Intersection {
    let [v0, v1, v2] = triangle.vertices;

    let mut out = [Point::zeros(); 3];
    let mut n = 0;

    // Vertices lying on the plane are taken as is, no interpolation.
    for v in [v0, v1, v2] {
        if v.z == height {
            out[n] = v.xy();
            n += 1;
        }
    }

    if n == 3 {
        return Intersection::Coplanar;
    }

    // Each edge with one end strictly above and one strictly below the plane
    // adds the point where it crosses. The edge is always walked from its
    // lower end so the two triangles sharing it compute the same point down
    // to the last bit.
    if n < 2 {
        let mut push_crossing = |a: Pos, b: Pos| {
            let (low, high) = if a.z < b.z { (a, b) } else { (b, a) };
            let t = (height - low.z) / (high.z - low.z);
            out[n] = low.xy() + (high.xy() - low.xy()) * t;
            n += 1;
        };

        for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
            let crosses = (a.z < height && b.z > height) || (a.z > height && b.z < height);
            if crosses {
                push_crossing(a, b);
            }
        }
    }

    match n {
        0 => Intersection::Miss,
        1 => Intersection::Vertex(out[0]),
        _ => Intersection::Segment([out[0], out[1]]),
    }
}
