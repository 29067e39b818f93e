use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use common::{progress::Progress, serde::SliceDeserializer};
use mesh_format::Facet;
use nalgebra::Vector3;
use ordered_float::OrderedFloat;

use crate::Pos;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Pos; 3],
    /// Carried over from the mesh file, slicing never looks at it.
    pub normal: Pos,
}

/// An immutable triangle soup along with its vertical bounds. Cloning is
/// cheap, the triangles are shared.
#[derive(Debug, Clone)]
pub struct Mesh {
    inner: Arc<MeshInner>,
}

#[derive(Debug)]
struct MeshInner {
    triangles: Box<[Triangle]>,
    z_min: f32,
    z_max: f32,
}

impl Triangle {
    pub fn new(vertices: [Pos; 3], normal: Pos) -> Self {
        Self { vertices, normal }
    }

    /// Creates a triangle with a normal following the right hand rule.
    pub fn from_vertices(vertices: [Pos; 3]) -> Self {
        let [v0, v1, v2] = vertices;
        let normal = (v1 - v0)
            .cross(&(v2 - v0))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        Self { vertices, normal }
    }

    /// Gets the min and max heights of the vertices.
    pub fn z_range(&self) -> (f32, f32) {
        let [v0, v1, v2] = self.vertices;
        (v0.z.min(v1.z).min(v2.z), v0.z.max(v1.z).max(v2.z))
    }
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let (z_min, z_max) = vertical_bounds(&triangles);
        Self {
            inner: Arc::new(MeshInner {
                triangles: triangles.into_boxed_slice(),
                z_min,
                z_max,
            }),
        }
    }

    pub fn from_facets(facets: &[Facet]) -> Self {
        let triangles = facets
            .iter()
            .map(|facet| Triangle::new(facet.vertices, facet.normal))
            .collect();
        Self::new(triangles)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.inner.triangles
    }

    pub fn triangle(&self, index: usize) -> &Triangle {
        &self.inner.triangles[index]
    }

    pub fn triangle_count(&self) -> usize {
        self.inner.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.triangles.is_empty()
    }

    /// Minimum and maximum z over every vertex. For a mesh without triangles
    /// this is `(f32::MAX, f32::MIN)`, an empty range.
    pub fn bounds(&self) -> (f32, f32) {
        (self.inner.z_min, self.inner.z_max)
    }

    /// Checks that every edge is shared by exactly two triangles. Vertices
    /// are matched by exact coordinate equality (so `-0.0` and `0.0` are the
    /// same), the same way slicing matches segment endpoints.
    pub fn is_manifold(&self) -> bool {
        let mut edges = HashMap::<_, u8>::new();

        for triangle in self.triangles() {
            let [a, b, c] = triangle
                .vertices
                .map(|v| [OrderedFloat(v.x), OrderedFloat(v.y), OrderedFloat(v.z)]);
            for (a, b) in [(a, b), (b, c), (c, a)] {
                let count = edges.entry((a.min(b), a.max(b))).or_default();
                *count = count.saturating_add(1);
            }
        }

        !edges.is_empty() && edges.values().all(|&count| count == 2)
    }
}

impl From<mesh_format::Mesh> for Mesh {
    fn from(mesh: mesh_format::Mesh) -> Self {
        Self::from_facets(&mesh.facets)
    }
}

/// Parses a mesh file that has already been read into memory. `format` is
/// the file extension.
pub fn load_mesh(data: &[u8], format: &str) -> Result<Mesh> {
    let mut des = SliceDeserializer::new(data);
    let mesh = mesh_format::load_mesh(&mut des, format, Progress::new())?;
    Ok(Mesh::from(mesh))
}

fn vertical_bounds(triangles: &[Triangle]) -> (f32, f32) {
    triangles
        .iter()
        .flat_map(|x| x.vertices.iter())
        .fold((f32::MAX, f32::MIN), |(min, max), v| {
            (min.min(v.z), max.max(v.z))
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::builder::MeshBuilder;

    #[test]
    fn empty_mesh_has_empty_bounds() {
        let mesh = Mesh::new(Vec::new());
        let (min, max) = mesh.bounds();
        assert!(mesh.is_empty());
        assert!(min > max);
    }

    #[test]
    fn facets_keep_vertex_order() {
        let facet = Facet {
            normal: Pos::new(0.0, 0.0, 1.0),
            vertices: [
                Pos::new(1.0, 2.0, 3.0),
                Pos::new(4.0, 5.0, 6.0),
                Pos::new(7.0, 8.0, -9.0),
            ],
        };

        let mesh = Mesh::from_facets(&[facet]);
        assert_eq!(mesh.triangle(0).vertices, facet.vertices);
        assert_eq!(mesh.triangle(0).normal, facet.normal);
        assert_eq!(mesh.bounds(), (-9.0, 6.0));
    }

    #[test]
    fn box_is_manifold() {
        let mut builder = MeshBuilder::new();
        builder.add_box(Pos::zeros(), Pos::new(1.0, 2.0, 3.0));
        assert!(builder.build().is_manifold());
    }

    #[test]
    fn signed_zero_is_same_vertex() {
        // Faces of a tetrahedron disagree on the sign of zero at the shared
        // vertices.
        let flip = |v: Pos| v.map(|x| if x == 0.0 { -0.0 } else { x });
        let (a, b, c, d) = (
            Pos::new(0.0, 0.0, 0.0),
            Pos::new(1.0, 0.0, 0.0),
            Pos::new(0.0, 1.0, 0.0),
            Pos::new(0.0, 0.0, 1.0),
        );

        let mesh = Mesh::new(vec![
            Triangle::from_vertices([a, c, b]),
            Triangle::from_vertices([flip(a), flip(b), flip(d)]),
            Triangle::from_vertices([b, c, d]),
            Triangle::from_vertices([flip(c), flip(a), flip(d)]),
        ]);
        assert!(mesh.is_manifold());
    }

    #[test]
    fn open_surface_is_not_manifold() {
        let mesh = Mesh::new(vec![Triangle::from_vertices([
            Pos::new(0.0, 0.0, 0.0),
            Pos::new(1.0, 0.0, 0.0),
            Pos::new(0.0, 1.0, 0.0),
        ])]);
        assert!(!mesh.is_manifold());
        assert!(!Mesh::new(Vec::new()).is_manifold());
    }

    #[test]
    fn load_truncated_stl() {
        let mut data = vec![0; 80];
        data.extend_from_slice(&3_u32.to_le_bytes());
        data.extend_from_slice(&[0; 50 * 2]);

        assert!(load_mesh(&data, "stl").is_err());
    }

    fn arb_pos() -> impl Strategy<Value = Pos> {
        (-1e3_f32..1e3, -1e3_f32..1e3, -1e3_f32..1e3).prop_map(|(x, y, z)| Pos::new(x, y, z))
    }

    proptest! {
        #[test]
        fn bounds_match_vertices(tris in prop::collection::vec([arb_pos(), arb_pos(), arb_pos()], 1..50)) {
            let mesh = Mesh::new(tris.iter().copied().map(Triangle::from_vertices).collect());

            let zs = tris.iter().flatten().map(|v| v.z).collect::<Vec<_>>();
            let min = zs.iter().copied().fold(f32::INFINITY, f32::min);
            let max = zs.iter().copied().fold(f32::NEG_INFINITY, f32::max);

            prop_assert_eq!(mesh.bounds(), (min, max));
            for z in zs {
                prop_assert!(min <= z && z <= max);
            }
        }
    }
}
