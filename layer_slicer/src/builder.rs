use std::f32::consts::{FRAC_PI_4, TAU};

use nalgebra::{Vector2, Vector3};

use crate::{
    mesh::{Mesh, Triangle},
    Pos,
};

/// Builds meshes out of simple solids. Vertices are shared between faces by
/// index, so the resulting triangles of adjacent faces have bit identical
/// edges and slice into closed perimeters.
pub struct MeshBuilder {
    vertices: Vec<Pos>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, vertex: Pos) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_face(&mut self, face: [u32; 3]) {
        self.faces.push(face);
    }

    /// Adds two triangles sharing the `quad[1]`-`quad[2]` diagonal.
    pub fn add_quad(&mut self, quad: [u32; 4]) {
        self.add_face([quad[0], quad[1], quad[2]]);
        self.add_face([quad[2], quad[1], quad[3]]);
    }

    pub fn build(self) -> Mesh {
        let triangles = self
            .faces
            .iter()
            .map(|face| Triangle::from_vertices(face.map(|i| self.vertices[i as usize])))
            .collect();
        Mesh::new(triangles)
    }
}

impl MeshBuilder {
    /// Axis aligned box spanning from `min` to `max`.
    pub fn add_box(&mut self, min: Pos, max: Pos) {
        let corners = (0..8)
            .map(|i| {
                let pick = |bit: u32, lo: f32, hi: f32| if i & bit == 0 { lo } else { hi };
                self.add_vertex(Vector3::new(
                    pick(1, min.x, max.x),
                    pick(2, min.y, max.y),
                    pick(4, min.z, max.z),
                ))
            })
            .collect::<Vec<_>>();

        for quad in [
            [0, 1, 2, 3],
            [4, 5, 6, 7],
            [0, 1, 4, 5],
            [2, 3, 6, 7],
            [0, 2, 4, 6],
            [1, 3, 5, 7],
        ] {
            self.add_quad(quad.map(|i| corners[i]));
        }
    }

    pub fn add_vertical_cylinder(
        &mut self,
        bottom: Pos,
        height: f32,
        (bottom_radius, top_radius): (f32, f32),
        precision: u32,
    ) {
        let top = bottom + Vector3::new(0.0, 0.0, height);
        let bottom_center = self.add_vertex(bottom);
        let top_center = self.add_vertex(top);

        let mut last = None;
        let mut first = None;
        for i in 0..precision {
            let angle = TAU * (i as f32) / (precision as f32);
            let normal = Vector3::new(angle.sin(), angle.cos(), 0.0);

            let top = self.add_vertex(top + normal * top_radius);
            let bottom = self.add_vertex(bottom + normal * bottom_radius);

            if let Some((last_top, last_bottom)) = last {
                self.add_quad([last_bottom, last_top, bottom, top]);
                self.add_face([top, last_top, top_center]);
                self.add_face([bottom_center, last_bottom, bottom]);
            }

            last = Some((top, bottom));
            if first.is_none() {
                first = Some((top, bottom));
            }
        }

        if let (Some((first_top, first_bottom)), Some((last_top, last_bottom))) = (first, last) {
            self.add_quad([last_bottom, last_top, first_bottom, first_top]);
            self.add_face([first_top, last_top, top_center]);
            self.add_face([bottom_center, last_bottom, first_bottom]);
        }
    }

    /// Square block with a round vertical hole through its center. `min` is
    /// the lowest corner, the hole is approximated with `4 * per_side`
    /// sides. The outer walls are split into the same number of pieces so
    /// the top and bottom faces are rings of quads.
    pub fn add_box_with_hole(
        &mut self,
        min: Pos,
        size: f32,
        height: f32,
        radius: f32,
        per_side: u32,
    ) {
        let per_side = per_side.max(1);
        let count = per_side as usize * 4;

        let (lo, hi) = (min.xy(), min.xy() + Vector2::repeat(size));
        let center = (lo + hi) / 2.0;
        let step = size / per_side as f32;

        // Walk the square counter clockwise starting at the (+x, +y) corner.
        // Corners are taken as is so the sides stay exactly axis aligned.
        let corners = [hi, Vector2::new(lo.x, hi.y), lo, Vector2::new(hi.x, lo.y)];
        let directions = [
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, -1.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        let square = (0..count).map(|i| {
            let (side, j) = (i / per_side as usize, i % per_side as usize);
            corners[side] + directions[side] * (j as f32 * step)
        });
        let circle = (0..count).map(|i| {
            let angle = FRAC_PI_4 + TAU * i as f32 / count as f32;
            center + Vector2::new(angle.cos(), angle.sin()) * radius
        });

        let (bottom, top) = (min.z, min.z + height);
        let outer = self.add_ring(square, bottom, top);
        let inner = self.add_ring(circle, bottom, top);

        for i in 0..count {
            let k = (i + 1) % count;
            let ((ob, ot), (ob_next, ot_next)) = (outer[i], outer[k]);
            let ((ib, it), (ib_next, it_next)) = (inner[i], inner[k]);

            self.add_quad([ob, ot, ob_next, ot_next]);
            self.add_quad([ib, it, ib_next, it_next]);
            self.add_quad([ot, ot_next, it, it_next]);
            self.add_quad([ob, ob_next, ib, ib_next]);
        }
    }

    /// Adds each point at both heights, returning the (bottom, top) indices.
    fn add_ring(
        &mut self,
        points: impl Iterator<Item = Vector2<f32>>,
        bottom: f32,
        top: f32,
    ) -> Vec<(u32, u32)> {
        points
            .map(|p| (self.add_vertex(p.push(bottom)), self.add_vertex(p.push(top))))
            .collect()
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_bounds() {
        let mut builder = MeshBuilder::new();
        builder.add_box(Pos::new(-1.0, -2.0, 0.5), Pos::new(1.0, 2.0, 4.0));
        let mesh = builder.build();

        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.bounds(), (0.5, 4.0));
    }

    #[test]
    fn box_with_hole_is_closed() {
        let mut builder = MeshBuilder::new();
        builder.add_box_with_hole(Pos::zeros(), 20.0, 20.0, 5.0, 4);
        let mesh = builder.build();

        // 16 segments around, four quads each
        assert_eq!(mesh.triangle_count(), 16 * 4 * 2);
        assert_eq!(mesh.bounds(), (0.0, 20.0));
        assert!(mesh.is_manifold());
    }

    #[test]
    fn cylinder_is_closed() {
        let mut builder = MeshBuilder::new();
        builder.add_vertical_cylinder(Pos::zeros(), 3.0, (1.0, 1.0), 12);
        assert!(builder.build().is_manifold());
    }
}
