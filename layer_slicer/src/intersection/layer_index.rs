use crate::mesh::Mesh;

/// Acceleration structure for mesh slicing. By splitting the height of the
/// mesh into bins and adding references to all the triangles that overlap
/// each bin, slicing a layer only needs to visit the triangles whose height
/// range could contain it instead of every triangle in the mesh.
///
/// Bin lookup is monotonic in height, so a triangle with `min_z <= height <=
/// max_z` is always found. Triangles within a bin keep mesh order.
pub struct LayerIndex {
    start_height: f32,
    end_height: f32,
    bin_height: f32,

    bins: Vec<Vec<usize>>,
}

impl LayerIndex {
    /// Creates a new index for the mesh with the given number of bins.
    pub fn from_mesh(mesh: &Mesh, bin_count: usize) -> Self {
        let (min, max) = mesh.bounds();
        let mut out = Self {
            start_height: min,
            end_height: max,
            bin_height: (max - min) / bin_count.max(1) as f32,
            bins: Vec::new(),
        };

        if mesh.is_empty() {
            return out;
        }

        // A flat mesh gets a single bin holding everything.
        let bin_count = if out.bin_height > 0.0 { bin_count.max(1) } else { 1 };
        out.bins = vec![Vec::new(); bin_count];

        for (face, triangle) in mesh.triangles().iter().enumerate() {
            let (min_height, max_height) = triangle.z_range();
            let (min_bin, max_bin) = (out.bin(min_height), out.bin(max_height));
            for bin in &mut out.bins[min_bin..=max_bin] {
                bin.push(face);
            }
        }

        out
    }

    /// Indices of every triangle that may intersect the plane at `height`, in
    /// mesh order.
    pub fn faces(&self, height: f32) -> &[usize] {
        if self.bins.is_empty() || !(self.start_height..=self.end_height).contains(&height) {
            return &[];
        }

        &self.bins[self.bin(height)]
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    fn bin(&self, height: f32) -> usize {
        let last = self.bins.len().saturating_sub(1);
        if !(self.bin_height > 0.0) {
            return 0;
        }

        let bin = ((height - self.start_height) / self.bin_height).floor();
        (bin.max(0.0) as usize).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::MeshBuilder, mesh::Triangle, Pos};

    #[test]
    fn empty_mesh() {
        let index = LayerIndex::from_mesh(&Mesh::new(Vec::new()), 10);
        assert_eq!(index.bin_count(), 0);
        assert!(index.faces(0.0).is_empty());
    }

    #[test]
    fn outside_of_bounds() {
        let mut builder = MeshBuilder::new();
        builder.add_box(Pos::new(0.0, 0.0, 1.0), Pos::new(1.0, 1.0, 5.0));
        let index = LayerIndex::from_mesh(&builder.build(), 4);

        assert!(index.faces(0.5).is_empty());
        assert!(index.faces(5.5).is_empty());
        assert!(!index.faces(1.0).is_empty());
        assert!(!index.faces(5.0).is_empty());
    }

    #[test]
    fn flat_mesh_uses_one_bin() {
        let mesh = Mesh::new(vec![Triangle::from_vertices([
            Pos::new(0.0, 0.0, 2.0),
            Pos::new(1.0, 0.0, 2.0),
            Pos::new(0.0, 1.0, 2.0),
        ])]);

        let index = LayerIndex::from_mesh(&mesh, 100);
        assert_eq!(index.bin_count(), 1);
        assert_eq!(index.faces(2.0), &[0]);
    }

    #[test]
    fn every_spanning_triangle_is_found() {
        let mut builder = MeshBuilder::new();
        builder.add_box_with_hole(Pos::new(0.0, 0.0, 0.3), 10.0, 7.7, 3.0, 3);
        let mesh = builder.build();
        let index = LayerIndex::from_mesh(&mesh, 7);

        for step in 0..=100 {
            let height = 0.3 + 7.7 * step as f32 / 100.0;
            let faces = index.faces(height);
            for (face, triangle) in mesh.triangles().iter().enumerate() {
                let (min, max) = triangle.z_range();
                if min <= height && height <= max {
                    assert!(faces.contains(&face), "face {face} missing at {height}");
                }
            }
            assert!(faces.windows(2).all(|x| x[0] < x[1]));
        }
    }
}
