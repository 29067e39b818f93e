use anyhow::{bail, Result};
use common::{progress::Progress, serde::Deserializer};
use nalgebra::Vector3;

mod stl;

/// One triangle as stored in a mesh file. Vertices keep their file order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: Vector3<f32>,
    pub vertices: [Vector3<f32>; 3],
}

#[derive(Debug, Default)]
pub struct Mesh {
    pub facets: Vec<Facet>,
}

/// Parses a mesh file. `format` is the file extension, currently only `stl`
/// (binary or ASCII) is supported. A truncated or malformed file is an error,
/// a partially parsed mesh is never returned.
pub fn load_mesh<T: Deserializer>(des: &mut T, format: &str, progress: Progress) -> Result<Mesh> {
    let format = format.to_ascii_lowercase();
    let mesh = match format.as_str() {
        "stl" => stl::parse(des, progress.clone())?,
        _ => bail!("Unsupported format: {}", format),
    };

    progress.set_finished();
    Ok(mesh)
}
