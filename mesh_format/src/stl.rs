use anyhow::Result;
use common::serde::Deserializer;
use nalgebra::Vector3;

use crate::{Facet, Mesh, Progress};

const HEADER_SIZE: usize = 80;
const FACET_SIZE: usize = 50;

pub fn parse<T: Deserializer>(des: &mut T, progress: Progress) -> Result<Mesh> {
    // Plenty of binary exporters start their header with `solid` too, so
    // only trust the keyword if the binary facet count doesn't line up with
    // the file size.
    let solid = &*des.read_bytes(5) == b"solid";
    let is_ascii = solid && !binary::size_matches(des);
    des.jump_to(0);

    if is_ascii {
        ascii::parse(des, progress)
    } else {
        binary::parse(des, progress)
    }
}

/// ```text
/// UINT8[80]    – Header                 - 80 bytes
/// UINT32       – Number of triangles    - 04 bytes
/// foreach triangle                      - 50 bytes
///     REAL32[3] – Normal vector         - 12 bytes
///     REAL32[3] – Vertex 1              - 12 bytes
///     REAL32[3] – Vertex 2              - 12 bytes
///     REAL32[3] – Vertex 3              - 12 bytes
///     UINT16    – Attribute byte count  - 02 bytes
/// end
/// ```
mod binary {
    use anyhow::ensure;
    use tracing::debug;

    use super::*;

    pub fn size_matches<T: Deserializer>(des: &mut T) -> bool {
        let size = des.size();
        if size < HEADER_SIZE + 4 {
            return false;
        }

        des.jump_to(HEADER_SIZE);
        let count = des.read_u32_le() as usize;
        count
            .checked_mul(FACET_SIZE)
            .is_some_and(|body| body + HEADER_SIZE + 4 == size)
    }

    pub fn parse<T: Deserializer>(des: &mut T, progress: Progress) -> Result<Mesh> {
        let size = des.size();
        ensure!(
            size >= HEADER_SIZE + 4,
            "Binary STL is {} bytes, too small to hold a header",
            size
        );

        des.advance_by(HEADER_SIZE); // skip header
        let count = des.read_u32_le() as usize;
        let available = des.remaining() / FACET_SIZE;
        ensure!(
            available >= count,
            "Truncated binary STL: header declares {} triangles but only {} complete records are present",
            count,
            available
        );
        progress.set_total(count as u64);

        let mut facets = Vec::with_capacity(count);
        for i in 0..count {
            progress.set_complete(i as u64);
            facets.push(Facet {
                normal: des_vec3f(des),
                vertices: [des_vec3f(des), des_vec3f(des), des_vec3f(des)],
            });
            des.advance_by(2); // attribute byte count
        }

        debug!("Parsed {} facets from binary STL", facets.len());
        Ok(Mesh { facets })
    }

    fn des_vec3f<T: Deserializer>(des: &mut T) -> Vector3<f32> {
        Vector3::new(des.read_f32_le(), des.read_f32_le(), des.read_f32_le())
    }
}

/// ```text
/// solid name
/// facet normal ni nj nk
///     outer loop
///         vertex v1x v1y v1z
///         vertex v2x v2y v2z
///         vertex v3x v3y v3z
///     endloop
/// endfacet
/// endsolid name
/// ```
mod ascii {
    use std::str::{self, SplitAsciiWhitespace};

    use anyhow::{ensure, Context};
    use tracing::debug;

    use super::*;

    pub fn parse<T: Deserializer>(des: &mut T, progress: Progress) -> Result<Mesh> {
        let size = des.size();
        progress.set_total(1);

        let bytes = des.read_bytes(size);
        let text = str::from_utf8(&bytes).context("ASCII STL is not valid UTF-8")?;

        let mut facets = Vec::new();
        let mut normal = Vector3::zeros();
        let mut vertices = Vec::with_capacity(3);

        let mut tokens = text.split_ascii_whitespace();
        while let Some(token) = tokens.next() {
            match token {
                "facet" => {
                    ensure!(
                        tokens.next() == Some("normal"),
                        "Expected `normal` after `facet` in facet {}",
                        facets.len()
                    );
                    normal = read_vector(&mut tokens)?;
                    vertices.clear();
                }
                "vertex" => vertices.push(read_vector(&mut tokens)?),
                "endfacet" => {
                    ensure!(
                        vertices.len() == 3,
                        "Facet {} has {} vertices, expected 3",
                        facets.len(),
                        vertices.len()
                    );
                    facets.push(Facet {
                        normal,
                        vertices: [vertices[0], vertices[1], vertices[2]],
                    });
                    vertices.clear();
                }
                _ => {}
            }
        }

        debug!("Parsed {} facets from ASCII STL", facets.len());
        Ok(Mesh { facets })
    }

    fn read_vector(tokens: &mut SplitAsciiWhitespace) -> Result<Vector3<f32>> {
        let mut out = Vector3::zeros();
        for i in 0..3 {
            let token = tokens.next().context("Unexpected end of ASCII STL")?;
            out[i] = token
                .parse()
                .with_context(|| format!("Invalid number `{}`", token))?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use common::serde::SliceDeserializer;

    use super::*;

    fn binary_stl(header: &[u8], facets: &[[[f32; 3]; 4]]) -> Vec<u8> {
        let mut data = vec![0; HEADER_SIZE];
        data[..header.len()].copy_from_slice(header);
        data.extend_from_slice(&(facets.len() as u32).to_le_bytes());

        for facet in facets {
            for value in facet.iter().flatten() {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.extend_from_slice(&0_u16.to_le_bytes());
        }

        data
    }

    const FACETS: [[[f32; 3]; 4]; 2] = [
        [
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        [
            [0.0, 0.0, -1.0],
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0, 9.0],
        ],
    ];

    #[test]
    fn binary_preserves_vertex_order() {
        let data = binary_stl(b"exported by something", &FACETS);
        let mesh = parse(&mut SliceDeserializer::new(&data), Progress::new()).unwrap();

        assert_eq!(mesh.facets.len(), 2);
        let facet = mesh.facets[1];
        assert_eq!(facet.normal, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(facet.vertices[0], Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(facet.vertices[1], Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(facet.vertices[2], Vector3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn binary_with_solid_header() {
        let data = binary_stl(b"solid but actually binary", &FACETS);
        let mesh = parse(&mut SliceDeserializer::new(&data), Progress::new()).unwrap();
        assert_eq!(mesh.facets.len(), 2);
    }

    #[test]
    fn binary_truncated_is_fatal() {
        let mut data = binary_stl(b"", &FACETS);
        data.truncate(data.len() - 1);

        let err = parse(&mut SliceDeserializer::new(&data), Progress::new()).unwrap_err();
        assert!(err.to_string().contains("Truncated"), "{err}");
    }

    #[test]
    fn binary_missing_header_is_fatal() {
        let data = [0; 40];
        assert!(parse(&mut SliceDeserializer::new(&data), Progress::new()).is_err());
    }

    #[test]
    fn binary_progress_finishes_on_count() {
        let data = binary_stl(b"", &FACETS);
        let progress = Progress::new();
        parse(&mut SliceDeserializer::new(&data), progress.clone()).unwrap();
        assert_eq!(progress.total(), 2);
    }

    const ASCII: &str = "solid cube
  facet normal 0 0 1
    outer loop
      vertex 0 0 1
      vertex 1 0 1
      vertex 1 1 1
    endloop
  endfacet
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 1.5e0 1 0
      vertex -1 0 0
    endloop
  endfacet
endsolid cube
";

    #[test]
    fn ascii() {
        let mesh = parse(&mut SliceDeserializer::new(ASCII.as_bytes()), Progress::new()).unwrap();

        assert_eq!(mesh.facets.len(), 2);
        assert_eq!(mesh.facets[0].normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.facets[1].vertices[1], Vector3::new(1.5, 1.0, 0.0));
        assert_eq!(mesh.facets[1].vertices[2], Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn ascii_bad_number() {
        let text = ASCII.replace("1.5e0", "one");
        let err = parse(&mut SliceDeserializer::new(text.as_bytes()), Progress::new()).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid number `one`"));
    }

    #[test]
    fn ascii_missing_vertex() {
        let text = ASCII.replacen("      vertex 1 1 1\n", "", 1);
        let err = parse(&mut SliceDeserializer::new(text.as_bytes()), Progress::new()).unwrap_err();
        assert!(err.to_string().contains("has 2 vertices"), "{err}");
    }
}
