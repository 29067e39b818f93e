use std::io::Write;

use anyhow::{Context, Result};
use nalgebra::Vector2;
use ::svg::{
    node::element::{Group, Polygon, Polyline, Rectangle},
    Document,
};

use crate::{perimeter::Perimeter, slicer::SliceResult, Point};

const MARGIN: f32 = 2.0;

/// Every layer of a slice result drawn side by side in a grid, in layer
/// order. Outer perimeters are black, inner ones red. Closed perimeters are
/// polygons and open chains polylines.
pub struct SvgFile {
    layers: Vec<VectorLayer>,
}

struct VectorLayer {
    perimeters: Vec<(Perimeter, bool)>,
}

impl SvgFile {
    pub fn from_slice_result(result: &SliceResult) -> Self {
        let layers = result
            .layers
            .iter()
            .map(|layer| VectorLayer {
                perimeters: (layer.outer.iter().map(|x| (x.clone(), true)))
                    .chain(layer.inners.iter().map(|x| (x.clone(), false)))
                    .collect(),
            })
            .collect();

        Self { layers }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn to_document(&self) -> Document {
        let (min, max) = self.bounds();
        let size = (max - min).add_scalar(MARGIN);
        let columns = (self.layers.len() as f32).sqrt() as usize + 1;
        let rows = self.layers.len().div_ceil(columns).max(1);

        let mut document = Document::new().set(
            "viewBox",
            (
                min.x - MARGIN / 2.0,
                min.y - MARGIN / 2.0,
                size.x * columns as f32,
                size.y * rows as f32,
            ),
        );

        for (idx, layer) in self.layers.iter().enumerate() {
            let offset = Vector2::new((idx % columns) as f32, (idx / columns) as f32)
                .component_mul(&size);

            let mut group = Group::new()
                .set("id", format!("layer-{idx}"))
                .set("transform", format!("translate({} {})", offset.x, offset.y))
                .add(
                    Rectangle::new()
                        .set("x", min.x - MARGIN / 2.0)
                        .set("y", min.y - MARGIN / 2.0)
                        .set("width", size.x)
                        .set("height", size.y)
                        .set("fill", "#eee"),
                );

            for (perimeter, outer) in &layer.perimeters {
                let points = perimeter.points().map(|x| (x.x, x.y)).collect::<Vec<_>>();
                let stroke = if *outer { "black" } else { "red" };

                group = if perimeter.is_closed() {
                    group.add(
                        Polygon::new()
                            .set("points", points)
                            .set("fill", "none")
                            .set("stroke", stroke)
                            .set("stroke-width", 0.1),
                    )
                } else {
                    group.add(
                        Polyline::new()
                            .set("points", points)
                            .set("fill", "none")
                            .set("stroke", stroke)
                            .set("stroke-width", 0.1),
                    )
                };
            }

            document = document.add(group);
        }

        document
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        ::svg::write(writer, &self.to_document()).context("Writing SVG document")
    }

    /// XY bounding box of every perimeter point across all layers.
    fn bounds(&self) -> (Point, Point) {
        let points = (self.layers.iter())
            .flat_map(|x| x.perimeters.iter())
            .flat_map(|(x, _)| x.points());

        let (min, max) = points.fold(
            (Point::repeat(f32::MAX), Point::repeat(f32::MIN)),
            |(min, max), p| (min.inf(&p), max.sup(&p)),
        );

        if min.x > max.x {
            return (Point::zeros(), Point::zeros());
        }

        (min, max)
    }
}
