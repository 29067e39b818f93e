use std::time::Instant;

use anyhow::{Context, Result};
use common::{config::SliceConfig, progress::Progress};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    classify::{Classified, Classifier, MaxStartX},
    intersection::LayerIndex,
    mesh::Mesh,
    perimeter::{reconstruct, Perimeter},
    segments::collect_indexed,
};

const INDEX_BINS: usize = 100;

/// Used to slice a mesh.
pub struct Slicer<C = MaxStartX> {
    slice_config: SliceConfig,
    mesh: Mesh,
    index: LayerIndex,
    classifier: C,

    layers: u32,
    progress: Progress,
}

/// Cross section of the mesh at one height.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerResult {
    pub index: u32,
    pub height: f32,
    /// Only `None` when the plane doesn't cross the mesh at all.
    pub outer: Option<Perimeter>,
    pub inners: Vec<Perimeter>,
}

#[derive(Debug, Clone)]
pub struct SliceResult {
    pub layers: Vec<LayerResult>,
    pub slice_config: SliceConfig,
}

impl Slicer {
    /// Creates a new slicer using the default outer perimeter heuristic.
    pub fn new(slice_config: SliceConfig, mesh: Mesh) -> Result<Self> {
        Self::with_classifier(slice_config, mesh, MaxStartX)
    }
}

impl<C: Classifier> Slicer<C> {
    pub fn with_classifier(slice_config: SliceConfig, mesh: Mesh, classifier: C) -> Result<Self> {
        slice_config.validate()?;

        let layers = layer_count(&mesh, slice_config.path_layer_size).with_context(|| {
            let (min, max) = mesh.bounds();
            format!(
                "Mesh spans z {}..{}, too many layers of {}",
                min, max, slice_config.path_layer_size
            )
        })?;
        let index = LayerIndex::from_mesh(&mesh, INDEX_BINS);

        let progress = Progress::new();
        progress.set_total(layers as u64);

        Ok(Self {
            slice_config,
            mesh,
            index,
            classifier,

            layers,
            progress,
        })
    }

    /// Gets an instance of the slicing [`Progress`] struct.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    pub fn layer_count(&self) -> u32 {
        self.layers
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Height of the slicing plane for a layer. Heights are measured from
    /// z = 0, not from the bottom of the mesh, so a mesh floating above the
    /// origin starts with empty layers.
    pub fn layer_height(&self, layer: u32) -> f32 {
        layer as f32 * self.slice_config.path_layer_size
    }

    pub fn slice_layer(&self, layer: u32) -> LayerResult {
        let height = self.layer_height(layer);

        let segments = collect_indexed(&self.mesh, &self.index, height);
        let perimeters = reconstruct(segments);

        let (outer, inners) = match self.classifier.classify(perimeters) {
            Some(Classified { outer, inners }) => (Some(outer), inners),
            None => (None, Vec::new()),
        };

        LayerResult {
            index: layer,
            height,
            outer,
            inners,
        }
    }

    /// Slices every layer. Layers are processed in parallel, the result is
    /// always in layer order.
    pub fn slice(&self) -> SliceResult {
        info!(
            "Slicing {} layers of {} triangles",
            self.layers,
            self.mesh.triangle_count()
        );
        let start = Instant::now();

        let layers = (0..self.layers)
            .into_par_iter()
            .inspect(|_| self.progress.add_complete(1))
            .map(|layer| self.slice_layer(layer))
            .collect::<Vec<_>>();

        self.progress.set_finished();

        let result = SliceResult {
            layers,
            slice_config: self.slice_config.clone(),
        };

        let open = result.open_perimeters();
        if open > 0 {
            warn!(
                "{} perimeters could not be closed, the mesh is probably not manifold",
                open
            );
        }

        info!("Sliced {} layers in {:?}", self.layers, start.elapsed());
        result
    }
}

impl LayerResult {
    pub fn is_empty(&self) -> bool {
        self.outer.is_none()
    }

    /// The outer perimeter followed by the inner ones.
    pub fn perimeters(&self) -> impl Iterator<Item = &Perimeter> {
        self.outer.iter().chain(self.inners.iter())
    }

    pub fn open_perimeters(&self) -> usize {
        self.perimeters().filter(|x| !x.is_closed()).count()
    }
}

impl SliceResult {
    pub fn open_perimeters(&self) -> usize {
        self.layers.iter().map(LayerResult::open_perimeters).sum()
    }

    pub fn non_empty_layers(&self) -> usize {
        self.layers.iter().filter(|x| !x.is_empty()).count()
    }
}

/// Number of layers needed to cover the vertical extent of the mesh, zero
/// for a mesh without triangles. `None` if the count doesn't fit in a `u32`.
pub fn layer_count(mesh: &Mesh, layer_height: f32) -> Option<u32> {
    if mesh.is_empty() {
        return Some(0);
    }

    let (min, max) = mesh.bounds();
    let count = ((max as f64 - min as f64) / layer_height as f64).floor() + 1.0;
    (count <= u32::MAX as f64).then_some(count as u32)
}
