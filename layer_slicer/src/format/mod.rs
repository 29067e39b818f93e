//! Exporters for sliced layers.

use std::io::Write;

use anyhow::{Context, Result};

use crate::slicer::SliceResult;

mod svg;
pub use self::svg::SvgFile;

/// Writes every layer of the result as pretty printed JSON. Each layer holds
/// its index, height, outer perimeter (or `null`) and inner perimeters.
pub fn write_json<W: Write>(writer: W, result: &SliceResult) -> Result<()> {
    serde_json::to_writer_pretty(writer, &result.layers).context("Writing layers as JSON")
}
