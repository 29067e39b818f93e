use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use common::config::SliceConfig;
use nalgebra::{ArrayStorage, Const, Matrix, Scalar, Vector2, U1};
use num_traits::Zero;

#[derive(Debug, Parser)]
/// Slices a triangle mesh into layers of outer and inner perimeters.
pub struct Args {
    /// Path to a binary or ASCII .stl file.
    pub mesh: PathBuf,

    #[arg(long)]
    /// TOML file with the slice config. Missing keys use their defaults.
    pub config: Option<PathBuf>,
    #[arg(long)]
    /// Distance between slicing planes in mm, overrides the config.
    pub layer_height: Option<f32>,
    #[arg(long)]
    /// Width of an extruded path in mm, overrides the config.
    pub fill_width: Option<f32>,
    #[arg(long, value_parser = vector_value_parser::<f32, 2>)]
    /// Anchor point of the infill pattern, overrides the config.
    pub infill_origin: Option<Vector2<f32>>,

    #[arg(long)]
    /// Print the perimeters of this layer.
    pub layer: Option<u32>,
    #[arg(long)]
    /// File to write every layer to as JSON.
    pub json: Option<PathBuf>,
    #[arg(long)]
    /// File to write an SVG drawing of every layer to.
    pub svg: Option<PathBuf>,
}

impl Args {
    pub fn slice_config(&self) -> Result<SliceConfig> {
        let mut config = match &self.config {
            Some(path) => SliceConfig::load(path)?,
            None => SliceConfig::default(),
        };

        if let Some(layer_height) = self.layer_height {
            config.path_layer_size = layer_height;
        }
        if let Some(fill_width) = self.fill_width {
            config.path_fill_width = fill_width;
        }
        if let Some(infill_origin) = self.infill_origin {
            config.infill_origin = infill_origin;
        }

        config.validate()?;
        Ok(config)
    }
}

fn vector_value_parser<T, const N: usize>(
    raw: &str,
) -> Result<Matrix<T, Const<N>, U1, ArrayStorage<T, N, 1>>>
where
    T: FromStr + Scalar + Zero,
    T::Err: Send + Sync + std::error::Error + 'static,
{
    let mut vec = Matrix::<T, Const<N>, U1, ArrayStorage<T, N, 1>>::zeros();

    let mut parts = raw.splitn(N, ',');
    for i in 0..N {
        let element = parts.next().context("Missing vector element")?.trim();
        vec[i] = element
            .parse()
            .with_context(|| format!("Can't convert `{element}` to a number"))?;
    }

    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply() {
        let args = Args::parse_from([
            "layer_slicer",
            "part.stl",
            "--layer-height",
            "0.5",
            "--infill-origin",
            "1.5, -2",
        ]);

        let config = args.slice_config().unwrap();
        assert_eq!(config.path_layer_size, 0.5);
        assert_eq!(config.path_fill_width, 1.0);
        assert_eq!(config.infill_origin, Vector2::new(1.5, -2.0));
    }

    #[test]
    fn invalid_override() {
        let args = Args::parse_from(["layer_slicer", "part.stl", "--layer-height", "0"]);
        assert!(args.slice_config().is_err());
    }

    #[test]
    fn vector_parser() {
        assert!(vector_value_parser::<f32, 2>("1").is_err());
        assert!(vector_value_parser::<f32, 2>("1, x").is_err());
        assert_eq!(
            vector_value_parser::<f32, 2>(" 3 ,4 ").unwrap(),
            Vector2::new(3.0, 4.0)
        );
    }
}
