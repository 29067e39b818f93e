use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Settings consumed by the slicer. Only `path_layer_size` drives slicing,
/// the other two are carried for the toolpath stage that consumes the
/// sliced layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Width of an extruded path, in mm.
    pub path_fill_width: f32,
    /// Distance between two slicing planes, in mm.
    pub path_layer_size: f32,
    /// Point the infill pattern is anchored to.
    pub infill_origin: Vector2<f32>,
}

impl SliceConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.path_layer_size.is_finite() && self.path_layer_size > 0.0,
            "Layer size must be a positive number, got {}",
            self.path_layer_size
        );
        ensure!(
            self.path_fill_width.is_finite() && self.path_fill_width > 0.0,
            "Fill width must be a positive number, got {}",
            self.path_fill_width
        );
        ensure!(
            self.infill_origin.iter().all(|x| x.is_finite()),
            "Infill origin must be finite"
        );
        Ok(())
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load config, using defaults: {:#}", err);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::read(path)
            .with_context(|| format!("Can't read config file `{}`", path.display()))?;
        let string = String::from_utf8_lossy(&file);
        let config = toml::from_str(&string)
            .with_context(|| format!("Invalid config file `{}`", path.display()))?;
        info!("Loaded config from `{}`", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let string = toml::to_string(self)?;
        fs::write(path, string)?;
        Ok(())
    }
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            path_fill_width: 1.0,
            path_layer_size: 2.0,
            infill_origin: Vector2::zeros(),
        }
    }
}
