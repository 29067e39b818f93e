//! Slices triangle meshes into horizontal layers. Each layer is made of
//! [`perimeter::Perimeter`]s rebuilt from the line segments where the mesh
//! crosses the slicing plane, split into one outer perimeter and any number of
//! inner ones (holes or islands). See [`slicer::Slicer`] for the entry point.

use nalgebra::{Vector2, Vector3};

pub mod builder;
pub mod classify;
pub mod format;
pub mod intersection;
pub mod mesh;
pub mod perimeter;
pub mod segments;
pub mod slicer;

pub type Pos = Vector3<f32>;
pub type Point = Vector2<f32>;
