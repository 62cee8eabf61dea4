//! Scene data: geometry, meshes, materials, textures and instances.
//!
//! - `geometry` holds CPU vertex data and the sphere generator
//! - `model` contains the GPU vertex layout and uploaded meshes
//! - `material` describes standard materials and builds their bind groups
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-node transformation data

pub mod geometry;
pub mod instance;
pub mod material;
pub mod model;
pub mod texture;
