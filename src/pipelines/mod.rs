//! Render pipelines and the bind group layouts they expect.
//!
//! - `standard`: metallic/roughness materials with displacement, normal,
//!   occlusion and environment maps
//! - `light`: the ambient + directional light uniform shared by all draws

pub mod light;
pub mod standard;
