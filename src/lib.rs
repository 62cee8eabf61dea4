//! material-spheres
//!
//! Four spheres wearing leather, metal, metal plate and rock texture sets,
//! lit by an ambient and a directional light, reflecting an environment cube
//! and slowly spinning under an orbit camera. Runs natively and in the
//! browser (WebGL, attached to `canvas.webgl`).
//!
//! High-level modules
//! - `settings`: every tunable of the demo, with defaults
//! - `clock`: elapsed time for the animation
//! - `camera`: camera, projection, orbit controls and their uniform
//! - `context`: central GPU and window context that owns device/queue/pipeline
//! - `data_structures`: geometry, meshes, instances, textures and materials
//! - `pipelines`: the standard material pipeline and the light uniform
//! - `resources`: loading texture files into GPU textures
//! - `scene`: materials plus the mesh nodes drawn each frame
//! - `showcase`: the demo content
//! - `render`: frame rendering and offscreen capture
//! - `flow`: the winit application loop
//!

pub mod camera;
pub mod clock;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod settings;
pub mod showcase;

pub use flow::{run, run_with};
pub use settings::Settings;
