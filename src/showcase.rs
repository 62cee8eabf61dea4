//! The demo scene: four spheres, each wearing a different texture set.
//!
//! ```text
//!   leather (-2,  2)    plates (2,  2)
//!   metal   (-2, -2)    rock   (2, -2)
//! ```
//!
//! All four share one sphere mesh. Every material but rock reflects the
//! environment cube; rock uses an ambient-occlusion map instead.

use std::rc::Rc;

use anyhow::*;
use cgmath::Vector3;

use crate::{
    context::Context,
    data_structures::{
        geometry::Geometry,
        material::{MapKind, StandardMaterial, StandardMaterialDesc},
        model::Mesh,
    },
    resources::{self, TextureRequest},
    scene::Scene,
};

pub const SPHERE_RADIUS: f32 = 1.0;
pub const SPHERE_SEGMENTS: u32 = 40;

/// Cube faces in +X, -X, +Y, -Y, +Z, -Z order.
pub fn environment_faces() -> [&'static str; 6] {
    [
        "cubemap/px.png",
        "cubemap/nx.png",
        "cubemap/py.png",
        "cubemap/ny.png",
        "cubemap/pz.png",
        "cubemap/nz.png",
    ]
}

pub fn leather() -> StandardMaterialDesc {
    StandardMaterialDesc::new("leather")
        .map(MapKind::Color, "leather/Leather011_1K_Color.jpg")
        .displacement("leather/Leather011_1K_Displacement.jpg", 0.2)
        .map(MapKind::Normal, "leather/Leather011_1K_Normal.jpg")
        .map(MapKind::Roughness, "leather/Leather011_1K_Roughness.jpg")
        .roughness(1.0)
        .env_map()
        .env_intensity(0.2)
}

pub fn metal() -> StandardMaterialDesc {
    StandardMaterialDesc::new("metal")
        .map(MapKind::Color, "metal/Metal001_1K_Color.jpg")
        .displacement("metal/Metal001_1K_Displacement.jpg", 0.2)
        .map(MapKind::Metalness, "metal/Metal001_1K_Metalness.jpg")
        .metalness(1.0)
        .map(MapKind::Normal, "metal/Metal001_1K_Normal.jpg")
        .map(MapKind::Roughness, "metal/Metal001_1K_Roughness.jpg")
        .roughness(1.0)
        .env_map()
        .env_intensity(1.0)
}

pub fn plates() -> StandardMaterialDesc {
    StandardMaterialDesc::new("plates")
        .map(MapKind::Color, "plates/MetalPlates006_1K_Color.jpg")
        .displacement("plates/MetalPlates006_1K_Displacement.jpg", 0.1)
        .map(MapKind::Metalness, "plates/MetalPlates006_1K_Metalness.jpg")
        .metalness(1.0)
        .map(MapKind::Normal, "plates/MetalPlates006_1K_Normal.jpg")
        .map(MapKind::Roughness, "plates/MetalPlates006_1K_Roughness.jpg")
        .env_map()
        .env_intensity(0.9)
}

pub fn rock() -> StandardMaterialDesc {
    StandardMaterialDesc::new("rock")
        .map(MapKind::Color, "rock/Rock028_1K_Color.jpg")
        .map(MapKind::AmbientOcclusion, "rock/Rock028_1K_AmbientOcclusion.jpg")
        .ao_intensity(1.0)
        .displacement("rock/Rock028_1K_Displacement.jpg", 0.3)
        .map(MapKind::Normal, "rock/Rock028_1K_Normal.jpg")
        .map(MapKind::Roughness, "rock/Rock028_1K_Roughness.jpg")
        .roughness(1.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub material: StandardMaterialDesc,
    pub position: Vector3<f32>,
}

pub fn layout() -> Vec<Placement> {
    [
        (leather(), -2.0, 2.0),
        (metal(), -2.0, -2.0),
        (plates(), 2.0, 2.0),
        (rock(), 2.0, -2.0),
    ]
    .into_iter()
    .map(|(material, x, y)| Placement {
        material,
        position: Vector3::new(x, y, 0.0),
    })
    .collect()
}

/// Every 2D texture the scene references, each path once.
pub fn texture_manifest() -> Vec<TextureRequest> {
    let requests: Vec<_> = layout()
        .iter()
        .flat_map(|placement| {
            placement
                .material
                .texture_paths()
                .map(|(kind, path)| TextureRequest::new(path, kind.color_space()))
                .collect::<Vec<_>>()
        })
        .collect();
    resources::dedup_requests(&requests)
}

/// Load every texture and assemble the scene.
///
/// Textures that fail to load are replaced by neutral maps. An unusable
/// environment cube only switches reflections off.
pub async fn build(ctx: &Context) -> Result<Scene> {
    let faces = environment_faces();
    let manifest = texture_manifest();
    let (textures, environment) = futures::join!(
        resources::load_textures(ctx, &manifest),
        resources::load_cube_texture(ctx, &faces),
    );
    let environment = match environment {
        Result::Ok(env) => Some(env),
        Err(e) => {
            log::warn!("environment map unavailable, reflections disabled: {e:#}");
            None
        }
    };

    let mut geometry = Geometry::sphere(SPHERE_RADIUS, SPHERE_SEGMENTS, SPHERE_SEGMENTS);
    // the occlusion map reads the second uv channel
    geometry.set_uv2_from_uv();
    let sphere = Rc::new(Mesh::from_geometry(&ctx.device, "sphere", &geometry));

    let mut scene = Scene::new();
    for placement in layout() {
        let material = StandardMaterial::new(
            &ctx.device,
            &ctx.queue,
            &ctx.material_layout,
            &placement.material,
            &textures,
            environment.as_ref(),
        );
        let material = scene.add_material(material);
        scene.add(&ctx.device, sphere.clone(), material, placement.position)?;
    }
    log::info!("scene ready: {} meshes", scene.nodes().len());
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rock_skips_the_environment() {
        let envs: Vec<_> = layout()
            .iter()
            .map(|p| (p.material.name.clone(), p.material.env_map))
            .collect();
        assert_eq!(
            envs,
            vec![
                ("leather".to_string(), true),
                ("metal".to_string(), true),
                ("plates".to_string(), true),
                ("rock".to_string(), false),
            ]
        );
    }

    #[test]
    fn plates_keep_default_roughness() {
        assert_eq!(plates().roughness, 1.0);
        assert_eq!(plates().metalness, 1.0);
        assert_eq!(leather().metalness, 0.0);
    }
}
