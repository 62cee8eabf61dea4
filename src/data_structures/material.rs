//! Standard (metallic/roughness) materials.
//!
//! A material is described on the CPU by [`StandardMaterialDesc`]: which texture
//! file feeds which slot plus the scalar factors. [`StandardMaterial`] is the
//! GPU side, created once every referenced texture has been loaded. Slots that
//! have no file, or whose file failed to load, are bound to a neutral
//! [`FallbackMap`] so the shader never has to branch on missing textures.

use std::collections::BTreeMap;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::{create_sampler, ColorSpace, FallbackMap, Texture},
    resources::TextureSet,
};

/// The 2D texture slots of a standard material, in binding order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKind {
    Color,
    Displacement,
    Normal,
    Roughness,
    Metalness,
    AmbientOcclusion,
}

impl MapKind {
    pub const ALL: [MapKind; 6] = [
        MapKind::Color,
        MapKind::Displacement,
        MapKind::Normal,
        MapKind::Roughness,
        MapKind::Metalness,
        MapKind::AmbientOcclusion,
    ];

    pub fn color_space(self) -> ColorSpace {
        match self {
            MapKind::Color => ColorSpace::Srgb,
            _ => ColorSpace::Linear,
        }
    }

    pub fn fallback(self) -> FallbackMap {
        match self {
            MapKind::Normal => FallbackMap::FlatNormal,
            MapKind::Displacement => FallbackMap::Black,
            _ => FallbackMap::White,
        }
    }
}

/// CPU description of a standard material.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardMaterialDesc {
    pub name: String,
    pub maps: BTreeMap<MapKind, String>,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub normal_scale: f32,
    pub ao_map_intensity: f32,
    pub env_map: bool,
    pub env_map_intensity: f32,
}

impl StandardMaterialDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            maps: BTreeMap::new(),
            displacement_scale: 1.0,
            displacement_bias: 0.0,
            roughness: 1.0,
            metalness: 0.0,
            normal_scale: 1.0,
            ao_map_intensity: 1.0,
            env_map: false,
            env_map_intensity: 1.0,
        }
    }

    pub fn map(mut self, kind: MapKind, path: impl Into<String>) -> Self {
        self.maps.insert(kind, path.into());
        self
    }

    pub fn displacement(mut self, path: impl Into<String>, scale: f32) -> Self {
        self.displacement_scale = scale;
        self.map(MapKind::Displacement, path)
    }

    pub fn roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }

    pub fn ao_intensity(mut self, intensity: f32) -> Self {
        self.ao_map_intensity = intensity;
        self
    }

    /// Reflect the scene environment cube.
    pub fn env_map(mut self) -> Self {
        self.env_map = true;
        self
    }

    /// Strength of the environment reflection. Has no effect without [`Self::env_map`].
    pub fn env_intensity(mut self, intensity: f32) -> Self {
        self.env_map_intensity = intensity;
        self
    }

    pub fn texture_paths(&self) -> impl Iterator<Item = (MapKind, &str)> {
        self.maps.iter().map(|(kind, path)| (*kind, path.as_str()))
    }
}

pub const HAS_ENV_MAP: u32 = 1;
pub const HAS_AO_MAP: u32 = 1 << 1;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub roughness: f32,
    pub metalness: f32,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    pub normal_scale: f32,
    pub ao_map_intensity: f32,
    pub env_map_intensity: f32,
    pub flags: u32,
}

impl MaterialUniform {
    pub fn from_desc(desc: &StandardMaterialDesc) -> Self {
        let mut flags = 0;
        if desc.env_map {
            flags |= HAS_ENV_MAP;
        }
        if desc.maps.contains_key(&MapKind::AmbientOcclusion) {
            flags |= HAS_AO_MAP;
        }
        Self {
            roughness: desc.roughness,
            metalness: desc.metalness,
            displacement_scale: desc.displacement_scale,
            displacement_bias: desc.displacement_bias,
            normal_scale: desc.normal_scale,
            ao_map_intensity: desc.ao_map_intensity,
            env_map_intensity: desc.env_map_intensity,
            flags,
        }
    }

    pub fn without_env_map(mut self) -> Self {
        self.flags &= !HAS_ENV_MAP;
        self
    }
}

pub struct StandardMaterial {
    pub name: String,
    pub uniform: MaterialUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl StandardMaterial {
    /// Resolve `desc` against loaded textures and build the bind group.
    ///
    /// `environment` is `None` when the scene has no usable cube map; materials
    /// asking for one then render without reflections.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        desc: &StandardMaterialDesc,
        textures: &TextureSet,
        environment: Option<&Texture>,
    ) -> Self {
        let maps: Vec<Texture> = MapKind::ALL
            .iter()
            .map(|kind| {
                desc.maps
                    .get(kind)
                    .and_then(|path| textures.get(path))
                    .cloned()
                    .unwrap_or_else(|| {
                        if let Some(path) = desc.maps.get(kind) {
                            log::warn!("{}: {:?} map {} unavailable, using fallback", desc.name, kind, path);
                        }
                        Texture::fallback(device, queue, kind.fallback(), kind.color_space())
                    })
            })
            .collect();

        let mut uniform = MaterialUniform::from_desc(desc);
        let environment = match (desc.env_map, environment) {
            (true, Some(env)) => env.clone(),
            (wants_env, _) => {
                if wants_env {
                    log::warn!("{}: no environment map available", desc.name);
                }
                uniform = uniform.without_env_map();
                Texture::solid_cube(device, queue, FallbackMap::Black.rgba(), "empty environment")
            }
        };

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} material buffer", desc.name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // all maps share one sampler, the cube brings its own
        let sampler = maps[0]
            .sampler
            .clone()
            .unwrap_or_else(|| create_sampler(device, false));
        let env_sampler = environment
            .sampler
            .clone()
            .unwrap_or_else(|| create_sampler(device, true));

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ];
        entries.extend(maps.iter().enumerate().map(|(i, map)| wgpu::BindGroupEntry {
            binding: 2 + i as u32,
            resource: wgpu::BindingResource::TextureView(&map.view),
        }));
        entries.push(wgpu::BindGroupEntry {
            binding: 8,
            resource: wgpu::BindingResource::Sampler(&env_sampler),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: 9,
            resource: wgpu::BindingResource::TextureView(&environment.view),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &entries,
            label: Some(&format!("{} material bind group", desc.name)),
        });

        Self {
            name: desc.name.clone(),
            uniform,
            buffer,
            bind_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_standard_material() {
        let desc = StandardMaterialDesc::new("plain");
        assert_eq!(desc.roughness, 1.0);
        assert_eq!(desc.metalness, 0.0);
        assert_eq!(desc.displacement_scale, 1.0);
        assert_eq!(desc.env_map_intensity, 1.0);
        assert!(!desc.env_map);
        assert_eq!(MaterialUniform::from_desc(&desc).flags, 0);
    }

    #[test]
    fn flags_track_env_and_ao() {
        let desc = StandardMaterialDesc::new("rock")
            .map(MapKind::AmbientOcclusion, "ao.jpg")
            .env_map()
            .env_intensity(0.5);
        let uniform = MaterialUniform::from_desc(&desc);
        assert_eq!(uniform.flags, HAS_ENV_MAP | HAS_AO_MAP);
        assert_eq!(uniform.env_map_intensity, 0.5);
        assert_eq!(uniform.without_env_map().flags, HAS_AO_MAP);
    }

    #[test]
    fn intensity_alone_does_not_enable_env_map() {
        let desc = StandardMaterialDesc::new("dull").env_intensity(0.3);
        assert!(!desc.env_map);
        let uniform = MaterialUniform::from_desc(&desc);
        assert_eq!(uniform.flags & HAS_ENV_MAP, 0);
        assert_eq!(uniform.env_map_intensity, 0.3);
    }

    #[test]
    fn slots_fall_back_to_neutral_values() {
        assert_eq!(MapKind::Normal.fallback(), FallbackMap::FlatNormal);
        assert_eq!(MapKind::Displacement.fallback(), FallbackMap::Black);
        assert_eq!(MapKind::AmbientOcclusion.fallback(), FallbackMap::White);
        assert_eq!(MapKind::Color.color_space(), ColorSpace::Srgb);
        assert_eq!(MapKind::Roughness.color_space(), ColorSpace::Linear);
    }

    #[test]
    fn uniform_is_two_vec4s() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }
}
