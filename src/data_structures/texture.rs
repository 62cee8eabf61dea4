//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU texture resources,
//! and helpers for depth buffers, 1x1 fallback maps, cube maps and textures
//! decoded from image files.

use anyhow::*;
use image::GenericImageView;

/// How texel values are interpreted by the sampler.
///
/// Colour maps are authored in sRGB; data maps (normals, roughness, metalness,
/// occlusion, displacement) hold linear values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

impl ColorSpace {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Neutral stand-ins for maps that are absent or failed to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackMap {
    /// Multiplies to identity (colour, roughness, metalness, occlusion).
    White,
    /// The blue/purple-ish colour that represents the default for normal maps.
    FlatNormal,
    /// Zero displacement, no environment contribution.
    Black,
}

impl FallbackMap {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            FallbackMap::White => [255, 255, 255, 255],
            FallbackMap::FlatNormal => [127, 127, 255, 255],
            FallbackMap::Black => [0, 0, 0, 255],
        }
    }
}

/// A GPU texture with a view and optional sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// * `size` is [width, height] of the texture in pixels, each clamped to at least one
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// A 1x1 texture of a single colour.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        color_space: ColorSpace,
        label: &str,
    ) -> Texture {
        let image = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(1, 1, image::Rgba(rgba)));
        Self::upload(device, queue, &[image], Some(label), color_space, false)
    }

    pub fn fallback(device: &wgpu::Device, queue: &wgpu::Queue, map: FallbackMap, color_space: ColorSpace) -> Texture {
        Self::solid(device, queue, map.rgba(), color_space, &format!("{:?} fallback map", map))
    }

    /// Load a texture from raw image file contents (PNG, JPEG), guessing the format.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        color_space: ColorSpace,
    ) -> Result<Self> {
        let img = image::load_from_memory(bytes).with_context(|| format!("decoding {label}"))?;
        Ok(Self::from_image(device, queue, &img, Some(label), color_space))
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
        color_space: ColorSpace,
    ) -> Self {
        Self::upload(device, queue, std::slice::from_ref(img), label, color_space, false)
    }

    /// Build a cube texture from six faces in +X, -X, +Y, -Y, +Z, -Z order.
    ///
    /// All faces must be square and of the same size.
    pub fn cube_from_images(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[image::DynamicImage; 6],
        label: &str,
    ) -> Result<Self> {
        validate_cube_faces(faces.iter().map(|f| f.dimensions()))?;
        Ok(Self::upload(device, queue, faces, Some(label), ColorSpace::Srgb, true))
    }

    /// A 1x1 cube of a single colour, used when a material has no environment.
    pub fn solid_cube(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        let face = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(1, 1, image::Rgba(rgba)));
        let faces: [image::DynamicImage; 6] = std::array::from_fn(|_| face.clone());
        Self::upload(device, queue, &faces, Some(label), ColorSpace::Srgb, true)
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layers: &[image::DynamicImage],
        label: Option<&str>,
        color_space: ColorSpace,
        cube: bool,
    ) -> Self {
        let (width, height) = layers[0].dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers.len() as u32,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: color_space.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, img) in layers.iter().enumerate() {
            let rgba = img.to_rgba8();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                },
                &rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(if cube {
                wgpu::TextureViewDimension::Cube
            } else {
                wgpu::TextureViewDimension::D2
            }),
            ..Default::default()
        });
        let sampler = Some(create_sampler(device, cube));

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Cube faces must share one square size.
pub fn validate_cube_faces(dimensions: impl IntoIterator<Item = (u32, u32)>) -> Result<(u32, u32)> {
    let mut dimensions = dimensions.into_iter();
    let first = dimensions.next().ok_or_else(|| anyhow!("cube map without faces"))?;
    ensure!(first.0 == first.1, "cube face is not square: {}x{}", first.0, first.1);
    for (idx, dims) in dimensions.enumerate() {
        ensure!(
            dims == first,
            "cube face {} is {}x{}, expected {}x{}",
            idx + 1,
            dims.0,
            dims.1,
            first.0,
            first.1
        );
    }
    Ok(first)
}

/// Linear filtering everywhere. Flat maps tile, cube maps clamp at the face seams.
pub fn sampler_desc(cube: bool) -> wgpu::SamplerDescriptor<'static> {
    let address_mode = if cube {
        wgpu::AddressMode::ClampToEdge
    } else {
        wgpu::AddressMode::Repeat
    };
    wgpu::SamplerDescriptor {
        label: Some(if cube { "cube sampler" } else { "map sampler" }),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    }
}

pub fn create_sampler(device: &wgpu::Device, cube: bool) -> wgpu::Sampler {
    device.create_sampler(&sampler_desc(cube))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_maps_tile_and_cubes_clamp() {
        let flat = sampler_desc(false);
        assert_eq!(flat.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(flat.address_mode_v, wgpu::AddressMode::Repeat);
        assert_eq!(flat.min_filter, wgpu::FilterMode::Linear);
        let cube = sampler_desc(true);
        assert_eq!(cube.address_mode_w, wgpu::AddressMode::ClampToEdge);
        assert_eq!(cube.mag_filter, wgpu::FilterMode::Linear);
    }

    #[test]
    fn cube_faces_must_match() {
        assert_eq!(validate_cube_faces([(4, 4); 6]).unwrap(), (4, 4));
        assert!(validate_cube_faces([(4, 4), (4, 4), (8, 8), (4, 4), (4, 4), (4, 4)]).is_err());
        assert!(validate_cube_faces([(4, 2); 6]).is_err());
        assert!(validate_cube_faces(std::iter::empty()).is_err());
    }

    #[test]
    fn colour_maps_are_srgb() {
        assert_eq!(ColorSpace::Srgb.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(ColorSpace::Linear.format(), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(FallbackMap::FlatNormal.rgba(), [127, 127, 255, 255]);
    }
}
