//! Frame rendering.
//!
//! [`render_to_texture`] records the scene into any colour/depth pair. The
//! window path ([`render_frame`]) feeds it the swapchain image; [`capture_frame`]
//! feeds it an offscreen texture and reads the pixels back.

use std::iter;

use anyhow::*;
use anyhow::Context as _;
use instant::Duration;

use crate::{context::Context, scene::Scene};

/// Draw `scene` into the given targets, clearing both first.
pub fn render_to_texture(ctx: &Context, scene: &Scene, target: &wgpu::TextureView, depth: &wgpu::TextureView) {
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        render_pass.set_pipeline(&ctx.standard_pipeline);
        scene.draw(&mut render_pass, &ctx.camera.bind_group, &ctx.light.bind_group);
    }
    ctx.queue.submit(iter::once(encoder.finish()));
}

/// Render one frame to the window surface and present it.
///
/// A context without a surface reports [`wgpu::SurfaceError::Lost`].
pub fn render_frame(ctx: &Context, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
    let surface = ctx.surface.as_ref().ok_or(wgpu::SurfaceError::Lost)?;
    let output = surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    render_to_texture(ctx, scene, &view, ctx.depth_view());
    output.present();
    Result::Ok(())
}

/// Rows of a texture-to-buffer copy have to be a multiple of 256 bytes.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drop the per-row padding of a mapped copy buffer.
pub fn strip_row_padding(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let padded = padded_bytes_per_row(width) as usize;
    let unpadded = (width * 4) as usize;
    data.chunks(padded)
        .take(height as usize)
        .flat_map(|row| &row[..unpadded])
        .copied()
        .collect()
}

/// Reorder BGRA texels to RGBA in place. Other formats are left untouched.
pub fn to_rgba_order(pixels: &mut [u8], format: wgpu::TextureFormat) {
    if matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    ) {
        for texel in pixels.chunks_exact_mut(4) {
            texel.swap(0, 2);
        }
    }
}

/// Render `scene` offscreen at `width`x`height` and read the result back.
pub async fn capture_frame(ctx: &Context, scene: &Scene, width: u32, height: u32) -> Result<image::RgbaImage> {
    ensure!(width > 0 && height > 0, "cannot capture an empty {width}x{height} frame");
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let target = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Capture Texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: ctx.config.format,
        usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth = crate::data_structures::texture::Texture::create_depth_texture(
        &ctx.device,
        [width, height],
        "capture depth texture",
    );
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    render_to_texture(ctx, scene, &view, &depth.view);

    let bytes_per_row = padded_bytes_per_row(width);
    let output_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        size: (bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        label: Some("Capture Buffer"),
        mapped_at_creation: false,
    });
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        extent,
    );
    ctx.queue.submit(iter::once(encoder.finish()));

    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    let buffer_slice = output_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        // the receiver only goes away if capture_frame was dropped
        let _ = tx.send(result);
    });
    ctx.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .context("waiting for the capture copy")?;
    rx.receive()
        .await
        .ok_or_else(|| anyhow!("capture buffer mapping was cancelled"))?
        .context("mapping the capture buffer")?;

    let mut pixels = {
        let data = buffer_slice.get_mapped_range();
        strip_row_padding(&data, width, height)
    };
    output_buffer.unmap();
    // windowed contexts may render in the surface's BGRA format
    to_rgba_order(&mut pixels, ctx.config.format);
    image::RgbaImage::from_raw(width, height, pixels).ok_or_else(|| anyhow!("capture buffer too small"))
}
