//! Central GPU state.
//!
//! [`Context`] owns the device, queue and (when rendering to a window) the
//! surface, together with everything every frame needs: the depth buffer,
//! camera, projection, lights and the standard pipeline.

use std::sync::Arc;

use anyhow::*;
use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{CameraResources, Projection},
    data_structures::texture,
    pipelines::{
        light::{LightResources, LightUniform},
        standard::{material_layout, mk_standard_pipeline},
    },
    settings::Settings,
};

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Option<Arc<Window>>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: Option<wgpu::Surface<'static>>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub material_layout: wgpu::BindGroupLayout,
    pub standard_pipeline: wgpu::RenderPipeline,
    pub clear_colour: wgpu::Color,
    pub settings: Settings,
}

fn instance() -> wgpu::Instance {
    // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
    wgpu::Instance::new(wgpu::InstanceDescriptor {
        #[cfg(not(target_arch = "wasm32"))]
        backends: wgpu::Backends::PRIMARY,
        #[cfg(target_arch = "wasm32")]
        backends: wgpu::Backends::GL,
        ..wgpu::InstanceDescriptor::new_without_display_handle()
    })
}

async fn device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
    let info = adapter.get_info();
    log::info!("using {} ({:?})", info.name, info.backend);
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            // WebGL doesn't support all of wgpu's features, so if
            // we're building for the web we'll have to disable some.
            required_limits: if cfg!(target_arch = "wasm32") {
                wgpu::Limits::downlevel_webgl2_defaults()
            } else {
                wgpu::Limits::default()
            },
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
            experimental_features: Default::default(),
        })
        .await
        .context("requesting a device")
}

impl Context {
    /// Set up rendering into `window`.
    ///
    /// The surface is sized from the window's logical size and the clamped
    /// pixel ratio.
    pub async fn new(window: Arc<Window>, settings: Settings) -> Result<Self> {
        let instance = instance();
        let surface = instance
            .create_surface(window.clone())
            .context("creating the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter for this surface")?;
        let (device, queue) = device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colour and relies on an sRGB target for the encoding.
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        // the canvas is see-through where nothing is drawn
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| surface_caps.alpha_modes.contains(mode))
        .or_else(|| surface_caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let present_mode = surface_caps
            .present_modes
            .first()
            .copied()
            .unwrap_or(wgpu::PresentMode::Fifo);

        let scale_factor = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale_factor);
        let (width, height) = surface_size(&settings, logical.width, logical.height, scale_factor);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut ctx = Self::with_parts(Some(window), Some(surface), device, queue, config, settings);
        ctx.sync_canvas_size();
        Ok(ctx)
    }

    /// A context without a window, rendering only into offscreen targets.
    pub async fn headless(settings: Settings, width: u32, height: u32) -> Result<Self> {
        let instance = instance();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter")?;
        let (device, queue) = device(&adapter).await?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        Ok(Self::with_parts(None, None, device, queue, config, settings))
    }

    fn with_parts(
        window: Option<Arc<Window>>,
        surface: Option<wgpu::Surface<'static>>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
        settings: Settings,
    ) -> Self {
        let projection = Projection::new(
            config.width,
            config.height,
            settings.fovy,
            settings.znear,
            settings.zfar,
        );
        let camera = CameraResources::new(&device, &settings, &projection);
        let light = LightResources::new(LightUniform::default(), &device);
        let depth_texture =
            texture::Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        let material_layout = material_layout(&device);
        let standard_pipeline = mk_standard_pipeline(
            &device,
            config.format,
            &material_layout,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );
        log::info!("surface {}x{} {:?}", config.width, config.height, config.format);

        Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
            material_layout,
            standard_pipeline,
            clear_colour: settings.clear_colour,
            settings,
        }
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_texture.view
    }

    /// Follow a change of the viewport's logical size or of the device pixel ratio.
    ///
    /// Empty viewports (a minimized window) are ignored.
    pub fn resize(&mut self, logical_width: f64, logical_height: f64, scale_factor: f64) {
        if !(logical_width > 0.0 && logical_height > 0.0) {
            return;
        }
        let (width, height) = surface_size(&self.settings, logical_width, logical_height, scale_factor);
        self.resize_physical(width, height);
    }

    pub fn resize_physical(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
        self.sync_canvas_size();
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        self.projection.resize(width, height);
        log::debug!("resized to {width}x{height}");
    }

    /// Reconfigure at the current window size, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let scale_factor = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale_factor);
        self.resize(logical.width, logical.height, scale_factor);
    }

    /// Apply pending orbit input and upload the camera matrices.
    pub fn update_camera(&mut self) {
        self.camera.update(&self.queue, &self.projection);
    }

    /// The canvas backbuffer has to match the configured surface, not the
    /// unclamped size winit gives it.
    #[cfg(target_arch = "wasm32")]
    fn sync_canvas_size(&mut self) {
        use winit::platform::web::WindowExtWebSys;

        if let Some(canvas) = self.window.as_ref().and_then(|w| w.canvas()) {
            canvas.set_width(self.config.width);
            canvas.set_height(self.config.height);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn sync_canvas_size(&mut self) {}
}

/// On the web the backbuffer follows the clamped pixel ratio. Native
/// swapchains must cover the whole window, so there the clamp does not apply.
fn surface_size(settings: &Settings, logical_width: f64, logical_height: f64, scale_factor: f64) -> (u32, u32) {
    if cfg!(target_arch = "wasm32") {
        settings.surface_size(logical_width, logical_height, scale_factor)
    } else {
        let unclamped = settings.clone().with_max_pixel_ratio(f64::INFINITY);
        unclamped.surface_size(logical_width, logical_height, scale_factor)
    }
}
