//! Application event loop.
//!
//! [`App`] drives the demo with winit's `ApplicationHandler`:
//! 1. `resumed` creates the window (on the web: attaches to the configured canvas)
//! 2. the GPU context and showcase scene are built asynchronously
//! 3. every `RedrawRequested` spins the spheres, updates the orbit camera,
//!    renders and asks for the next frame
//!
//! Natively, async setup blocks on a tokio runtime. On the web it runs via
//! `spawn_local` and reports back through an [`AppEvent`].

use std::{fmt::Debug, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{clock::Clock, context::Context, render, scene::Scene, settings::Settings, showcase};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// A fully initialised context plus the scene it renders.
pub struct AppState {
    pub ctx: Context,
    pub scene: Scene,
    clock: Clock,
}

impl AppState {
    async fn new(window: Arc<Window>, settings: Settings) -> anyhow::Result<Self> {
        let ctx = Context::new(window, settings).await?;
        let scene = showcase::build(&ctx).await?;
        Ok(Self {
            ctx,
            scene,
            clock: Clock::new(),
        })
    }

    /// Advance the animation by wall clock time and draw one frame.
    fn tick(&mut self) -> Result<(), wgpu::SurfaceError> {
        let elapsed = self.clock.elapsed();
        self.scene.spin_all(elapsed * self.ctx.settings.spin_speed);
        self.scene.write_to_buffers(&self.ctx.queue);
        self.ctx.update_camera();
        render::render_frame(&self.ctx, &self.scene)
    }
}

pub enum AppEvent {
    #[allow(dead_code)]
    Initialized(Box<AppState>),
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

impl Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    settings: Settings,
    window: Option<Arc<Window>>,
    state: Option<AppState>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, settings: Settings) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            settings,
            window: None,
            state: None,
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    #[cfg(target_arch = "wasm32")]
    fn window_attributes(&self) -> anyhow::Result<winit::window::WindowAttributes> {
        use wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| anyhow::anyhow!("no document to attach to"))?;
        let canvas = document
            .query_selector(&self.settings.canvas_selector)
            .map_err(|e| anyhow::anyhow!("bad canvas selector: {e:?}"))?
            .ok_or_else(|| anyhow::anyhow!("no element matches {}", self.settings.canvas_selector))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| anyhow::anyhow!("{} is not a canvas", self.settings.canvas_selector))?;
        Ok(Window::default_attributes().with_canvas(Some(canvas)))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn window_attributes(&self) -> anyhow::Result<winit::window::WindowAttributes> {
        Ok(Window::default_attributes().with_title("material spheres"))
    }

    fn on_ready(&mut self, state: AppState) {
        let window = state.ctx.window().cloned();
        self.state = Some(state);
        if let (Some(window), Some(state)) = (window, self.state.as_mut()) {
            // the canvas may have been resized while textures were loading
            state.ctx.reconfigure();
            window.request_redraw();
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match self
            .window_attributes()
            .and_then(|attributes| Ok(event_loop.create_window(attributes)?))
        {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e),
        };
        self.window = Some(window.clone());

        let init_future = AppState::new(window, self.settings.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.on_ready(state),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok(state) => AppEvent::Initialized(Box::new(state)),
                    Err(e) => AppEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("event loop closed before initialisation finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            AppEvent::Initialized(state) => self.on_ready(*state),
            AppEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // cursor positions are in window pixels, not surface pixels
        let viewport_height = state
            .ctx
            .window()
            .map_or(state.ctx.config.height, |w| w.inner_size().height) as f32;
        state.ctx.camera.controls.handle_window_event(
            &event,
            viewport_height,
            &state.ctx.camera.camera,
            &state.ctx.projection,
        );

        match event {
            WindowEvent::Resized(size) => {
                let scale_factor = state.ctx.window().map_or(1.0, |w| w.scale_factor());
                let logical = size.to_logical::<f64>(scale_factor);
                state.ctx.resize(logical.width, logical.height, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { .. } => state.ctx.reconfigure(),
            WindowEvent::RedrawRequested => {
                match state.tick() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.ctx.reconfigure();
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
                if let Some(window) = state.ctx.window() {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {e}").into());
        }
    }
}

/// Run the demo with [`Settings::default`].
pub fn run() -> anyhow::Result<()> {
    run_with(Settings::default())
}

pub fn run_with(settings: Settings) -> anyhow::Result<()> {
    init_logging();

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, settings)?;

    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run_app(&mut app)?;
        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
