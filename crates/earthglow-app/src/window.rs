//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. Everything that
//! needs a live window (GPU context, renderer, scene, viewport) is created in
//! `resumed` and kept together in a [`Runtime`].

use std::sync::Arc;

use earthglow_config::Config;
use earthglow_input::CursorTracker;
use earthglow_render::{
    RenderContext, RendererError, RendererSettings, SceneRenderer, SurfaceError, Viewport,
    init_render_context_blocking,
};
use earthglow_scene::{PerspectiveCamera, Scene, SceneBuilder};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::frame_loop::{FrameLoop, FrameRenderer, RefreshTrigger, SystemClock};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Renderer settings taken from the loaded configuration.
pub fn renderer_settings_from_config(config: &Config) -> RendererSettings {
    RendererSettings {
        asset_dir: config.assets.asset_dir.clone(),
        shader_dir: config.shader_dir().map(|dir| dir.to_path_buf()),
        msaa_samples: config.render.msaa_samples,
    }
}

/// Window size in logical pixels.
pub fn logical_size(size: PhysicalSize<u32>, scale_factor: f64) -> (f64, f64) {
    let logical: LogicalSize<f64> = size.to_logical(scale_factor);
    (logical.width, logical.height)
}

/// Window-bound state, alive between `resumed` and exit.
pub struct Runtime {
    pub window: Arc<Window>,
    pub gpu: RenderContext,
    pub renderer: SceneRenderer,
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub viewport: Viewport,
    pub cursor: CursorTracker,
    pub frame_loop: FrameLoop<SystemClock>,
}

impl Runtime {
    fn handle_resize(&mut self, scale_factor: f64) {
        let (width, height) = logical_size(self.window.inner_size(), scale_factor);
        let Some(resize) = self
            .viewport
            .on_resize(width, height, scale_factor, &mut self.camera)
        else {
            return;
        };

        // The surface follows the capped drawing buffer, not the window's
        // inner size, so on dense displays it is smaller than the window.
        let physical = resize.physical;
        let inner = self.window.inner_size();
        if physical.width < inner.width || physical.height < inner.height {
            debug!(
                "Drawing buffer {}x{} is below window size {}x{} (scale factor {scale_factor:.2} capped to {:.2})",
                physical.width, physical.height, inner.width, inner.height, resize.pixel_ratio
            );
        }
        self.gpu.resize(physical.width, physical.height);
        self.renderer.resize(&self.gpu.device, physical);
        info!(
            "Resized to {}x{} (pixel ratio {:.2}, aspect {:.3})",
            physical.width, physical.height, resize.pixel_ratio, resize.aspect
        );
    }
}

/// Adapts the GPU renderer to the frame loop.
struct GpuFrame<'a> {
    gpu: &'a RenderContext,
    renderer: &'a mut SceneRenderer,
    viewport: &'a Viewport,
}

impl FrameRenderer for GpuFrame<'_> {
    type Error = SurfaceError;

    fn render_frame(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<(), SurfaceError> {
        self.renderer.render(self.gpu, scene, camera, self.viewport)
    }
}

/// Schedules the next frame on the window's redraw.
struct WindowRefresh<'a>(&'a Window);

impl RefreshTrigger for WindowRefresh<'_> {
    fn request_refresh(&mut self) {
        self.0.request_redraw();
    }
}

/// Application state. `runtime` is `None` until the window exists.
pub struct AppState {
    pub config: Config,
    pub runtime: Option<Runtime>,
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] earthglow_render::RenderContextError),

    #[error("renderer initialization failed: {0}")]
    Renderer(#[from] RendererError),
}

impl AppState {
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            runtime: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Runtime, StartupError> {
        let attrs = window_attributes_from_config(&self.config);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let scale_factor = window.scale_factor();
        let (width, height) = logical_size(window.inner_size(), scale_factor);
        let viewport = Viewport::new(
            width,
            height,
            scale_factor,
            self.config.render.max_pixel_ratio,
        );
        let cursor = CursorTracker::new(width, height);
        let (scene, camera) = SceneBuilder::new()
            .with_seed(self.config.starfield.seed)
            .build(viewport.aspect());

        let buffer = viewport.drawing_buffer_size();
        info!(
            "Window {}x{} logical, drawing buffer {}x{} (pixel ratio {:.2})",
            width, height, buffer.width, buffer.height, scale_factor
        );

        let gpu = init_render_context_blocking(
            Arc::clone(&window),
            buffer.width,
            buffer.height,
            self.config.window.vsync,
        )?;
        let renderer =
            SceneRenderer::new(&gpu, &scene, renderer_settings_from_config(&self.config))?;

        Ok(Runtime {
            window,
            gpu,
            renderer,
            scene,
            camera,
            viewport,
            cursor,
            frame_loop: FrameLoop::new(SystemClock::new()),
        })
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.runtime.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(runtime) => {
                runtime.window.request_redraw();
                self.runtime = Some(runtime);
            }
            Err(e) => {
                error!("{e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(runtime) = &mut self.runtime else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!(
                    "Close requested after {} frames, shutting down",
                    runtime.frame_loop.frame_count()
                );
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                let scale_factor = runtime.window.scale_factor();
                runtime.handle_resize(scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                runtime.handle_resize(scale_factor);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let scale_factor = runtime.window.scale_factor();
                runtime.cursor.on_cursor_moved(position, scale_factor);
            }
            WindowEvent::RedrawRequested => {
                let swapped = runtime.renderer.poll_textures(&runtime.gpu);
                if swapped > 0 {
                    debug!(
                        "{swapped} bodies textured, {} loads pending",
                        runtime.renderer.pending_textures()
                    );
                }

                let mut frame = GpuFrame {
                    gpu: &runtime.gpu,
                    renderer: &mut runtime.renderer,
                    viewport: &runtime.viewport,
                };
                let mut trigger = WindowRefresh(&runtime.window);
                let result = runtime.frame_loop.frame(
                    &mut runtime.scene,
                    &runtime.camera,
                    &runtime.cursor,
                    &mut frame,
                    &mut trigger,
                );

                match result {
                    Ok(_) | Err(SurfaceError::Lost) | Err(SurfaceError::Timeout) => {}
                    Err(SurfaceError::OutOfMemory) => {
                        error!("GPU out of memory, exiting");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.runtime.take().is_some() {
            info!("Released GPU resources");
        } else {
            warn!("Exiting before the window was created");
        }
    }
}

/// Create an event loop and run until the window closes.
#[instrument(skip(config))]
pub fn run_with_config(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::with_config(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
