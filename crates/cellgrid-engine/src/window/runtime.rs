use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::ViewerConfig;
use crate::device::{Gpu, InitError};
use crate::display::{CanvasGeometry, DisplayScaler, Viewport};
use crate::grid::VertexSet;
use crate::render::{CELL_SHADER, GridRenderer, RenderCtx};

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, builds the grid pipeline and runs until the window closes.
    ///
    /// The first fatal error (startup or frame submission) ends the loop and is
    /// returned here.
    pub fn run(config: ViewerConfig) -> Result<()> {
        config.validate().context("invalid viewer configuration")?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.fatal.map_or(Ok(()), Err)
    }
}

/// GPU context plus the grid resources built on it.
struct Stage<'w> {
    gpu: Gpu<'w>,
    renderer: GridRenderer,
}

impl<'w> Stage<'w> {
    fn new(window: &'w Window, config: &ViewerConfig) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(window, config.gpu.clone()))?;

        let ctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format());
        let renderer = GridRenderer::new(
            &ctx,
            &VertexSet::cell_quad(),
            config.grid,
            &CELL_SHADER,
            config.clear_color,
        )?;

        Ok(Self { gpu, renderer })
    }
}

#[self_referencing]
struct WindowEntry {
    geometry: Option<CanvasGeometry>,

    window: Window,

    #[borrows(window)]
    #[covariant]
    stage: Stage<'this>,
}

struct AppState {
    config: ViewerConfig,
    scaler: DisplayScaler,

    entry: Option<WindowEntry>,
    fatal: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: ViewerConfig) -> Self {
        Self {
            scaler: config.scaler(),
            config,
            entry: None,
            fatal: None,
        }
    }

    /// Keeps the first error, releases GPU state and stops the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.entry = None;
        event_loop.exit();
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let (w, h) = self.config.canvas_size;
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(w as f64, h as f64));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")
            .context(InitError::SurfaceAcquisition)?;

        // Geometry first: the canvas is placed before the GPU is touched.
        let geometry = rescale(&self.scaler, &window);
        let config = &self.config;

        WindowEntryTryBuilder {
            geometry,
            window,
            stage_builder: |w| Stage::new(w, config),
        }
        .try_build()
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.fatal.is_some() {
            return;
        }

        // Redraws are requested explicitly; there is no continuous frame loop.
        event_loop.set_control_flow(ControlFlow::Wait);

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(e) => self.fail(event_loop, e.context("startup failed")),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let scaler = self.scaler;
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_mut(|fields| {
                    fields.stage.gpu.resize(new_size);
                    *fields.geometry = rescale(&scaler, fields.window);
                    fields.window.request_redraw();
                });
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                entry.with_mut(|fields| {
                    fields.stage.gpu.resize(fields.window.inner_size());
                    *fields.geometry = rescale(&scaler, fields.window);
                    fields.window.request_redraw();
                });
            }

            WindowEvent::RedrawRequested => {
                let result = entry.with_mut(|fields| {
                    let size = fields.stage.gpu.size();
                    if size.width == 0 || size.height == 0 {
                        return Ok(());
                    }

                    let canvas = fields
                        .geometry
                        .and_then(|g| g.to_physical(fields.window.scale_factor(), size));

                    fields.window.pre_present_notify();
                    fields.stage.renderer.render(&mut fields.stage.gpu, canvas)
                });

                if let Err(e) = result {
                    self.fail(event_loop, e.context("frame submission failed"));
                }
            }

            _ => {}
        }
    }
}

/// Recomputes the canvas geometry from the window's current logical size.
fn rescale(scaler: &DisplayScaler, window: &Window) -> Option<CanvasGeometry> {
    let viewport = Viewport::of_window(window);
    let geometry = scaler.fit(viewport);

    match &geometry {
        Some(g) => log::debug!(
            "canvas {}x{} in {}x{} viewport (scale {:.3}, margins {}/{})",
            g.width,
            g.height,
            viewport.width,
            viewport.height,
            g.scale,
            g.margin_left,
            g.margin_top
        ),
        None => log::debug!("viewport {}x{} has no drawable area", viewport.width, viewport.height),
    }

    geometry
}
