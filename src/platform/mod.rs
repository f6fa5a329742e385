//! Platform layer
//!
//! Owns the winit event loop and window, samples pointer input and drives
//! one update + render per redraw.

pub mod input;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::renderer::{GpuRenderer, SurfaceAction, render_scene};
use crate::settings::Settings;
use crate::sim::{FrameClock, Simulation, tick};

pub use input::PointerState;

/// Open the window and run until it is closed
///
/// Returns an error if the window or graphics could not be set up, or if the
/// surface failed unrecoverably mid-run.
pub fn run(settings: Settings) -> Result<()> {
    settings.validate().context("invalid settings")?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(settings);

    event_loop
        .run_app(&mut app)
        .context("event loop terminated with error")?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Everything that exists once the window is up
struct Running {
    window: Arc<Window>,
    renderer: GpuRenderer,
    clock: FrameClock,
    epoch: Instant,
}

struct App {
    sim: Simulation,
    pointer: PointerState,
    running: Option<Running>,
    /// First fatal error, reported after the loop exits
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(settings: Settings) -> Self {
        Self {
            sim: Simulation::new(settings),
            pointer: PointerState::default(),
            running: None,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let settings = &self.sim.settings;
        let (width, height) = settings.window_size();
        let attrs = Window::default_attributes()
            .with_title(settings.window_title.clone())
            .with_inner_size(LogicalSize::new(width, height));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let renderer = pollster::block_on(GpuRenderer::new(window.clone(), settings))
            .context("failed to initialize graphics")?;

        let epoch = Instant::now();
        Ok(Running {
            window,
            renderer,
            clock: FrameClock::new(0.0, settings.max_frame_delta),
            epoch,
        })
    }

    /// sample input -> update -> render -> present
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let now = running.epoch.elapsed().as_secs_f64();
        let dt = running.clock.tick(now);

        let (w, h) = running.renderer.size;
        let window_size = Vec2::new(w as f32, h as f32);
        let input = self.pointer.sample(window_size, self.sim.bounds());

        tick(&mut self.sim, &input, dt);

        render_scene(&self.sim, &mut running.renderer);
        match running.renderer.present() {
            Ok(()) => {}
            Err(e) => match running.renderer.handle_surface_error(e.clone()) {
                SurfaceAction::Reconfigured | SurfaceAction::SkipFrame => {}
                SurfaceAction::Fatal => {
                    self.fail(event_loop, anyhow::anyhow!("surface failed: {e}"));
                }
            },
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => {
                log::info!("Settings: {}", self.sim.settings.to_json());
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        // Continuous redraw: one simulation step per presented frame
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.pointer.apply(&event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(running) = self.running.as_mut() {
                    running.renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release GPU resources before the window goes away
        if let Some(running) = self.running.take() {
            log::info!("Exiting after {} frames", running.clock.frame_index());
        }
    }
}
