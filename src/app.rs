//! Application shell
//!
//! Owns the event loop, the window, the render engine, the UI manager and the
//! simulation host, and runs the per-frame protocol: measure delta time, update the
//! active simulation, draw the panels, present.

use std::sync::Arc;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::AppConfig,
    gfx::{render_engine::FrameStatus, Gfx, RenderEngine},
    performance::{FrameClock, FrameStats},
    simulation::{SimulationHost, SimulationId},
    ui::{draw_panels, UiManager},
};

pub struct SimDeckApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    host: SimulationHost,
    clock: FrameClock,
    stats: FrameStats,
    startup_error: Option<anyhow::Error>,
}

impl SimDeckApp {
    /// Creates the application; the window and GPU are set up once the event loop resumes
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;

        Ok(Self {
            event_loop,
            app_state: AppState {
                clock: FrameClock::new(config.max_frame_dt),
                stats: FrameStats::new(),
                host: SimulationHost::new(),
                window: None,
                render_engine: None,
                ui_manager: None,
                startup_error: None,
                config,
            },
        })
    }

    /// Run the application (consumes self and blocks until the window closes)
    pub fn run(mut self) -> anyhow::Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop
            .run_app(&mut self.app_state)
            .context("Failed to run event loop")?;

        match self.app_state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(self.config.title.clone())
                    .with_inner_size(LogicalSize::new(self.config.width, self.config.height)),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let (width, height) = window.inner_size().into();
        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.vsync,
            self.config.wgpu_clear_color(),
        ))?;

        let mut ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
            self.config.font_size,
        );

        {
            let mut gfx = Gfx::new(
                render_engine.device(),
                render_engine.queue(),
                ui_manager.renderer_mut(),
            );
            self.host.start(Some(&mut gfx))?;

            let initial = self.config.initial_simulation;
            if initial != SimulationId::None {
                // A failed start leaves the placeholder active; the error shows in the UI
                let _ = self.host.select(initial, Some(&mut gfx));
            }
        }

        log::info!("Window ready: {}x{}", width, height);
        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.ui_manager = Some(ui_manager);
        Ok(())
    }

    /// Destroys the active simulation while the GPU handles are still alive
    fn shutdown(&mut self) {
        let (Some(render_engine), Some(ui_manager)) =
            (self.render_engine.as_ref(), self.ui_manager.as_mut())
        else {
            self.host.shutdown(None);
            return;
        };

        let mut gfx = Gfx::new(
            render_engine.device(),
            render_engine.queue(),
            ui_manager.renderer_mut(),
        );
        self.host.shutdown(Some(&mut gfx));
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        self.stats.record(dt);
        self.host.update(dt);

        let (Some(render_engine), Some(ui_manager), Some(window)) = (
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
            self.window.as_ref(),
        ) else {
            return;
        };

        let host = &mut self.host;
        let stats = &self.stats;
        let status = render_engine.render_frame(|device, queue, encoder, color_attachment| {
            ui_manager.draw(
                device,
                queue,
                encoder,
                window,
                color_attachment,
                |ui, renderer| {
                    let mut gfx = Gfx::new(device, queue, renderer);
                    draw_panels(ui, host, stats, &mut gfx);
                },
            );
        });

        if status == FrameStatus::Fatal {
            log::error!("Surface cannot be recovered, exiting");
            self.shutdown();
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_graphics(event_loop) {
            log::error!("Failed to start: {:#}", err);
            self.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
