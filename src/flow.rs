//! Window and event loop.
//!
//! [`run`] opens the window, builds the GPU context, the pipeline and the
//! model, then drives one [`Viewer`] frame per redraw until the user closes
//! the window. Only setup errors end the process with an error; anything
//! that goes wrong inside a frame is logged and the frame is skipped.

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Fullscreen, Window, WindowId},
};

use crate::{
    camera::Projection,
    config::ViewerConfig,
    context::Context,
    data_structures::model::Model,
    error::{InitError, ViewerError},
    gui::{Gui, UiOverlay},
    input::{InputAction, InputEvent, InputHandler},
    overlay::{FrameStats, LogOverlay, ParameterPanel},
    pipelines::recorder::ModelPipeline,
    render::{self, FrameClock},
    resources::FsReader,
    state::ViewerState,
};

/// Everything that exists once the window is up.
pub struct Viewer {
    ctx: Context,
    pipeline: ModelPipeline,
    model: Model<Context>,
    projection: Projection,
    state: ViewerState,
    input: InputHandler,
    clock: FrameClock,
    gui: Gui,
    overlay: LogOverlay,
    panel: ParameterPanel,
    clear_colour: wgpu::Color,
    title: String,
    last_title_update: Instant,
    is_surface_configured: bool,
}

impl Viewer {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let mut ctx = Context::new(window).await?;
        let pipeline = ModelPipeline::new(&ctx)?;

        let model = Model::load_or_empty(&mut ctx, &FsReader, &config.model, &config.import_options());
        if model.is_empty() {
            log::warn!("nothing to draw from {}", config.model.display());
        }

        let projection = Projection::new(ctx.config.width, ctx.config.height, config.znear, config.zfar);
        let mut state = ViewerState::new(config);
        if state.wireframe && !pipeline.supports_wireframe() {
            log::warn!("wireframe requested but the adapter does not support line polygon mode");
            state.wireframe = false;
        }

        let gui = Gui::new(&ctx);
        let viewer = Self {
            ctx,
            pipeline,
            model,
            projection,
            state,
            input: InputHandler::new(),
            clock: FrameClock::new(),
            gui,
            overlay: LogOverlay::default(),
            panel: ParameterPanel,
            clear_colour: config.clear_colour,
            title: config.title.clone(),
            last_title_update: Instant::now(),
            is_surface_configured: true,
        };
        viewer.capture_cursor(true);
        Ok(viewer)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.is_surface_configured = self.ctx.resize(width, height);
        if self.is_surface_configured {
            self.projection.resize(width, height);
        }
    }

    fn capture_cursor(&self, captured: bool) {
        let window = self.ctx.window();
        let grab = if captured {
            window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            log::warn!("could not change the cursor grab: {e}");
        }
        window.set_cursor_visible(!captured);
    }

    fn toggle_fullscreen(&self) {
        let window = self.ctx.window();
        match window.fullscreen() {
            Some(_) => window.set_fullscreen(None),
            None => window.set_fullscreen(Some(Fullscreen::Borderless(None))),
        }
    }

    /// Returns `false` when the user asked to quit.
    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let consumed = self.gui.on_window_event(&self.ctx.window, event);
        // the panel is only reachable once the cursor is released
        if consumed && self.input.cursor_released() {
            return true;
        }
        match InputEvent::from_window_event(event) {
            Some(event) => self.handle_input(event),
            None => true,
        }
    }

    fn handle_input(&mut self, event: InputEvent) -> bool {
        let action = self.input.handle(event, &mut self.state);

        if self.state.wireframe && !self.pipeline.supports_wireframe() {
            log::warn!("wireframe is not supported by this adapter");
            self.state.wireframe = false;
        }

        match action {
            Some(InputAction::Exit) => return false,
            Some(InputAction::ToggleFullscreen) => self.toggle_fullscreen(),
            Some(InputAction::SetCursorCaptured(captured)) => self.capture_cursor(captured),
            None => (),
        }
        true
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        let dt = self.clock.tick();
        self.input.apply_held_keys(&mut self.state, dt);
        self.state.advance_light(self.clock.elapsed());

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        let transforms = {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut recorder =
                self.pipeline
                    .recorder(&self.ctx.device, &mut render_pass, self.state.wireframe);
            render::render_frame(&mut recorder, &mut self.state, &self.model, &self.projection)
        };

        let stats = FrameStats {
            view: transforms.view,
            fps: self.clock.fps(),
        };
        let gui_commands = self.gui.draw(&self.ctx, &mut encoder, &view, |egui_ctx| {
            egui::Window::new(ParameterPanel::TITLE).show(egui_ctx, |ui| {
                self.panel
                    .show(&mut UiOverlay::new(ui), &mut self.state, &stats);
            });
        });

        self.ctx.queue.submit(
            gui_commands
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        output.present();

        self.panel.show(&mut self.overlay, &mut self.state, &stats);

        if self.last_title_update.elapsed().as_secs_f32() >= 1.0 {
            self.ctx
                .window
                .set_title(&format!("{} | {:.1} fps", self.title, stats.fps));
            self.last_title_update = Instant::now();
        }
        Ok(())
    }
}

pub struct App {
    config: ViewerConfig,
    viewer: Option<Viewer>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            viewer: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, InitError::Window(e.to_string()).into()),
        };
        log::info!(
            "window created ({}x{})",
            window.inner_size().width,
            window.inner_size().height
        );

        match futures::executor::block_on(Viewer::new(window, &self.config)) {
            Ok(viewer) => self.viewer = Some(viewer),
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let viewer = match &mut self.viewer {
            Some(viewer) => viewer,
            None => return,
        };

        if !viewer.handle_window_event(&event) {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => viewer.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match viewer.render() {
                Ok(()) => (),
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("surface lost, reconfiguring");
                    let size = viewer.ctx.window.inner_size();
                    viewer.resize(size.width, size.height);
                }
                Err(wgpu::SurfaceError::Timeout) => log::warn!("surface timed out, skipping frame"),
                Err(e) => log::error!("Unable to render {}", e),
            },
            _ => {}
        }
    }

    // Pointer deltas keep coming while the cursor is grabbed in place.
    fn device_event(&mut self, event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        if let Some(event) = InputEvent::from_device_event(&event) {
            if !viewer.handle_input(event) {
                event_loop.exit();
            }
        }
    }
}

/// Open the viewer and block until it is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().map_err(|e| InitError::EventLoop(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
