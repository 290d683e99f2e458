//! On-screen parameter panel, drawn with egui in a second render pass on top
//! of the model.

use egui_wgpu::ScreenDescriptor;
use winit::{event::WindowEvent, window::Window};

use crate::{context::Context, overlay::DebugOverlay};

/// Speed of the three-component drag widgets, in units per pixel.
const DRAG_SPEED: f64 = 0.05;

/// egui context, its winit bridge and its wgpu renderer.
pub struct Gui {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Gui {
    pub fn new(ctx: &Context) -> Self {
        let egui_ctx = egui::Context::default();
        let window = ctx.window();
        let state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1, false);
        Self {
            ctx: egui_ctx,
            state,
            renderer,
        }
    }

    /// Feed a window event to egui. Returns `true` when a widget consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Build this frame's widgets with `build` and record them into `encoder`
    /// as a pass that loads `view`. The returned buffers must be submitted
    /// before `encoder`.
    pub fn draw(
        &mut self,
        ctx: &Context,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        build: impl FnMut(&egui::Context),
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = self.state.take_egui_input(ctx.window());
        let output = self.ctx.run(raw_input, build);
        self.state
            .handle_platform_output(ctx.window(), output.platform_output);

        let paint_jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        let screen = ScreenDescriptor {
            size_in_pixels: [ctx.config.width, ctx.config.height],
            pixels_per_point: output.pixels_per_point,
        };

        for (id, delta) in &output.textures_delta.set {
            self.renderer
                .update_texture(&ctx.device, &ctx.queue, *id, delta);
        }
        let commands =
            self.renderer
                .update_buffers(&ctx.device, &ctx.queue, encoder, &paint_jobs, &screen);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Gui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &paint_jobs, &screen);
        }
        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
        commands
    }
}

/// [`DebugOverlay`] over an egui [`egui::Ui`]. The enclosing window carries
/// the title.
pub struct UiOverlay<'a> {
    ui: &'a mut egui::Ui,
}

impl<'a> UiOverlay<'a> {
    pub fn new(ui: &'a mut egui::Ui) -> Self {
        Self { ui }
    }
}

impl DebugOverlay for UiOverlay<'_> {
    fn begin(&mut self, _title: &str) {}

    fn text(&mut self, text: &str) {
        self.ui.label(text);
    }

    fn slider_f32(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> bool {
        self.ui
            .add(egui::Slider::new(value, min..=max).text(label))
            .changed()
    }

    fn slider_vec3(&mut self, label: &str, value: &mut [f32; 3], min: f32, max: f32) -> bool {
        self.ui
            .horizontal(|ui| {
                let mut changed = false;
                for component in value.iter_mut() {
                    changed |= ui
                        .add(
                            egui::DragValue::new(component)
                                .range(min..=max)
                                .speed(DRAG_SPEED),
                        )
                        .changed();
                }
                ui.label(label);
                changed
            })
            .inner
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        self.ui.checkbox(value, label).changed()
    }

    fn end(&mut self) {}
}
