//! Per-frame transform pipeline.
//!
//! Once per frame the viewer: measures the elapsed time, recomputes the
//! model, view, projection and normal matrices from [`ViewerState`], pushes
//! them together with the light and camera position, and draws each batch of
//! the model once. There is no culling, sorting or instancing.

use cgmath::{EuclideanSpace, Matrix, Matrix4, SquareMatrix};
use instant::Instant;

use crate::{
    camera::{Camera, Projection},
    context::GpuResourceSink,
    data_structures::{model::Model, transform::SceneTransform},
    shader::{self, DrawTarget, Shader},
    state::ViewerState,
};

/// Frame timing: delta since the previous frame, time since start and a
/// once-per-second fps average.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Option<Instant>,
    frames: u32,
    window_start: Instant,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: None,
            frames: 0,
            window_start: start,
            fps: 0.0,
        }
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Seconds since the previous tick; zero for the first one.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = self
            .last
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last = Some(now);

        self.frames += 1;
        let window = now.saturating_duration_since(self.window_start).as_secs_f32();
        if window >= 1.0 {
            self.fps = self.frames as f32 / window;
            self.frames = 0;
            self.window_start = now;
        }
        dt
    }

    /// Seconds between the clock start and the latest tick.
    pub fn elapsed(&self) -> f32 {
        self.last
            .map_or(0.0, |last| last.saturating_duration_since(self.start).as_secs_f32())
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// The four matrices pushed every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub normal: Matrix4<f32>,
}

impl FrameTransforms {
    pub fn compute(transform: &SceneTransform, camera: &Camera, projection: &Projection) -> Self {
        let model = transform.model_matrix();
        Self {
            model,
            view: camera.view_matrix(),
            projection: projection.calc_matrix(camera.fov_zoom()),
            normal: normal_matrix(&model),
        }
    }

    pub fn push<S: Shader + ?Sized>(&self, shader: &mut S) {
        shader.set_mat4(shader::MODEL, &self.model);
        shader.set_mat4(shader::VIEW, &self.view);
        shader.set_mat4(shader::PROJECTION, &self.projection);
        shader.set_mat4(shader::NORMAL_MATRIX, &self.normal);
    }
}

/// inverse(transpose(model)); identity when the model matrix is singular
/// (for instance at scale zero).
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix4<f32> {
    model
        .transpose()
        .invert()
        .unwrap_or_else(Matrix4::identity)
}

/// Record one frame: mirror the scale, push every uniform and draw each batch once.
pub fn render_frame<G, D>(
    target: &mut D,
    state: &mut ViewerState,
    model: &Model<G>,
    projection: &Projection,
) -> FrameTransforms
where
    G: GpuResourceSink,
    D: DrawTarget<G>,
{
    state.transform.mirror_scale();
    let transforms = FrameTransforms::compute(&state.transform, &state.camera, projection);

    target.use_program();
    transforms.push(target);
    state.light.push(target);
    target.set_vec3(shader::CAM_POS, state.camera.position.to_vec());

    model.draw(target);
    transforms
}
