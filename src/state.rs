use cgmath::{Deg, Vector3};

use crate::{
    camera::{self, Camera},
    config::ViewerConfig,
    data_structures::transform::SceneTransform,
    pipelines::light::Light,
};

/// Everything the input stage mutates and the render stage reads.
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub camera: Camera,
    pub transform: SceneTransform,
    pub light: Light,
    pub wireframe: bool,
    /// Model displacement speed in units per second.
    pub key_sensitivity: f32,
    /// Model rotation speed in degrees per second.
    pub rotate_speed: f32,
    /// Model scale speed per second.
    pub scale_speed: f32,
    light_orbit_radius: f32,
    light_orbit_height: f32,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            camera: Camera::new(config.camera_start, Deg(camera::YAW), Deg(camera::PITCH)),
            transform: SceneTransform::new(),
            light: config.light,
            wireframe: config.wireframe,
            key_sensitivity: config.key_sensitivity,
            rotate_speed: config.rotate_speed,
            scale_speed: config.scale_speed,
            light_orbit_radius: config.light_orbit_radius,
            light_orbit_height: config.light_orbit_height,
        }
    }

    /// Move the light along its orbit for time `t` (seconds since start).
    pub fn advance_light(&mut self, t: f32) {
        self.light.orbit(t, self.light_orbit_radius, self.light_orbit_height);
    }

    pub fn displace(&mut self, delta: Vector3<f32>) {
        self.transform.displacement += delta;
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}
