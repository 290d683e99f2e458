use cgmath::Vector3;

use crate::shader::{self, Shader};

/// The single point light of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vector3<f32>,
    pub colour: Vector3<f32>,
    /// Ambient contribution of the light colour.
    pub strength: f32,
    /// Specular exponent.
    pub n: f32,
}

impl Light {
    pub fn new(position: Vector3<f32>, colour: Vector3<f32>, strength: f32, n: f32) -> Self {
        Self {
            position,
            colour,
            strength,
            n,
        }
    }

    pub fn push<S: Shader + ?Sized>(&self, shader: &mut S) {
        shader.set_vec3(shader::LIGHT_POS, self.position);
        shader.set_vec3(shader::LIGHT_COLOUR, self.colour);
        shader.set_float(shader::LIGHT_STR, self.strength);
        shader.set_float(shader::LIGHT_N, self.n);
    }

    /// Place the light on a horizontal circle at `time` seconds: `(r cos t, h, r sin t)`.
    pub fn orbit(&mut self, time: f32, radius: f32, height: f32) {
        self.position = Vector3::new(radius * time.cos(), height, radius * time.sin());
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(
            Vector3::new(10.0, 30.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            0.2,
            5.0,
        )
    }
}
