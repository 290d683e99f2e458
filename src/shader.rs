//! Named-uniform shader capability.
//!
//! The frame pipeline talks to the GPU program by uniform name, the way a GL
//! program is driven through uniform locations. A backend maps the names it
//! knows onto its own layout and ignores the rest.

use cgmath::{Matrix4, Vector3};

use crate::context::GpuResourceSink;

pub const MODEL: &str = "model";
pub const VIEW: &str = "view";
pub const PROJECTION: &str = "projection";
pub const NORMAL_MATRIX: &str = "NormalMatrix";
pub const CAM_POS: &str = "camPos";
pub const USE_TEXTURE: &str = "useTexture";

pub const LIGHT_POS: &str = "uLightPos";
pub const LIGHT_COLOUR: &str = "uLightColour";
pub const LIGHT_STR: &str = "uLightStr";
pub const LIGHT_N: &str = "uN";

pub const MATERIAL_DIFFUSE: &str = "uDiffuse";
pub const MATERIAL_AMBIENT: &str = "uAmbient";
pub const MATERIAL_SPECULAR: &str = "uSpecular";

/// A compiled program whose uniforms can be written by name.
///
/// Writing a name the program does not declare is not an error; it is
/// silently dropped, like writing to a GL uniform location of `-1`.
pub trait Shader {
    /// Make this program current for the uniform writes and draws that follow.
    fn use_program(&mut self);

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>);

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>);

    fn set_int(&mut self, name: &str, value: i32);

    fn set_float(&mut self, name: &str, value: f32);
}

/// Draw issuance against the buffers and textures created by a [`GpuResourceSink`].
pub trait DrawTarget<G: GpuResourceSink + ?Sized>: Shader {
    /// Bind `texture` to sampler unit `unit` for the next draw.
    fn bind_texture(&mut self, unit: u32, texture: &G::Texture);

    /// Draw `index_count` indices as a triangle list using the current uniforms.
    fn draw_indexed(&mut self, vertices: &G::Buffer, indices: &G::Buffer, index_count: u32);
}
