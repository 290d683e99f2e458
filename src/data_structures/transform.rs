use cgmath::{Deg, Matrix4, Vector3};

/// User-editable placement of the model in the world.
///
/// Only `scale.x` is authoritative: y and z are overwritten with it every
/// frame by [`SceneTransform::mirror_scale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransform {
    pub displacement: Vector3<f32>,
    pub scale: Vector3<f32>,
    /// Rotation about world up, in degrees.
    pub rotation: f32,
}

impl SceneTransform {
    pub fn new() -> Self {
        Self {
            displacement: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: 0.0,
        }
    }

    pub fn mirror_scale(&mut self) {
        self.scale.y = self.scale.x;
        self.scale.z = self.scale.x;
    }

    /// translate · scale · rotate(+Y). Uses `scale` as is, call `mirror_scale` first.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.displacement)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
            * Matrix4::from_angle_y(Deg(self.rotation))
    }
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self::new()
    }
}
