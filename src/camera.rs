//! Euler-angle free-fly camera and the perspective projection it feeds.
//!
//! The camera owns position, yaw and pitch. The `front`/`right`/`up` basis is
//! derived state: it is rebuilt in one place, [`Camera::update_vectors`],
//! whenever the orientation changes and is only readable from outside.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Vector3};

pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
pub const SPEED: f32 = 2.5;
pub const SENSITIVITY: f32 = 0.1;
pub const FOV_ZOOM: f32 = 45.0;

pub const PITCH_LIMIT: f32 = 89.0;
pub const FOV_MIN: f32 = 1.0;
pub const FOV_MAX: f32 = 60.0;

/// Direction of a keyboard-style camera impulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    world_up: Vector3<f32>,
    yaw: Deg<f32>,
    pitch: Deg<f32>,
    front: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    fov_zoom: f32,
}

impl Camera {
    /// Camera at `position` with the given orientation and `+Y` as world up.
    pub fn new<V: Into<Point3<f32>>, Y: Into<Deg<f32>>, P: Into<Deg<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self::with_world_up(position, Vector3::unit_y(), yaw, pitch)
    }

    pub fn with_world_up<V: Into<Point3<f32>>, Y: Into<Deg<f32>>, P: Into<Deg<f32>>>(
        position: V,
        world_up: Vector3<f32>,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            world_up,
            yaw: yaw.into(),
            pitch: pitch.into(),
            front: -Vector3::unit_z(),
            right: Vector3::unit_x(),
            up: Vector3::unit_y(),
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            fov_zoom: FOV_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw.0
    }

    pub fn pitch(&self) -> f32 {
        self.pitch.0
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    /// Vertical field of view in degrees, always within `[FOV_MIN, FOV_MAX]`.
    pub fn fov_zoom(&self) -> f32 {
        self.fov_zoom
    }

    /// Replace yaw and pitch (degrees) and rebuild the basis. No pitch clamp is applied.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = Deg(yaw);
        self.pitch = Deg(pitch);
        self.update_vectors();
    }

    /// Right-handed look-at from `position` towards `position + front`.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Keyboard-style dolly/strafe, scaled by `dt` so it is frame-rate independent.
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Look around. Offsets are in screen units; `dy` is positive upwards.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += Deg(dx * self.mouse_sensitivity);
        self.pitch += Deg(dy * self.mouse_sensitivity);

        // keep away from the poles, the basis flips there
        if constrain_pitch {
            self.pitch = Deg(self.pitch.0.clamp(-PITCH_LIMIT, PITCH_LIMIT));
        }

        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.fov_zoom = (self.fov_zoom - dy).clamp(FOV_MIN, FOV_MAX);
    }

    /// Low-sensitivity pan along world z/y, used while the pan button is held.
    pub fn process_camera_position(&mut self, dx: f32, dy: f32) {
        self.position.z -= dx * self.mouse_sensitivity / 10.0;
        self.position.y += dy * self.mouse_sensitivity / 10.0;
    }

    // right is derived from front and up from both; the order matters
    fn update_vectors(&mut self) {
        let (sin_pitch, cos_pitch) = cgmath::Rad::from(self.pitch).0.sin_cos();
        let (sin_yaw, cos_yaw) = cgmath::Rad::from(self.yaw).0.sin_cos();

        self.front = Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 0.0, 0.0), Deg(YAW), Deg(PITCH))
    }
}

/// Viewport-dependent half of the projection. The field of view comes from the camera.
#[derive(Debug, Clone)]
pub struct Projection {
    aspect: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// OpenGL-convention perspective; the vertex shader remaps depth for wgpu.
    pub fn calc_matrix(&self, fov_zoom: f32) -> Matrix4<f32> {
        cgmath::perspective(Deg(fov_zoom), self.aspect, self.znear, self.zfar)
    }
}
