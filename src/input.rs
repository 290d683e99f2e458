//! Input mapping.
//!
//! winit events are first narrowed to [`InputEvent`]s, which the
//! [`InputHandler`] applies to a [`ViewerState`]. Window-level side effects
//! (closing, fullscreen, cursor grab) come back as [`InputAction`]s for the
//! event loop to carry out.

use std::collections::HashSet;

use cgmath::Vector3;
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{camera::CameraMovement, state::ViewerState};

/// Pixels of a trackpad scroll that count as one wheel notch.
const PIXELS_PER_LINE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    F,
    I,
    J,
    K,
    L,
    Up,
    Down,
    Escape,
    F11,
}

impl Key {
    pub fn from_code(code: KeyCode) -> Option<Self> {
        Some(match code {
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyQ => Key::Q,
            KeyCode::KeyE => Key::E,
            KeyCode::KeyF => Key::F,
            KeyCode::KeyI => Key::I,
            KeyCode::KeyJ => Key::J,
            KeyCode::KeyK => Key::K,
            KeyCode::KeyL => Key::L,
            KeyCode::ArrowUp => Key::Up,
            KeyCode::ArrowDown => Key::Down,
            KeyCode::Escape => Key::Escape,
            KeyCode::F11 => Key::F11,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: Key, state: KeyState },
    /// Absolute cursor position in physical pixels, y pointing down.
    CursorMoved { x: f64, y: f64 },
    /// Raw pointer motion, y pointing up. Keeps arriving while the cursor is
    /// grabbed and pinned in place.
    MouseDelta { dx: f32, dy: f32 },
    /// Vertical scroll in wheel notches, positive away from the user.
    Scroll { dy: f32 },
    MouseButton { button: MouseButton, pressed: bool },
}

impl InputEvent {
    /// Narrow a winit window event. Events the viewer does not react to map to `None`.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let key = Key::from_code(*code)?;
                let state = match (state, repeat) {
                    (ElementState::Released, _) => KeyState::Released,
                    (ElementState::Pressed, true) => KeyState::Repeat,
                    (ElementState::Pressed, false) => KeyState::Pressed,
                };
                Some(InputEvent::Key { key, state })
            }
            WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
                x: position.x,
                y: position.y,
            }),
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                };
                Some(InputEvent::Scroll { dy })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    _ => return None,
                };
                Some(InputEvent::MouseButton {
                    button,
                    pressed: state.is_pressed(),
                })
            }
            _ => None,
        }
    }

    pub fn from_device_event(event: &DeviceEvent) -> Option<Self> {
        match event {
            DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(InputEvent::MouseDelta {
                dx: *dx as f32,
                dy: -*dy as f32,
            }),
            _ => None,
        }
    }
}

/// Side effects the event loop has to perform on the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Exit,
    ToggleFullscreen,
    /// Grab and hide the cursor (`true`) or release and show it (`false`).
    SetCursorCaptured(bool),
}

#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    held: HashSet<Key>,
    left_drag: bool,
    right_drag: bool,
    cursor_released: bool,
    first_mouse: bool,
    last_cursor: Option<(f64, f64)>,
    /// Set once raw motion arrives; absolute cursor positions then only track
    /// where the pointer is.
    relative_motion: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn cursor_released(&self) -> bool {
        self.cursor_released
    }

    pub fn is_looking(&self) -> bool {
        self.right_drag
    }

    pub fn is_panning(&self) -> bool {
        self.left_drag
    }

    pub fn handle(&mut self, event: InputEvent, state: &mut ViewerState) -> Option<InputAction> {
        match event {
            InputEvent::Key { key, state: KeyState::Released } => {
                self.held.remove(&key);
                None
            }
            InputEvent::Key { key, state: KeyState::Repeat } => {
                self.held.insert(key);
                None
            }
            InputEvent::Key { key, state: KeyState::Pressed } => {
                self.held.insert(key);
                match key {
                    Key::Escape => Some(InputAction::Exit),
                    Key::F11 => Some(InputAction::ToggleFullscreen),
                    Key::F => {
                        state.wireframe = !state.wireframe;
                        None
                    }
                    _ => None,
                }
            }
            InputEvent::CursorMoved { x, y } => {
                self.cursor_moved(x, y, state);
                None
            }
            InputEvent::MouseDelta { dx, dy } => {
                self.relative_motion = true;
                self.drag(dx, dy, state);
                None
            }
            InputEvent::Scroll { dy } => {
                state.camera.process_mouse_scroll(dy);
                None
            }
            InputEvent::MouseButton { button: MouseButton::Middle, pressed } => {
                if !pressed {
                    return None;
                }
                self.cursor_released = !self.cursor_released;
                if self.cursor_released {
                    self.left_drag = false;
                    self.right_drag = false;
                }
                Some(InputAction::SetCursorCaptured(!self.cursor_released))
            }
            InputEvent::MouseButton { button, pressed } => {
                if self.cursor_released {
                    return None;
                }
                if pressed {
                    self.first_mouse = true;
                }
                match button {
                    MouseButton::Left => self.left_drag = pressed,
                    MouseButton::Right => self.right_drag = pressed,
                    MouseButton::Middle => (),
                }
                None
            }
        }
    }

    fn cursor_moved(&mut self, x: f64, y: f64, state: &mut ViewerState) {
        if !self.relative_motion && (self.right_drag || self.left_drag) {
            if self.first_mouse || self.last_cursor.is_none() {
                self.last_cursor = Some((x, y));
                self.first_mouse = false;
            }
            let (last_x, last_y) = self.last_cursor.unwrap_or((x, y));
            let dx = (x - last_x) as f32;
            // screen y grows downwards
            let dy = (last_y - y) as f32;
            self.drag(dx, dy, state);
        }
        self.last_cursor = Some((x, y));
    }

    /// Right drag looks around, left drag pans.
    fn drag(&self, dx: f32, dy: f32, state: &mut ViewerState) {
        if self.right_drag {
            state.camera.process_mouse_movement(dx, dy, true);
        } else if self.left_drag {
            state.camera.process_camera_position(dx, dy);
        }
    }

    /// Continuous controls, applied once per frame for every key still held.
    pub fn apply_held_keys(&self, state: &mut ViewerState, dt: f32) {
        let step = state.key_sensitivity * dt;
        let held = |key| self.held.contains(&key);

        if held(Key::W) {
            state.displace(Vector3::new(0.0, 0.0, step));
        }
        if held(Key::S) {
            state.displace(Vector3::new(0.0, 0.0, -step));
        }
        if held(Key::A) {
            state.displace(Vector3::new(-step, 0.0, 0.0));
        }
        if held(Key::D) {
            state.displace(Vector3::new(step, 0.0, 0.0));
        }
        if held(Key::Q) {
            state.transform.rotation += state.rotate_speed * dt;
        }
        if held(Key::E) {
            state.transform.rotation -= state.rotate_speed * dt;
        }
        if held(Key::Up) {
            state.transform.scale.x += state.scale_speed * dt;
        }
        if held(Key::Down) {
            state.transform.scale.x -= state.scale_speed * dt;
        }

        let dolly = [
            (Key::I, CameraMovement::Forward),
            (Key::K, CameraMovement::Backward),
            (Key::J, CameraMovement::Left),
            (Key::L, CameraMovement::Right),
        ];
        for (key, direction) in dolly {
            if held(key) {
                state.camera.process_keyboard(direction, dt);
            }
        }
    }
}
