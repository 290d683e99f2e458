use cgmath::Vector3;
use model_viewer::{
    camera::YAW,
    input::{InputAction, InputEvent, InputHandler, Key, KeyState, MouseButton},
    state::ViewerState,
};

fn press(key: Key) -> InputEvent {
    InputEvent::Key {
        key,
        state: KeyState::Pressed,
    }
}

fn release(key: Key) -> InputEvent {
    InputEvent::Key {
        key,
        state: KeyState::Released,
    }
}

fn button(button: MouseButton, pressed: bool) -> InputEvent {
    InputEvent::MouseButton { button, pressed }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn held_keys_move_the_model_every_frame() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    input.handle(press(Key::W), &mut state);
    input.handle(press(Key::D), &mut state);
    input.apply_held_keys(&mut state, 0.5);
    input.apply_held_keys(&mut state, 0.5);
    assert_eq!(state.transform.displacement, Vector3::new(4.0, 0.0, 4.0));

    input.handle(release(Key::W), &mut state);
    input.handle(release(Key::D), &mut state);
    input.apply_held_keys(&mut state, 1.0);
    assert_eq!(state.transform.displacement, Vector3::new(4.0, 0.0, 4.0));
    assert!(!input.is_held(Key::W));
}

#[test]
fn rotation_and_scale_keys() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    input.handle(press(Key::Q), &mut state);
    input.handle(press(Key::Up), &mut state);
    input.apply_held_keys(&mut state, 0.1);
    assert!(approx(state.transform.rotation, 5.0));
    assert!(approx(state.transform.scale.x, 1.05));

    input.handle(release(Key::Q), &mut state);
    input.handle(release(Key::Up), &mut state);
    input.handle(press(Key::E), &mut state);
    input.handle(press(Key::Down), &mut state);
    input.apply_held_keys(&mut state, 0.2);
    assert!(approx(state.transform.rotation, -5.0));
    assert!(approx(state.transform.scale.x, 0.95));
}

#[test]
fn dolly_keys_move_the_camera() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    input.handle(press(Key::I), &mut state);
    input.apply_held_keys(&mut state, 1.0);
    assert!(approx(state.camera.position.z, 0.5));

    input.handle(release(Key::I), &mut state);
    input.handle(press(Key::L), &mut state);
    input.apply_held_keys(&mut state, 1.0);
    assert!(approx(state.camera.position.x, 2.5));
}

#[test]
fn window_actions() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    assert_eq!(input.handle(press(Key::Escape), &mut state), Some(InputAction::Exit));
    assert_eq!(
        input.handle(press(Key::F11), &mut state),
        Some(InputAction::ToggleFullscreen)
    );
    assert_eq!(input.handle(press(Key::W), &mut state), None);
}

#[test]
fn f_toggles_wireframe_once_per_press() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();
    assert!(!state.wireframe);

    input.handle(press(Key::F), &mut state);
    input.handle(
        InputEvent::Key {
            key: Key::F,
            state: KeyState::Repeat,
        },
        &mut state,
    );
    assert!(state.wireframe);

    input.handle(release(Key::F), &mut state);
    input.handle(press(Key::F), &mut state);
    assert!(!state.wireframe);
}

#[test]
fn first_motion_after_a_press_does_not_jump() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    input.handle(InputEvent::CursorMoved { x: 500.0, y: 500.0 }, &mut state);
    input.handle(button(MouseButton::Right, true), &mut state);
    assert!(input.is_looking());

    input.handle(InputEvent::CursorMoved { x: 100.0, y: 100.0 }, &mut state);
    assert!(approx(state.camera.yaw(), YAW));
    assert!(approx(state.camera.pitch(), 0.0));

    // screen y grows downwards, so moving up pitches up
    input.handle(InputEvent::CursorMoved { x: 110.0, y: 90.0 }, &mut state);
    assert!(approx(state.camera.yaw(), YAW + 1.0));
    assert!(approx(state.camera.pitch(), 1.0));

    input.handle(button(MouseButton::Right, false), &mut state);
    input.handle(InputEvent::CursorMoved { x: 300.0, y: 300.0 }, &mut state);
    assert!(approx(state.camera.yaw(), YAW + 1.0));
}

#[test]
fn left_drag_pans_the_camera() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    input.handle(button(MouseButton::Left, true), &mut state);
    input.handle(InputEvent::CursorMoved { x: 0.0, y: 0.0 }, &mut state);
    input.handle(InputEvent::CursorMoved { x: 10.0, y: 0.0 }, &mut state);

    assert!(input.is_panning());
    assert!(approx(state.camera.position.z, 2.9));
    assert!(approx(state.camera.yaw(), YAW));
}

#[test]
fn middle_button_releases_and_recaptures_the_cursor() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    input.handle(button(MouseButton::Right, true), &mut state);
    assert_eq!(
        input.handle(button(MouseButton::Middle, true), &mut state),
        Some(InputAction::SetCursorCaptured(false))
    );
    assert!(input.cursor_released());
    assert!(!input.is_looking());

    // drags are ignored while the cursor is free
    input.handle(button(MouseButton::Right, true), &mut state);
    assert!(!input.is_looking());
    assert_eq!(input.handle(button(MouseButton::Middle, false), &mut state), None);

    assert_eq!(
        input.handle(button(MouseButton::Middle, true), &mut state),
        Some(InputAction::SetCursorCaptured(true))
    );
    assert!(!input.cursor_released());
}

#[test]
fn scroll_changes_the_field_of_view() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    input.handle(InputEvent::Scroll { dy: 5.0 }, &mut state);
    assert_eq!(state.camera.fov_zoom(), 40.0);
}

#[test]
fn raw_motion_drives_the_camera_while_grabbed() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    let event = InputEvent::from_device_event(&winit::event::DeviceEvent::MouseMotion {
        delta: (10.0, -10.0),
    });
    // raw motion reports y downwards like the screen
    assert_eq!(event, Some(InputEvent::MouseDelta { dx: 10.0, dy: 10.0 }));

    // no drag, no effect
    input.handle(InputEvent::MouseDelta { dx: 10.0, dy: 10.0 }, &mut state);
    assert!(approx(state.camera.yaw(), YAW));

    input.handle(button(MouseButton::Right, true), &mut state);
    input.handle(InputEvent::MouseDelta { dx: 10.0, dy: 10.0 }, &mut state);
    assert!(approx(state.camera.yaw(), YAW + 1.0));
    assert!(approx(state.camera.pitch(), 1.0));

    // a pinned cursor still reports positions; they must not look a second time
    input.handle(InputEvent::CursorMoved { x: 0.0, y: 0.0 }, &mut state);
    input.handle(InputEvent::CursorMoved { x: 400.0, y: 0.0 }, &mut state);
    assert!(approx(state.camera.yaw(), YAW + 1.0));

    input.handle(button(MouseButton::Right, false), &mut state);
    input.handle(button(MouseButton::Left, true), &mut state);
    input.handle(InputEvent::MouseDelta { dx: 10.0, dy: 0.0 }, &mut state);
    assert!(approx(state.camera.position.z, 2.9));
    assert!(approx(state.camera.yaw(), YAW + 1.0));
}

#[test]
fn raw_motion_is_ignored_while_the_cursor_is_free() {
    let mut input = InputHandler::new();
    let mut state = ViewerState::default();

    input.handle(button(MouseButton::Middle, true), &mut state);
    input.handle(button(MouseButton::Right, true), &mut state);
    input.handle(InputEvent::MouseDelta { dx: 50.0, dy: 50.0 }, &mut state);
    assert!(approx(state.camera.yaw(), YAW));
    assert!(approx(state.camera.pitch(), 0.0));
}
