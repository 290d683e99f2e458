use std::{path::Path, time::Duration};

use cgmath::{Matrix, Matrix4, SquareMatrix, Vector3, Vector4};
use instant::Instant;
use model_viewer::{
    camera::Projection,
    data_structures::{model::Model, scene_graph::TextureType},
    render::{FrameClock, normal_matrix, render_frame},
    resources::{ImportOptions, import_scene},
    shader,
    state::ViewerState,
};

use crate::common::test_utils::{
    Call, MemoryReader, RecordingGpu, RecordingTarget, flat_scene, material, png_bytes,
};

mod common;

fn close(a: Matrix4<f32>, b: Matrix4<f32>) -> bool {
    let a: &[f32; 16] = a.as_ref();
    let b: &[f32; 16] = b.as_ref();
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
}

fn projection() -> Projection {
    Projection::new(1200, 900, 0.1, 100.0)
}

fn textured_model(gpu: &mut RecordingGpu) -> Model<RecordingGpu> {
    let reader = MemoryReader::new()
        .with_file("m/a.png", png_bytes(1, 1, [255, 0, 0, 255]))
        .with_file("m/b.png", png_bytes(1, 1, [0, 255, 0, 255]))
        .with_file("m/s.png", png_bytes(1, 1, [0, 0, 255, 255]));
    let scene = flat_scene(vec![
        material(&[
            (TextureType::Diffuse, "a.png"),
            (TextureType::Diffuse, "b.png"),
            (TextureType::Specular, "s.png"),
        ]),
        material(&[(TextureType::Diffuse, "b.png")]),
    ]);
    import_scene(gpu, &reader, &scene, Path::new("m"), &ImportOptions::default()).unwrap()
}

#[test]
fn frame_pushes_every_uniform_before_drawing() {
    let mut gpu = RecordingGpu::new();
    let model = textured_model(&mut gpu);
    let mut state = ViewerState::default();
    let mut target = RecordingTarget::new();

    let transforms = render_frame(&mut target, &mut state, &model, &projection());

    assert_eq!(target.calls.first(), Some(&Call::UseProgram));
    assert_eq!(target.last_mat4(shader::MODEL), Some(transforms.model));
    assert_eq!(target.last_mat4(shader::VIEW), Some(state.camera.view_matrix()));
    assert_eq!(target.last_mat4(shader::PROJECTION), Some(transforms.projection));
    assert_eq!(target.last_mat4(shader::NORMAL_MATRIX), Some(transforms.normal));
    assert_eq!(target.last_vec3(shader::LIGHT_POS), Some(state.light.position));
    assert_eq!(target.last_vec3(shader::LIGHT_COLOUR), Some(Vector3::new(1.0, 1.0, 1.0)));
    assert_eq!(target.last_float(shader::LIGHT_STR), Some(0.2));
    assert_eq!(target.last_float(shader::LIGHT_N), Some(5.0));
    assert_eq!(target.last_vec3(shader::CAM_POS), Some(Vector3::new(0.0, 0.0, 3.0)));

    let first_draw = target
        .calls
        .iter()
        .position(|c| matches!(c, Call::Draw { .. }))
        .unwrap();
    let camera_push = target
        .calls
        .iter()
        .position(|c| matches!(c, Call::Vec3(name, _) if name == shader::CAM_POS))
        .unwrap();
    assert!(camera_push < first_draw);
}

#[test]
fn each_batch_is_drawn_once_with_numbered_samplers() {
    let mut gpu = RecordingGpu::new();
    let model = textured_model(&mut gpu);
    let mut target = RecordingTarget::new();

    render_frame(&mut target, &mut ViewerState::default(), &model, &projection());

    assert_eq!(target.draws(), vec![3, 3]);
    assert_eq!(
        target.ints(),
        vec![
            (shader::USE_TEXTURE, 3),
            ("texture_diffuse1", 0),
            ("texture_diffuse2", 1),
            ("texture_specular1", 2),
            (shader::USE_TEXTURE, 1),
            ("texture_diffuse1", 0),
        ]
    );
    assert_eq!(
        target.bound(),
        vec![(0, "a.png"), (1, "b.png"), (2, "s.png"), (0, "b.png")]
    );
    assert_eq!(target.last_vec3(shader::MATERIAL_DIFFUSE), Some(Vector3::new(1.0, 0.5, 0.25)));
}

#[test]
fn empty_model_draws_nothing() {
    let model: Model<RecordingGpu> = Model::empty();
    let mut target = RecordingTarget::new();

    render_frame(&mut target, &mut ViewerState::default(), &model, &projection());

    assert!(target.draws().is_empty());
    assert!(target.last_mat4(shader::MODEL).is_some());
}

#[test]
fn scale_follows_its_x_component() {
    let model: Model<RecordingGpu> = Model::empty();
    let mut state = ViewerState::default();
    state.transform.scale = Vector3::new(2.0, 5.0, 7.0);
    state.transform.displacement = Vector3::new(1.0, 0.0, 0.0);

    let transforms = render_frame(&mut RecordingTarget::new(), &mut state, &model, &projection());

    assert_eq!(state.transform.scale, Vector3::new(2.0, 2.0, 2.0));
    let corner = transforms.model * Vector4::new(1.0, 1.0, 1.0, 1.0);
    assert_eq!(corner, Vector4::new(3.0, 2.0, 2.0, 1.0));
}

#[test]
fn normal_matrix_is_inverse_transpose() {
    let model = Matrix4::from_translation(Vector3::new(3.0, -1.0, 2.0))
        * Matrix4::from_scale(2.0)
        * Matrix4::from_angle_y(cgmath::Deg(30.0));
    let normal = normal_matrix(&model);

    let expected = model.invert().unwrap().transpose();
    assert!(close(normal, expected));

    assert!(close(normal_matrix(&Matrix4::from_scale(0.5)), Matrix4::from_scale(2.0)));
}

#[test]
fn normal_matrix_of_a_singular_model_is_identity() {
    assert_eq!(normal_matrix(&Matrix4::from_scale(0.0)), Matrix4::identity());
}

#[test]
fn frame_clock_reports_delta_and_fps() {
    let start = Instant::now();
    let mut clock = FrameClock::starting_at(start);

    assert_eq!(clock.tick_at(start + Duration::from_millis(500)), 0.0);
    assert!((clock.elapsed() - 0.5).abs() < 1e-6);
    assert_eq!(clock.fps(), 0.0);

    let dt = clock.tick_at(start + Duration::from_millis(1000));
    assert!((dt - 0.5).abs() < 1e-6);
    assert!((clock.fps() - 2.0).abs() < 1e-6);
    assert!((clock.elapsed() - 1.0).abs() < 1e-6);
}
