use std::collections::HashMap;

use cgmath::{Matrix4, Vector3};
use model_viewer::{
    pipelines::{
        basic::{MODEL_SHADER, validate_wgsl},
        recorder::{ShaderUniforms, UniformState, texture_slot},
    },
    shader::{self, Shader},
};

#[test]
fn uniform_block_matches_the_wgsl_layout() {
    let module = validate_wgsl("model", MODEL_SHADER).unwrap();
    let span = module
        .types
        .iter()
        .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
            (Some(name), naga::TypeInner::Struct { span, .. }) if name == "Uniforms" => Some(*span),
            _ => None,
        })
        .expect("shader declares a Uniforms struct");

    assert_eq!(span as usize, std::mem::size_of::<ShaderUniforms>());
}

#[test]
fn names_map_onto_their_fields() {
    let mut uniforms = ShaderUniforms::default();
    let translation = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));

    assert!(uniforms.set_mat4(shader::MODEL, &translation));
    assert!(uniforms.set_mat4(shader::NORMAL_MATRIX, &Matrix4::from_scale(2.0)));
    assert!(uniforms.set_vec3(shader::CAM_POS, Vector3::new(0.0, 0.0, 3.0)));
    assert!(uniforms.set_vec3(shader::MATERIAL_SPECULAR, Vector3::new(0.5, 0.5, 0.5)));
    assert!(uniforms.set_float(shader::LIGHT_STR, 0.8));
    assert!(uniforms.set_float(shader::LIGHT_N, 32.0));

    assert_eq!(uniforms.model, Into::<[[f32; 4]; 4]>::into(translation));
    assert_eq!(uniforms.normal_matrix[0][0], 2.0);
    assert_eq!(uniforms.cam_pos, [0.0, 0.0, 3.0]);
    assert_eq!(uniforms.specular, [0.5, 0.5, 0.5]);
    assert_eq!(uniforms.light_str, 0.8);
    assert_eq!(uniforms.n, 32.0);
    // untouched fields keep their defaults
    assert_eq!(uniforms.view, Into::<[[f32; 4]; 4]>::into(Matrix4::from_scale(1.0)));
    assert_eq!(uniforms.diffuse, [1.0; 3]);
}

#[test]
fn unknown_names_are_dropped() {
    let mut uniforms = ShaderUniforms::default();
    let before = uniforms;

    assert!(!uniforms.set_mat4("lightSpaceMatrix", &Matrix4::from_scale(3.0)));
    // names are case sensitive
    assert!(!uniforms.set_vec3("udiffuse", Vector3::new(0.0, 0.0, 0.0)));
    assert!(!uniforms.set_float(shader::CAM_POS, 1.0));
    assert_eq!(uniforms, before);

    let mut state = UniformState::default();
    state.set_int("shadowMap", 7);
    assert_eq!(state.uniforms, before);
    assert!((0..4).all(|slot| state.slot_unit(slot).is_none()));
}

#[test]
fn only_the_first_texture_of_a_role_has_a_slot() {
    assert_eq!(texture_slot("texture_diffuse1"), Some(0));
    assert_eq!(texture_slot("texture_specular1"), Some(1));
    assert_eq!(texture_slot("texture_normal1"), Some(2));
    assert_eq!(texture_slot("texture_height1"), Some(3));
    assert_eq!(texture_slot("texture_diffuse2"), None);
    assert_eq!(texture_slot("texture_diffuse"), None);
    assert_eq!(texture_slot("useTexture"), None);
}

#[test]
fn each_batch_announces_its_own_units() {
    let mut state = UniformState::default();

    state.set_int(shader::USE_TEXTURE, 2);
    state.set_int("texture_diffuse1", 0);
    state.set_int("texture_normal1", 1);
    assert_eq!(state.uniforms.use_texture, 2);
    assert_eq!(state.slot_unit(0), Some(0));
    assert_eq!(state.slot_unit(2), Some(1));

    // the next batch only has a diffuse map
    state.set_int(shader::USE_TEXTURE, 1);
    state.set_int("texture_diffuse1", 0);
    assert_eq!(state.slot_unit(0), Some(0));
    assert_eq!(state.slot_unit(2), None);

    state.set_int("texture_specular1", -1);
    assert_eq!(state.slot_unit(1), None);
}

#[test]
fn unannounced_or_unbound_slots_sample_the_placeholder() {
    let placeholders = ["white", "black", "flat", "zero"].map(String::from);
    let bound = HashMap::from([(0, "brick".to_string()), (1, "brick_n".to_string())]);

    let mut state = UniformState::default();
    state.set_int(shader::USE_TEXTURE, 3);
    state.set_int("texture_diffuse1", 0);
    state.set_int("texture_normal1", 1);
    // announced, but nothing was bound to unit 5
    state.set_int("texture_height1", 5);

    let resolved = state.resolve_slots(&bound, &placeholders);
    assert_eq!(resolved.map(String::as_str), ["brick", "black", "brick_n", "zero"]);
}
