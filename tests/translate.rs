mod common;

use mfx_host::constants::*;
use mfx_host::model::mesh::{Attachment, AttributeBuffer, AttributeData, MeshData};
use mfx_host::model::parameter::{ParamType, ParamValue};

fn assert_point(actual: [f32; 3], expected: [f32; 3]) {
    for (a, e) in actual.into_iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "{actual:?} != {expected:?}");
    }
}

#[test]
fn test_translate_quad() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap();
    session
        .set_param(instance, "translation", ParamValue::doubles(&[0.1, 0.2, 0.3]))
        .unwrap();

    let cooked = session.cook(instance).unwrap();
    assert_eq!(cooked.positions.len(), 4);
    assert_point(cooked.positions[0], [-0.9, -0.8, 0.3]);
    assert_point(cooked.positions[2], [1.1, 1.2, 0.3]);
    assert_eq!(cooked.corner_points, vec![0, 1, 2, 3]);
    assert_eq!(cooked.face_sizes, vec![4]);
}

#[test]
fn test_translate_two_triangles() {
    let triangles = MeshData {
        corner_points: vec![0, 1, 2, 2, 0, 3],
        face_sizes: vec![3, 3],
        ..MeshData::quad()
    };
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &triangles)
        .unwrap();
    session
        .set_param(instance, "translation", ParamValue::doubles(&[0.1, 0.2, 0.3]))
        .unwrap();

    let cooked = session.cook(instance).unwrap();
    assert_eq!(cooked.positions.len(), 4);
    assert_point(cooked.positions[0], [-0.9, -0.8, 0.3]);
    assert_point(cooked.positions[3], [-0.9, 1.2, 0.3]);
    assert_eq!(cooked.corner_points, vec![0, 1, 2, 2, 0, 3]);
    assert_eq!(cooked.face_sizes, vec![3, 3]);
}

#[test]
fn test_default_translation_is_zero() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap();

    let cooked = session.cook(instance).unwrap();
    assert_eq!(cooked.positions, MeshData::quad().positions);
}

#[test]
fn test_recook_after_param_change() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap();

    for dz in [1.0, 2.0] {
        session
            .set_param(instance, "translation", ParamValue::doubles(&[0.0, 0.0, dz]))
            .unwrap();
        let cooked = session.cook(instance).unwrap();
        assert_point(cooked.positions[0], [-1.0, -1.0, dz as f32]);
    }
}

#[test]
fn test_declared_parameters_and_inputs() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();

    let params = session.param_infos(descriptor).unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name, "translation");
    assert_eq!(params[0].ty, ParamType::Double3D);
    assert_eq!(
        session.param_type(descriptor, "translation").unwrap(),
        ParamType::Double3D
    );

    let names: Vec<String> = session
        .input_infos(descriptor)
        .unwrap()
        .into_iter()
        .map(|input| input.name)
        .collect();
    assert_eq!(names, vec![MESH_MAIN_INPUT, MESH_MAIN_OUTPUT]);
}

#[test]
fn test_optional_request_is_zero_filled() {
    common::request_uv(false);
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let requested = &session.input_infos(descriptor).unwrap()[0].requested;
    assert_eq!(requested.len(), 1);
    assert_eq!(requested[0].name, "uv");
    assert!(!requested[0].mandatory);

    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap();
    assert!(session.cook(instance).is_ok());
}

#[test]
fn test_mandatory_request_must_be_supplied() {
    common::request_uv(true);
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();

    let err = session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap_err();
    assert!(err.to_string().contains("uv"), "{err}");

    let mut data = MeshData::quad();
    data.attributes.push(AttributeData {
        attachment: Attachment::Corner,
        name: "uv".to_string(),
        components: 2,
        semantic: Some(MESH_ATTRIB_SEMANTIC_TEXTURE_COORDINATE.to_string()),
        values: AttributeBuffer::Float(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]),
    });
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &data)
        .unwrap();
    let cooked = session.cook(instance).unwrap();
    assert_eq!(cooked.face_sizes, vec![4]);
}
