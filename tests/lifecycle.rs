mod common;

use std::ffi::c_void;

use mfx_host::Status;
use mfx_host::action::Action;
use mfx_host::constants::*;
use mfx_host::host::{EffectSession, HostError};
use mfx_host::model::config::HostSection;
use mfx_host::model::mesh::MeshData;
use mfx_host::model::parameter::ParamValue;
use mfx_host::model::registry::with_registry;
use mfx_host::model::stage::SessionStage;
use mfx_host::plugin::Plugin;
use mfx_host::suite;

#[test]
fn test_actions_in_order() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap();
    session.cook(instance).unwrap();
    session.destroy_instance(instance).unwrap();
    drop(session);

    assert_eq!(
        common::actions(),
        vec!["load", "describe", "create_instance", "cook", "destroy_instance", "unload"]
    );
}

#[test]
fn test_cook_before_create_instance_fails() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let err = session.cook(descriptor).unwrap_err();
    assert!(matches!(err, HostError::WrongStage { action: Action::Cook, .. }));
    assert!(!common::actions().contains(&"cook"));
}

#[test]
fn test_instances_are_independent() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let a = session.create_instance(descriptor).unwrap();
    let b = session.create_instance(descriptor).unwrap();
    assert_ne!(a, b);

    for instance in [a, b] {
        session
            .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
            .unwrap();
    }
    session
        .set_param(a, "translation", ParamValue::doubles(&[5.0, 0.0, 0.0]))
        .unwrap();

    let cooked_a = session.cook(a).unwrap();
    let cooked_b = session.cook(b).unwrap();
    assert_eq!(cooked_a.positions[0], [4.0, -1.0, 0.0]);
    assert_eq!(cooked_b.positions[0], [-1.0, -1.0, 0.0]);

    let descriptor_params = session.param_infos(descriptor).unwrap();
    assert_eq!(descriptor_params[0].value, ParamValue::doubles(&[0.0, 0.0, 0.0]));

    session.destroy_instance(a).unwrap();
    assert!(session.cook(b).is_ok());
}

#[test]
fn test_definitions_after_describe_are_refused() {
    common::define_on_cook();
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap();
    session.cook(instance).unwrap();

    let unsupported = Status::ErrUnsupported.code();
    assert_eq!(common::late_define_statuses(), Some([unsupported, unsupported]));
    for effect in [descriptor, instance] {
        let inputs: Vec<String> = session
            .input_infos(effect)
            .unwrap()
            .into_iter()
            .map(|info| info.name)
            .collect();
        assert_eq!(inputs, [MESH_MAIN_INPUT, MESH_MAIN_OUTPUT]);
        assert_eq!(session.param_infos(effect).unwrap().len(), 1);
    }

    // Later instances come from the untouched template.
    let next = session.create_instance(descriptor).unwrap();
    assert_eq!(session.input_infos(next).unwrap().len(), 2);
}

#[test]
fn test_descriptor_values_are_read_only() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let err = session
        .set_param(descriptor, "translation", ParamValue::doubles(&[1.0, 0.0, 0.0]))
        .unwrap_err();
    assert!(matches!(err, HostError::WrongStage { .. }));
    assert_eq!(
        session.param_infos(descriptor).unwrap()[0].value,
        ParamValue::doubles(&[0.0, 0.0, 0.0])
    );
}

#[test]
fn test_failed_describe() {
    common::set_describe_status(Status::Failed.code());
    let mut session = common::loaded_session();
    let err = session.describe().unwrap_err();
    assert_eq!(err.status(), Some(Status::Failed));
    assert_eq!(session.stage(), SessionStage::Loaded);

    common::set_describe_status(Status::Ok.code());
    assert!(session.describe().is_ok());
}

#[test]
fn test_failed_cook_keeps_instance() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap();

    common::set_cook_status(Status::Failed.code());
    let err = session.cook(instance).unwrap_err();
    assert_eq!(err.status(), Some(Status::Failed));

    common::set_cook_status(Status::Ok.code());
    assert_eq!(session.cook(instance).unwrap().positions.len(), 4);
}

#[test]
fn test_fatal_status_poisons_session() {
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap();

    common::set_cook_status(Status::ErrFatal.code());
    let err = session.cook(instance).unwrap_err();
    assert_eq!(err.status(), Some(Status::ErrFatal));
    assert_eq!(session.stage(), SessionStage::Poisoned);

    common::set_cook_status(Status::Ok.code());
    assert!(matches!(session.cook(instance), Err(HostError::Poisoned)));
    assert!(matches!(session.describe(), Err(HostError::Poisoned)));

    // A poisoned plugin is never sent another action, not even Unload.
    drop(session);
    assert!(!common::actions().contains(&"unload"));
}

#[test]
fn test_double_load_is_refused() {
    let mut session = common::loaded_session();
    assert!(matches!(session.load(), Err(HostError::WrongStage { .. })));
}

#[test]
fn test_describe_requires_load() {
    let plugin = Plugin::from_record(&common::TRANSLATE).unwrap();
    let mut session = EffectSession::new(plugin, &HostSection::default()).unwrap();
    assert!(matches!(session.describe(), Err(HostError::WrongStage { .. })));
    session.load().unwrap();
    session.unload().unwrap();
    assert_eq!(session.stage(), SessionStage::Unloaded);
}

#[test]
fn test_unknown_suite_is_null() {
    assert!(suite::suite("OfxImageEffectSuite", 1).is_none());
    assert!(suite::suite(PROPERTY_SUITE, 2).is_none());
    let table: *const c_void =
        unsafe { suite::fetch_suite(std::ptr::null_mut(), c"OfxDrawSuite".as_ptr(), 1) };
    assert!(table.is_null());
}

#[test]
fn test_session_frees_everything() {
    let before = with_registry(|registry| registry.len());
    let mut session = common::loaded_session();
    let descriptor = session.describe().unwrap();
    let instance = session.create_instance(descriptor).unwrap();
    session
        .set_input_mesh(instance, MESH_MAIN_INPUT, &MeshData::quad())
        .unwrap();
    session.cook(instance).unwrap();
    drop(session);
    assert_eq!(with_registry(|registry| registry.len()), before);
}
