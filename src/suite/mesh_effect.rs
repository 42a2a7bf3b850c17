//! `OfxMeshEffectSuite` v1.

use std::ffi::{c_char, c_int};

use crate::abi::{
    OfxMeshEffectHandle, OfxMeshEffectSuiteV1, OfxMeshHandle, OfxMeshInputHandle,
    OfxParamSetHandle, OfxPropertySetHandle, OfxStatus, OfxTime,
};
use crate::error::Error;
use crate::model::effect::RequestedAttribute;
use crate::model::mesh::{Attachment, AttributeType};
use crate::model::registry::{from_handle, to_handle};
use crate::suite::{dispatch, read_opt_str, read_str, write_opt, write_out};

pub static MESH_EFFECT_SUITE_V1: OfxMeshEffectSuiteV1 = OfxMeshEffectSuiteV1 {
    get_property_set,
    get_param_set,
    input_define,
    input_get_handle,
    input_get_property_set,
    input_request_attribute,
    input_get_mesh,
    input_release_mesh,
    attribute_define,
    mesh_get_attribute_by_index,
    mesh_get_attribute,
    mesh_get_property_set,
    mesh_alloc,
    abort,
};

unsafe extern "C" fn get_property_set(
    effect: OfxMeshEffectHandle,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("getPropertySet", |registry| {
        let key = registry.effect(from_handle(effect)?)?.props;
        unsafe { write_out(props, to_handle(key)) }
    })
}

unsafe extern "C" fn get_param_set(
    effect: OfxMeshEffectHandle,
    params: *mut OfxParamSetHandle,
) -> OfxStatus {
    dispatch("getParamSet", |registry| {
        let key = registry.effect(from_handle(effect)?)?.param_set;
        unsafe { write_out(params, to_handle(key)) }
    })
}

unsafe extern "C" fn input_define(
    effect: OfxMeshEffectHandle,
    name: *const c_char,
    input: *mut OfxMeshInputHandle,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("inputDefine", |registry| {
        let effect = from_handle(effect)?;
        registry.effect(effect)?;
        let name = unsafe { read_str(name) }?;
        let (input_key, props_key) = registry.define_input(effect, name)?;
        tracing::debug!("defined input '{name}'");
        unsafe {
            write_opt(input, to_handle(input_key));
            write_opt(props, to_handle(props_key));
        }
        Ok(())
    })
}

unsafe extern "C" fn input_get_handle(
    effect: OfxMeshEffectHandle,
    name: *const c_char,
    input: *mut OfxMeshInputHandle,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("inputGetHandle", |registry| {
        let effect = from_handle(effect)?;
        registry.effect(effect)?;
        let name = unsafe { read_str(name) }?;
        let (input_key, props_key) = registry.input_handle(effect, name)?;
        unsafe {
            write_out(input, to_handle(input_key))?;
            write_opt(props, to_handle(props_key));
        }
        Ok(())
    })
}

unsafe extern "C" fn input_get_property_set(
    input: OfxMeshInputHandle,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("inputGetPropertySet", |registry| {
        let key = registry.input(from_handle(input)?)?.props;
        unsafe { write_out(props, to_handle(key)) }
    })
}

unsafe extern "C" fn input_request_attribute(
    input: OfxMeshInputHandle,
    attachment: *const c_char,
    name: *const c_char,
    components: c_int,
    type_tag: *const c_char,
    semantic: *const c_char,
    mandatory: c_int,
) -> OfxStatus {
    dispatch("inputRequestAttribute", |registry| {
        let input = from_handle(input)?;
        registry.input(input)?;
        let (attachment, name, type_tag, semantic) = unsafe {
            (
                read_str(attachment)?,
                read_str(name)?,
                read_str(type_tag)?,
                read_opt_str(semantic)?,
            )
        };
        Attachment::from_name(attachment)?;
        AttributeType::from_tag(type_tag)?;
        if !(1..=4).contains(&components) {
            return Err(Error::InvalidValue(format!(
                "attribute '{name}' needs 1 to 4 components, got {components}"
            )));
        }
        registry.request_attribute(
            input,
            RequestedAttribute {
                attachment: attachment.to_string(),
                name: name.to_string(),
                components,
                type_tag: type_tag.to_string(),
                semantic: semantic.map(str::to_string),
                mandatory: mandatory != 0,
            },
        )
    })
}

unsafe extern "C" fn input_get_mesh(
    input: OfxMeshInputHandle,
    _time: OfxTime,
    mesh: *mut OfxMeshHandle,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("inputGetMesh", |registry| {
        if mesh.is_null() {
            return Err(Error::InvalidValue("null output argument".to_string()));
        }
        let target = registry.input(from_handle(input)?)?.mesh;
        let mesh_props = registry.mesh(target)?.props;
        let lease = registry.lease_mesh(target)?;
        unsafe {
            write_out(mesh, to_handle(lease))?;
            write_opt(props, to_handle(mesh_props));
        }
        Ok(())
    })
}

unsafe extern "C" fn input_release_mesh(mesh: OfxMeshHandle) -> OfxStatus {
    dispatch("inputReleaseMesh", |registry| {
        registry.release_lease(from_handle(mesh)?)
    })
}

unsafe extern "C" fn attribute_define(
    mesh: OfxMeshHandle,
    attachment: *const c_char,
    name: *const c_char,
    components: c_int,
    type_tag: *const c_char,
    semantic: *const c_char,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("attributeDefine", |registry| {
        let mesh = registry.mesh_target(from_handle(mesh)?)?;
        let (attachment, name, type_tag, semantic) = unsafe {
            (
                read_str(attachment)?,
                read_str(name)?,
                read_str(type_tag)?,
                read_opt_str(semantic)?,
            )
        };
        let key = registry.define_attribute(mesh, attachment, name, components, type_tag, semantic)?;
        unsafe { write_opt(props, to_handle(key)) };
        Ok(())
    })
}

unsafe extern "C" fn mesh_get_attribute_by_index(
    mesh: OfxMeshHandle,
    index: c_int,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("meshGetAttributeByIndex", |registry| {
        let mesh = registry.mesh_target(from_handle(mesh)?)?;
        let key = registry.attribute_by_index(mesh, i64::from(index))?;
        unsafe { write_out(props, to_handle(key)) }
    })
}

unsafe extern "C" fn mesh_get_attribute(
    mesh: OfxMeshHandle,
    attachment: *const c_char,
    name: *const c_char,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("meshGetAttribute", |registry| {
        let mesh = registry.mesh_target(from_handle(mesh)?)?;
        let (attachment, name) = unsafe { (read_str(attachment)?, read_str(name)?) };
        let key = registry.mesh_attribute(mesh, attachment, name)?;
        unsafe { write_out(props, to_handle(key)) }
    })
}

unsafe extern "C" fn mesh_get_property_set(
    mesh: OfxMeshHandle,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("meshGetPropertySet", |registry| {
        let mesh = registry.mesh_target(from_handle(mesh)?)?;
        let key = registry.mesh(mesh)?.props;
        unsafe { write_out(props, to_handle(key)) }
    })
}

unsafe extern "C" fn mesh_alloc(mesh: OfxMeshHandle) -> OfxStatus {
    dispatch("meshAlloc", |registry| {
        let mesh = registry.mesh_target(from_handle(mesh)?)?;
        registry.allocate_mesh(mesh)
    })
}

/// The host never asks a cook to stop.
unsafe extern "C" fn abort(_effect: OfxMeshEffectHandle) -> c_int {
    0
}
