//! `OfxParameterSuite` v1.
//!
//! Parameters are not animated: the time-based accessors ignore the time and
//! every parameter reports zero keys.

use std::ffi::{c_char, c_uint, c_void};

use crate::abi::{
    OfxParamHandle, OfxParamSetHandle, OfxParameterSuiteV1, OfxPropertySetHandle, OfxStatus,
    OfxTime,
};
use crate::error::{Error, Result};
use crate::model::parameter::ParamValue;
use crate::model::registry::{Registry, from_handle, to_handle};
use crate::suite::{dispatch, read_str, unimplemented, write_opt, write_out};

pub static PARAMETER_SUITE_V1: OfxParameterSuiteV1 = OfxParameterSuiteV1 {
    param_define,
    param_get_handle,
    param_set_get_property_set,
    param_get_property_set,
    param_get_value,
    param_get_value_at_time,
    param_get_derivative: unimplemented,
    param_get_integral: unimplemented,
    param_set_value,
    param_set_value_at_time,
    param_get_num_keys,
    param_get_key_time: unimplemented,
    param_get_key_index: unimplemented,
    param_delete_key: unimplemented,
    param_delete_all_keys: unimplemented,
    param_copy: unimplemented,
    param_edit_begin: unimplemented,
    param_edit_end: unimplemented,
};

unsafe extern "C" fn param_define(
    set: OfxParamSetHandle,
    param_type: *const c_char,
    name: *const c_char,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("paramDefine", |registry| {
        let set = from_handle(set)?;
        registry.param_set(set)?;
        let (param_type, name) = unsafe { (read_str(param_type)?, read_str(name)?) };
        let key = registry.define_param(set, param_type, name)?;
        tracing::debug!("defined parameter '{name}' ({param_type})");
        unsafe { write_opt(props, to_handle(key)) };
        Ok(())
    })
}

unsafe extern "C" fn param_get_handle(
    set: OfxParamSetHandle,
    name: *const c_char,
    param: *mut OfxParamHandle,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("paramGetHandle", |registry| {
        let set = from_handle(set)?;
        registry.param_set(set)?;
        let name = unsafe { read_str(name) }?;
        let (param_key, props_key) = registry.param_handle(set, name)?;
        unsafe {
            write_out(param, to_handle(param_key))?;
            write_opt(props, to_handle(props_key));
        }
        Ok(())
    })
}

unsafe extern "C" fn param_set_get_property_set(
    set: OfxParamSetHandle,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("paramSetGetPropertySet", |registry| {
        let key = registry.param_set(from_handle(set)?)?.props;
        unsafe { write_out(props, to_handle(key)) }
    })
}

unsafe extern "C" fn param_get_property_set(
    param: OfxParamHandle,
    props: *mut OfxPropertySetHandle,
) -> OfxStatus {
    dispatch("paramGetPropertySet", |registry| {
        let key = registry.param(from_handle(param)?)?.props;
        unsafe { write_out(props, to_handle(key)) }
    })
}

/// Copy a parameter's components to `dst`.
unsafe fn get_value(registry: &mut Registry, param: OfxParamHandle, dst: *mut c_void) -> Result<()> {
    let param = registry.param(from_handle(param)?)?;
    if dst.is_null() {
        return Err(Error::InvalidValue("null value pointer".to_string()));
    }
    // SAFETY: the plugin passes storage for the declared type.
    unsafe { param.value.write_to(dst) };
    Ok(())
}

unsafe fn set_value(registry: &mut Registry, param: OfxParamHandle, src: *const c_void) -> Result<()> {
    let key = from_handle(param)?;
    let ty = registry.param(key)?.ty;
    if src.is_null() {
        return Err(Error::InvalidValue("null value pointer".to_string()));
    }
    // SAFETY: the plugin passes a value of the declared type.
    let value = unsafe { ParamValue::read_from(ty, src) }?;
    registry.set_param_value(key, value)
}

unsafe extern "C" fn param_get_value(param: OfxParamHandle, dst: *mut c_void) -> OfxStatus {
    dispatch("paramGetValue", |registry| unsafe { get_value(registry, param, dst) })
}

unsafe extern "C" fn param_get_value_at_time(
    param: OfxParamHandle,
    _time: OfxTime,
    dst: *mut c_void,
) -> OfxStatus {
    dispatch("paramGetValueAtTime", |registry| unsafe {
        get_value(registry, param, dst)
    })
}

unsafe extern "C" fn param_set_value(param: OfxParamHandle, src: *const c_void) -> OfxStatus {
    dispatch("paramSetValue", |registry| unsafe { set_value(registry, param, src) })
}

unsafe extern "C" fn param_set_value_at_time(
    param: OfxParamHandle,
    _time: OfxTime,
    src: *const c_void,
) -> OfxStatus {
    dispatch("paramSetValueAtTime", |registry| unsafe {
        set_value(registry, param, src)
    })
}

unsafe extern "C" fn param_get_num_keys(param: OfxParamHandle, keys: *mut c_uint) -> OfxStatus {
    dispatch("paramGetNumKeys", |registry| {
        registry.param(from_handle(param)?)?;
        unsafe { write_out(keys, 0) }
    })
}
