//! C ABI of the OpenMfx protocol.
//!
//! These types mirror the C headers plugins are compiled against. Every
//! struct here is `#[repr(C)]`; handles are opaque pointers whose value is an
//! encoded registry key (see [`crate::model::registry`]).
//!
//! Parameter value accessors take a single pointer to contiguous components
//! rather than C varargs, which stable Rust cannot define.

use std::ffi::{CStr, c_char, c_double, c_int, c_uint, c_void};

/// Raw status code as it crosses the boundary. See [`crate::Status`].
pub type OfxStatus = c_int;

/// Time samples are plain seconds.
pub type OfxTime = c_double;

macro_rules! opaque_handles {
    ($($(#[$meta:meta])* $strukt:ident => $handle:ident;)*) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            pub struct $strukt {
                _private: [u8; 0],
            }

            pub type $handle = *mut $strukt;
        )*
    };
}

opaque_handles! {
    /// Property set (hosts, effects, inputs, meshes, attributes, parameters).
    OfxPropertySetStruct => OfxPropertySetHandle;
    OfxParamSetStruct => OfxParamSetHandle;
    OfxParamStruct => OfxParamHandle;
    /// Descriptor or instance.
    OfxMeshEffectStruct => OfxMeshEffectHandle;
    OfxMeshInputStruct => OfxMeshInputHandle;
    /// Mesh lease handed out by `inputGetMesh`.
    OfxMeshStruct => OfxMeshHandle;
}

/// Host record passed to `setHost`.
#[repr(C)]
pub struct OfxHost {
    pub host: OfxPropertySetHandle,
    pub fetch_suite: unsafe extern "C" fn(
        host: OfxPropertySetHandle,
        suite_name: *const c_char,
        suite_version: c_int,
    ) -> *const c_void,
}

pub type SetHostFn = unsafe extern "C" fn(host: *mut OfxHost);

pub type MainEntryFn = unsafe extern "C" fn(
    action: *const c_char,
    handle: *const c_void,
    in_args: OfxPropertySetHandle,
    out_args: OfxPropertySetHandle,
) -> OfxStatus;

/// Plugin record returned by `OfxGetPlugin`.
#[repr(C)]
pub struct OfxPlugin {
    pub plugin_api: *const c_char,
    pub api_version: c_int,
    pub plugin_identifier: *const c_char,
    pub plugin_version_major: c_uint,
    pub plugin_version_minor: c_uint,
    pub set_host: Option<SetHostFn>,
    pub main_entry: Option<MainEntryFn>,
}

// SAFETY: the record only holds pointers to static strings and functions of
// the library that produced it.
unsafe impl Send for OfxPlugin {}
unsafe impl Sync for OfxPlugin {}

pub type GetNumberOfPluginsFn = unsafe extern "C" fn() -> c_int;
pub type GetPluginFn = unsafe extern "C" fn(nth: c_int) -> *const OfxPlugin;

pub const GET_NUMBER_OF_PLUGINS_SYMBOL: &CStr = c"OfxGetNumberOfPlugins";
pub const GET_PLUGIN_SYMBOL: &CStr = c"OfxGetPlugin";

/// Type of every suite entry the host does not implement. Callers pass
/// arguments the stub never reads.
pub type OfxUnimplementedFn = unsafe extern "C" fn() -> OfxStatus;

#[repr(C)]
pub struct OfxPropertySuiteV1 {
    pub prop_set_pointer: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *mut c_void,
    ) -> OfxStatus,
    pub prop_set_string: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *const c_char,
    ) -> OfxStatus,
    pub prop_set_double:
        unsafe extern "C" fn(OfxPropertySetHandle, *const c_char, c_int, c_double) -> OfxStatus,
    pub prop_set_int:
        unsafe extern "C" fn(OfxPropertySetHandle, *const c_char, c_int, c_int) -> OfxStatus,
    pub prop_set_pointer_n: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *const *mut c_void,
    ) -> OfxStatus,
    pub prop_set_string_n: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *const *const c_char,
    ) -> OfxStatus,
    pub prop_set_double_n: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *const c_double,
    ) -> OfxStatus,
    pub prop_set_int_n:
        unsafe extern "C" fn(OfxPropertySetHandle, *const c_char, c_int, *const c_int) -> OfxStatus,
    pub prop_get_pointer: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *mut *mut c_void,
    ) -> OfxStatus,
    pub prop_get_string: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *mut *const c_char,
    ) -> OfxStatus,
    pub prop_get_double: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *mut c_double,
    ) -> OfxStatus,
    pub prop_get_int:
        unsafe extern "C" fn(OfxPropertySetHandle, *const c_char, c_int, *mut c_int) -> OfxStatus,
    pub prop_get_pointer_n: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *mut *mut c_void,
    ) -> OfxStatus,
    pub prop_get_string_n: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *mut *const c_char,
    ) -> OfxStatus,
    pub prop_get_double_n: unsafe extern "C" fn(
        OfxPropertySetHandle,
        *const c_char,
        c_int,
        *mut c_double,
    ) -> OfxStatus,
    pub prop_get_int_n:
        unsafe extern "C" fn(OfxPropertySetHandle, *const c_char, c_int, *mut c_int) -> OfxStatus,
    pub prop_reset: unsafe extern "C" fn(OfxPropertySetHandle, *const c_char) -> OfxStatus,
    pub prop_get_dimension:
        unsafe extern "C" fn(OfxPropertySetHandle, *const c_char, *mut c_int) -> OfxStatus,
}

#[repr(C)]
pub struct OfxParameterSuiteV1 {
    pub param_define: unsafe extern "C" fn(
        OfxParamSetHandle,
        *const c_char,
        *const c_char,
        *mut OfxPropertySetHandle,
    ) -> OfxStatus,
    pub param_get_handle: unsafe extern "C" fn(
        OfxParamSetHandle,
        *const c_char,
        *mut OfxParamHandle,
        *mut OfxPropertySetHandle,
    ) -> OfxStatus,
    pub param_set_get_property_set:
        unsafe extern "C" fn(OfxParamSetHandle, *mut OfxPropertySetHandle) -> OfxStatus,
    pub param_get_property_set:
        unsafe extern "C" fn(OfxParamHandle, *mut OfxPropertySetHandle) -> OfxStatus,
    pub param_get_value: unsafe extern "C" fn(OfxParamHandle, *mut c_void) -> OfxStatus,
    pub param_get_value_at_time:
        unsafe extern "C" fn(OfxParamHandle, OfxTime, *mut c_void) -> OfxStatus,
    pub param_get_derivative: OfxUnimplementedFn,
    pub param_get_integral: OfxUnimplementedFn,
    pub param_set_value: unsafe extern "C" fn(OfxParamHandle, *const c_void) -> OfxStatus,
    pub param_set_value_at_time:
        unsafe extern "C" fn(OfxParamHandle, OfxTime, *const c_void) -> OfxStatus,
    pub param_get_num_keys: unsafe extern "C" fn(OfxParamHandle, *mut c_uint) -> OfxStatus,
    pub param_get_key_time: OfxUnimplementedFn,
    pub param_get_key_index: OfxUnimplementedFn,
    pub param_delete_key: OfxUnimplementedFn,
    pub param_delete_all_keys: OfxUnimplementedFn,
    pub param_copy: OfxUnimplementedFn,
    pub param_edit_begin: OfxUnimplementedFn,
    pub param_edit_end: OfxUnimplementedFn,
}

#[repr(C)]
pub struct OfxMeshEffectSuiteV1 {
    pub get_property_set:
        unsafe extern "C" fn(OfxMeshEffectHandle, *mut OfxPropertySetHandle) -> OfxStatus,
    pub get_param_set:
        unsafe extern "C" fn(OfxMeshEffectHandle, *mut OfxParamSetHandle) -> OfxStatus,
    pub input_define: unsafe extern "C" fn(
        OfxMeshEffectHandle,
        *const c_char,
        *mut OfxMeshInputHandle,
        *mut OfxPropertySetHandle,
    ) -> OfxStatus,
    pub input_get_handle: unsafe extern "C" fn(
        OfxMeshEffectHandle,
        *const c_char,
        *mut OfxMeshInputHandle,
        *mut OfxPropertySetHandle,
    ) -> OfxStatus,
    pub input_get_property_set:
        unsafe extern "C" fn(OfxMeshInputHandle, *mut OfxPropertySetHandle) -> OfxStatus,
    pub input_request_attribute: unsafe extern "C" fn(
        OfxMeshInputHandle,
        *const c_char,
        *const c_char,
        c_int,
        *const c_char,
        *const c_char,
        c_int,
    ) -> OfxStatus,
    pub input_get_mesh: unsafe extern "C" fn(
        OfxMeshInputHandle,
        OfxTime,
        *mut OfxMeshHandle,
        *mut OfxPropertySetHandle,
    ) -> OfxStatus,
    pub input_release_mesh: unsafe extern "C" fn(OfxMeshHandle) -> OfxStatus,
    pub attribute_define: unsafe extern "C" fn(
        OfxMeshHandle,
        *const c_char,
        *const c_char,
        c_int,
        *const c_char,
        *const c_char,
        *mut OfxPropertySetHandle,
    ) -> OfxStatus,
    pub mesh_get_attribute_by_index:
        unsafe extern "C" fn(OfxMeshHandle, c_int, *mut OfxPropertySetHandle) -> OfxStatus,
    pub mesh_get_attribute: unsafe extern "C" fn(
        OfxMeshHandle,
        *const c_char,
        *const c_char,
        *mut OfxPropertySetHandle,
    ) -> OfxStatus,
    pub mesh_get_property_set:
        unsafe extern "C" fn(OfxMeshHandle, *mut OfxPropertySetHandle) -> OfxStatus,
    pub mesh_alloc: unsafe extern "C" fn(OfxMeshHandle) -> OfxStatus,
    pub abort: unsafe extern "C" fn(OfxMeshEffectHandle) -> c_int,
}

/// Message suite, version 2. The trailing printf arguments of `message` and
/// `setPersistentMessage` are not read; the format string is reported as is.
#[repr(C)]
pub struct OfxMessageSuiteV2 {
    pub message: unsafe extern "C" fn(
        *mut c_void,
        *const c_char,
        *const c_char,
        *const c_char,
    ) -> OfxStatus,
    pub set_persistent_message: unsafe extern "C" fn(
        *mut c_void,
        *const c_char,
        *const c_char,
        *const c_char,
    ) -> OfxStatus,
    pub clear_persistent_message: unsafe extern "C" fn(*mut c_void) -> OfxStatus,
}
