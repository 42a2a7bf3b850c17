//! Suite dispatch tables handed to plugins through `fetchSuite`.
//!
//! Every entry decodes its handles, runs one operation against the
//! thread-local registry and reports the outcome as a status code.

pub mod mesh_effect;
pub mod message;
pub mod parameter;
pub mod property;

use std::ffi::{CStr, c_char, c_int, c_void};
use std::ptr;

use crate::abi::{OfxPropertySetHandle, OfxStatus};
use crate::constants::{MESH_EFFECT_SUITE, MESSAGE_SUITE, PARAMETER_SUITE, PROPERTY_SUITE};
use crate::error::{Error, Result, Status};
use crate::model::registry::{Registry, with_registry};

pub use mesh_effect::MESH_EFFECT_SUITE_V1;
pub use message::MESSAGE_SUITE_V2;
pub use parameter::PARAMETER_SUITE_V1;
pub use property::PROPERTY_SUITE_V1;

/// Table for a suite name and version, if the host provides it.
pub fn suite(name: &str, version: c_int) -> Option<*const c_void> {
    let table: *const c_void = match (name, version) {
        (PROPERTY_SUITE, 1) => ptr::from_ref(&PROPERTY_SUITE_V1).cast(),
        (PARAMETER_SUITE, 1) => ptr::from_ref(&PARAMETER_SUITE_V1).cast(),
        (MESH_EFFECT_SUITE, 1) => ptr::from_ref(&MESH_EFFECT_SUITE_V1).cast(),
        (MESSAGE_SUITE, 2) => ptr::from_ref(&MESSAGE_SUITE_V2).cast(),
        _ => return None,
    };
    Some(table)
}

/// `OfxHost::fetchSuite`. Unknown names and versions yield null.
pub unsafe extern "C" fn fetch_suite(
    _host: OfxPropertySetHandle,
    name: *const c_char,
    version: c_int,
) -> *const c_void {
    let name = match unsafe { read_str(name) } {
        Ok(name) => name,
        Err(err) => {
            tracing::warn!("fetchSuite: {err}");
            return ptr::null();
        }
    };
    match suite(name, version) {
        Some(table) => {
            tracing::debug!("fetched suite {name} v{version}");
            table
        }
        None => {
            tracing::warn!("plugin requested unknown suite {name} v{version}");
            ptr::null()
        }
    }
}

/// Shared target of every suite entry the host does not implement.
pub unsafe extern "C" fn unimplemented() -> OfxStatus {
    tracing::warn!("plugin called a suite entry this host does not implement");
    Status::ErrMissingHostFeature.code()
}

/// Run one suite call against the registry and report its status.
pub(crate) fn dispatch(entry: &'static str, f: impl FnOnce(&mut Registry) -> Result<()>) -> OfxStatus {
    match with_registry(f) {
        Ok(()) => {
            tracing::trace!("{entry}");
            Status::Ok.code()
        }
        Err(err) => {
            let status = err.status();
            tracing::debug!("{entry} -> {status}: {err}");
            status.code()
        }
    }
}

/// Borrow a nul-terminated UTF-8 string from the plugin.
///
/// # Safety
///
/// `ptr` must be null or point at a nul-terminated string that outlives `'a`.
pub(crate) unsafe fn read_str<'a>(ptr: *const c_char) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(Error::InvalidValue("null string".to_string()));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| Error::InvalidString)
}

/// Like [`read_str`], null meaning absent.
pub(crate) unsafe fn read_opt_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>> {
    if ptr.is_null() {
        Ok(None)
    } else {
        unsafe { read_str(ptr) }.map(Some)
    }
}

/// Store an output argument.
///
/// # Safety
///
/// `dst` must be null or valid for a write of `T`.
pub(crate) unsafe fn write_out<T>(dst: *mut T, value: T) -> Result<()> {
    if dst.is_null() {
        return Err(Error::InvalidValue("null output argument".to_string()));
    }
    unsafe { dst.write(value) };
    Ok(())
}

/// Store an output argument the plugin may leave null.
pub(crate) unsafe fn write_opt<T>(dst: *mut T, value: T) {
    if !dst.is_null() {
        unsafe { dst.write(value) };
    }
}
