//! `OfxMessageSuite` v2. Messages go to the log.

use std::ffi::{c_char, c_void};

use crate::abi::{OfxMessageSuiteV2, OfxStatus};
use crate::constants::*;
use crate::error::Status;
use crate::suite::read_str;

pub static MESSAGE_SUITE_V2: OfxMessageSuiteV2 = OfxMessageSuiteV2 {
    message,
    set_persistent_message,
    clear_persistent_message,
};

/// Log a plugin message at the level matching its type. Questions get the
/// default reply since there is nobody to ask.
fn report(kind: &str, id: &str, text: &str) -> Status {
    match kind {
        MESSAGE_FATAL | MESSAGE_ERROR => tracing::error!(id, "{text}"),
        MESSAGE_WARNING => tracing::warn!(id, "{text}"),
        MESSAGE_LOG => tracing::debug!(id, "{text}"),
        _ => tracing::info!(id, "{text}"),
    }
    if kind == MESSAGE_QUESTION {
        Status::ReplyDefault
    } else {
        Status::Ok
    }
}

unsafe fn read_message<'a>(
    kind: *const c_char,
    id: *const c_char,
    format: *const c_char,
) -> Option<(&'a str, &'a str, &'a str)> {
    let kind = unsafe { read_str(kind) }.ok()?;
    let id = unsafe { read_str(id) }.unwrap_or_default();
    let text = unsafe { read_str(format) }.ok()?;
    Some((kind, id, text))
}

unsafe extern "C" fn message(
    _handle: *mut c_void,
    kind: *const c_char,
    id: *const c_char,
    format: *const c_char,
) -> OfxStatus {
    match unsafe { read_message(kind, id, format) } {
        Some((kind, id, text)) => report(kind, id, text).code(),
        None => Status::ErrValue.code(),
    }
}

unsafe extern "C" fn set_persistent_message(
    _handle: *mut c_void,
    kind: *const c_char,
    id: *const c_char,
    format: *const c_char,
) -> OfxStatus {
    match unsafe { read_message(kind, id, format) } {
        Some((kind, id, text)) => {
            report(kind, id, text);
            Status::Ok.code()
        }
        None => Status::ErrValue.code(),
    }
}

unsafe extern "C" fn clear_persistent_message(_handle: *mut c_void) -> OfxStatus {
    Status::Ok.code()
}
