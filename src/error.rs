//! Status codes and the store-level error type.

use std::ffi::c_int;
use std::fmt;

use thiserror::Error;

/// Result type alias using the store-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Status codes exchanged with plugins (`kOfxStat*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    Ok = 0,
    Failed = 1,
    ErrFatal = 2,
    ErrUnknown = 3,
    ErrMissingHostFeature = 4,
    ErrUnsupported = 5,
    ErrExists = 6,
    ErrFormat = 7,
    ErrMemory = 8,
    ErrBadHandle = 9,
    ErrBadIndex = 10,
    ErrValue = 11,
    ReplyYes = 12,
    ReplyNo = 13,
    ReplyDefault = 14,
}

impl Status {
    const ALL: [Status; 15] = [
        Status::Ok,
        Status::Failed,
        Status::ErrFatal,
        Status::ErrUnknown,
        Status::ErrMissingHostFeature,
        Status::ErrUnsupported,
        Status::ErrExists,
        Status::ErrFormat,
        Status::ErrMemory,
        Status::ErrBadHandle,
        Status::ErrBadIndex,
        Status::ErrValue,
        Status::ReplyYes,
        Status::ReplyNo,
        Status::ReplyDefault,
    ];

    /// Decode a raw status returned by a plugin.
    pub fn from_code(code: c_int) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn code(self) -> c_int {
        self as c_int
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }

    /// Fatal statuses require tearing the plugin down.
    pub fn is_fatal(self) -> bool {
        matches!(self, Status::ErrFatal | Status::ErrMemory)
    }

    pub fn name(self) -> &'static str {
        match self {
            Status::Ok => "kOfxStatOK",
            Status::Failed => "kOfxStatFailed",
            Status::ErrFatal => "kOfxStatErrFatal",
            Status::ErrUnknown => "kOfxStatErrUnknown",
            Status::ErrMissingHostFeature => "kOfxStatErrMissingHostFeature",
            Status::ErrUnsupported => "kOfxStatErrUnsupported",
            Status::ErrExists => "kOfxStatErrExists",
            Status::ErrFormat => "kOfxStatErrFormat",
            Status::ErrMemory => "kOfxStatErrMemory",
            Status::ErrBadHandle => "kOfxStatErrBadHandle",
            Status::ErrBadIndex => "kOfxStatErrBadIndex",
            Status::ErrValue => "kOfxStatErrValue",
            Status::ReplyYes => "kOfxStatReplyYes",
            Status::ReplyNo => "kOfxStatReplyNo",
            Status::ReplyDefault => "kOfxStatReplyDefault",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by the handle registry and the property, parameter and mesh
/// stores. Each maps onto the status reported back to the plugin.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("null handle")]
    NullHandle,

    /// Never issued, or already released.
    #[error("invalid handle")]
    InvalidHandle,

    #[error("handle refers to a {found}, expected a {expected}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("component index {0} out of range")]
    BadIndex(i64),

    #[error("property '{key}' holds {found} values, accessed as {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("{kind} '{name}' already exists")]
    Exists { kind: &'static str, name: String },

    #[error("unknown {kind} '{name}'")]
    Unknown { kind: &'static str, name: String },

    /// Lookups the reference host reports as a bad index (inputs, attributes).
    #[error("no {kind} named '{name}'")]
    NotFound { kind: &'static str, name: String },

    #[error("unsupported {what}: '{value}'")]
    Unsupported { what: &'static str, value: String },

    #[error("attribute '{0}' is already allocated")]
    AlreadyAllocated(String),

    #[error("attribute '{0}' has no data")]
    Unallocated(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("string argument is not valid UTF-8")]
    InvalidString,

    /// Definitions on an effect that has left the describe action.
    #[error("cannot define {0} after describe")]
    Frozen(&'static str),

    #[error("cannot allocate {0} elements")]
    OutOfMemory(usize),
}

impl Error {
    /// Status reported to the plugin for this failure.
    pub fn status(&self) -> Status {
        match self {
            Error::NullHandle | Error::InvalidHandle | Error::WrongKind { .. } => {
                Status::ErrBadHandle
            }
            Error::BadIndex(_) | Error::NotFound { .. } => Status::ErrBadIndex,
            Error::TypeMismatch { .. } | Error::InvalidValue(_) | Error::InvalidString => {
                Status::ErrValue
            }
            Error::UnknownProperty(_) | Error::Unknown { .. } => Status::ErrUnknown,
            Error::Exists { .. } | Error::AlreadyAllocated(_) => Status::ErrExists,
            Error::Unsupported { .. } | Error::Frozen(_) => Status::ErrUnsupported,
            Error::Unallocated(_) => Status::Failed,
            Error::OutOfMemory(_) => Status::ErrMemory,
        }
    }
}
