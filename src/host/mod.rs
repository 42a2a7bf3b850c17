//! Host side of the protocol: the host record handed to `setHost` and the
//! lifecycle driver that sends actions to a plugin.

pub mod session;

use std::ffi::c_int;
use std::fmt;
use std::ptr;

use thiserror::Error;

use crate::abi::OfxHost;
use crate::action::Action;
use crate::constants::{PROP_LABEL, PROP_NAME, PROP_VERSION, PROP_VERSION_LABEL};
use crate::error::Status;
use crate::model::config::HostSection;
use crate::model::property::PropertySet;
use crate::model::registry::{ObjectKey, to_handle, with_registry};
use crate::plugin::PluginError;
use crate::suite;

pub use session::EffectSession;

/// Errors raised while driving a plugin through its lifecycle.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Store(#[from] crate::Error),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("{action} returned {status}")]
    Action { action: Action, status: Status },

    #[error("{action} returned unknown status {code}")]
    UnknownStatus { action: Action, code: c_int },

    #[error("plugin returned a fatal status earlier; session is poisoned")]
    Poisoned,

    #[error("{action} not allowed: {what} is {stage}")]
    WrongStage {
        action: Action,
        what: &'static str,
        stage: &'static str,
    },

    #[error("describe did not define both OfxMeshMainInput and OfxMeshMainOutput")]
    MissingMainIo,
}

impl HostError {
    /// Status the plugin returned, if this error came from an action.
    pub fn status(&self) -> Option<Status> {
        match self {
            HostError::Action { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The host record and the property set it advertises.
pub struct Host {
    props: ObjectKey,
    record: Box<OfxHost>,
}

impl Host {
    pub fn new(identity: &HostSection) -> Result<Self, HostError> {
        let mut props = PropertySet::new();
        props.set_str(PROP_NAME, 0, &identity.name)?;
        props.set_str(PROP_LABEL, 0, &identity.label)?;
        props.set_all(PROP_VERSION, identity.version.as_slice())?;
        props.set_str(PROP_VERSION_LABEL, 0, &identity.version_label)?;
        let props = with_registry(|registry| registry.wrap(props));

        tracing::debug!("host '{}' ({})", identity.name, identity.version_label);
        Ok(Self {
            props,
            record: Box::new(OfxHost {
                host: to_handle(props),
                fetch_suite: suite::fetch_suite,
            }),
        })
    }

    pub fn props(&self) -> ObjectKey {
        self.props
    }

    /// Pointer handed to `setHost`. Stable for the lifetime of the host.
    pub fn record(&mut self) -> *mut OfxHost {
        ptr::from_mut(&mut *self.record)
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        with_registry(|registry| {
            if !registry.contains(self.props) {
                return;
            }
            if let Err(err) = registry.destroy(self.props) {
                tracing::warn!("releasing host properties: {err}");
            }
        });
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").field("props", &self.props).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::OfxPropertySuiteV1;
    use crate::constants::PROPERTY_SUITE;
    use std::ffi::{CStr, c_char};

    #[test]
    fn test_host_properties_through_fetch_suite() {
        let mut host = Host::new(&HostSection::default()).unwrap();
        let record = unsafe { &*host.record() };

        let table = unsafe { (record.fetch_suite)(record.host, c"OfxPropertySuite".as_ptr(), 1) };
        assert!(!table.is_null());
        assert_eq!(table, suite::suite(PROPERTY_SUITE, 1).unwrap());
        let props_suite = unsafe { &*table.cast::<OfxPropertySuiteV1>() };

        let mut name: *const c_char = ptr::null();
        let mut version = [0 as c_int; 3];
        unsafe {
            assert_eq!((props_suite.prop_get_string)(record.host, c"OfxPropName".as_ptr(), 0, &mut name), 0);
            assert_eq!(CStr::from_ptr(name), c"mfx-host");
            assert_eq!(
                (props_suite.prop_get_int_n)(record.host, c"OfxPropVersion".as_ptr(), 3, version.as_mut_ptr()),
                0
            );
        }
        assert_eq!(version, [0, 1, 0]);

        let unknown = unsafe { (record.fetch_suite)(record.host, c"OfxImageEffectSuite".as_ptr(), 1) };
        assert!(unknown.is_null());
    }

    #[test]
    fn test_drop_releases_host_properties() {
        let host = Host::new(&HostSection::default()).unwrap();
        let props = host.props();
        assert!(with_registry(|registry| registry.contains(props)));
        drop(host);
        assert!(!with_registry(|registry| registry.contains(props)));
    }

    #[test]
    fn test_drop_after_properties_are_gone() {
        let host = Host::new(&HostSection::default()).unwrap();
        let props = host.props();
        with_registry(|registry| registry.destroy(props)).unwrap();
        let before = with_registry(|registry| registry.len());
        drop(host);
        assert_eq!(with_registry(|registry| registry.len()), before);
    }
}
