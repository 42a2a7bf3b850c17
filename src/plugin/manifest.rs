use std::ffi::{CStr, c_char};
use std::fmt;

use crate::abi::OfxPlugin;
use crate::constants::{MESH_EFFECT_API_VERSION, MESH_EFFECT_PLUGIN_API};
use crate::plugin::PluginError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginId(pub String);

/// Identity of a plugin, read from its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub id: PluginId,
    pub api: String,
    pub api_version: i32,
    pub version_major: u32,
    pub version_minor: u32,
}

impl PluginInfo {
    /// Read the identity fields of a plugin record.
    ///
    /// # Safety
    ///
    /// String fields of `record` must be null or nul-terminated.
    pub unsafe fn from_record(record: &OfxPlugin) -> Result<Self, PluginError> {
        let api = unsafe { record_str(record.plugin_api, "pluginApi") }?;
        let id = unsafe { record_str(record.plugin_identifier, "pluginIdentifier") }?;
        Ok(Self {
            id: PluginId(id),
            api,
            api_version: record.api_version,
            version_major: record.plugin_version_major,
            version_minor: record.plugin_version_minor,
        })
    }

    pub fn is_mesh_effect(&self) -> bool {
        self.api == MESH_EFFECT_PLUGIN_API && self.api_version == MESH_EFFECT_API_VERSION
    }

    pub fn display_name(&self) -> &str {
        &self.id.0
    }
}

impl fmt::Display for PluginInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{}.{}",
            self.id.0, self.version_major, self.version_minor
        )
    }
}

unsafe fn record_str(ptr: *const c_char, field: &'static str) -> Result<String, PluginError> {
    if ptr.is_null() {
        return Err(PluginError::InvalidRecord(field));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(str::to_string)
        .map_err(|_| PluginError::InvalidRecord(field))
}
