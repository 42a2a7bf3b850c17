//! Native plugin libraries.
//!
//! A library exports `OfxGetNumberOfPlugins` and `OfxGetPlugin`; each plugin
//! record it returns stays valid while the library is loaded, so every
//! [`Plugin`] keeps its library alive.

use std::ffi::{CStr, c_int, c_void};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::abi::{
    GET_NUMBER_OF_PLUGINS_SYMBOL, GET_PLUGIN_SYMBOL, GetNumberOfPluginsFn, GetPluginFn,
    MainEntryFn, OfxHost, OfxPlugin, OfxPropertySetHandle, OfxStatus, SetHostFn,
};
use crate::plugin::{PluginError, PluginInfo};

pub struct PluginLibrary {
    path: PathBuf,
    library: Arc<Library>,
}

impl PluginLibrary {
    /// Load a plugin library and check that it exports both entry symbols.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initializers; the library must be a
    /// trusted OpenMfx plugin binary.
    pub unsafe fn open(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let path = path.as_ref().to_path_buf();
        // SAFETY: caller trusts the library.
        let library = unsafe { Library::new(&path) }.map_err(|err| PluginError::CannotLoad {
            path: path.clone(),
            reason: err.to_string(),
        })?;

        let lib = Self {
            path,
            library: Arc::new(library),
        };
        lib.symbol::<GetNumberOfPluginsFn>(GET_NUMBER_OF_PLUGINS_SYMBOL)?;
        lib.symbol::<GetPluginFn>(GET_PLUGIN_SYMBOL)?;
        tracing::info!("loaded plugin library {}", lib.path.display());
        Ok(lib)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn plugin_count(&self) -> Result<usize, PluginError> {
        let count = self.symbol::<GetNumberOfPluginsFn>(GET_NUMBER_OF_PLUGINS_SYMBOL)?;
        // SAFETY: symbol type follows the OpenFX headers.
        let n = unsafe { count() };
        Ok(usize::try_from(n).unwrap_or(0))
    }

    /// Select the plugin at `index`.
    pub fn plugin(&self, index: usize) -> Result<Plugin, PluginError> {
        let count = self.plugin_count()?;
        if index >= count {
            return Err(PluginError::IndexOutOfRange { index, count });
        }
        let get = self.symbol::<GetPluginFn>(GET_PLUGIN_SYMBOL)?;
        let nth = c_int::try_from(index).map_err(|_| PluginError::IndexOutOfRange { index, count })?;
        // SAFETY: index is in range; symbol type follows the OpenFX headers.
        let record = unsafe { get(nth) };
        if record.is_null() {
            return Err(PluginError::NullRecord(index));
        }
        // SAFETY: the record lives as long as the library, which the plugin
        // keeps loaded.
        unsafe { Plugin::validate(record, Some(Arc::clone(&self.library))) }
    }

    /// Identity of every plugin in the library. Records that fail to read are
    /// skipped with a warning.
    pub fn plugin_infos(&self) -> Result<Vec<PluginInfo>, PluginError> {
        let mut infos = Vec::new();
        for index in 0..self.plugin_count()? {
            match self.plugin(index) {
                Ok(plugin) => infos.push(plugin.info().clone()),
                Err(err) => tracing::warn!("plugin {index} of {}: {err}", self.path.display()),
            }
        }
        Ok(infos)
    }

    fn symbol<T>(&self, name: &'static CStr) -> Result<Symbol<'_, T>, PluginError> {
        // SAFETY: callers name the type the OpenFX headers give the symbol.
        unsafe { self.library.get::<T>(name.to_bytes_with_nul()) }.map_err(|_| {
            PluginError::MissingSymbol {
                path: self.path.clone(),
                symbol: name.to_str().unwrap_or("?"),
            }
        })
    }
}

impl fmt::Debug for PluginLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLibrary")
            .field("path", &self.path)
            .finish()
    }
}

/// A mesh effect plugin selected from a library or linked in-process.
pub struct Plugin {
    record: *const OfxPlugin,
    set_host: SetHostFn,
    main_entry: MainEntryFn,
    info: PluginInfo,
    _library: Option<Arc<Library>>,
}

impl Plugin {
    /// Wrap a plugin record that lives for the whole program, such as one
    /// linked into the host binary.
    pub fn from_record(record: &'static OfxPlugin) -> Result<Self, PluginError> {
        // SAFETY: 'static record; string fields are checked for null.
        unsafe { Self::validate(record, None) }
    }

    /// # Safety
    ///
    /// `record` must stay valid while `library` (if any) is loaded.
    unsafe fn validate(
        record: *const OfxPlugin,
        library: Option<Arc<Library>>,
    ) -> Result<Self, PluginError> {
        // SAFETY: non-null, guaranteed by the caller.
        let rec = unsafe { &*record };
        let info = unsafe { PluginInfo::from_record(rec) }?;
        if !info.is_mesh_effect() {
            return Err(PluginError::Unsupported {
                api: info.api,
                version: info.api_version,
            });
        }
        let set_host = rec.set_host.ok_or(PluginError::MissingEntryPoint("setHost"))?;
        let main_entry = rec
            .main_entry
            .ok_or(PluginError::MissingEntryPoint("mainEntry"))?;
        tracing::debug!("selected plugin {info}");
        Ok(Self {
            record,
            set_host,
            main_entry,
            info,
            _library: library,
        })
    }

    pub fn info(&self) -> &PluginInfo {
        &self.info
    }

    pub fn record(&self) -> *const OfxPlugin {
        self.record
    }

    /// # Safety
    ///
    /// `host` must stay valid for as long as the plugin may call into it.
    pub unsafe fn set_host(&self, host: *mut OfxHost) {
        unsafe { (self.set_host)(host) }
    }

    /// # Safety
    ///
    /// `handle` and the argument sets must be live registry handles (or null).
    pub unsafe fn main_entry(
        &self,
        action: &CStr,
        handle: *const c_void,
        in_args: OfxPropertySetHandle,
        out_args: OfxPropertySetHandle,
    ) -> OfxStatus {
        unsafe { (self.main_entry)(action.as_ptr(), handle, in_args, out_args) }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("id", &self.info.id.0)
            .field("version", &(self.info.version_major, self.info.version_minor))
            .field("linked", &self._library.is_none())
            .finish()
    }
}
