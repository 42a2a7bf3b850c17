pub mod library;
pub mod manifest;

use std::path::PathBuf;

use thiserror::Error;

pub use library::{Plugin, PluginLibrary};
pub use manifest::PluginInfo;

/// Errors raised while loading a plugin library or selecting a plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("cannot load plugin library {}: {reason}", path.display())]
    CannotLoad { path: PathBuf, reason: String },

    #[error("{} does not export {symbol}", path.display())]
    MissingSymbol { path: PathBuf, symbol: &'static str },

    #[error("plugin index {index} out of range ({count} plugins)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("OfxGetPlugin({0}) returned null")]
    NullRecord(usize),

    #[error("plugin record has no {0} entry point")]
    MissingEntryPoint(&'static str),

    #[error("plugin record has a null or non UTF-8 {0}")]
    InvalidRecord(&'static str),

    #[error("unsupported plugin API {api} v{version}")]
    Unsupported { api: String, version: i32 },
}
