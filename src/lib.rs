//! Host for OpenMfx mesh-effect plugins.
//!
//! A plugin library is opened with [`plugin::PluginLibrary`], driven through
//! its lifecycle by [`host::EffectSession`], and talks back to the host
//! through the suite tables in [`suite`].

pub mod abi;
pub mod action;
pub mod constants;
pub mod error;
pub mod host;
pub mod model;
pub mod plugin;
pub mod suite;

pub use error::{Error, Result, Status};
