//! Module load management
//!
//! This module provides the load/reload state machine:
//!
//! - [`LoadManager`]: orchestrates guarded loads, tracks per-module status,
//!   and owns the callback and co-load semantics
//! - [`ModuleReport`]: read-only projection of one module's status
//! - [`CallbackUpdate`]: callback resolution for reloads
//!
//! A failing module never propagates an error to the caller: `load` and
//! `reload` always return normally and encode the outcome in the status
//! table.

mod attempt;
mod host;
mod status;

pub use host::{CallbackUpdate, LoadCallback, LoadManager, LoadOptions, LoadedModules};
pub use status::{LoadState, ModuleReport};
