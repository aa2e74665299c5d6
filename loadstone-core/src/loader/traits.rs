//! ModuleLoader trait and related types

use crate::error::LoadError;

/// Opaque value produced by a host loader for a loaded module
pub type ModuleValue = serde_json::Value;

/// The host's native module-load primitive plus its cache
///
/// Implementations own the module cache: `load` re-executes the underlying
/// module only when it is not cached, and `evict` removes a cached module
/// so the next `load` re-executes it. The manager layers idempotence,
/// capture, and failure isolation on top of this seam.
pub trait ModuleLoader: Send {
    /// Load a module, returning its value
    fn load(&mut self, path: &str) -> Result<ModuleValue, LoadError>;

    /// Drop the cached value for a module, if any
    fn evict(&mut self, path: &str);

    /// The currently cached value for a module, if loaded
    fn cached(&self, path: &str) -> Option<ModuleValue>;
}
