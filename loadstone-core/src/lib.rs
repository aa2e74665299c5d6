//! loadstone-core: safe module loading with diagnostic capture
//!
//! This crate wraps a host runtime's native module-load primitive so that
//! a failing module never aborts the embedding process. Failures are
//! recorded, not raised; loads are timed; everything a module prints or
//! signals while loading is captured and attributed to it.
//!
//! The main components:
//!
//! - **Load management** - [`LoadManager`] for the per-module load/reload
//!   state machine, batch loads, and callback semantics
//! - **Loader capability** - the [`ModuleLoader`] trait with
//!   [`DylibLoader`] (native libraries) and [`MockLoader`] (scripted, for
//!   tests)
//! - **Diagnostic capture** - [`capture`] for scoped interception of
//!   print/error emissions during a load
//! - **Command surface** - [`commands`] for the textual
//!   `Load`/`Reload`/`Status` dispatcher
//!
//! # Quick Start
//!
//! ```
//! use loadstone_core::{LoadManager, MockLoader};
//!
//! let loader = MockLoader::new();
//! loader.succeed_with("core.utils", serde_json::json!({"version": 1}));
//!
//! let mut manager = LoadManager::new(Box::new(loader.clone()));
//! manager.load("core.utils", None);
//!
//! assert_eq!(manager.success_count(), 1);
//! assert!(manager.status("core.utils").unwrap().imported());
//! ```
//!
//! # Architecture
//!
//! ```text
//! caller ──► LoadManager ──► attempt (capture + timing + isolation)
//!                │                      │
//!                │                      └──► ModuleLoader (host cache)
//!                ├──► status table (per-module records)
//!                └──► OutputChannel (ambient replay, notices)
//! ```

pub mod capture;
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod manager;
pub mod output;

// Re-export key types for convenience
pub use capture::{CaptureBuffers, CaptureError, CaptureSession, CaptureStyle, CapturedLine};
pub use commands::{Command, CommandError, dispatch};
pub use config::{Settings, SplitType};
pub use error::{CallbackError, LoadError};
pub use loader::{DylibLoader, MockLoader, ModuleLoader, ModuleValue};
pub use manager::{
    CallbackUpdate, LoadCallback, LoadManager, LoadOptions, LoadState, LoadedModules, ModuleReport,
};
pub use output::{MemoryChannel, OutputChannel, StdoutChannel};
