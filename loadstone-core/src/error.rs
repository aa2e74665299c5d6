//! Error types for loadstone-core

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a host loader while bringing a module in
#[derive(Error, Debug)]
pub enum LoadError {
    /// Module library not found on disk
    #[error("Module library not found: {path}")]
    LibraryNotFound { path: PathBuf },

    /// Failed to load a dynamic library
    #[error("Failed to load module library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// Generic loader failure with a message
    #[error("{0}")]
    Failed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure raised by a success callback after a load
#[derive(Error, Debug)]
#[error("{message}")]
pub struct CallbackError {
    /// Human-readable description of what went wrong
    pub message: String,
}

impl CallbackError {
    /// Create a callback error from any message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
