//! Host loader capability
//!
//! The load manager never touches a module system directly; it drives a
//! [`ModuleLoader`] that owns the host's module cache:
//!
//! - [`DylibLoader`]: native dynamic libraries via `libloading`
//! - [`MockLoader`]: scripted outcomes for tests

mod dylib;
mod mock;
mod traits;

pub use dylib::DylibLoader;
pub use mock::MockLoader;
pub use traits::{ModuleLoader, ModuleValue};
