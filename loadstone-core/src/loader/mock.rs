//! Scripted loader for tests
//!
//! MockLoader allows scripting per-module outcomes, enabling fast,
//! deterministic testing of the manager's state machine without a real
//! module system. Clones share state, so a test can keep a handle for
//! assertions after the manager takes ownership of the other clone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{ModuleLoader, ModuleValue};
use crate::capture;
use crate::error::LoadError;

/// Scripted behavior for one module path
#[derive(Debug, Clone, Default)]
struct Script {
    /// `None` means succeed with a null value
    result: Option<Result<ModuleValue, String>>,
    prints: Vec<String>,
    errors: Vec<String>,
    panics: bool,
}

#[derive(Debug, Default)]
struct MockState {
    scripts: HashMap<String, Script>,
    cache: HashMap<String, ModuleValue>,
    load_calls: HashMap<String, usize>,
}

/// Scripted implementation of [`ModuleLoader`]
#[derive(Debug, Clone, Default)]
pub struct MockLoader {
    state: Arc<Mutex<MockState>>,
}

impl MockLoader {
    /// Create a loader with no scripted modules
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful load producing `value`
    pub fn succeed_with(&self, path: &str, value: ModuleValue) {
        let mut state = self.state.lock().expect("mock state lock poisoned");
        state.scripts.entry(path.to_string()).or_default().result = Some(Ok(value));
    }

    /// Script a failing load
    pub fn fail_with(&self, path: &str, message: &str) {
        let mut state = self.state.lock().expect("mock state lock poisoned");
        state.scripts.entry(path.to_string()).or_default().result =
            Some(Err(message.to_string()));
    }

    /// Script a panic during load
    pub fn panic_on(&self, path: &str) {
        let mut state = self.state.lock().expect("mock state lock poisoned");
        state.scripts.entry(path.to_string()).or_default().panics = true;
    }

    /// Lines the module prints while loading
    pub fn print_during(&self, path: &str, lines: &[&str]) {
        let mut state = self.state.lock().expect("mock state lock poisoned");
        let script = state.scripts.entry(path.to_string()).or_default();
        script.prints.extend(lines.iter().map(|l| l.to_string()));
    }

    /// Error lines the module signals while loading
    pub fn error_during(&self, path: &str, lines: &[&str]) {
        let mut state = self.state.lock().expect("mock state lock poisoned");
        let script = state.scripts.entry(path.to_string()).or_default();
        script.errors.extend(lines.iter().map(|l| l.to_string()));
    }

    /// Number of times `load` actually ran for `path`
    pub fn load_count(&self, path: &str) -> usize {
        let state = self.state.lock().expect("mock state lock poisoned");
        state.load_calls.get(path).copied().unwrap_or(0)
    }
}

impl ModuleLoader for MockLoader {
    fn load(&mut self, path: &str) -> Result<ModuleValue, LoadError> {
        // clone the script and release the lock before emitting or
        // panicking, so a scripted panic cannot poison the shared state
        let script = {
            let mut state = self.state.lock().expect("mock state lock poisoned");
            *state.load_calls.entry(path.to_string()).or_insert(0) += 1;
            state.scripts.get(path).cloned()
        };

        let Some(script) = script else {
            return Err(LoadError::Failed(format!("module '{path}' not found")));
        };

        for line in &script.prints {
            capture::emit_print(&[line.as_str()]);
        }
        for line in &script.errors {
            capture::emit_error(&[line.as_str()]);
        }
        if script.panics {
            panic!("scripted panic in '{path}'");
        }

        match script.result {
            Some(Err(message)) => Err(LoadError::Failed(message)),
            Some(Ok(value)) => {
                let mut state = self.state.lock().expect("mock state lock poisoned");
                state.cache.insert(path.to_string(), value.clone());
                Ok(value)
            }
            None => {
                let mut state = self.state.lock().expect("mock state lock poisoned");
                state.cache.insert(path.to_string(), ModuleValue::Null);
                Ok(ModuleValue::Null)
            }
        }
    }

    fn evict(&mut self, path: &str) {
        let mut state = self.state.lock().expect("mock state lock poisoned");
        state.cache.remove(path);
    }

    fn cached(&self, path: &str) -> Option<ModuleValue> {
        let state = self.state.lock().expect("mock state lock poisoned");
        state.cache.get(path).cloned()
    }
}
