//! Dynamic-library module loader

use std::collections::HashMap;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};

use libloading::Library;

use super::traits::{ModuleLoader, ModuleValue};
use crate::error::LoadError;

/// Exported symbol a module may provide to describe itself
const DESCRIBE_SYMBOL: &[u8] = b"loadstone_module_describe";

struct LoadedLibrary {
    /// Keep the library mapped while the module counts as loaded
    _library: Library,
    value: ModuleValue,
}

/// [`ModuleLoader`] over native dynamic libraries
///
/// Loaded handles stay cached until evicted; evicting drops the handle,
/// which unloads the library, so the next load re-executes it.
pub struct DylibLoader {
    search_dirs: Vec<PathBuf>,
    libs: HashMap<String, LoadedLibrary>,
}

impl DylibLoader {
    /// Create a loader with no search directories
    pub fn new() -> Self {
        Self {
            search_dirs: Vec::new(),
            libs: HashMap::new(),
        }
    }

    /// Add a directory to probe when a module path is not a direct file
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Resolve a module path to a library file
    ///
    /// Tries the path as given, then `<name>.<ext>` and `lib<name>.<ext>`
    /// under each search directory with platform extensions.
    fn resolve(&self, path: &str) -> Result<PathBuf, LoadError> {
        let direct = Path::new(path);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }

        let extensions: &[&str] = if cfg!(target_os = "macos") {
            &["dylib", "so"]
        } else if cfg!(target_os = "windows") {
            &["dll"]
        } else {
            &["so"]
        };

        for dir in &self.search_dirs {
            for ext in extensions {
                let candidate = dir.join(format!("{path}.{ext}"));
                if candidate.is_file() {
                    return Ok(candidate);
                }

                let candidate = dir.join(format!("lib{path}.{ext}"));
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }

        Err(LoadError::LibraryNotFound {
            path: PathBuf::from(path),
        })
    }

    fn describe(library: &Library, file: &Path) -> ModuleValue {
        // SAFETY: the symbol, when present, is expected to be an
        // `extern "C" fn() -> *const c_char` returning a NUL-terminated
        // string with static lifetime, owned by the module.
        let description = unsafe {
            match library.get::<extern "C" fn() -> *const c_char>(DESCRIBE_SYMBOL) {
                Ok(describe) => {
                    let raw = describe();
                    if raw.is_null() {
                        None
                    } else {
                        Some(CStr::from_ptr(raw).to_string_lossy().into_owned())
                    }
                }
                Err(_) => None,
            }
        };

        match description {
            Some(text) => serde_json::json!({
                "library": file.display().to_string(),
                "description": text,
            }),
            None => serde_json::json!({
                "library": file.display().to_string(),
            }),
        }
    }
}

impl Default for DylibLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for DylibLoader {
    fn load(&mut self, path: &str) -> Result<ModuleValue, LoadError> {
        if let Some(loaded) = self.libs.get(path) {
            return Ok(loaded.value.clone());
        }

        let file = self.resolve(path)?;

        // SAFETY: loading a library the caller explicitly named; the
        // module is expected to follow the describe-symbol contract above.
        let library = unsafe { Library::new(&file)? };
        let value = Self::describe(&library, &file);

        tracing::info!(module = %path, file = %file.display(), "Module library loaded");
        self.libs.insert(
            path.to_string(),
            LoadedLibrary {
                _library: library,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    fn evict(&mut self, path: &str) {
        if self.libs.remove(path).is_some() {
            tracing::debug!(module = %path, "Module library evicted");
        }
    }

    fn cached(&self, path: &str) -> Option<ModuleValue> {
        self.libs.get(path).map(|loaded| loaded.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_module_not_found() {
        let mut loader = DylibLoader::new();
        let result = loader.load("nonexistent-module");
        assert!(matches!(result, Err(LoadError::LibraryNotFound { .. })));
    }

    #[test]
    fn test_load_invalid_library_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.so");
        std::fs::write(&file, "not a shared object").unwrap();

        let mut loader = DylibLoader::new();
        let result = loader.load(file.to_str().unwrap());
        assert!(matches!(result, Err(LoadError::LibraryLoad(_))));
    }

    #[test]
    fn test_search_dir_probing_misses_cleanly() {
        let dir = TempDir::new().unwrap();
        let loader = DylibLoader::new().with_search_dir(dir.path());
        assert!(matches!(
            loader.resolve("absent"),
            Err(LoadError::LibraryNotFound { .. })
        ));
    }

    #[test]
    fn test_cached_is_empty_before_any_load() {
        let loader = DylibLoader::new();
        assert!(loader.cached("anything").is_none());
    }

    #[test]
    fn test_evict_unknown_is_noop() {
        let mut loader = DylibLoader::new();
        loader.evict("anything");
        assert!(loader.cached("anything").is_none());
    }
}
