//! CLI subcommands

use std::path::PathBuf;

use loadstone_core::{DylibLoader, LoadManager, Settings};

pub mod load;
pub mod shell;

/// Resolve settings: explicit flag, else the user config directory
pub(crate) fn load_settings(config: Option<&PathBuf>) -> Settings {
    match config {
        Some(path) => Settings::load(path),
        None => match dirs::config_dir() {
            Some(dir) => Settings::load(&dir.join("loadstone/config.toml")),
            None => Settings::default(),
        },
    }
}

/// Build a manager over the native dynamic-library loader
pub(crate) fn build_manager(config: Option<&PathBuf>) -> LoadManager {
    let loader = DylibLoader::new().with_search_dir(".");
    LoadManager::with_settings(Box::new(loader), load_settings(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_settings_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "success_icon = \"OK\"").unwrap();

        let settings = load_settings(Some(&path));
        assert_eq!(settings.success_icon, "OK");
    }

    #[test]
    fn test_load_settings_missing_file_defaults() {
        let path = PathBuf::from("/nonexistent/config.toml");
        let settings = load_settings(Some(&path));
        assert_eq!(settings, Settings::default());
    }
}
