//! Settings for the load manager and its display collaborators
//!
//! Settings come from a TOML file. A missing or unreadable file, or an
//! invalid value, never surfaces as an error to the caller: defaults are
//! substituted and a warning is logged.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::capture::CaptureStyle;

/// Layout hint for the status viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Horizontal split (the default)
    #[default]
    Horizontal,
    /// Vertical split
    Vertical,
}

impl<'de> Deserialize<'de> for SplitType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // unrecognized values coerce to horizontal rather than failing
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_ascii_lowercase().as_str() {
            "vertical" => Self::Vertical,
            _ => Self::Horizontal,
        })
    }
}

/// Manager and viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Render captured entries with path and timestamp tags
    pub better_printing: bool,
    /// Status viewer layout hint
    pub split_type: SplitType,
    /// Glyph shown next to failed modules
    pub failed_icon: String,
    /// Glyph shown next to successfully imported modules
    pub success_icon: String,
    /// Viewer keybindings; opaque to the core
    pub keybindings: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            better_printing: false,
            split_type: SplitType::Horizontal,
            failed_icon: "✗".to_string(),
            success_icon: "✓".to_string(),
            keybindings: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    ///
    /// Returns defaults when the file does not exist or cannot be parsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read settings, using defaults");
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid settings file, using defaults");
                Self::default()
            }
        }
    }

    /// Capture rendering mode selected by these settings
    pub fn capture_style(&self) -> CaptureStyle {
        if self.better_printing {
            CaptureStyle::Formatted
        } else {
            CaptureStyle::Raw
        }
    }
}
