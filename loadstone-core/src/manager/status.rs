//! Per-module status records and their read-only projections

use std::time::Duration;

use crate::capture::CapturedLine;

use super::host::LoadCallback;

/// Terminal outcome of the most recent load attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// The module is imported
    Success,
    /// The load (or its batch callback) failed
    Failed,
}

/// One record per module path ever requested
///
/// Created lazily on the first attempt and replaced wholesale on every
/// completed (re)load; only the cached callback survives replacement.
pub(crate) struct ModuleRecord {
    pub(crate) state: LoadState,
    pub(crate) duration: Option<Duration>,
    pub(crate) failure: Option<String>,
    pub(crate) prints: Vec<CapturedLine>,
    pub(crate) errors: Vec<CapturedLine>,
    pub(crate) callback: Option<LoadCallback>,
    pub(crate) co_loaded_with: Vec<String>,
}

/// Read-only view of one module's status
///
/// Returned by [`LoadManager::status`](super::LoadManager::status); a path
/// with no report has never been requested.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleReport {
    /// The module path
    pub path: String,
    /// Outcome of the most recent attempt
    pub state: LoadState,
    /// Elapsed time of the most recent completed attempt
    pub duration: Option<Duration>,
    /// Failure message, present only when the state is [`LoadState::Failed`]
    pub failure: Option<String>,
    /// Output captured during the most recent attempt
    pub print_log: Vec<CapturedLine>,
    /// Errors captured during the most recent attempt
    pub error_log: Vec<CapturedLine>,
    /// Other paths requested in the same batch call
    pub co_loaded_with: Vec<String>,
}

impl ModuleReport {
    /// Whether the module is currently imported
    pub fn imported(&self) -> bool {
        self.state == LoadState::Success
    }

    /// Duration in whole milliseconds, `-1` when no attempt completed
    pub fn duration_millis(&self) -> i64 {
        self.duration.map_or(-1, |d| d.as_millis() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(state: LoadState, duration: Option<Duration>) -> ModuleReport {
        ModuleReport {
            path: "mod.a".to_string(),
            state,
            duration,
            failure: None,
            print_log: Vec::new(),
            error_log: Vec::new(),
            co_loaded_with: Vec::new(),
        }
    }

    #[test]
    fn test_imported_follows_state() {
        assert!(report(LoadState::Success, None).imported());
        assert!(!report(LoadState::Failed, None).imported());
    }

    #[test]
    fn test_duration_millis_sentinel() {
        assert_eq!(report(LoadState::Failed, None).duration_millis(), -1);
        let ms = report(LoadState::Success, Some(Duration::from_millis(42))).duration_millis();
        assert_eq!(ms, 42);
    }
}
