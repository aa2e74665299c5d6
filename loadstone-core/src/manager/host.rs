//! LoadManager - the module load/reload state machine

use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::capture::CapturedLine;
use crate::config::Settings;
use crate::error::CallbackError;
use crate::loader::{ModuleLoader, ModuleValue};
use crate::output::{OutputChannel, StdoutChannel};

use super::attempt::{self, AttemptOutcome};
use super::status::{LoadState, ModuleRecord, ModuleReport};

/// Values handed to a success callback
#[derive(Clone, Copy)]
pub enum LoadedModules<'a> {
    /// Single-path form: the loaded value itself
    Single(&'a ModuleValue),
    /// Batch form: every requested path mapped to its value; fully
    /// populated, because the callback is skipped on any partial failure
    Batch(&'a BTreeMap<String, ModuleValue>),
}

/// Callback invoked after a fully successful load or batch load
pub type LoadCallback =
    Arc<dyn Fn(LoadedModules<'_>) -> Result<(), CallbackError> + Send + Sync>;

/// Callback resolution for [`LoadManager::reload`]
pub enum CallbackUpdate {
    /// Reuse the callback cached on the module's record, if any
    Keep,
    /// Clear the cached callback; this reload runs without one
    Clear,
    /// Replace the cached callback and use the new one
    Replace(LoadCallback),
}

/// Per-call surfacing options
///
/// Hidden lines are still stored on the status record; they just do not
/// reach the ambient channel during the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Keep captured output lines out of the ambient channel
    pub hide_output: bool,
    /// Keep captured error lines out of the ambient channel
    pub hide_errors: bool,
}

/// Whether a request used the single-path or batch form
#[derive(Clone, Copy)]
enum BatchShape {
    Single,
    Batch,
}

/// The load manager
///
/// Wraps a [`ModuleLoader`] so that failures during loading never abort
/// the caller: every load returns normally and records its outcome in the
/// per-module status table. Loads are idempotent until a module is
/// reloaded, and a batch's success callback runs only when every path in
/// the batch succeeded.
pub struct LoadManager {
    loader: Box<dyn ModuleLoader>,
    channel: Box<dyn OutputChannel>,
    settings: Settings,
    records: HashMap<String, ModuleRecord>,
    /// Sticky: set by the first failed load, never cleared
    failure_seen: bool,
    failure_notice_sent: bool,
}

impl LoadManager {
    /// Create a manager with default settings, writing to stdout
    pub fn new(loader: Box<dyn ModuleLoader>) -> Self {
        Self::with_settings(loader, Settings::default())
    }

    /// Create a manager with explicit settings
    pub fn with_settings(loader: Box<dyn ModuleLoader>, settings: Settings) -> Self {
        Self {
            loader,
            channel: Box::new(StdoutChannel),
            settings,
            records: HashMap::new(),
            failure_seen: false,
            failure_notice_sent: false,
        }
    }

    /// Replace the ambient output channel
    pub fn set_channel(&mut self, channel: Box<dyn OutputChannel>) {
        self.channel = channel;
    }

    /// Apply new settings
    pub fn configure(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ─── Loading ─────────────────────────────────────────────────────

    /// Load one module
    ///
    /// Idempotent: a module already imported is not re-loaded. The
    /// callback, if given, receives [`LoadedModules::Single`] and is
    /// cached on the record for reuse by [`reload`](Self::reload).
    pub fn load(&mut self, path: &str, callback: Option<LoadCallback>) {
        self.load_with(path, callback, LoadOptions::default());
    }

    /// Load one module with surfacing options
    pub fn load_with(&mut self, path: &str, callback: Option<LoadCallback>, options: LoadOptions) {
        self.run_batch(&[path], callback, options, BatchShape::Single, false);
    }

    /// Load several modules as one batch
    ///
    /// Paths are processed in order. The callback runs only if every path
    /// succeeded and receives [`LoadedModules::Batch`] with all values.
    pub fn load_batch(&mut self, paths: &[&str], callback: Option<LoadCallback>) {
        self.load_batch_with(paths, callback, LoadOptions::default());
    }

    /// Batch load with surfacing options
    pub fn load_batch_with(
        &mut self,
        paths: &[&str],
        callback: Option<LoadCallback>,
        options: LoadOptions,
    ) {
        self.run_batch(paths, callback, options, BatchShape::Batch, false);
    }

    /// Evict a module's cached value and load it again
    ///
    /// The callback in effect is resolved from `callback`: kept from the
    /// prior record, cleared, or replaced. A status line naming the path
    /// and the callback source is emitted before the load runs.
    pub fn reload(&mut self, path: &str, callback: CallbackUpdate) {
        let (resolved, source) = match callback {
            CallbackUpdate::Keep => {
                let cached = self.records.get(path).and_then(|r| r.callback.clone());
                let source = if cached.is_some() {
                    "cached callback"
                } else {
                    "no callback"
                };
                (cached, source)
            }
            CallbackUpdate::Clear => {
                if let Some(record) = self.records.get_mut(path) {
                    record.callback = None;
                }
                (None, "no callback")
            }
            CallbackUpdate::Replace(cb) => (Some(cb), "new callback"),
        };

        let verb = if self.records.contains_key(path) {
            "Reloading"
        } else {
            "Importing"
        };
        self.channel.line(&format!("{verb} {path} ({source})"));

        self.run_batch(&[path], resolved, LoadOptions::default(), BatchShape::Single, true);
    }

    // ─── Queries ─────────────────────────────────────────────────────

    /// Status of one module; `None` when the path was never requested
    pub fn status(&self, path: &str) -> Option<ModuleReport> {
        self.records.get(path).map(|record| ModuleReport {
            path: path.to_string(),
            state: record.state,
            duration: record.duration,
            failure: record.failure.clone(),
            print_log: record.prints.clone(),
            error_log: record.errors.clone(),
            co_loaded_with: record.co_loaded_with.clone(),
        })
    }

    /// Number of modules currently imported
    pub fn success_count(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.state == LoadState::Success)
            .count()
    }

    /// Number of modules currently failed
    pub fn failure_count(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.state == LoadState::Failed)
            .count()
    }

    /// Every known module path, sorted case-insensitively ascending
    pub fn known_modules(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.records.keys().cloned().collect();
        paths.sort_by_key(|p| p.to_lowercase());
        paths
    }

    /// Whether any load has ever failed in this manager's lifetime
    pub fn has_failures(&self) -> bool {
        self.failure_seen
    }

    // ─── Internals ───────────────────────────────────────────────────

    fn run_batch(
        &mut self,
        paths: &[&str],
        callback: Option<LoadCallback>,
        options: LoadOptions,
        shape: BatchShape,
        force: bool,
    ) {
        if paths.is_empty() {
            return;
        }

        let style = self.settings.capture_style();
        let mut values: BTreeMap<String, ModuleValue> = BTreeMap::new();
        let mut all_succeeded = true;

        for &path in paths {
            let co_loaded: Vec<String> = match shape {
                BatchShape::Single => Vec::new(),
                BatchShape::Batch => paths
                    .iter()
                    .filter(|p| **p != path)
                    .map(|p| (*p).to_string())
                    .collect(),
            };

            if force {
                // the cached callback survives; only the loaded
                // bookkeeping and the host cache reset
                self.loader.evict(path);
            } else if let Some(record) = self.records.get_mut(path) {
                if record.state == LoadState::Success {
                    tracing::debug!(module = %path, "Module already imported, skipping");
                    record.co_loaded_with = co_loaded;
                    let value = self.loader.cached(path).unwrap_or(ModuleValue::Null);
                    values.insert(path.to_string(), value);
                    continue;
                }
            }

            let outcome = attempt::run(self.loader.as_mut(), path, style);
            let succeeded = outcome.succeeded();
            self.commit(path, &outcome, co_loaded);
            self.surface(&outcome, options);

            if succeeded {
                values.insert(
                    path.to_string(),
                    outcome.value.unwrap_or(ModuleValue::Null),
                );
            } else {
                all_succeeded = false;
                self.note_failure();
            }
        }

        if let Some(callback) = callback {
            if all_succeeded {
                self.invoke_callback(paths, &values, &callback, shape);
            }
            // cached even when the batch failed, so a later reload can
            // retry with the same callback
            for &path in paths {
                if let Some(record) = self.records.get_mut(path) {
                    record.callback = Some(callback.clone());
                }
            }
        }
    }

    /// Whole-record replace; only the cached callback carries over
    fn commit(&mut self, path: &str, outcome: &AttemptOutcome, co_loaded: Vec<String>) {
        let state = if outcome.succeeded() {
            LoadState::Success
        } else {
            LoadState::Failed
        };
        let callback = self.records.remove(path).and_then(|r| r.callback);
        self.records.insert(
            path.to_string(),
            ModuleRecord {
                state,
                duration: Some(outcome.duration),
                failure: outcome.failure.clone(),
                prints: outcome.buffers.prints.clone(),
                errors: outcome.buffers.errors.clone(),
                callback,
                co_loaded_with: co_loaded,
            },
        );
    }

    /// Replay captured lines to the ambient channel in capture order
    fn surface(&mut self, outcome: &AttemptOutcome, options: LoadOptions) {
        if !options.hide_output {
            for line in &outcome.buffers.prints {
                self.channel.line(&line.text);
            }
        }
        if !options.hide_errors {
            for line in &outcome.buffers.errors {
                self.channel.line(&format!("[error] {}", line.text));
            }
        }
    }

    fn note_failure(&mut self) {
        self.failure_seen = true;
        if !self.failure_notice_sent {
            self.failure_notice_sent = true;
            self.channel
                .line("One or more modules failed to load; inspect their status for details");
        }
    }

    /// Run the success callback with failure isolation; a raising or
    /// panicking callback retroactively fails the whole batch
    fn invoke_callback(
        &mut self,
        paths: &[&str],
        values: &BTreeMap<String, ModuleValue>,
        callback: &LoadCallback,
        shape: BatchShape,
    ) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| match shape {
            BatchShape::Single => match paths.first().and_then(|p| values.get(*p)) {
                Some(value) => callback(LoadedModules::Single(value)),
                None => Ok(()),
            },
            BatchShape::Batch => callback(LoadedModules::Batch(values)),
        }));

        let failure = match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(_) => "module callback panicked".to_string(),
        };

        tracing::error!(error = %failure, "Success callback failed; invalidating batch");
        let style = self.settings.capture_style();
        let message = format!("callback failed: {failure}");
        for &path in paths {
            if let Some(record) = self.records.get_mut(path) {
                record.state = LoadState::Failed;
                record.failure = Some(message.clone());
                record
                    .errors
                    .push(CapturedLine::new(style, path, &[message.as_str()]));
            }
        }
        self.note_failure();
    }
}
