//! Load attempt execution
//!
//! One guarded load of one module: diagnostic capture goes up, the host
//! loader runs inside a failure-isolating call, timing is measured, and
//! capture comes down on every exit path. Both `Err` returns and panics
//! from the loader are normalized into the outcome.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::capture::{CaptureBuffers, CaptureSession, CaptureStyle};
use crate::loader::{ModuleLoader, ModuleValue};

/// Normalized outcome of one load attempt
pub(crate) struct AttemptOutcome {
    pub(crate) value: Option<ModuleValue>,
    pub(crate) failure: Option<String>,
    pub(crate) duration: Duration,
    pub(crate) buffers: CaptureBuffers,
}

impl AttemptOutcome {
    pub(crate) fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    fn failed(message: String, duration: Duration, buffers: CaptureBuffers) -> Self {
        Self {
            value: None,
            failure: Some(message),
            duration,
            buffers,
        }
    }
}

/// Run the host loader on `path` under diagnostic capture and timing
pub(crate) fn run(
    loader: &mut dyn ModuleLoader,
    path: &str,
    style: CaptureStyle,
) -> AttemptOutcome {
    let session = match CaptureSession::begin(path, style) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(module = %path, error = %e, "Cannot install diagnostic capture");
            return AttemptOutcome::failed(e.to_string(), Duration::ZERO, CaptureBuffers::default());
        }
    };

    let start = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| loader.load(path)));
    let duration = start.elapsed();
    let buffers = session.finish();

    match result {
        Ok(Ok(value)) => {
            tracing::info!(module = %path, ?duration, "Module loaded");
            AttemptOutcome {
                value: Some(value),
                failure: None,
                duration,
                buffers,
            }
        }
        Ok(Err(e)) => {
            tracing::error!(module = %path, error = %e, "Module load failed");
            AttemptOutcome::failed(e.to_string(), duration, buffers)
        }
        Err(_) => {
            tracing::error!(module = %path, "Module panicked during load");
            AttemptOutcome::failed(
                format!("module '{path}' panicked during load"),
                duration,
                buffers,
            )
        }
    }
}
