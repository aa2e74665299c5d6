//! Diagnostic capture - scoped interception of print/error emissions
//!
//! While a module loads, everything it prints or signals as an error is
//! buffered with a timestamp instead of reaching the ambient output
//! channel. Capture is a thread-local redirect with an RAII guard
//! ([`CaptureSession`]): the prior behavior is restored when the guard is
//! finished or dropped, on every exit path.
//!
//! Capture is deliberately not reentrant. A second [`CaptureSession::begin`]
//! on the same thread returns [`CaptureError::AlreadyActive`] rather than
//! silently corrupting attribution between two loads.

use std::cell::RefCell;
use std::marker::PhantomData;

use chrono::{DateTime, Local};
use thiserror::Error;

/// How captured entries are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureStyle {
    /// Store the emitted arguments verbatim, joined with spaces
    #[default]
    Raw,
    /// Render `"<path> - [<timestamp>] <joined arguments>"`
    Formatted,
}

/// One captured emission
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedLine {
    /// When the emission happened
    pub timestamp: DateTime<Local>,
    /// Rendered text, per the active [`CaptureStyle`]
    pub text: String,
}

impl CapturedLine {
    /// Render an entry for `path` from positional arguments
    pub fn new(style: CaptureStyle, path: &str, args: &[&str]) -> Self {
        let timestamp = Local::now();
        let joined = args.join(" ");
        let text = match style {
            CaptureStyle::Raw => joined,
            CaptureStyle::Formatted => {
                format!("{} - [{}] {}", path, timestamp.format("%H:%M:%S"), joined)
            }
        };
        Self { timestamp, text }
    }
}

/// Errors from installing diagnostic capture
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaptureError {
    /// Capture hooks are a single per-thread resource
    #[error("Diagnostic capture is already active on this thread")]
    AlreadyActive,
}

/// Output and error buffers collected during one capture session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureBuffers {
    /// Captured print emissions, in emission order
    pub prints: Vec<CapturedLine>,
    /// Captured error emissions, in emission order
    pub errors: Vec<CapturedLine>,
}

struct ActiveCapture {
    path: String,
    style: CaptureStyle,
    buffers: CaptureBuffers,
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveCapture>> = const { RefCell::new(None) };
}

/// RAII guard over the thread's capture hooks
///
/// Created by [`CaptureSession::begin`]. [`CaptureSession::finish`] tears
/// down the interception and returns the buffers; dropping the guard
/// without finishing (early return, panic unwinding past it) still
/// restores the prior behavior, discarding the buffers.
pub struct CaptureSession {
    finished: bool,
    // capture state is thread-local; the guard must not cross threads
    _not_send: PhantomData<*const ()>,
}

impl CaptureSession {
    /// Install capture for `path` on the current thread
    pub fn begin(path: &str, style: CaptureStyle) -> Result<Self, CaptureError> {
        ACTIVE.with(|active| {
            let mut slot = active.borrow_mut();
            if slot.is_some() {
                return Err(CaptureError::AlreadyActive);
            }
            *slot = Some(ActiveCapture {
                path: path.to_string(),
                style,
                buffers: CaptureBuffers::default(),
            });
            Ok(())
        })?;
        Ok(Self {
            finished: false,
            _not_send: PhantomData,
        })
    }

    /// Tear down the interception and take the buffers
    pub fn finish(mut self) -> CaptureBuffers {
        self.finished = true;
        ACTIVE
            .with(|active| active.borrow_mut().take())
            .map(|active| active.buffers)
            .unwrap_or_default()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if !self.finished {
            ACTIVE.with(|active| active.borrow_mut().take());
        }
    }
}

/// Emit a print. Buffered when capture is active on this thread,
/// written to standard output otherwise.
pub fn emit_print(args: &[&str]) {
    let routed = ACTIVE.with(|active| {
        let mut slot = active.borrow_mut();
        match slot.as_mut() {
            Some(capture) => {
                let line = CapturedLine::new(capture.style, &capture.path, args);
                capture.buffers.prints.push(line);
                true
            }
            None => false,
        }
    });
    if !routed {
        println!("{}", args.join(" "));
    }
}

/// Emit an error signal. Buffered when capture is active on this thread,
/// written to standard error otherwise.
pub fn emit_error(args: &[&str]) {
    let routed = ACTIVE.with(|active| {
        let mut slot = active.borrow_mut();
        match slot.as_mut() {
            Some(capture) => {
                let line = CapturedLine::new(capture.style, &capture.path, args);
                capture.buffers.errors.push(line);
                true
            }
            None => false,
        }
    });
    if !routed {
        eprintln!("{}", args.join(" "));
    }
}

#[cfg(test)]
pub(crate) fn is_active() -> bool {
    ACTIVE.with(|active| active.borrow().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_line_joins_args() {
        let line = CapturedLine::new(CaptureStyle::Raw, "mod.a", &["hello", "world"]);
        assert_eq!(line.text, "hello world");
    }

    #[test]
    fn test_formatted_line_tags_path_and_timestamp() {
        let line = CapturedLine::new(CaptureStyle::Formatted, "mod.a", &["hello"]);
        assert!(line.text.starts_with("mod.a - ["));
        assert!(line.text.ends_with("] hello"));
    }

    #[test]
    fn test_capture_collects_prints_and_errors_in_order() {
        let session = CaptureSession::begin("mod.a", CaptureStyle::Raw).unwrap();
        emit_print(&["first"]);
        emit_error(&["oops"]);
        emit_print(&["second"]);
        let buffers = session.finish();

        let prints: Vec<&str> = buffers.prints.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(prints, vec!["first", "second"]);
        assert_eq!(buffers.errors.len(), 1);
        assert_eq!(buffers.errors[0].text, "oops");
    }

    #[test]
    fn test_begin_twice_is_rejected() {
        let _session = CaptureSession::begin("mod.a", CaptureStyle::Raw).unwrap();
        let second = CaptureSession::begin("mod.b", CaptureStyle::Raw);
        assert!(matches!(second, Err(CaptureError::AlreadyActive)));
    }

    #[test]
    fn test_finish_restores_prior_behavior() {
        let session = CaptureSession::begin("mod.a", CaptureStyle::Raw).unwrap();
        assert!(is_active());
        session.finish();
        assert!(!is_active());

        // a fresh session can start again
        let session = CaptureSession::begin("mod.b", CaptureStyle::Raw).unwrap();
        session.finish();
    }

    #[test]
    fn test_drop_without_finish_restores() {
        {
            let _session = CaptureSession::begin("mod.a", CaptureStyle::Raw).unwrap();
            assert!(is_active());
        }
        assert!(!is_active());
    }

    #[test]
    fn test_restores_when_unwinding() {
        let result = std::panic::catch_unwind(|| {
            let _session = CaptureSession::begin("mod.a", CaptureStyle::Raw).unwrap();
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(!is_active());
    }

    #[test]
    fn test_capture_is_scoped_to_one_session() {
        let session = CaptureSession::begin("mod.a", CaptureStyle::Raw).unwrap();
        emit_print(&["inside"]);
        let first = session.finish();
        assert_eq!(first.prints.len(), 1);

        let session = CaptureSession::begin("mod.b", CaptureStyle::Raw).unwrap();
        let second = session.finish();
        assert!(second.prints.is_empty());
    }
}
