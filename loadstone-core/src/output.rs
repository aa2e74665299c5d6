//! Ambient output channel
//!
//! The load manager never prints directly; it writes lines into an
//! injected [`OutputChannel`]. [`StdoutChannel`] is the production
//! implementation, [`MemoryChannel`] the in-memory one for tests.

use std::sync::{Arc, Mutex};

/// Destination for replayed diagnostics and status lines
pub trait OutputChannel: Send {
    /// Write one line to the channel
    fn line(&mut self, text: &str);
}

/// Writes lines to standard output
#[derive(Debug, Default)]
pub struct StdoutChannel;

impl OutputChannel for StdoutChannel {
    fn line(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Collects lines in memory; clones share one buffer so a test can keep
/// a handle after the manager takes ownership of the other
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryChannel {
    /// Create an empty channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("channel lock poisoned").clone()
    }
}

impl OutputChannel for MemoryChannel {
    fn line(&mut self, text: &str) {
        self.lines
            .lock()
            .expect("channel lock poisoned")
            .push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_channel_collects_lines() {
        let mut channel = MemoryChannel::new();
        channel.line("one");
        channel.line("two");
        assert_eq!(channel.lines(), vec!["one", "two"]);
    }

    #[test]
    fn test_memory_channel_clones_share_buffer() {
        let handle = MemoryChannel::new();
        let mut writer = handle.clone();
        writer.line("shared");
        assert_eq!(handle.lines(), vec!["shared"]);
    }
}
