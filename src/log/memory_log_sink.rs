use std::sync::Mutex;

use crate::log::{log_level::LogLevel, log_sink::LogSink};

/// A diagnostic captured by [`MemoryLogSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub text: String,
    pub target: &'static str,
}

/// Sink that keeps every diagnostic in memory so callers can assert on them.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far, in emission order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// True if any entry at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|e| e.level == level && e.text.contains(needle))
    }

    #[must_use]
    pub fn count_at(&self, level: LogLevel) -> usize {
        self.entries().iter().filter(|e| e.level == level).count()
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        // A poisoned lock only means another test thread panicked mid-push.
        let mut guard = match self.entries.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(LogEntry {
            level,
            text: msg.to_owned(),
            target,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_entries_in_order() {
        let sink = MemoryLogSink::new();
        sink.log(LogLevel::Info, "first", "a");
        sink.log(LogLevel::Warn, "second", "b");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "first");
        assert_eq!(entries[1].level, LogLevel::Warn);
        assert!(sink.contains(LogLevel::Warn, "sec"));
        assert!(!sink.contains(LogLevel::Info, "second"));
        assert_eq!(sink.count_at(LogLevel::Info), 1);
    }
}
