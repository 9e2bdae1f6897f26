use crate::log::{log_level::LogLevel, log_sink::LogSink};

/// Sink that discards every diagnostic.
///
/// Used by `signal_probe` when `[Logging] enabled = false`, and by tests that
/// do not inspect diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    #[inline]
    fn log(&self, _level: LogLevel, _msg: &str, _target: &'static str) {}
}
