use crate::log::log_level::LogLevel;

/// Diagnostics capability injected into every component.
///
/// Purely observational: implementations must never influence control flow.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}
