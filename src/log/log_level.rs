use std::fmt;

/// Severity of a diagnostic, ordered from most to least verbose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Fine-grained detail: frame ids, ignored triggers, duplicate resolutions.
    Debug,
    /// Progress detail that is noisier than `Info` (candidates, track bookkeeping).
    Verbose,
    /// Coarse-grained progress of the negotiation (joined, renegotiating, closed).
    Info,
    /// Potentially harmful situations that do not change control flow.
    Warn,
    /// Failures that end a negotiation or a session.
    Error,
}

impl LogLevel {
    /// Parses a level name as written in config files (`debug`, `warn`, ...).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "verbose" => Some(Self::Verbose),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Verbose => "Verbose",
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
