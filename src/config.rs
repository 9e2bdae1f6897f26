use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::log::log_level::LogLevel;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:7000/ws";
pub const DEFAULT_SESSION_ID: &str = "test room";
pub const DEFAULT_STUN: &str = "stun:stun.l.google.com:19302";

/// Raw INI-style configuration: `[Section]` headers, `key = value` lines and
/// `#` comments. Keys outside any section are globals.
#[derive(Debug)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Error reading file {path}: {e}"))?;
        Ok(Self::parse(&content))
    }

    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = &line[1..line.len() - 1];
                current_section = Some(name.trim().to_string());
                continue;
            }

            if let Some(pos) = line.find('=') {
                let key = line[..pos].trim().to_string();
                let value = line[pos + 1..].trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    pub fn empty() -> Self {
        Self {
            globals: HashMap::new(),
            sections: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty_or_default<'a>(
        &'a self,
        section: &str,
        key: &str,
        default: &'a str,
    ) -> &'a str {
        self.get_non_empty(section, key)
            .or_else(|| self.get_global(key).filter(|s| !s.is_empty()))
            .unwrap_or(default)
    }

    /// Boolean values accept `true/false`, `yes/no`, `on/off` and `1/0`.
    #[must_use]
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.get_non_empty(section, key)?.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_u64(&self, section: &str, key: &str) -> Option<u64> {
        self.get_non_empty(section, key)?.parse().ok()
    }
}

/// `[Signaling]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalingSettings {
    /// `ws://` or `wss://` URL of the session coordinator.
    pub endpoint: String,
    /// Opaque session identifier sent as `sid` in the join request.
    pub session_id: String,
    /// Optional deadline for correlated requests; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// PEM file with the CA that signs the coordinator's certificate.
    pub ca_cert_path: Option<PathBuf>,
}

/// `[Media]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    pub stun: String,
    /// SDP offer used by the static transport of the probe binary.
    pub offer_path: Option<PathBuf>,
}

/// `[Logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `enabled = false` runs without a log file.
    pub enabled: bool,
    pub dir: Option<String>,
    pub file_name: Option<String>,
    pub level: LogLevel,
}

/// Typed view over [`Config`] for the negotiation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub signaling: SignalingSettings,
    pub media: MediaSettings,
    pub logging: LogSettings,
    /// `[Registry] prune_ended_tracks`: drop bookkeeping when a track ends.
    pub prune_ended_tracks: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from_config(&Config::empty())
    }
}

impl ClientSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let request_timeout = config
            .get_u64("Signaling", "request_timeout_ms")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let level = config
            .get_non_empty("Logging", "level")
            .and_then(LogLevel::parse)
            .unwrap_or(LogLevel::Debug);

        Self {
            signaling: SignalingSettings {
                endpoint: config
                    .get_non_empty_or_default("Signaling", "endpoint", DEFAULT_ENDPOINT)
                    .to_owned(),
                session_id: config
                    .get_non_empty_or_default("Signaling", "session_id", DEFAULT_SESSION_ID)
                    .to_owned(),
                request_timeout,
                ca_cert_path: config
                    .get_non_empty("Signaling", "ca_cert_path")
                    .map(PathBuf::from),
            },
            media: MediaSettings {
                stun: config
                    .get_non_empty_or_default("Media", "stun", DEFAULT_STUN)
                    .to_owned(),
                offer_path: config.get_non_empty("Media", "offer_path").map(PathBuf::from),
            },
            logging: LogSettings {
                enabled: config.get_bool("Logging", "enabled").unwrap_or(true),
                dir: config.get_non_empty("Logging", "log_path").map(str::to_owned),
                file_name: config
                    .get_non_empty("Logging", "log_filename")
                    .map(str::to_owned),
                level,
            },
            prune_ended_tracks: config
                .get_bool("Registry", "prune_ended_tracks")
                .unwrap_or(false),
        }
    }
}
