//! Viewer configuration.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use remodesk_core::{RemoError, ScreenSize};

/// Top-level configuration for the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// How to reach the host.
    pub connection: ConnectionConfig,
    /// Initial window size.
    pub display: DisplayConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Host address or name.
    pub host: String,
    /// Host port (the stream port, or the SSH port when tunneled).
    pub port: u16,
    /// `direct` for a raw TCP connection, `tunneled` for SSH.
    pub transport: String,
    /// SSH user (tunneled transport only).
    pub user: String,
    /// SSH password (tunneled transport only).
    pub password: String,
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Initial viewport width.
    pub width: u32,
    /// Initial viewport height.
    pub height: u32,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is not set.
    pub level: String,
}

// ── Transport kind ───────────────────────────────────────────────

/// Parsed `connection.transport` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Direct,
    Tunneled,
}

impl FromStr for TransportKind {
    type Err = RemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(TransportKind::Direct),
            "tunneled" => Ok(TransportKind::Tunneled),
            other => Err(RemoError::Config(format!("unknown transport: {other}"))),
        }
    }
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            display: DisplayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 2222,
            transport: "direct".into(),
            user: String::new(),
            password: String::new(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading & derived accessors ──────────────────────────────────

impl ViewerConfig {
    /// Load from a TOML file.
    ///
    /// A missing file falls back to defaults; a file that exists but
    /// does not parse is a fatal startup error.
    pub fn load(path: &Path) -> Result<Self, RemoError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .map_err(|e| RemoError::Config(format!("{}: {e}", path.display()))),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Ok(Self::default())
            }
        }
    }

    /// Initial viewport size.
    pub fn start_size(&self) -> ScreenSize {
        ScreenSize::new(self.display.width, self.display.height)
    }
}

impl ConnectionConfig {
    /// Parse the transport field; fatal at startup when unknown.
    pub fn transport_kind(&self) -> Result<TransportKind, RemoError> {
        TransportKind::from_str(&self.transport)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let text = toml::to_string_pretty(&ViewerConfig::default()).unwrap();
        assert!(text.contains("host"));
        assert!(text.contains("transport"));
        assert!(text.contains("width"));
    }

    #[test]
    fn roundtrip_config() {
        let cfg = ViewerConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ViewerConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.connection.port, 2222);
        assert_eq!(parsed.display.width, 1280);
    }

    #[test]
    fn transport_parsing() {
        assert_eq!(
            "direct".parse::<TransportKind>().unwrap(),
            TransportKind::Direct
        );
        assert_eq!(
            "tunneled".parse::<TransportKind>().unwrap(),
            TransportKind::Tunneled
        );
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }
}
