//! Host configuration.
//!
//! TOML sections mirror the session knobs: `[general]` compression
//! level, `[video]` encode settings, `[audio]` (accepted but unused by
//! the core), `[server]` listen address, `[logging]`.

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use remodesk_core::{RemoError, ScreenSize, VideoFormat};

/// Top-level host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub general: GeneralConfig,
    pub video: VideoConfig,
    /// Accepted for compatibility; audio streaming is not implemented.
    pub audio: AudioConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// General session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Payload compression level 0–100. 0 disables compression for
    /// the session.
    pub compression: u8,
}

/// Video encode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Image quality 0–100.
    pub quality: u8,
    /// Image codec: `webp`, `jpeg` or `avif`.
    pub format: String,
    /// Target encode width.
    pub x: u32,
    /// Target encode height.
    pub y: u32,
}

/// Audio settings (unused by the core).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enable: bool,
    pub bitrate: u32,
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is not set.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            video: VideoConfig::default(),
            audio: AudioConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { compression: 60 }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            quality: 80,
            format: "jpeg".into(),
            x: 1280,
            y: 720,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enable: false,
            bitrate: 96_000,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "0.0.0.0".into(),
            port: 2222,
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

impl HostConfig {
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

    /// Parse the configured image format.
    ///
    /// An unknown format is a fatal configuration error raised once at
    /// startup, never per-frame.
    pub fn video_format(&self) -> Result<VideoFormat, RemoError> {
        VideoFormat::from_str(&self.video.format)
    }

    /// The target encode resolution — the resolution every frame
    /// header declares.
    pub fn target_size(&self) -> ScreenSize {
        ScreenSize::new(self.video.x, self.video.y)
    }

    /// The socket address to listen on.
    pub fn listen_addr(&self) -> Result<SocketAddr, RemoError> {
        format!("{}:{}", self.server.ip, self.server.port)
            .parse()
            .map_err(|e| RemoError::Config(format!("invalid server address: {e}")))
    }
}

// ── Tests ────────────────────────────────────────────────────────
