//! Domain-specific error types for remodesk.
//!
//! All fallible operations return `Result<T, RemoError>`. Network and
//! decode failures are handled at the boundary where they occur
//! (reconnect, eviction, fallback) and never cross a thread boundary
//! as values — the observable effects are state transitions and log
//! lines.

use thiserror::Error;

/// The canonical error type for the remodesk pipeline.
#[derive(Debug, Error)]
pub enum RemoError {
    // ── Wire errors ──────────────────────────────────────────────
    /// Fewer than 12 bytes were available for a frame header.
    ///
    /// Callers treat this as a closed connection, not a retryable
    /// decode error.
    #[error("malformed frame header: {0} of 12 bytes available")]
    MalformedHeader(usize),

    /// A command message body failed to deserialize.
    ///
    /// Logged and dropped by the dispatcher; the connection stays open.
    #[error("malformed command: {0}")]
    MalformedCommand(String),

    /// A command length prefix exceeded the sanity cap.
    #[error("command too large: {size} bytes (max {max})")]
    CommandTooLarge { size: usize, max: usize },

    // ── Media errors ─────────────────────────────────────────────
    /// The configured image format is not one of `webp|jpeg|avif`.
    ///
    /// Raised once at startup — a fatal configuration error.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Image encoding or decoding failed.
    #[error("image codec error: {0}")]
    Encoding(String),

    /// Brotli compression or decompression failed.
    #[error("compression error: {0}")]
    Compression(String),

    // ── Connection errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// The frame queue was closed on the other side.
    #[error("frame queue closed")]
    ChannelClosed,

    /// The secure-shell tunnel could not be established.
    #[error("tunnel error: {0}")]
    Tunnel(String),

    // ── Host errors ──────────────────────────────────────────────
    /// Configuration file was present but unreadable. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Screen capture failed. Fatal for the running session.
    #[error("capture error: {0}")]
    Capture(String),

    /// OS input injection failed.
    #[error("input injection error: {0}")]
    Injection(String),

    // ── Viewer errors ────────────────────────────────────────────
    /// The render surface could not be created or updated.
    #[error("render surface error: {0}")]
    Surface(String),
}

// ── Convenient From implementations ──────────────────────────────

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for RemoError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        RemoError::ChannelClosed
    }
}

impl From<image::ImageError> for RemoError {
    fn from(e: image::ImageError) -> Self {
        RemoError::Encoding(e.to_string())
    }
}
