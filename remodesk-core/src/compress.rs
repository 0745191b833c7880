//! Brotli byte compression for encoded frame payloads.
//!
//! The host exposes a single 0–100 compression level in its
//! configuration and maps it onto brotli's two tuning knobs:
//!
//! ```text
//! quality = round(level / 100 × 11)          (0..=11)
//! lgwin   = round(10 + level / 100 × 14)     (10..=24)
//! ```
//!
//! Level 0 disables compression for the session entirely — frames then
//! carry raw encoded-image bytes and the viewer's decompression
//! heuristic settles on the uncompressed path.

use brotli::enc::BrotliEncoderParams;

use crate::error::RemoError;

// ── CompressionParams ────────────────────────────────────────────

/// Brotli parameters derived from the configured 0–100 level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionParams {
    /// Effort, 0 (fastest) to 11 (densest).
    pub quality: i32,
    /// Window size exponent, 10 to 24.
    pub lgwin: i32,
}

impl CompressionParams {
    /// Map a 0–100 level onto brotli quality and window size.
    pub fn from_level(level: u8) -> Self {
        let t = f64::from(level.min(100)) / 100.0;
        Self {
            quality: (t * 11.0).round() as i32,
            lgwin: (10.0 + t * (24.0 - 10.0)).round() as i32,
        }
    }
}

// ── Operations ───────────────────────────────────────────────────

/// Compress a payload with the given parameters.
pub fn compress(data: &[u8], params: CompressionParams) -> Result<Vec<u8>, RemoError> {
    let enc = BrotliEncoderParams {
        quality: params.quality,
        lgwin: params.lgwin,
        ..BrotliEncoderParams::default()
    };
    let mut out = Vec::with_capacity(data.len() / 2);
    brotli::BrotliCompress(&mut &data[..], &mut out, &enc)
        .map_err(|e| RemoError::Compression(e.to_string()))?;
    Ok(out)
}

/// Decompress a payload.
///
/// Fails on input that is not a brotli stream — the viewer relies on
/// that to detect an uncompressed session.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, RemoError> {
    let mut out = Vec::with_capacity(data.len() * 4);
    brotli::BrotliDecompress(&mut &data[..], &mut out)
        .map_err(|e| RemoError::Compression(e.to_string()))?;
    Ok(out)
}

// ── Tests ────────────────────────────────────────────────────────
