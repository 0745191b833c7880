//! Image encode/decode collaborator.
//!
//! Thin wrapper over the `image` crate turning raw RGB pixel buffers
//! into compressed image bytes and back, in one of the session
//! formats. Format selection happens once at startup — an unknown
//! format string is a fatal configuration error, never a per-frame
//! one.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::error::RemoError;

// ── VideoFormat ──────────────────────────────────────────────────

/// Image codec used for the frame stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    /// Lossless WebP (the `image` crate's encoder ignores quality).
    Webp,
    Jpeg,
    Avif,
}

impl FromStr for VideoFormat {
    type Err = RemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "webp" => Ok(VideoFormat::Webp),
            "jpeg" => Ok(VideoFormat::Jpeg),
            "avif" => Ok(VideoFormat::Avif),
            other => Err(RemoError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoFormat::Webp => write!(f, "webp"),
            VideoFormat::Jpeg => write!(f, "jpeg"),
            VideoFormat::Avif => write!(f, "avif"),
        }
    }
}

// ── Operations ───────────────────────────────────────────────────

/// Encode an RGB image into compressed image bytes.
///
/// `quality` is 0–100 (jpeg/avif; webp is lossless).
pub fn encode_image(
    image: &RgbImage,
    format: VideoFormat,
    quality: u8,
) -> Result<Vec<u8>, RemoError> {
    let (width, height) = image.dimensions();
    let mut out = Cursor::new(Vec::new());

    match format {
        VideoFormat::Jpeg => {
            let mut enc = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
            enc.encode_image(image)?;
        }
        VideoFormat::Webp => {
            WebPEncoder::new_lossless(&mut out).encode(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        VideoFormat::Avif => {
            AvifEncoder::new_with_speed_quality(&mut out, 8, quality.clamp(1, 100)).write_image(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
    }

    Ok(out.into_inner())
}

/// Decode compressed image bytes (format auto-detected) into RGB pixels.
pub fn decode_image(data: &[u8]) -> Result<RgbImage, RemoError> {
    let decoded = image::load_from_memory(data)?;
    Ok(decoded.to_rgb8())
}

/// Resize with nearest-neighbor sampling. Returns the input unchanged
/// when it already has the target dimensions.
pub fn resize_nearest(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Nearest)
    }
}

// ── Tests ────────────────────────────────────────────────────────
