//! Screen capture collaborator.
//!
//! [`ScreenSource`] is the narrow interface the producer consumes: one
//! call returns a raw RGB frame plus the native resolution it was
//! grabbed at. The production implementation wraps `scrap`; tests
//! supply synthetic sources.
//!
//! `scrap`'s capturer is not `Send` on X11, so the producer constructs
//! its source *inside* the capture thread via a factory.

use std::io::ErrorKind;
use std::thread;
use std::time::Duration;

use image::RgbImage;
use scrap::{Capturer, Display};

use remodesk_core::{RemoError, ScreenSize};

/// Wait between retries while the OS has no new frame for us.
const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(5);

// ── RawFrame ─────────────────────────────────────────────────────

/// One uncompressed capture: pixels plus the native screen size.
pub struct RawFrame {
    pub image: RgbImage,
    pub native: ScreenSize,
}

// ── ScreenSource ─────────────────────────────────────────────────

/// Anything that can produce raw screen frames.
pub trait ScreenSource {
    /// Grab the next frame, blocking until one is available.
    fn capture(&mut self) -> Result<RawFrame, RemoError>;
}

/// Factory handed to the capture thread; builds the source in place.
pub type SourceFactory =
    Box<dyn FnOnce() -> Result<Box<dyn ScreenSource>, RemoError> + Send + 'static>;

// ── ScrapSource ──────────────────────────────────────────────────

/// Captures the primary display via `scrap`.
pub struct ScrapSource {
    capturer: Capturer,
    native: ScreenSize,
}

impl ScrapSource {
    /// Open the primary display.
    pub fn new() -> Result<Self, RemoError> {
        let display =
            Display::primary().map_err(|e| RemoError::Capture(format!("no display: {e}")))?;
        let native = ScreenSize::new(display.width() as u32, display.height() as u32);
        let capturer =
            Capturer::new(display).map_err(|e| RemoError::Capture(format!("capturer: {e}")))?;
        Ok(Self { capturer, native })
    }
}

impl ScreenSource for ScrapSource {
    fn capture(&mut self) -> Result<RawFrame, RemoError> {
        let width = self.native.width as usize;
        let height = self.native.height as usize;

        loop {
            match self.capturer.frame() {
                Ok(frame) => {
                    // BGRA rows, possibly padded to a GPU-friendly stride.
                    let stride = frame.len() / height;
                    let mut rgb = Vec::with_capacity(width * height * 3);
                    for y in 0..height {
                        let row = &frame[y * stride..];
                        for x in 0..width {
                            let px = &row[x * 4..x * 4 + 4];
                            rgb.extend_from_slice(&[px[2], px[1], px[0]]);
                        }
                    }
                    let image = RgbImage::from_raw(width as u32, height as u32, rgb)
                        .ok_or_else(|| RemoError::Capture("frame buffer size mismatch".into()))?;
                    return Ok(RawFrame {
                        image,
                        native: self.native,
                    });
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    // Desktop unchanged; ask again shortly.
                    thread::sleep(FRAME_POLL_INTERVAL);
                }
                Err(e) => return Err(RemoError::Capture(e.to_string())),
            }
        }
    }
}
