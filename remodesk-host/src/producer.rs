//! Frame producer — capture → resize → encode → compress → queue.
//!
//! Runs on a dedicated thread (the capture source is built in place
//! because it is not `Send` on every platform) and pushes into the
//! bounded frame queue, so its pace is throttled by the slowest
//! broadcast cycle.
//!
//! There is no retry inside the loop: any capture or encode failure is
//! fatal for the producer, and the session falls back to standby once
//! the broadcaster drains the closed queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use tracing::{debug, error, info};

use remodesk_core::{
    CompressionParams, FrameSender, RemoError, ScreenSize, VideoFormat, compress, encode_image,
    resize_nearest, Frame,
};

use crate::capture::SourceFactory;
use crate::config::HostConfig;

// ── EncodeSettings ───────────────────────────────────────────────

/// Immutable per-session encode parameters, validated at startup.
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    pub format: VideoFormat,
    pub quality: u8,
    /// Target encode resolution — declared in every frame header.
    pub target: ScreenSize,
    /// `None` disables payload compression for the session.
    pub compression: Option<CompressionParams>,
}

impl EncodeSettings {
    /// Derive settings from the host configuration.
    ///
    /// Fails on an unsupported image format — the fatal startup check.
    pub fn from_config(config: &HostConfig) -> Result<Self, RemoError> {
        let level = config.general.compression;
        Ok(Self {
            format: config.video_format()?,
            quality: config.video.quality.min(100),
            target: config.target_size(),
            compression: (level > 0).then(|| CompressionParams::from_level(level)),
        })
    }
}

// ── Producer ─────────────────────────────────────────────────────

/// Start the capture thread.
///
/// The thread runs until `running` clears, the queue closes (the
/// broadcaster went to standby), or a capture/encode error occurs.
/// The shared `native` cell is refreshed with the true screen size on
/// every grab; the dispatchers read it for coordinate translation.
pub fn spawn(
    factory: SourceFactory,
    settings: EncodeSettings,
    queue: FrameSender,
    native: Arc<Mutex<ScreenSize>>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut source = match factory() {
            Ok(s) => s,
            Err(e) => {
                error!("capture source unavailable: {e}");
                return;
            }
        };
        info!(
            "producer started: {} q{} at {}",
            settings.format, settings.quality, settings.target
        );

        while running.load(Ordering::SeqCst) {
            let raw = match source.capture() {
                Ok(f) => f,
                Err(e) => {
                    error!("capture failed: {e}");
                    break;
                }
            };
            *native.lock().unwrap() = raw.native;

            let resized = resize_nearest(&raw.image, settings.target.width, settings.target.height);
            let encoded = match encode_image(&resized, settings.format, settings.quality) {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!("frame encode failed: {e}");
                    break;
                }
            };

            let payload = match settings.compression {
                Some(params) => match compress(&encoded, params) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        error!("frame compression failed: {e}");
                        break;
                    }
                },
                None => encoded,
            };

            let frame = Frame::new(
                Bytes::from(payload),
                settings.target.width,
                settings.target.height,
            );
            if queue.put(frame).is_err() {
                debug!("frame queue closed; producer stopping");
                break;
            }
        }

        info!("producer stopped");
    })
}

// ── Tests ────────────────────────────────────────────────────────
