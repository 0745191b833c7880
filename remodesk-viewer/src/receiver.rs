//! Client receiver — connection establishment, framed read loop, and
//! the reconnect state machine.
//!
//! ```text
//! Disconnected → Connecting → Connected → Reconnecting → Connecting → …
//! ```
//!
//! Connecting retries forever on a fixed backoff; there is no maximum
//! attempt count. Connected runs the read loop until any error, which
//! is never fatal: the machine closes the stream, clears the
//! latest-frame cell, and dials again.
//!
//! Whether the stream is compressed is discovered from the first
//! payload: decompression is attempted, and its success or failure
//! fixes the session's interpretation from then on.

use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use remodesk_core::{FrameHeader, ScreenSize, decompress};

use crate::config::ConnectionConfig;
use crate::state::ViewerShared;
use crate::transport;

/// Fixed pause between connection attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

// ── Link state ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

// ── Stream compression ───────────────────────────────────────────

/// What this connection's payloads turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCompression {
    /// Not yet established; the next payload decides.
    Unknown,
    /// Payloads decompress with brotli.
    Brotli,
    /// Payloads are already raw image bytes.
    Raw,
}

/// Apply the session decompression policy to one payload.
///
/// While `Unknown`, a successful decompression marks the session
/// compressed; a failure marks it raw. Either way the verdict sticks
/// for the remainder of the session, so later frames skip the probe.
pub fn resolve_payload(mode: &mut StreamCompression, data: Vec<u8>) -> Vec<u8> {
    match *mode {
        StreamCompression::Raw => data,
        StreamCompression::Unknown | StreamCompression::Brotli => match decompress(&data) {
            Ok(out) => {
                *mode = StreamCompression::Brotli;
                out
            }
            Err(e) => {
                if *mode == StreamCompression::Brotli {
                    warn!("compressed stream stopped decompressing ({e}); treating as raw");
                }
                *mode = StreamCompression::Raw;
                data
            }
        },
    }
}

// ── Receiver thread ──────────────────────────────────────────────

/// Start the connection/read thread.
pub fn spawn(config: ConnectionConfig, shared: Arc<ViewerShared>) -> JoinHandle<()> {
    thread::spawn(move || run(config, &shared))
}

fn run(config: ConnectionConfig, shared: &ViewerShared) {
    let mut state = LinkState::Disconnected;
    let mut live: Option<std::net::TcpStream> = None;

    while shared.running() {
        state = match state {
            LinkState::Disconnected => LinkState::Connecting,

            LinkState::Connecting => {
                shared.set_status(format!(
                    "connecting to {}:{} ({})",
                    config.host, config.port, config.transport
                ));
                match transport::connect(&config).and_then(|s| {
                    let writer = s.try_clone()?;
                    Ok((s, writer))
                }) {
                    Ok((stream, writer)) => {
                        shared.counters.reset();
                        shared.link.install(writer);
                        shared.set_status("connected");
                        live = Some(stream);
                        LinkState::Connected
                    }
                    Err(e) => {
                        warn!(
                            "connect failed: {e}; retrying in {}s",
                            RECONNECT_DELAY.as_secs()
                        );
                        thread::sleep(RECONNECT_DELAY);
                        LinkState::Connecting
                    }
                }
            }

            LinkState::Connected => {
                if let Some(mut stream) = live.take() {
                    read_frames(&mut stream, shared);
                }
                LinkState::Reconnecting
            }

            LinkState::Reconnecting => {
                info!("link lost; reconnecting");
                shared.link.clear();
                shared.cell.clear();
                LinkState::Connecting
            }
        };
    }
}

/// Framed read loop: 12-byte header, then exactly `payload_len` bytes.
///
/// Short reads accumulate inside `read_exact`; only closure or a
/// genuine socket error ends the loop. Returns once per connection.
pub fn read_frames<R: Read>(stream: &mut R, shared: &ViewerShared) {
    let mut mode = StreamCompression::Unknown;
    let mut header_buf = [0u8; FrameHeader::SIZE];

    while shared.running() {
        if let Err(e) = stream.read_exact(&mut header_buf) {
            info!("frame stream closed: {e}");
            return;
        }
        let header = match FrameHeader::decode(&header_buf) {
            Ok(h) => h,
            Err(e) => {
                info!("frame stream closed: {e}");
                return;
            }
        };

        let negotiated = ScreenSize::new(header.width, header.height);
        if negotiated != shared.sizes.current() {
            shared.sizes.note_negotiated(negotiated);
        }

        let mut payload = vec![0u8; header.payload_len as usize];
        if let Err(e) = stream.read_exact(&mut payload) {
            info!("frame stream closed mid-payload: {e}");
            return;
        }
        shared.counters.record(payload.len());

        let image_bytes = resolve_payload(&mut mode, payload);
        debug!(
            "frame {}x{}, {} bytes after {:?}",
            header.width,
            header.height,
            image_bytes.len(),
            mode
        );
        shared.cell.store(image_bytes);
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use remodesk_core::{CompressionParams, Frame, compress};

    #[test]
    fn unknown_stream_locks_onto_brotli() {
        let mut mode = StreamCompression::Unknown;
        let original = b"encoded image bytes".repeat(20);
        let packed = compress(&original, CompressionParams::from_level(60)).unwrap();

        let out = resolve_payload(&mut mode, packed);
        assert_eq!(out, original);
        assert_eq!(mode, StreamCompression::Brotli);
    }

    #[test]
    fn unknown_stream_falls_back_to_raw() {
        let mut mode = StreamCompression::Unknown;
        let mut raw = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        raw.extend_from_slice(b"JFIF\0");
        raw.extend_from_slice(&[0xFF; 64]);

        let out = resolve_payload(&mut mode, raw.clone());
        assert_eq!(out, raw);
        assert_eq!(mode, StreamCompression::Raw);

        // The verdict sticks: even a valid brotli payload now passes
        // through untouched.
        let packed = compress(b"later frame", CompressionParams::from_level(50)).unwrap();
        let out = resolve_payload(&mut mode, packed.clone());
        assert_eq!(out, packed);
        assert_eq!(mode, StreamCompression::Raw);
    }

    #[test]
    fn corrupt_compressed_frame_degrades_to_raw() {
        let mut mode = StreamCompression::Brotli;
        let garbage = vec![0x00, 0x11, 0x22, 0x33];
        let out = resolve_payload(&mut mode, garbage.clone());
        assert_eq!(out, garbage);
        assert_eq!(mode, StreamCompression::Raw);
    }

    #[test]
    fn read_loop_keeps_only_the_latest_frame() {
        let shared = ViewerShared::new(ScreenSize::new(1280, 720));

        let mut wire = Vec::new();
        for payload in [b"frame-one".as_slice(), b"frame-two".as_slice()] {
            let frame = Frame::new(payload.to_vec().into(), 1920, 1080);
            wire.extend_from_slice(&frame.to_bytes());
        }

        read_frames(&mut &wire[..], &shared);

        assert_eq!(shared.cell.snapshot().unwrap(), b"frame-two");
        assert_eq!(shared.counters.snapshot(), (2, 18));
        // The new resolution is noted for the next render tick but not
        // yet adopted.
        assert_eq!(
            shared.sizes.pending_adopt(),
            Some(ScreenSize::new(1920, 1080))
        );
        assert_eq!(shared.sizes.current(), ScreenSize::new(1280, 720));
    }

    #[test]
    fn partial_header_ends_the_loop() {
        let shared = ViewerShared::new(ScreenSize::new(1280, 720));
        let wire = [0u8; 7]; // fewer than 12 header bytes, then EOF
        read_frames(&mut &wire[..], &shared);
        assert!(shared.cell.snapshot().is_none());
        assert_eq!(shared.counters.snapshot(), (0, 0));
    }
}
