//! # remodesk-core
//!
//! Core library for the remodesk remote-screen session.
//!
//! This crate contains everything shared between the host and the
//! viewer:
//! - **Wire protocol**: `FrameHeader` (12-byte big-endian frame
//!   header) and `InputCommand` (length-prefixed, bincode-framed input
//!   events)
//! - **Frame pipeline**: `Frame` and the bounded back-pressure
//!   `frame_queue`
//! - **Media collaborators**: brotli payload compression and the
//!   `image`-backed encode/decode in `webp|jpeg|avif`
//! - **Geometry**: `ScreenSize` and the viewport↔negotiated↔native
//!   coordinate transform
//! - **Error**: `RemoError` — typed, `thiserror`-based error hierarchy
//!
//! No sockets live here; the host and viewer crates own all I/O.

pub mod command;
pub mod compress;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod header;
pub mod image_codec;
pub mod queue;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use command::{
    InputCommand, MAX_COMMAND_SIZE, PointerButton, PressState, decode_command, encode_command,
};
pub use compress::{CompressionParams, compress, decompress};
pub use error::RemoError;
pub use frame::Frame;
pub use geometry::{ScreenSize, scale_point};
pub use header::FrameHeader;
pub use image_codec::{VideoFormat, decode_image, encode_image, resize_nearest};
pub use queue::{FRAME_QUEUE_DEPTH, FrameReceiver, FrameSender, frame_queue};
