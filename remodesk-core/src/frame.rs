//! One encoded screen frame plus its header.
//!
//! A [`Frame`] is immutable once constructed: it is owned by the
//! bounded queue until consumed, then by whichever socket write is in
//! flight. The payload is a [`Bytes`] handle so the broadcaster can
//! fan the same frame out to every viewer without copying.

use bytes::{BufMut, Bytes, BytesMut};

use crate::header::FrameHeader;

// ── Frame ────────────────────────────────────────────────────────

/// An encoded (and possibly compressed) screen image with its header.
#[derive(Debug, Clone)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Bytes,
}

impl Frame {
    /// Build a frame for a payload encoded at `width`×`height`.
    ///
    /// The header's `payload_len` always matches the payload exactly.
    pub fn new(payload: Bytes, width: u32, height: u32) -> Self {
        let header = FrameHeader::new(payload.len() as u32, width, height);
        Self { header, payload }
    }

    /// Contiguous wire representation: header followed by payload.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(FrameHeader::SIZE + self.payload.len());
        buf.put_slice(&self.header.encode());
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Total size on the wire.
    pub fn wire_len(&self) -> usize {
        FrameHeader::SIZE + self.payload.len()
    }
}

// ── Tests ────────────────────────────────────────────────────────
