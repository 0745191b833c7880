//! Screen-size bookkeeping and the linear coordinate transform shared
//! by both ends of the pipeline.
//!
//! The viewer rescales pointer positions from its rendered viewport to
//! the negotiated resolution before sending; the host rescales from
//! the negotiated resolution to the native screen before injecting.
//! Each side owns exactly one direction of the transform.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── ScreenSize ───────────────────────────────────────────────────

/// A width×height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<(u32, u32)> for ScreenSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ── Transform ────────────────────────────────────────────────────

/// Rescale a point from one coordinate space to another.
///
/// Identity when the spaces agree (or when `from` is degenerate, so a
/// transient zero size never divides).
pub fn scale_point(x: u32, y: u32, from: ScreenSize, to: ScreenSize) -> (u32, u32) {
    if from == to || from.width == 0 || from.height == 0 {
        return (x, y);
    }
    (
        (u64::from(x) * u64::from(to.width) / u64::from(from.width)) as u32,
        (u64::from(y) * u64::from(to.height) / u64::from(from.height)) as u32,
    )
}

// ── Tests ────────────────────────────────────────────────────────
