//! # remodesk-viewer
//!
//! Viewer side of a remodesk session: a resilient reconnecting
//! receiver feeding a latest-frame-wins render cell, and a fixed-tick
//! render/input loop that forwards local events back to the host.
//!
//! ## Threads
//!
//! ```text
//! receiver thread          main thread (≈30 Hz tick)
//! ───────────────          ─────────────────────────
//! connect / reconnect      poll window events
//! framed read loop    ──►  latest-frame cell ──► decode + blit
//! decompress fallback      translate input ──► command channel
//! ```

pub mod config;
pub mod input;
pub mod receiver;
pub mod state;
pub mod stats;
pub mod transport;
pub mod tunnel;
pub mod window;

pub use config::{TransportKind, ViewerConfig};
pub use receiver::{RECONNECT_DELAY, StreamCompression};
pub use state::ViewerShared;
pub use window::{Surface, SurfaceEvent};
