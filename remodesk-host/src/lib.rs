//! # remodesk-host
//!
//! Host side of a remodesk session: captures the screen, encodes and
//! compresses frames, fans them out to every connected viewer, and
//! replays viewer input.
//!
//! ## Architecture
//!
//! ```text
//! Session (accept loop, Standby/Active state machine)
//!   │ first accept
//!   ▼
//! producer thread ──► bounded frame queue ──► broadcaster task
//!   (capture →            (capacity 10,          (fan-out to every
//!    resize →              back-pressure)         viewer, evict on
//!    encode →                                     write failure)
//!    compress)
//!
//! per-viewer dispatcher task: framed InputCommand → InputSink
//! ```

pub mod broadcast;
pub mod capture;
pub mod config;
pub mod dispatch;
pub mod inject;
pub mod keymap;
pub mod producer;
pub mod session;

pub use capture::{RawFrame, ScrapSource, ScreenSource, SourceFactory};
pub use config::HostConfig;
pub use inject::{InputSink, SystemInput};
pub use producer::EncodeSettings;
pub use session::{Session, SessionState};
