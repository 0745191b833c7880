//! Session manager — accept loop and the Standby/Active state machine.
//!
//! The session owns the one piece of shared mutable state on the host:
//! the live viewer set. Viewers are added here on accept and removed
//! by the broadcaster on the first failed write. The capture pipeline
//! (producer thread + broadcaster task) is started on the first accept
//! after entering standby and winds itself down when the viewer set
//! empties.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tracing::info;

use remodesk_core::{FRAME_QUEUE_DEPTH, RemoError, ScreenSize, frame_queue};

use crate::broadcast;
use crate::capture::SourceFactory;
use crate::config::HostConfig;
use crate::dispatch;
use crate::inject::InputSink;
use crate::producer::{self, EncodeSettings};

// ── SessionState ─────────────────────────────────────────────────

/// Host session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// No pipeline running; waiting for the first viewer.
    Standby = 0,
    /// Producer and broadcaster running, ≥1 viewer connected.
    Active = 1,
}

/// Atomic cell holding the current [`SessionState`].
#[derive(Clone)]
pub struct SharedSessionState(Arc<AtomicU8>);

impl SharedSessionState {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(SessionState::Standby as u8)))
    }

    pub fn load(&self) -> SessionState {
        match self.0.load(Ordering::SeqCst) {
            0 => SessionState::Standby,
            _ => SessionState::Active,
        }
    }

    pub fn store(&self, state: SessionState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Set `Active`, returning the previous state.
    pub fn activate(&self) -> SessionState {
        match self.0.swap(SessionState::Active as u8, Ordering::SeqCst) {
            0 => SessionState::Standby,
            _ => SessionState::Active,
        }
    }
}

impl Default for SharedSessionState {
    fn default() -> Self {
        Self::new()
    }
}

// ── Viewer set ───────────────────────────────────────────────────

/// One connected viewer's frame channel.
pub struct ViewerConnection {
    pub addr: std::net::SocketAddr,
    pub writer: OwnedWriteHalf,
}

/// The live viewer set; all membership changes go through this lock.
pub type SharedViewers = Arc<tokio::sync::Mutex<Vec<ViewerConnection>>>;

// ── Session ──────────────────────────────────────────────────────

/// The host session: accept loop, state machine, pipeline lifecycle.
pub struct Session {
    config: HostConfig,
    settings: EncodeSettings,
    viewers: SharedViewers,
    state: SharedSessionState,
    /// Native screen size as last observed by the producer.
    native: Arc<Mutex<ScreenSize>>,
    source_factory: Box<dyn Fn() -> SourceFactory + Send + Sync>,
    sink: Arc<dyn InputSink>,
}

impl Session {
    /// Build a session, validating the encode configuration.
    ///
    /// `source_factory` is invoked once per pipeline start and the
    /// result handed to the capture thread; `sink` receives translated
    /// input events from every dispatcher.
    pub fn new(
        config: HostConfig,
        source_factory: Box<dyn Fn() -> SourceFactory + Send + Sync>,
        sink: Arc<dyn InputSink>,
    ) -> Result<Self, RemoError> {
        let settings = EncodeSettings::from_config(&config)?;
        // Until the first capture lands, translate against the encode
        // resolution (identity transform).
        let native = Arc::new(Mutex::new(settings.target));
        Ok(Self {
            config,
            settings,
            viewers: Arc::new(tokio::sync::Mutex::new(Vec::new())),
            state: SharedSessionState::new(),
            native,
            source_factory,
            sink,
        })
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state.load()
    }

    /// Number of currently registered viewers.
    pub async fn viewer_count(&self) -> usize {
        self.viewers.lock().await.len()
    }

    /// Bind the configured listener and serve forever.
    pub async fn run(&self) -> Result<(), RemoError> {
        let listener = TcpListener::bind(self.config.listen_addr()?).await?;
        info!("host listening on {}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Accept loop on an already-bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), RemoError> {
        loop {
            let (stream, peer) = listener.accept().await?;
            self.register(stream, peer).await;
        }
    }

    /// Register a freshly accepted viewer.
    ///
    /// Always: add it to the viewer set and start its command
    /// dispatcher. On the first accept after standby: also start the
    /// capture pipeline.
    pub async fn register(&self, stream: TcpStream, peer: std::net::SocketAddr) {
        info!("{peer} connected");
        let (read_half, write_half) = stream.into_split();

        // Membership change and the Standby check happen under the set
        // lock so they serialize against the broadcaster's standby
        // transition.
        let mut set = self.viewers.lock().await;
        set.push(ViewerConnection {
            addr: peer,
            writer: write_half,
        });
        if self.state.activate() == SessionState::Standby {
            self.start_pipeline();
        }
        drop(set);

        tokio::spawn(dispatch::run(
            read_half,
            peer,
            self.settings.target,
            Arc::clone(&self.native),
            Arc::clone(&self.sink),
        ));
    }

    /// Start producer thread + broadcaster task for a fresh queue.
    fn start_pipeline(&self) {
        info!("session active; starting capture pipeline");
        let (tx, rx) = frame_queue(FRAME_QUEUE_DEPTH);
        let running = Arc::new(AtomicBool::new(true));

        producer::spawn(
            (self.source_factory)(),
            self.settings.clone(),
            tx,
            Arc::clone(&self.native),
            Arc::clone(&running),
        );

        tokio::spawn(broadcast::run(
            rx,
            Arc::clone(&self.viewers),
            self.state.clone(),
            running,
        ));
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_cell_transitions() {
        let state = SharedSessionState::new();
        assert_eq!(state.load(), SessionState::Standby);

        assert_eq!(state.activate(), SessionState::Standby);
        assert_eq!(state.load(), SessionState::Active);

        // A second accept while active must not restart the pipeline.
        assert_eq!(state.activate(), SessionState::Active);

        state.store(SessionState::Standby);
        assert_eq!(state.load(), SessionState::Standby);
    }
}
