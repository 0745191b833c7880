//! Integration tests — session lifecycle, fan-out, and input relay
//! over real TCP connections on localhost.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgb, RgbImage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};

use remodesk_core::{
    FrameHeader, InputCommand, PointerButton, PressState, RemoError, ScreenSize, encode_command,
};
use remodesk_host::capture::{RawFrame, ScreenSource, SourceFactory};
use remodesk_host::config::HostConfig;
use remodesk_host::inject::InputSink;
use remodesk_host::session::{Session, SessionState};

// ── Test collaborators ───────────────────────────────────────────

/// Synthetic capture source: solid-color frames at a fixed native size.
struct PatternSource {
    native: ScreenSize,
}

impl ScreenSource for PatternSource {
    fn capture(&mut self) -> Result<RawFrame, RemoError> {
        // Pace the synthetic source so tests don't spin a core.
        std::thread::sleep(Duration::from_millis(10));
        let image = RgbImage::from_pixel(self.native.width, self.native.height, Rgb([40, 90, 160]));
        Ok(RawFrame {
            image,
            native: self.native,
        })
    }
}

fn pattern_factory(native: ScreenSize) -> Box<dyn Fn() -> SourceFactory + Send + Sync> {
    Box::new(move || Box::new(move || Ok(Box::new(PatternSource { native }) as Box<dyn ScreenSource>)))
}

/// Records every injected event.
#[derive(Debug, Clone, PartialEq)]
enum Injected {
    Move(u32, u32),
    Button(PointerButton, PressState, u32, u32),
    Key(String, PressState),
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<Injected>>);

impl RecordingSink {
    fn events(&self) -> Vec<Injected> {
        self.0.lock().unwrap().clone()
    }
}

impl InputSink for RecordingSink {
    fn pointer_move(&self, x: u32, y: u32) -> Result<(), RemoError> {
        self.0.lock().unwrap().push(Injected::Move(x, y));
        Ok(())
    }

    fn pointer_button(
        &self,
        button: PointerButton,
        state: PressState,
        x: u32,
        y: u32,
    ) -> Result<(), RemoError> {
        self.0
            .lock()
            .unwrap()
            .push(Injected::Button(button, state, x, y));
        Ok(())
    }

    fn key(&self, name: &str, state: PressState) -> Result<(), RemoError> {
        self.0
            .lock()
            .unwrap()
            .push(Injected::Key(name.to_string(), state));
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Host config used by the tests: jpeg q80 at 1280x720, uncompressed
/// so payloads can be inspected directly.
fn test_config() -> HostConfig {
    let mut config = HostConfig::default();
    config.general.compression = 0;
    config.video.quality = 80;
    config.video.format = "jpeg".into();
    config.video.x = 1280;
    config.video.y = 720;
    config
}

/// Spin up a session on an OS-assigned port; returns it with the
/// address to dial and the recording sink.
async fn start_session(
    native: ScreenSize,
) -> (Arc<Session>, std::net::SocketAddr, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let session = Arc::new(
        Session::new(
            test_config(),
            pattern_factory(native),
            Arc::clone(&sink) as Arc<dyn InputSink>,
        )
        .unwrap(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let serving = Arc::clone(&session);
    tokio::spawn(async move {
        let _ = serving.serve(listener).await;
    });

    (session, addr, sink)
}

/// Read one full frame (header + payload) off a viewer socket.
async fn read_frame(stream: &mut TcpStream) -> (FrameHeader, Vec<u8>) {
    let mut header_bytes = [0u8; FrameHeader::SIZE];
    stream.read_exact(&mut header_bytes).await.unwrap();
    let header = FrameHeader::decode(&header_bytes).unwrap();

    let mut payload = vec![0u8; header.payload_len as usize];
    stream.read_exact(&mut payload).await.unwrap();
    (header, payload)
}

/// Poll `check` until it passes or five seconds elapse.
async fn eventually<F>(mut check: F, what: &str)
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if check() {
            return;
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("timed out waiting for {what}");
}

const NATIVE: ScreenSize = ScreenSize::new(1920, 1080);

// ── First frame ──────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn first_frame_declares_negotiated_resolution() {
    let (_session, addr, _sink) = start_session(NATIVE).await;

    let mut viewer = TcpStream::connect(addr).await.unwrap();
    let (header, payload) = timeout(Duration::from_secs(5), read_frame(&mut viewer))
        .await
        .expect("no frame within the capture interval");

    assert_eq!(header.width, 1280);
    assert_eq!(header.height, 720);
    assert_eq!(header.payload_len as usize, payload.len());
    assert!(!payload.is_empty());

    // Uncompressed session: the payload is directly decodable jpeg.
    let image = remodesk_core::decode_image(&payload).unwrap();
    assert_eq!(image.dimensions(), (1280, 720));
}

// ── Input relay ──────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn mouse_button_reaches_sink_in_native_coordinates() {
    let (_session, addr, sink) = start_session(NATIVE).await;

    let mut viewer = TcpStream::connect(addr).await.unwrap();
    // Wait until the producer has captured at least once so the host
    // knows its true native size.
    let _ = timeout(Duration::from_secs(5), read_frame(&mut viewer))
        .await
        .unwrap();

    let cmd = InputCommand::MouseButton {
        state: PressState::Down,
        x: 100,
        y: 50,
        button: PointerButton::Left,
    };
    viewer
        .write_all(&encode_command(&cmd).unwrap())
        .await
        .unwrap();

    eventually(
        || {
            sink.events().contains(&Injected::Button(
                PointerButton::Left,
                PressState::Down,
                150,
                75,
            ))
        },
        "pointer press at native (150, 75)",
    )
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_command_is_dropped_and_connection_survives() {
    let (_session, addr, sink) = start_session(NATIVE).await;

    let mut viewer = TcpStream::connect(addr).await.unwrap();
    let _ = timeout(Duration::from_secs(5), read_frame(&mut viewer))
        .await
        .unwrap();

    // Garbage body under a valid length prefix.
    let mut junk = 8u32.to_be_bytes().to_vec();
    junk.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0xDE, 0xAD, 0xBE, 0xEF]);
    viewer.write_all(&junk).await.unwrap();

    // A well-formed command afterwards still goes through.
    let cmd = InputCommand::Key {
        state: PressState::Down,
        key: "space".into(),
    };
    viewer
        .write_all(&encode_command(&cmd).unwrap())
        .await
        .unwrap();

    eventually(
        || {
            sink.events()
                .contains(&Injected::Key("space".into(), PressState::Down))
        },
        "key event after a malformed command",
    )
    .await;
}

// ── Eviction independence ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn failed_viewer_is_evicted_alone() {
    let (session, addr, _sink) = start_session(NATIVE).await;

    let mut viewer_a = TcpStream::connect(addr).await.unwrap();
    let mut viewer_b = TcpStream::connect(addr).await.unwrap();

    let _ = timeout(Duration::from_secs(5), read_frame(&mut viewer_a))
        .await
        .unwrap();
    let _ = timeout(Duration::from_secs(5), read_frame(&mut viewer_b))
        .await
        .unwrap();
    assert_eq!(session.viewer_count().await, 2);

    drop(viewer_a);

    // B keeps receiving frames across this and subsequent cycles.
    for _ in 0..3 {
        let (header, _) = timeout(Duration::from_secs(5), read_frame(&mut viewer_b))
            .await
            .expect("viewer B stopped receiving after A failed");
        assert_eq!(header.width, 1280);
    }

    // A's eviction lands on its first failed write.
    for _ in 0..100 {
        if session.viewer_count().await == 1 {
            break;
        }
        let _ = timeout(Duration::from_secs(5), read_frame(&mut viewer_b))
            .await
            .unwrap();
    }
    assert_eq!(session.viewer_count().await, 1);
    assert_eq!(session.state(), SessionState::Active);
}

// ── Standby / Active ─────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn last_viewer_disconnecting_returns_to_standby() {
    let (session, addr, _sink) = start_session(NATIVE).await;
    assert_eq!(session.state(), SessionState::Standby);

    let mut viewer = TcpStream::connect(addr).await.unwrap();
    let _ = timeout(Duration::from_secs(5), read_frame(&mut viewer))
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Active);

    drop(viewer);

    eventually_async_state(&session, SessionState::Standby).await;
    assert_eq!(session.viewer_count().await, 0);

    // The next accepted connection restarts producer and broadcaster.
    let mut viewer = TcpStream::connect(addr).await.unwrap();
    let (header, payload) = timeout(Duration::from_secs(5), read_frame(&mut viewer))
        .await
        .expect("no frame after pipeline restart");
    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(header.width, 1280);
    assert!(!payload.is_empty());
}

async fn eventually_async_state(session: &Session, want: SessionState) {
    for _ in 0..100 {
        if session.state() == want {
            return;
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("session never reached {want:?}");
}
