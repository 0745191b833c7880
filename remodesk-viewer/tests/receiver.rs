//! Integration tests — the receiver against a live localhost stream:
//! decompression detection, latest-frame delivery, and reconnect.

use std::io::Write;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::{Duration, Instant};

use remodesk_core::{CompressionParams, Frame, ScreenSize, compress};
use remodesk_viewer::config::ConnectionConfig;
use remodesk_viewer::receiver;
use remodesk_viewer::state::ViewerShared;

/// Poll `check` until it passes or ten seconds elapse.
fn wait_until(check: impl Fn() -> bool, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if check() {
            return;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    panic!("timed out waiting for {what}");
}

#[test]
fn receives_frames_and_reconnects() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let config = ConnectionConfig {
        host: "127.0.0.1".into(),
        port: addr.port(),
        transport: "direct".into(),
        user: String::new(),
        password: String::new(),
    };
    let shared = Arc::new(ViewerShared::new(ScreenSize::new(1280, 720)));
    receiver::spawn(config, Arc::clone(&shared));

    // ── First connection: a compressed stream ────────────────────
    let (mut conn, _) = listener.accept().unwrap();
    let payload = compress(b"picture-bytes", CompressionParams::from_level(40)).unwrap();
    conn.write_all(&Frame::new(payload.into(), 1920, 1080).to_bytes())
        .unwrap();

    let cell = Arc::clone(&shared);
    wait_until(
        move || cell.cell.snapshot() == Some(b"picture-bytes".to_vec()),
        "decompressed frame in the cell",
    );
    assert_eq!(shared.counters.snapshot().0, 1);
    // The new stream resolution is noted for the render loop to adopt.
    assert_eq!(
        shared.sizes.pending_adopt(),
        Some(ScreenSize::new(1920, 1080))
    );

    // ── Link failure: cell clears, machine dials again ───────────
    drop(conn);
    let cell = Arc::clone(&shared);
    wait_until(
        move || cell.cell.snapshot().is_none(),
        "cell cleared on reconnect",
    );

    // ── Second connection: an uncompressed stream ────────────────
    // The compression verdict is per connection, so raw bytes pass
    // straight through after the redial.
    let (mut conn, _) = listener.accept().unwrap();
    conn.write_all(&Frame::new(b"raw-image".to_vec().into(), 1280, 720).to_bytes())
        .unwrap();

    let cell = Arc::clone(&shared);
    wait_until(
        move || cell.cell.snapshot() == Some(b"raw-image".to_vec()),
        "raw frame after reconnect",
    );
    // Counters were reset by the reconnect.
    assert_eq!(shared.counters.snapshot(), (1, 9));

    shared.stop();
    drop(conn);
}
