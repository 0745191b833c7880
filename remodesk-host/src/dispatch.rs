//! Per-viewer command dispatcher.
//!
//! Reads one length-prefixed command at a time from the viewer's
//! socket, rescales coordinates from the declared viewport (the encode
//! resolution) to the native screen, and forwards the event to the
//! input sink.
//!
//! A malformed body is logged and dropped — the connection stays open.
//! A read failure ends this task only; the viewer is *not* removed
//! from the broadcast set here. Eviction happens lazily on the next
//! failed broadcast write, so frame-channel death and command-channel
//! death are detected independently.

use std::sync::{Arc, Mutex};

use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tracing::{info, warn};

use remodesk_core::{
    InputCommand, MAX_COMMAND_SIZE, RemoError, ScreenSize, decode_command, scale_point,
};

use crate::inject::InputSink;

/// Run one viewer's dispatcher until its command channel dies.
pub async fn run(
    mut stream: OwnedReadHalf,
    peer: std::net::SocketAddr,
    viewport: ScreenSize,
    native: Arc<Mutex<ScreenSize>>,
    sink: Arc<dyn InputSink>,
) {
    let mut prefix = [0u8; 4];

    loop {
        if let Err(e) = stream.read_exact(&mut prefix).await {
            if e.kind() != std::io::ErrorKind::UnexpectedEof {
                warn!("{peer}: command channel error: {e}");
            }
            break;
        }

        let len = u32::from_be_bytes(prefix) as usize;
        if len > MAX_COMMAND_SIZE {
            // Framing is unrecoverable past this point.
            warn!(
                "{peer}: {}",
                RemoError::CommandTooLarge {
                    size: len,
                    max: MAX_COMMAND_SIZE
                }
            );
            break;
        }

        let mut body = vec![0u8; len];
        if let Err(e) = stream.read_exact(&mut body).await {
            warn!("{peer}: command channel error: {e}");
            break;
        }

        match decode_command(&body) {
            Ok(cmd) => {
                let screen = *native.lock().unwrap();
                if let Err(e) = apply(&cmd, viewport, screen, sink.as_ref()) {
                    warn!("{peer}: input injection failed: {e}");
                }
            }
            Err(e) => warn!("{peer}: dropped command: {e}"),
        }
    }

    info!("{peer}: command dispatcher stopped");
}

/// Translate one command into native coordinates and forward it.
fn apply(
    cmd: &InputCommand,
    viewport: ScreenSize,
    native: ScreenSize,
    sink: &dyn InputSink,
) -> Result<(), RemoError> {
    match cmd {
        InputCommand::MouseMove { x, y } => {
            let (nx, ny) = scale_point(*x, *y, viewport, native);
            sink.pointer_move(nx, ny)
        }
        InputCommand::MouseButton {
            state,
            x,
            y,
            button,
        } => {
            let (nx, ny) = scale_point(*x, *y, viewport, native);
            sink.pointer_button(*button, *state, nx, ny)
        }
        InputCommand::Key { state, key } => sink.key(key, *state),
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use remodesk_core::{PointerButton, PressState};

    #[derive(Debug, PartialEq)]
    enum Injected {
        Move(u32, u32),
        Button(PointerButton, PressState, u32, u32),
        Key(String, PressState),
    }

    #[derive(Default)]
    struct TestSink(Mutex<Vec<Injected>>);

    impl InputSink for TestSink {
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

    const VIEWPORT: ScreenSize = ScreenSize::new(1280, 720);
    const NATIVE: ScreenSize = ScreenSize::new(1920, 1080);

    #[test]
    fn mouse_button_is_rescaled_to_native() {
        let sink = TestSink::default();
        apply(
            &InputCommand::MouseButton {
                state: PressState::Down,
                x: 100,
                y: 50,
                button: PointerButton::Left,
            },
            VIEWPORT,
            NATIVE,
            &sink,
        )
        .unwrap();

        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![Injected::Button(
                PointerButton::Left,
                PressState::Down,
                150,
                75
            )]
        );
    }

    #[test]
    fn mouse_move_is_rescaled_to_native() {
        let sink = TestSink::default();
        apply(
            &InputCommand::MouseMove { x: 640, y: 360 },
            VIEWPORT,
            NATIVE,
            &sink,
        )
        .unwrap();
        assert_eq!(*sink.0.lock().unwrap(), vec![Injected::Move(960, 540)]);
    }

    #[test]
    fn key_passes_through_untranslated() {
        let sink = TestSink::default();
        apply(
            &InputCommand::Key {
                state: PressState::Up,
                key: "space".into(),
            },
            VIEWPORT,
            NATIVE,
            &sink,
        )
        .unwrap();
        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![Injected::Key("space".into(), PressState::Up)]
        );
    }
}
