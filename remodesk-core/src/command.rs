//! Input-event commands for the viewer→host channel.
//!
//! Wire format: a 4-byte big-endian length prefix followed by a
//! bincode-serialised [`InputCommand`]. The tagged enum is the
//! validation boundary — a body that does not decode to a known
//! variant fails with [`RemoError::MalformedCommand`], which the
//! dispatcher logs and drops without closing the connection.
//!
//! Coordinates travel in the negotiated-resolution space: the viewer
//! rescales from its rendered viewport before sending, and the host
//! rescales to the native screen before injecting.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::RemoError;

/// Sanity cap on a single command body. A prefix above this is treated
/// as stream corruption rather than a droppable message.
pub const MAX_COMMAND_SIZE: usize = 16 * 1024;

// ── Wire enums ───────────────────────────────────────────────────

/// Whether a button or key is being pressed or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressState {
    Down,
    Up,
}

/// Pointer buttons carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// One input event relayed from a viewer to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputCommand {
    /// Pointer moved to `(x, y)`.
    MouseMove { x: u32, y: u32 },
    /// Pointer button pressed or released at `(x, y)`.
    MouseButton {
        state: PressState,
        x: u32,
        y: u32,
        button: PointerButton,
    },
    /// Key pressed or released, identified by its symbolic name
    /// (`"a"`, `"space"`, `"return"`, …).
    Key { state: PressState, key: String },
}

// ── Framing ──────────────────────────────────────────────────────

/// Serialize a command with its length prefix, ready for a socket write.
pub fn encode_command(cmd: &InputCommand) -> Result<Bytes, RemoError> {
    let body = bincode::serialize(cmd).map_err(|e| RemoError::Encoding(e.to_string()))?;
    let mut buf = BytesMut::with_capacity(4 + body.len());
    buf.put_u32(body.len() as u32);
    buf.put_slice(&body);
    Ok(buf.freeze())
}

/// Deserialize a command body (the bytes *after* the length prefix).
pub fn decode_command(body: &[u8]) -> Result<InputCommand, RemoError> {
    bincode::deserialize(body).map_err(|e| RemoError::MalformedCommand(e.to_string()))
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(cmd: InputCommand) {
        let framed = encode_command(&cmd).unwrap();
        let len = u32::from_be_bytes(framed[0..4].try_into().unwrap()) as usize;
        assert_eq!(len, framed.len() - 4);
        assert_eq!(decode_command(&framed[4..]).unwrap(), cmd);
    }

    #[test]
    fn mouse_move_roundtrip() {
        roundtrip(InputCommand::MouseMove { x: 640, y: 360 });
    }

    #[test]
    fn mouse_button_roundtrip() {
        roundtrip(InputCommand::MouseButton {
            state: PressState::Down,
            x: 100,
            y: 50,
            button: PointerButton::Left,
        });
        roundtrip(InputCommand::MouseButton {
            state: PressState::Up,
            x: 0,
            y: 0,
            button: PointerButton::Right,
        });
    }

    #[test]
    fn key_roundtrip() {
        roundtrip(InputCommand::Key {
            state: PressState::Down,
            key: "left shift".into(),
        });
    }

    #[test]
    fn garbage_is_malformed() {
        let err = decode_command(&[0xFF, 0xFE, 0xFD]).unwrap_err();
        assert!(matches!(err, RemoError::MalformedCommand(_)));
    }

    #[test]
    fn unknown_variant_is_malformed() {
        // Variant index far beyond the enum definition.
        let body = bincode::serialize(&42u32).unwrap();
        assert!(decode_command(&body).is_err());
    }
}
