//! Local input → wire commands.
//!
//! Pointer positions are rescaled from the rendered viewport to the
//! negotiated resolution before they leave the viewer — the inverse
//! direction of the host's negotiated→native transform. When the
//! viewport matches the negotiated size the transform is the identity.

use remodesk_core::{InputCommand, ScreenSize, scale_point};

use crate::window::SurfaceEvent;

/// Build the command for a surface event, if it carries input.
pub fn translate(
    event: &SurfaceEvent,
    viewport: ScreenSize,
    negotiated: ScreenSize,
) -> Option<InputCommand> {
    match event {
        SurfaceEvent::PointerMoved(x, y) => {
            let (nx, ny) = scale_point(*x, *y, viewport, negotiated);
            Some(InputCommand::MouseMove { x: nx, y: ny })
        }
        SurfaceEvent::PointerButton {
            button,
            state,
            x,
            y,
        } => {
            let (nx, ny) = scale_point(*x, *y, viewport, negotiated);
            Some(InputCommand::MouseButton {
                state: *state,
                x: nx,
                y: ny,
                button: *button,
            })
        }
        SurfaceEvent::Key { name, state } => Some(InputCommand::Key {
            state: *state,
            key: name.clone(),
        }),
        SurfaceEvent::Quit | SurfaceEvent::Resized(_) => None,
    }
}

// ── Tests ────────────────────────────────────────────────────────
