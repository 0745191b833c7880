//! OS pointer and keyboard injection collaborator.
//!
//! [`InputSink`] is the narrow interface the command dispatcher talks
//! to; [`SystemInput`] is the production implementation.
//!
//! # Platform
//!
//! Windows-only (`SendInput`). On other platforms the sink is defined
//! but every method returns an error, which the dispatcher logs.

use remodesk_core::{PointerButton, PressState, RemoError};

// ── InputSink ────────────────────────────────────────────────────

/// Receives translated input events in native screen coordinates.
pub trait InputSink: Send + Sync {
    /// Move the pointer to `(x, y)`.
    fn pointer_move(&self, x: u32, y: u32) -> Result<(), RemoError>;

    /// Press or release a pointer button at `(x, y)`.
    fn pointer_button(
        &self,
        button: PointerButton,
        state: PressState,
        x: u32,
        y: u32,
    ) -> Result<(), RemoError>;

    /// Press or release a key by symbolic name.
    fn key(&self, name: &str, state: PressState) -> Result<(), RemoError>;
}

// ── SystemInput ──────────────────────────────────────────────────

/// Injects events into the OS input stream.
///
/// `SendInput` requires the process to run in the same desktop
/// session as the screen being controlled.
pub struct SystemInput;

impl SystemInput {
    /// Create a new injector (no initialisation cost).
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemInput {
    fn default() -> Self {
        Self::new()
    }
}

// ── Windows implementation ───────────────────────────────────────

#[cfg(target_os = "windows")]
mod platform {
    use super::*;
    use crate::keymap;
    use windows::Win32::UI::Input::KeyboardAndMouse::*;

    /// Convert native pixel coordinates to the 0..65535 absolute space
    /// `SendInput` expects.
    fn absolute(x: u32, y: u32) -> Result<(i32, i32), RemoError> {
        let (screen_w, screen_h) = unsafe {
            use windows::Win32::UI::WindowsAndMessaging::*;
            (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN))
        };
        if screen_w == 0 || screen_h == 0 {
            return Err(RemoError::Injection("GetSystemMetrics returned 0".into()));
        }
        Ok((
            (x as i64 * 65535 / screen_w as i64) as i32,
            (y as i64 * 65535 / screen_h as i64) as i32,
        ))
    }

    fn send_mouse(flags: MOUSE_EVENT_FLAGS, dx: i32, dy: i32) -> Result<(), RemoError> {
        let input = INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx,
                    dy,
                    mouseData: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };
        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent == 0 {
            return Err(RemoError::Injection("SendInput (mouse) returned 0".into()));
        }
        Ok(())
    }

    impl InputSink for SystemInput {
        fn pointer_move(&self, x: u32, y: u32) -> Result<(), RemoError> {
            let (dx, dy) = absolute(x, y)?;
            send_mouse(MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE, dx, dy)
        }

        fn pointer_button(
            &self,
            button: PointerButton,
            state: PressState,
            x: u32,
            y: u32,
        ) -> Result<(), RemoError> {
            let (dx, dy) = absolute(x, y)?;

            let action = match (button, state) {
                (PointerButton::Left, PressState::Down) => MOUSEEVENTF_LEFTDOWN,
                (PointerButton::Left, PressState::Up) => MOUSEEVENTF_LEFTUP,
                (PointerButton::Middle, PressState::Down) => MOUSEEVENTF_MIDDLEDOWN,
                (PointerButton::Middle, PressState::Up) => MOUSEEVENTF_MIDDLEUP,
                (PointerButton::Right, PressState::Down) => MOUSEEVENTF_RIGHTDOWN,
                (PointerButton::Right, PressState::Up) => MOUSEEVENTF_RIGHTUP,
            };

            // Position first so the click lands where the viewer aimed.
            send_mouse(
                MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE | action,
                dx,
                dy,
            )
        }

        fn key(&self, name: &str, state: PressState) -> Result<(), RemoError> {
            let vk = keymap::virtual_key(name)
                .ok_or_else(|| RemoError::Injection(format!("unknown key: {name}")))?;

            let mut flags = KEYBD_EVENT_FLAGS(0);
            if state == PressState::Up {
                flags |= KEYEVENTF_KEYUP;
            }

            let input = INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: VIRTUAL_KEY(vk),
                        wScan: 0,
                        dwFlags: flags,
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            };
            let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
            if sent == 0 {
                return Err(RemoError::Injection(
                    "SendInput (keyboard) returned 0".into(),
                ));
            }
            Ok(())
        }
    }
}

// ── Non-Windows stub ─────────────────────────────────────────────

#[cfg(not(target_os = "windows"))]
mod platform {
    use super::*;

    impl InputSink for SystemInput {
        fn pointer_move(&self, _x: u32, _y: u32) -> Result<(), RemoError> {
            Err(RemoError::Injection(
                "input injection is only available on Windows".into(),
            ))
        }

        fn pointer_button(
            &self,
            _button: PointerButton,
            _state: PressState,
            _x: u32,
            _y: u32,
        ) -> Result<(), RemoError> {
            Err(RemoError::Injection(
                "input injection is only available on Windows".into(),
            ))
        }

        fn key(&self, _name: &str, _state: PressState) -> Result<(), RemoError> {
            Err(RemoError::Injection(
                "input injection is only available on Windows".into(),
            ))
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injector_creates_without_error() {
        let _sink = SystemInput::new();
    }
}
