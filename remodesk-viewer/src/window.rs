//! Render surface and local GUI event polling, wrapped over `minifb`.
//!
//! `minifb` is polled, not event-driven, so the surface diffs key and
//! button state between ticks to synthesize down/up events. The frame
//! buffer is blitted at the negotiated resolution and stretched to the
//! window by the scale mode, which is what resizes it to the viewport.

use image::RgbImage;
use minifb::{Key, MouseButton, MouseMode, ScaleMode, Window, WindowOptions};

use remodesk_core::{PointerButton, PressState, RemoError, ScreenSize};

// ── SurfaceEvent ─────────────────────────────────────────────────

/// Events the render loop acts on once per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Window closed by the user.
    Quit,
    /// The viewport was resized locally.
    Resized(ScreenSize),
    /// Pointer moved (viewport coordinates).
    PointerMoved(u32, u32),
    /// Pointer button transition (viewport coordinates).
    PointerButton {
        button: PointerButton,
        state: PressState,
        x: u32,
        y: u32,
    },
    /// Key transition, by symbolic name.
    Key { name: String, state: PressState },
}

// ── Surface ──────────────────────────────────────────────────────

/// The viewer window plus the input state needed to diff ticks.
pub struct Surface {
    window: Window,
    title: String,
    size: ScreenSize,
    buffer: Vec<u32>,
    prev_keys: Vec<Key>,
    prev_buttons: [bool; 3],
    prev_pointer: (u32, u32),
}

/// Render tick rate.
const TARGET_FPS: usize = 30;

impl Surface {
    /// Open a resizable window.
    pub fn new(title: &str, size: ScreenSize) -> Result<Self, RemoError> {
        let window = Self::open_window(title, size)?;
        Ok(Self {
            window,
            title: title.to_string(),
            size,
            buffer: vec![0; size.width as usize * size.height as usize],
            prev_keys: Vec::new(),
            prev_buttons: [false; 3],
            prev_pointer: (0, 0),
        })
    }

    fn open_window(title: &str, size: ScreenSize) -> Result<Window, RemoError> {
        let mut window = Window::new(
            title,
            size.width as usize,
            size.height as usize,
            WindowOptions {
                resize: true,
                scale_mode: ScaleMode::Stretch,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| RemoError::Surface(e.to_string()))?;
        window.set_target_fps(TARGET_FPS);
        Ok(window)
    }

    /// Recreate the window at a new negotiated size.
    pub fn recreate(&mut self, size: ScreenSize) -> Result<(), RemoError> {
        self.window = Self::open_window(&self.title, size)?;
        self.size = size;
        self.prev_keys.clear();
        self.prev_buttons = [false; 3];
        Ok(())
    }

    /// Whether the window is still open.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// The realized viewport size.
    pub fn viewport(&self) -> ScreenSize {
        let (w, h) = self.window.get_size();
        ScreenSize::new(w as u32, h as u32)
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// Collect this tick's events by diffing against the last tick.
    pub fn poll(&mut self) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();

        if !self.window.is_open() {
            events.push(SurfaceEvent::Quit);
            return events;
        }

        let viewport = self.viewport();
        if viewport != self.size {
            self.size = viewport;
            events.push(SurfaceEvent::Resized(viewport));
        }

        let pointer = self
            .window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x.max(0.0) as u32, y.max(0.0) as u32))
            .unwrap_or(self.prev_pointer);
        if pointer != self.prev_pointer {
            self.prev_pointer = pointer;
            events.push(SurfaceEvent::PointerMoved(pointer.0, pointer.1));
        }

        let buttons = [
            self.window.get_mouse_down(MouseButton::Left),
            self.window.get_mouse_down(MouseButton::Middle),
            self.window.get_mouse_down(MouseButton::Right),
        ];
        for (i, kind) in [
            PointerButton::Left,
            PointerButton::Middle,
            PointerButton::Right,
        ]
        .into_iter()
        .enumerate()
        {
            if buttons[i] != self.prev_buttons[i] {
                events.push(SurfaceEvent::PointerButton {
                    button: kind,
                    state: if buttons[i] {
                        PressState::Down
                    } else {
                        PressState::Up
                    },
                    x: pointer.0,
                    y: pointer.1,
                });
            }
        }
        self.prev_buttons = buttons;

        let keys = self.window.get_keys();
        for key in &keys {
            if !self.prev_keys.contains(key) {
                if let Some(name) = key_name(*key) {
                    events.push(SurfaceEvent::Key {
                        name: name.to_string(),
                        state: PressState::Down,
                    });
                }
            }
        }
        for key in &self.prev_keys {
            if !keys.contains(key) {
                if let Some(name) = key_name(*key) {
                    events.push(SurfaceEvent::Key {
                        name: name.to_string(),
                        state: PressState::Up,
                    });
                }
            }
        }
        self.prev_keys = keys;

        events
    }

    /// Draw a decoded frame, stretching to the viewport when the sizes
    /// differ.
    pub fn blit(&mut self, image: &RgbImage) -> Result<(), RemoError> {
        let (w, h) = image.dimensions();
        self.buffer.clear();
        self.buffer.reserve(w as usize * h as usize);
        for px in image.pixels() {
            let [r, g, b] = px.0;
            self.buffer
                .push((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b));
        }
        self.window
            .update_with_buffer(&self.buffer, w as usize, h as usize)
            .map_err(|e| RemoError::Surface(e.to_string()))
    }

    /// Tick the window without new frame content.
    pub fn idle(&mut self) {
        self.window.update();
    }
}

// ── Key names ────────────────────────────────────────────────────

/// Symbolic name for a key, as carried on the wire.
pub fn key_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::A => "a",
        Key::B => "b",
        Key::C => "c",
        Key::D => "d",
        Key::E => "e",
        Key::F => "f",
        Key::G => "g",
        Key::H => "h",
        Key::I => "i",
        Key::J => "j",
        Key::K => "k",
        Key::L => "l",
        Key::M => "m",
        Key::N => "n",
        Key::O => "o",
        Key::P => "p",
        Key::Q => "q",
        Key::R => "r",
        Key::S => "s",
        Key::T => "t",
        Key::U => "u",
        Key::V => "v",
        Key::W => "w",
        Key::X => "x",
        Key::Y => "y",
        Key::Z => "z",
        Key::Key0 => "0",
        Key::Key1 => "1",
        Key::Key2 => "2",
        Key::Key3 => "3",
        Key::Key4 => "4",
        Key::Key5 => "5",
        Key::Key6 => "6",
        Key::Key7 => "7",
        Key::Key8 => "8",
        Key::Key9 => "9",
        Key::Space => "space",
        Key::Enter => "return",
        Key::Escape => "escape",
        Key::Tab => "tab",
        Key::Backspace => "backspace",
        Key::Delete => "delete",
        Key::Insert => "insert",
        Key::Home => "home",
        Key::End => "end",
        Key::PageUp => "page up",
        Key::PageDown => "page down",
        Key::Left => "left",
        Key::Up => "up",
        Key::Right => "right",
        Key::Down => "down",
        Key::LeftShift => "left shift",
        Key::RightShift => "right shift",
        Key::LeftCtrl => "left ctrl",
        Key::RightCtrl => "right ctrl",
        Key::LeftAlt => "left alt",
        Key::RightAlt => "right alt",
        Key::LeftSuper => "left super",
        Key::RightSuper => "right super",
        Key::CapsLock => "caps lock",
        Key::NumLock => "num lock",
        Key::ScrollLock => "scroll lock",
        Key::Pause => "pause",
        Key::Menu => "menu",
        Key::Minus => "minus",
        Key::Equal => "equals",
        Key::Comma => "comma",
        Key::Period => "period",
        Key::Slash => "slash",
        Key::Backslash => "backslash",
        Key::Semicolon => "semicolon",
        Key::Apostrophe => "apostrophe",
        Key::Backquote => "grave",
        Key::LeftBracket => "left bracket",
        Key::RightBracket => "right bracket",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        _ => return None,
    };
    Some(name)
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_match_the_host_keymap_style() {
        assert_eq!(key_name(Key::A), Some("a"));
        assert_eq!(key_name(Key::Key7), Some("7"));
        assert_eq!(key_name(Key::Enter), Some("return"));
        assert_eq!(key_name(Key::LeftShift), Some("left shift"));
        assert_eq!(key_name(Key::Unknown), None);
    }
}
