//! Symbolic key name → Windows virtual-key code table.
//!
//! The wire carries keys by the symbolic names the viewer's window
//! layer produces (`"a"`, `"space"`, `"left shift"`, …); the injector
//! resolves them here. Unknown names are reported back to the
//! dispatcher, which logs and drops the event.

/// Resolve a symbolic key name to a Win32 virtual-key code.
pub fn virtual_key(name: &str) -> Option<u16> {
    // Single characters: letters and digits map directly.
    if name.len() == 1 {
        let c = name.as_bytes()[0];
        match c {
            b'a'..=b'z' => return Some(u16::from(c) - u16::from(b'a') + 0x41),
            b'0'..=b'9' => return Some(u16::from(c) - u16::from(b'0') + 0x30),
            _ => {}
        }
    }

    let vk = match name {
        "space" => 0x20,
        "return" | "enter" => 0x0D,
        "escape" => 0x1B,
        "tab" => 0x09,
        "backspace" => 0x08,
        "delete" => 0x2E,
        "insert" => 0x2D,
        "home" => 0x24,
        "end" => 0x23,
        "page up" => 0x21,
        "page down" => 0x22,
        "left" => 0x25,
        "up" => 0x26,
        "right" => 0x27,
        "down" => 0x28,
        "left shift" => 0xA0,
        "right shift" => 0xA1,
        "left ctrl" => 0xA2,
        "right ctrl" => 0xA3,
        "left alt" => 0xA4,
        "right alt" => 0xA5,
        "left super" => 0x5B,
        "right super" => 0x5C,
        "caps lock" => 0x14,
        "num lock" => 0x90,
        "scroll lock" => 0x91,
        "pause" => 0x13,
        "print screen" => 0x2C,
        "menu" => 0x5D,
        "minus" => 0xBD,
        "equals" => 0xBB,
        "comma" => 0xBC,
        "period" => 0xBE,
        "slash" => 0xBF,
        "backslash" => 0xDC,
        "semicolon" => 0xBA,
        "apostrophe" => 0xDE,
        "grave" => 0xC0,
        "left bracket" => 0xDB,
        "right bracket" => 0xDD,
        "f1" => 0x70,
        "f2" => 0x71,
        "f3" => 0x72,
        "f4" => 0x73,
        "f5" => 0x74,
        "f6" => 0x75,
        "f7" => 0x76,
        "f8" => 0x77,
        "f9" => 0x78,
        "f10" => 0x79,
        "f11" => 0x7A,
        "f12" => 0x7B,
        _ => return None,
    };
    Some(vk)
}

// ── Tests ────────────────────────────────────────────────────────
