use std::fmt;

/// Keyboard key identifier.
///
/// Covers the keys an emulator front-end typically binds. Anything else
/// arrives as `Key::Unknown` carrying the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Modifiers are ordinary keys here; emulators bind them as buttons.
    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

/// Stable identifier of one physical keyboard.
///
/// Derived from the platform device handle; equal ids mean the same device
/// for the lifetime of the process.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct KeyboardId(pub u64);

/// A raw key-down as delivered by a keyboard device.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct KeyDownEvent {
    pub device: KeyboardId,
    pub key: Key,
    /// Platform key code, preserved unchanged.
    pub code: u32,
}

impl KeyDownEvent {
    #[inline]
    pub const fn new(device: KeyboardId, key: Key, code: u32) -> Self {
        Self { device, key, code }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for KeyboardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keyboard#{:x}", self.0)
    }
}
