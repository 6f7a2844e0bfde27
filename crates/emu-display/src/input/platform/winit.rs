use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use winit::event::{DeviceId, ElementState, KeyEvent};
use winit::keyboard::{KeyCode, NativeKeyCode, PhysicalKey};

use crate::input::{Key, KeyDownEvent, KeyboardId};

/// Translates a winit keyboard event into a key-down.
///
/// Returns `None` for releases and auto-repeats: one physical press yields
/// exactly one key-down.
pub fn translate_key_down(device_id: DeviceId, event: &KeyEvent) -> Option<KeyDownEvent> {
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }

    let (key, code) = map_key(event.physical_key);
    Some(KeyDownEvent::new(keyboard_id(device_id), key, code))
}

/// Stable id for a winit device handle.
///
/// `DeviceId` is opaque; hashing it gives a value that is equal for equal
/// handles within one process.
pub fn keyboard_id(device_id: DeviceId) -> KeyboardId {
    let mut hasher = DefaultHasher::new();
    device_id.hash(&mut hasher);
    KeyboardId(hasher.finish())
}

/// Scancode-ish numeric for keys winit could not identify.
fn native_code(native: NativeKeyCode) -> u32 {
    match native {
        NativeKeyCode::Unidentified => 0,
        NativeKeyCode::Android(c) => c,
        NativeKeyCode::MacOS(c) => c as u32,
        NativeKeyCode::Windows(c) => c as u32,
        NativeKeyCode::Xkb(c) => c,
    }
}

pub(crate) fn map_key(pk: PhysicalKey) -> (Key, u32) {
    match pk {
        PhysicalKey::Code(code) => {
            let key = match code {
                KeyCode::Escape => Key::Escape,
                KeyCode::Enter => Key::Enter,
                KeyCode::Tab => Key::Tab,
                KeyCode::Backspace => Key::Backspace,
                KeyCode::Space => Key::Space,

                KeyCode::Insert => Key::Insert,
                KeyCode::Delete => Key::Delete,
                KeyCode::Home => Key::Home,
                KeyCode::End => Key::End,
                KeyCode::PageUp => Key::PageUp,
                KeyCode::PageDown => Key::PageDown,

                KeyCode::ArrowUp => Key::ArrowUp,
                KeyCode::ArrowDown => Key::ArrowDown,
                KeyCode::ArrowLeft => Key::ArrowLeft,
                KeyCode::ArrowRight => Key::ArrowRight,

                KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
                KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
                KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
                KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,

                KeyCode::KeyA => Key::A,
                KeyCode::KeyB => Key::B,
                KeyCode::KeyC => Key::C,
                KeyCode::KeyD => Key::D,
                KeyCode::KeyE => Key::E,
                KeyCode::KeyF => Key::F,
                KeyCode::KeyG => Key::G,
                KeyCode::KeyH => Key::H,
                KeyCode::KeyI => Key::I,
                KeyCode::KeyJ => Key::J,
                KeyCode::KeyK => Key::K,
                KeyCode::KeyL => Key::L,
                KeyCode::KeyM => Key::M,
                KeyCode::KeyN => Key::N,
                KeyCode::KeyO => Key::O,
                KeyCode::KeyP => Key::P,
                KeyCode::KeyQ => Key::Q,
                KeyCode::KeyR => Key::R,
                KeyCode::KeyS => Key::S,
                KeyCode::KeyT => Key::T,
                KeyCode::KeyU => Key::U,
                KeyCode::KeyV => Key::V,
                KeyCode::KeyW => Key::W,
                KeyCode::KeyX => Key::X,
                KeyCode::KeyY => Key::Y,
                KeyCode::KeyZ => Key::Z,

                KeyCode::Digit0 => Key::Digit0,
                KeyCode::Digit1 => Key::Digit1,
                KeyCode::Digit2 => Key::Digit2,
                KeyCode::Digit3 => Key::Digit3,
                KeyCode::Digit4 => Key::Digit4,
                KeyCode::Digit5 => Key::Digit5,
                KeyCode::Digit6 => Key::Digit6,
                KeyCode::Digit7 => Key::Digit7,
                KeyCode::Digit8 => Key::Digit8,
                KeyCode::Digit9 => Key::Digit9,

                KeyCode::F1 => Key::F1,
                KeyCode::F2 => Key::F2,
                KeyCode::F3 => Key::F3,
                KeyCode::F4 => Key::F4,
                KeyCode::F5 => Key::F5,
                KeyCode::F6 => Key::F6,
                KeyCode::F7 => Key::F7,
                KeyCode::F8 => Key::F8,
                KeyCode::F9 => Key::F9,
                KeyCode::F10 => Key::F10,
                KeyCode::F11 => Key::F11,
                KeyCode::F12 => Key::F12,

                other => Key::Unknown(other as u32),
            };

            (key, code as u32)
        }

        PhysicalKey::Unidentified(native) => {
            let code = native_code(native);
            (Key::Unknown(code), code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_digits_map_to_named_keys() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyA)).0, Key::A);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Digit7)).0, Key::Digit7);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowLeft)).0, Key::ArrowLeft);
    }

    #[test]
    fn left_and_right_modifiers_collapse() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftLeft)).0, Key::Shift);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftRight)).0, Key::Shift);
    }

    #[test]
    fn code_is_the_platform_key_code() {
        let (_, code) = map_key(PhysicalKey::Code(KeyCode::Enter));
        assert_eq!(code, KeyCode::Enter as u32);
    }

    #[test]
    fn unmapped_keys_keep_their_code() {
        let (key, code) = map_key(PhysicalKey::Code(KeyCode::NumpadAdd));
        assert_eq!(key, Key::Unknown(KeyCode::NumpadAdd as u32));
        assert_eq!(code, KeyCode::NumpadAdd as u32);
    }

    #[test]
    fn unidentified_native_codes_are_preserved() {
        let (key, code) = map_key(PhysicalKey::Unidentified(NativeKeyCode::Xkb(0x9f)));
        assert_eq!((key, code), (Key::Unknown(0x9f), 0x9f));
    }

    #[test]
    fn dummy_device_has_stable_id() {
        // SAFETY: the dummy id is only compared, never passed back to winit.
        let dev = unsafe { DeviceId::dummy() };
        assert_eq!(keyboard_id(dev), keyboard_id(dev));
    }
}
