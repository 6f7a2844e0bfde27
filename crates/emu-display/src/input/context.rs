use super::types::{KeyDownEvent, KeyboardId};

/// Input context for one window.
///
/// Keyboards are detected the first time they produce an event. While the
/// key-down forwarder is subscribed, every key-down from every detected
/// keyboard is passed through unchanged; there is no filtering and no key
/// state tracking.
#[derive(Debug, Default)]
pub struct InputContext {
    keyboards: Vec<KeyboardId>,
    key_down_subscribed: bool,
}

impl InputContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keyboards seen so far, in detection order.
    pub fn keyboards(&self) -> &[KeyboardId] {
        &self.keyboards
    }

    /// Records a keyboard. Returns `true` if it was not known yet.
    pub fn detect(&mut self, id: KeyboardId) -> bool {
        if self.keyboards.contains(&id) {
            return false;
        }
        self.keyboards.push(id);
        log::debug!("detected {id} ({} keyboard(s))", self.keyboards.len());
        true
    }

    /// Hooks the key-down forwarder to every keyboard, current and future.
    pub fn subscribe_key_down(&mut self) {
        self.key_down_subscribed = true;
    }

    pub fn unsubscribe_key_down(&mut self) {
        self.key_down_subscribed = false;
    }

    pub fn is_key_down_subscribed(&self) -> bool {
        self.key_down_subscribed
    }

    /// Routes one raw key-down: detects its device and returns the event to
    /// forward, or `None` while unsubscribed.
    pub fn route(&mut self, event: KeyDownEvent) -> Option<KeyDownEvent> {
        self.detect(event.device);
        self.key_down_subscribed.then_some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    #[test]
    fn keyboards_are_detected_once_in_order() {
        let mut ctx = InputContext::new();
        assert!(ctx.detect(KeyboardId(3)));
        assert!(ctx.detect(KeyboardId(1)));
        assert!(!ctx.detect(KeyboardId(3)));
        assert_eq!(ctx.keyboards(), &[KeyboardId(3), KeyboardId(1)]);
    }

    #[test]
    fn route_forwards_only_while_subscribed() {
        let mut ctx = InputContext::new();
        let event = KeyDownEvent::new(KeyboardId(9), Key::Space, 57);

        assert_eq!(ctx.route(event), None);
        assert_eq!(ctx.keyboards(), &[KeyboardId(9)]);

        ctx.subscribe_key_down();
        assert_eq!(ctx.route(event), Some(event));

        ctx.unsubscribe_key_down();
        assert_eq!(ctx.route(event), None);
    }

    #[test]
    fn new_devices_are_forwarded_after_subscription() {
        let mut ctx = InputContext::new();
        ctx.subscribe_key_down();

        let late = KeyDownEvent::new(KeyboardId(42), Key::F1, 59);
        assert_eq!(ctx.route(late), Some(late));
        assert_eq!(ctx.keyboards(), &[KeyboardId(42)]);
    }
}
