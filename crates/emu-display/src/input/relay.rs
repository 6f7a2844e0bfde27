use super::types::KeyDownEvent;

/// Handle returned by [`EventRelay::subscribe`], used to unsubscribe.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

/// Multi-subscriber event.
///
/// Subscribers run synchronously on the emitting thread, in registration
/// order. Emitting with no subscribers does nothing.
pub struct EventRelay<E> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
}

/// The forwarded key-down event exposed by the display surface.
pub type KeyDownRelay = EventRelay<KeyDownEvent>;

impl<E> EventRelay<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        log::debug!("relay subscriber {:?} added ({} total)", id, self.subscribers.len());
        id
    }

    /// Removes a subscriber. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Delivers `event` to every subscriber exactly once.
    ///
    /// Returns the number of subscribers reached.
    pub fn emit(&mut self, event: &E) -> usize {
        for (_, handler) in self.subscribers.iter_mut() {
            handler(event);
        }
        self.subscribers.len()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<E> Default for EventRelay<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::input::{Key, KeyboardId};

    fn ev(device: u64, key: Key, code: u32) -> KeyDownEvent {
        KeyDownEvent::new(KeyboardId(device), key, code)
    }

    #[test]
    fn emit_without_subscribers_is_noop() {
        let mut relay = KeyDownRelay::new();
        assert_eq!(relay.emit(&ev(1, Key::A, 4)), 0);
        assert!(relay.is_empty());
    }

    #[test]
    fn every_subscriber_sees_event_once_unchanged() {
        let mut relay = KeyDownRelay::new();
        let seen_a = Rc::new(RefCell::new(Vec::new()));
        let seen_b = Rc::new(RefCell::new(Vec::new()));

        let a = seen_a.clone();
        relay.subscribe(move |e| a.borrow_mut().push(*e));
        let b = seen_b.clone();
        relay.subscribe(move |e| b.borrow_mut().push(*e));

        let event = ev(7, Key::Unknown(0x1234), 0x1234);
        assert_eq!(relay.emit(&event), 2);

        assert_eq!(*seen_a.borrow(), vec![event]);
        assert_eq!(*seen_b.borrow(), vec![event]);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let mut relay = KeyDownRelay::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for n in 0..3 {
            let order = order.clone();
            relay.subscribe(move |_| order.borrow_mut().push(n));
        }

        relay.emit(&ev(1, Key::Enter, 36));
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut relay = KeyDownRelay::new();
        let hits = Rc::new(RefCell::new(0));

        let h = hits.clone();
        let id = relay.subscribe(move |_| *h.borrow_mut() += 1);

        relay.emit(&ev(1, Key::Z, 29));
        assert!(relay.unsubscribe(id));
        assert!(!relay.unsubscribe(id));
        relay.emit(&ev(1, Key::Z, 29));

        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut relay: EventRelay<u32> = EventRelay::new();
        let a = relay.subscribe(|_| {});
        relay.unsubscribe(a);
        let b = relay.subscribe(|_| {});
        assert_ne!(a, b);
    }
}
