//! Publish/subscribe channel for engine events.
//!
//! A [`Signal`] holds an ordered list of subscribers. [`Signal::emit`] calls
//! each of them once, synchronously, in registration order. Subscribers see
//! the event by shared reference and cannot reach back into the emitter.

use smallvec::SmallVec;

type Subscriber<E> = Box<dyn FnMut(&E)>;

/// Identifies a subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

pub struct Signal<E> {
    subscribers: SmallVec<[(SubscriptionId, Subscriber<E>); 2]>,
    next_id: u32,
}

impl<E> Signal<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: SmallVec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::<u32>::new();

        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            signal.subscribe(move |v| log.borrow_mut().push(format!("{tag}{v}")));
        }

        signal.emit(&1);
        signal.emit(&2);
        assert_eq!(*log.borrow(), ["a1", "b1", "c1", "a2", "b2", "c2"]);
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut signal = Signal::<()>::new();

        let h = Rc::clone(&hits);
        let id = signal.subscribe(move |()| *h.borrow_mut() += 1);
        signal.emit(&());
        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        signal.emit(&());

        assert_eq!(*hits.borrow(), 1);
        assert!(signal.is_empty());
    }
}
