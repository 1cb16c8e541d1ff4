//! Instance-scoped broadcast channel used for every device event stream.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Observable::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Owned list of subscribers for one event stream.
///
/// Handlers run synchronously in subscription order. Subscribing, unsubscribing
/// or clearing from inside a handler is allowed: the change applies to the
/// handlers that have not run yet. An event notified from inside a handler is
/// queued and delivered to every subscriber once the current event finishes.
pub struct Observable<T> {
    handlers: RefCell<Vec<(SubscriptionId, Handler<T>)>>,
    next_id: Cell<u64>,
    pending: RefCell<VecDeque<T>>,
    dispatching: Cell<bool>,
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl<T> Observable<T> {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    pub fn subscribe(&self, handler: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(handler))));
        id
    }

    /// Removes a subscriber. Returns `false` when the id is unknown (already removed or cleared).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Drops every subscriber.
    pub fn clear(&self) {
        // Take first so handler destructors run without the list borrowed.
        let dropped = std::mem::take(&mut *self.handlers.borrow_mut());
        drop(dropped);
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.handlers
            .borrow()
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    fn dispatch(&self, event: &T) {
        let snapshot: Vec<(SubscriptionId, Handler<T>)> = self
            .handlers
            .borrow()
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();

        for (id, handler) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => (*handler)(event),
                Err(_) => log::warn!("Skipping re-entrant notification for {:?}", id),
            }
        }
    }
}

impl<T: Clone> Observable<T> {
    /// Delivers `event` to every current subscriber.
    ///
    /// Called from inside a handler of this stream, the event is queued behind
    /// the one being delivered, so every subscriber sees events in order.
    pub fn notify(&self, event: &T) {
        if self.dispatching.get() {
            self.pending.borrow_mut().push_back(event.clone());
            return;
        }

        self.dispatching.set(true);
        let _guard = DispatchGuard(&self.dispatching);
        self.dispatch(event);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(queued) => self.dispatch(&queued),
                None => break,
            }
        }
    }
}

/// Resets the dispatching flag even if a handler panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_in_subscription_order() {
        let observable = Observable::<i32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = seen.clone();
        observable.subscribe(move |value| first.borrow_mut().push(("a", *value)));
        let second = seen.clone();
        observable.subscribe(move |value| second.borrow_mut().push(("b", *value)));

        observable.notify(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn unsubscribe_and_clear_stop_delivery() {
        let observable = Observable::<i32>::new();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        let id = observable.subscribe(move |_| c.set(c.get() + 1));
        observable.notify(&1);
        assert!(observable.unsubscribe(id));
        assert!(!observable.unsubscribe(id));
        observable.notify(&2);
        assert_eq!(count.get(), 1);

        let c = count.clone();
        observable.subscribe(move |_| c.set(c.get() + 1));
        observable.clear();
        observable.notify(&3);
        assert_eq!(count.get(), 1);
        assert!(observable.is_empty());
    }

    #[test]
    fn clear_from_inside_handler_skips_remaining_subscribers() {
        let observable = Rc::new(Observable::<i32>::new());
        let count = Rc::new(Cell::new(0));

        let inner = observable.clone();
        observable.subscribe(move |_| inner.clear());
        let c = count.clone();
        observable.subscribe(move |_| c.set(c.get() + 1));

        observable.notify(&1);
        assert_eq!(count.get(), 0);
        assert!(observable.is_empty());
    }

    #[test]
    fn nested_notifications_are_queued_in_order() {
        let observable = Rc::new(Observable::<i32>::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner = observable.clone();
        let first = seen.clone();
        observable.subscribe(move |value| {
            first.borrow_mut().push(("a", *value));
            if *value == 1 {
                inner.notify(&2);
                inner.notify(&3);
            }
        });
        let second = seen.clone();
        observable.subscribe(move |value| second.borrow_mut().push(("b", *value)));

        observable.notify(&1);
        assert_eq!(
            *seen.borrow(),
            vec![("a", 1), ("b", 1), ("a", 2), ("b", 2), ("a", 3), ("b", 3)]
        );

        // dispatch state is reset afterwards
        observable.notify(&4);
        assert_eq!(seen.borrow().len(), 8);
    }
}
