//! Synchronous change-event streams.
//!
//! Every primitive entity owns a [`Signal`] and emits one event per actual
//! field change. Delivery is synchronous on the single mutation thread;
//! subscription changes made from inside a handler take effect after the
//! current dispatch. Handlers receive the event value only and must not call
//! back into the sending entity, which is still mutably borrowed while its
//! setter runs.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Handler<E> = Rc<dyn Fn(&E)>;

struct Registry<E> {
    handlers: Vec<(u64, Handler<E>)>,
}

/// An event stream with a subscriber registry.
pub struct Signal<E> {
    registry: Rc<RefCell<Registry<E>>>,
    next_id: Cell<u64>,
}

impl<E> Signal<E> {
    /// Creates a signal with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                handlers: Vec::new(),
            })),
            next_id: Cell::new(0),
        }
    }

    /// Subscribes a handler; it stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Subscription<E> {
        let id = self.subscribe_raw(handler);
        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Subscribes a handler and returns its raw id for manual removal.
    pub fn subscribe_raw(&self, handler: impl Fn(&E) + 'static) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.registry
            .borrow_mut()
            .handlers
            .push((id, Rc::new(handler)));
        id
    }

    /// Removes a handler registered with [`Self::subscribe_raw`].
    pub fn unsubscribe(&self, id: u64) {
        self.registry
            .borrow_mut()
            .handlers
            .retain(|(handler_id, _)| *handler_id != id);
    }

    /// Delivers an event to all currently registered handlers.
    pub fn notify(&self, event: &E) {
        // Snapshot first so handlers may (un)subscribe without affecting the
        // running dispatch.
        let handlers: Vec<Handler<E>> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Keeps a handler registered; dropping it detaches the handler.
pub struct Subscription<E> {
    registry: Weak<RefCell<Registry<E>>>,
    id: u64,
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .handlers
                .retain(|(handler_id, _)| *handler_id != self.id);
        }
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_to_all_subscribers() {
        let signal: Signal<u32> = Signal::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen1 = Rc::clone(&seen);
        let seen2 = Rc::clone(&seen);
        let _sub1 = signal.subscribe(move |e| seen1.borrow_mut().push(*e));
        let _sub2 = signal.subscribe(move |e| seen2.borrow_mut().push(*e * 10));
        signal.notify(&7);
        assert_eq!(*seen.borrow(), vec![7, 70]);
    }

    #[test]
    fn dropping_subscription_detaches() {
        let signal: Signal<u32> = Signal::new();
        let seen = Rc::new(Cell::new(0u32));
        let seen2 = Rc::clone(&seen);
        let sub = signal.subscribe(move |e| seen2.set(seen2.get() + e));
        signal.notify(&1);
        drop(sub);
        signal.notify(&1);
        assert_eq!(seen.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn raw_subscription_is_removed_by_id() {
        let signal: Signal<()> = Signal::new();
        let id = signal.subscribe_raw(|()| {});
        assert_eq!(signal.subscriber_count(), 1);
        signal.unsubscribe(id);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn subscribing_during_dispatch_is_deferred() {
        let signal: Signal<u32> = Signal::new();
        let signal2 = Signal {
            registry: Rc::clone(&signal.registry),
            next_id: Cell::new(100),
        };
        let count = Rc::new(Cell::new(0u32));
        let count2 = Rc::clone(&count);
        let _sub = signal.subscribe(move |_| {
            let count3 = Rc::clone(&count2);
            // The new handler must not run for the event being dispatched.
            signal2.subscribe_raw(move |_| count3.set(count3.get() + 100));
            count2.set(count2.get() + 1);
        });
        signal.notify(&0);
        assert_eq!(count.get(), 1);
    }
}
