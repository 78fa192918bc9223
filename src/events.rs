//! Listener registry with scoped subscriptions.
//!
//! `subscribe` returns a `Subscription` guard; dropping it removes the
//! handler. Handlers may subscribe or unsubscribe while an event is being
//! emitted.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Handler<E> = Box<dyn FnMut(&E)>;

struct Registry<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
    emitting: bool,
    removed: Vec<u64>,
}

/// A set of handlers for events of type `E`.
pub struct Listeners<E> {
    inner: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
                emitting: false,
                removed: Vec::new(),
            })),
        }
    }

    /// Register a handler. It stays registered until the guard is dropped.
    #[must_use = "dropping the subscription unregisters the handler"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let id = {
            let mut registry = self.inner.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.push((id, Box::new(handler)));
            id
        };

        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut registry = inner.borrow_mut();
                    let before = registry.handlers.len();
                    registry.handlers.retain(|(hid, _)| *hid != id);
                    if registry.handlers.len() == before && registry.emitting {
                        registry.removed.push(id);
                    }
                }
            })),
        }
    }

    /// Call every registered handler with `event`, in subscription order.
    pub fn emit(&self, event: &E) {
        let mut active = {
            let mut registry = self.inner.borrow_mut();
            registry.emitting = true;
            std::mem::take(&mut registry.handlers)
        };

        for (_, handler) in active.iter_mut() {
            handler(event);
        }

        let mut registry = self.inner.borrow_mut();
        registry.emitting = false;
        let removed = std::mem::take(&mut registry.removed);
        active.retain(|(id, _)| !removed.contains(id));
        let added = std::mem::take(&mut registry.handlers);
        active.extend(added);
        registry.handlers = active;
    }

}

#[cfg(test)]
impl<E> Listeners<E> {
    pub fn len(&self) -> usize {
        self.inner.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Guard for a registered handler. Unsubscribes on drop.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_handlers_receive_events_until_dropped() {
        let listeners: Listeners<u32> = Listeners::new();
        let seen = Rc::new(Cell::new(0));

        let sub = {
            let seen = Rc::clone(&seen);
            listeners.subscribe(move |n| seen.set(seen.get() + n))
        };
        listeners.emit(&2);
        listeners.emit(&3);
        assert_eq!(seen.get(), 5);

        drop(sub);
        listeners.emit(&10);
        assert_eq!(seen.get(), 5);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let listeners: Listeners<()> = Listeners::new();
        let sub = listeners.subscribe(|_| {});
        assert_eq!(listeners.len(), 1);
        drop(sub);
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn test_subscription_outliving_registry_is_harmless() {
        let sub = {
            let listeners: Listeners<()> = Listeners::new();
            listeners.subscribe(|_| {})
        };
        drop(sub);
    }

    #[test]
    fn test_unsubscribe_during_emit() {
        let listeners: Listeners<()> = Listeners::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let sub = {
            let slot = Rc::clone(&slot);
            let calls = Rc::clone(&calls);
            listeners.subscribe(move |_| {
                calls.set(calls.get() + 1);
                // Drop our own guard from inside the handler
                slot.borrow_mut().take();
            })
        };
        *slot.borrow_mut() = Some(sub);

        listeners.emit(&());
        listeners.emit(&());
        assert_eq!(calls.get(), 1);
        assert!(listeners.is_empty());
    }
}
