//! Change-notification channel exposed by every store.
//!
//! # Invariants
//! - Subscribers run synchronously, in subscription order.
//! - `emit` snapshots the subscriber list first; subscribing or unsubscribing
//!   from inside a callback takes effect on the next emission.
//! - A callback that is already running is skipped rather than re-entered.

use log::warn;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Callback<P> = Rc<RefCell<dyn FnMut(&P)>>;

/// Ordered registry of change subscribers for payload type `P`.
pub struct Notifier<P> {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Callback<P>)>>,
}

impl<P> Default for Notifier<P> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(1),
            subscribers: RefCell::new(Vec::new()),
        }
    }
}

impl<P> fmt::Debug for Notifier<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<P> Notifier<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&P) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let callback: Callback<P> = Rc::new(RefCell::new(callback));
        self.subscribers.borrow_mut().push((id, callback));
        id
    }

    /// Removes one subscriber. Returns `false` for unknown handles.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Delivers `payload` to every subscriber. Returns how many ran.
    pub fn emit(&self, payload: &P) -> usize {
        let snapshot: Vec<(SubscriptionId, Callback<P>)> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            match callback.try_borrow_mut() {
                Ok(mut callback) => {
                    (&mut *callback)(payload);
                    delivered += 1;
                }
                Err(_) => {
                    warn!("event=notify_reentrant module=notify status=skipped subscription={id}");
                }
            }
        }
        delivered
    }
}
