//! Bus attachment bookkeeping shared by the stores.

use crate::dispatch::action::{Action, ActionKind};
use crate::dispatch::bus::{ActionBus, HandlerError, HandlerResult, ListenerHandle};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Handles collected while attaching, released on detach.
#[derive(Debug, Default)]
pub struct ListenerSet {
    handles: RefCell<Vec<ListenerHandle>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `on_action` for every kind in `kinds`.
    ///
    /// The store is held weakly, so the bus never keeps a store alive.
    pub fn attach<S: 'static>(
        &self,
        bus: &ActionBus,
        store: &Rc<S>,
        listener: &'static str,
        kinds: &[ActionKind],
        on_action: fn(&S, &Action) -> HandlerResult,
    ) {
        let mut handles = self.handles.borrow_mut();
        for kind in kinds {
            let weak: Weak<S> = Rc::downgrade(store);
            let handle = bus.listen(*kind, listener, move |action| match weak.upgrade() {
                Some(store) => on_action(&store, action),
                None => Err(HandlerError::Rejected {
                    listener: listener.to_string(),
                    message: "store already dropped".to_string(),
                }),
            });
            handles.push(handle);
        }
    }

    /// Unregisters every handle. Returns how many were still live.
    pub fn detach(&self, bus: &ActionBus) -> usize {
        self.handles
            .borrow_mut()
            .drain(..)
            .filter(|handle| bus.unlisten(*handle))
            .count()
    }
}
