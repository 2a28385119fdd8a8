//! In-process action bus with guarded, ordered delivery.
//!
//! # Responsibility
//! - Register handlers per `ActionKind` and hand back unlisten handles.
//! - Deliver each published action to its handlers synchronously, in
//!   registration order.
//! - Contain handler failures so one misbehaving store cannot stall others.
//!
//! # Invariants
//! - Actions are delivered in publish order. Publishing from inside a handler
//!   enqueues; the outermost `publish` drains the queue before returning.
//! - Handler errors and panics are logged and counted, never propagated.
//! - No internal borrow is held while a handler runs.

use crate::dispatch::action::{Action, ActionKind};
use crate::logging::panic_payload_message;
use log::{debug, error};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

pub type HandlerResult = Result<(), HandlerError>;

type Handler = Rc<dyn Fn(&Action) -> HandlerResult>;

/// Failure reported by an action handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Handler refused the action.
    Rejected { listener: String, message: String },
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { listener, message } => {
                write!(f, "listener `{listener}` rejected action: {message}")
            }
        }
    }
}

impl Error for HandlerError {}

/// Token returned by `listen`; pass it to `unlisten` to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle {
    kind: ActionKind,
    id: u64,
}

impl ListenerHandle {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

/// Delivery counters for one drain cycle, or totals since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub actions: usize,
    pub deliveries: usize,
    pub failures: usize,
}

impl DispatchReport {
    fn absorb(&mut self, other: DispatchReport) {
        self.actions += other.actions;
        self.deliveries += other.deliveries;
        self.failures += other.failures;
    }
}

/// Result of `publish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The queue was drained; counters cover every action delivered.
    Delivered(DispatchReport),
    /// Published from inside a handler; delivered once the current one ends.
    Queued,
}

#[derive(Clone)]
struct Listener {
    id: u64,
    name: Rc<str>,
    handler: Handler,
}

/// Synchronous publish/subscribe channel for `Action`s.
#[derive(Default)]
pub struct ActionBus {
    next_id: Cell<u64>,
    listeners: RefCell<BTreeMap<ActionKind, Vec<Listener>>>,
    queue: RefCell<VecDeque<Action>>,
    dispatching: Cell<bool>,
    totals: Cell<DispatchReport>,
}

impl std::fmt::Debug for ActionBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBus")
            .field("listeners", &self.total_listeners())
            .field("queued", &self.queue.borrow().len())
            .field("totals", &self.totals.get())
            .finish()
    }
}

impl ActionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for actions of `kind`.
    ///
    /// `listener` names the handler in failure logs.
    pub fn listen<F>(&self, kind: ActionKind, listener: &str, handler: F) -> ListenerHandle
    where
        F: Fn(&Action) -> HandlerResult + 'static,
    {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push(Listener {
                id,
                name: Rc::from(listener),
                handler: Rc::new(handler),
            });
        debug!("event=bus_listen module=bus status=ok kind={kind} listener={listener}");
        ListenerHandle { kind, id }
    }

    /// Detaches one handler. Returns `false` when the handle is stale.
    pub fn unlisten(&self, handle: ListenerHandle) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(entries) = listeners.get_mut(&handle.kind) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|listener| listener.id != handle.id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            listeners.remove(&handle.kind);
        }
        removed
    }

    pub fn listener_count(&self, kind: ActionKind) -> usize {
        self.listeners.borrow().get(&kind).map_or(0, Vec::len)
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().values().map(Vec::len).sum()
    }

    /// Counters accumulated over every drain cycle so far.
    pub fn totals(&self) -> DispatchReport {
        self.totals.get()
    }

    /// Publishes `action` and, unless already dispatching, drains the queue.
    pub fn publish(&self, action: Action) -> DispatchOutcome {
        self.queue.borrow_mut().push_back(action);
        if self.dispatching.replace(true) {
            return DispatchOutcome::Queued;
        }

        let mut report = DispatchReport::default();
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(action) = next else {
                break;
            };
            report.absorb(self.deliver(&action));
        }
        self.dispatching.set(false);

        let mut totals = self.totals.get();
        totals.absorb(report);
        self.totals.set(totals);
        DispatchOutcome::Delivered(report)
    }

    fn deliver(&self, action: &Action) -> DispatchReport {
        let kind = action.kind();
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        let mut report = DispatchReport {
            actions: 1,
            ..DispatchReport::default()
        };
        for listener in snapshot {
            report.deliveries += 1;
            if !invoke_guarded(&listener, kind, action) {
                report.failures += 1;
            }
        }
        debug!(
            "event=bus_deliver module=bus status=ok kind={kind} deliveries={} failures={}",
            report.deliveries, report.failures
        );
        report
    }
}

fn invoke_guarded(listener: &Listener, kind: ActionKind, action: &Action) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| (listener.handler)(action))) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            error!(
                "event=handler_failed module=bus status=error kind={kind} listener={} error={err}",
                listener.name
            );
            false
        }
        Err(payload) => {
            error!(
                "event=handler_panicked module=bus status=error kind={kind} listener={} payload={}",
                listener.name,
                panic_payload_message(payload.as_ref())
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionBus, DispatchOutcome, DispatchReport, HandlerError};
    use crate::dispatch::action::{Action, ActionKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn delivered(outcome: DispatchOutcome) -> DispatchReport {
        match outcome {
            DispatchOutcome::Delivered(report) => report,
            DispatchOutcome::Queued => panic!("expected delivery"),
        }
    }

    #[test]
    fn delivers_only_to_matching_kind_in_registration_order() {
        let bus = ActionBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for name in ["a", "b"] {
            let seen = Rc::clone(&seen);
            bus.listen(ActionKind::EventsReset, name, move |_| {
                seen.borrow_mut().push(name);
                Ok(())
            });
        }
        let other = Rc::clone(&seen);
        bus.listen(ActionKind::EventsRemove, "other", move |_| {
            other.borrow_mut().push("other");
            Ok(())
        });

        let report = delivered(bus.publish(Action::EventsReset));
        assert_eq!(report.deliveries, 2);
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn failing_handler_does_not_block_later_handlers() {
        let bus = ActionBus::new();
        let reached = Rc::new(RefCell::new(false));

        bus.listen(ActionKind::EventsReset, "rejects", |_| {
            Err(HandlerError::Rejected {
                listener: "rejects".to_string(),
                message: "nope".to_string(),
            })
        });
        let flag = Rc::clone(&reached);
        bus.listen(ActionKind::EventsReset, "after", move |_| {
            *flag.borrow_mut() = true;
            Ok(())
        });

        let report = delivered(bus.publish(Action::EventsReset));
        assert_eq!(report.failures, 1);
        assert!(*reached.borrow());
    }

    #[test]
    fn unlisten_is_idempotent() {
        let bus = ActionBus::new();
        let handle = bus.listen(ActionKind::EventsReset, "x", |_| Ok(()));
        assert_eq!(bus.listener_count(ActionKind::EventsReset), 1);
        assert!(bus.unlisten(handle));
        assert!(!bus.unlisten(handle));
        assert_eq!(bus.total_listeners(), 0);
    }
}
