//! Event collection store.
//!
//! # Responsibility
//! - Hold the event records shown by list/detail views.
//! - React to `events_*` actions published on the bus.
//!
//! # Invariants
//! - Records keep load order; `add` merges known ids in place.
//! - Notifications carry the set of event ids touched by one call.

use crate::dispatch::action::{Action, ActionKind};
use crate::dispatch::bus::{ActionBus, HandlerResult};
use crate::model::record::Record;
use crate::store::entity::{ChangedIds, EntityStore, OneOrMany, RemoveNotifyPolicy};
use crate::store::listeners::ListenerSet;
use crate::store::notify::SubscriptionId;
use std::rc::Rc;

const LISTENER_NAME: &str = "event_store";

const HANDLED_KINDS: &[ActionKind] = &[
    ActionKind::EventsLoadInitial,
    ActionKind::EventsAdd,
    ActionKind::EventsRemove,
    ActionKind::EventsReset,
];

#[derive(Debug)]
pub struct EventStore {
    items: EntityStore<Record>,
    listeners: ListenerSet,
}

impl EventStore {
    pub fn new(remove_policy: RemoveNotifyPolicy) -> Self {
        Self {
            items: EntityStore::new(LISTENER_NAME, remove_policy),
            listeners: ListenerSet::new(),
        }
    }

    pub fn attach(self: &Rc<Self>, bus: &ActionBus) {
        self.listeners
            .attach(bus, self, LISTENER_NAME, HANDLED_KINDS, Self::on_action);
    }

    pub fn detach(&self, bus: &ActionBus) -> usize {
        self.listeners.detach(bus)
    }

    pub fn reset(&self) {
        self.items.reset();
    }

    pub fn load_initial_data(&self, items: Vec<Record>) -> ChangedIds {
        self.items.load_initial_data(items)
    }

    pub fn add(&self, items: impl Into<OneOrMany<Record>>) -> ChangedIds {
        self.items.add(items)
    }

    pub fn remove(&self, id: &str) -> bool {
        self.items.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.items.get(id)
    }

    pub fn get_all_items(&self) -> Vec<Record> {
        self.items.get_all()
    }

    pub fn get_all_item_ids(&self) -> Vec<String> {
        self.items.get_all_ids()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangedIds) + 'static,
    {
        self.items.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.items.unsubscribe(id)
    }

    fn on_action(&self, action: &Action) -> HandlerResult {
        match action {
            Action::EventsLoadInitial(items) => {
                self.load_initial_data(items.clone());
            }
            Action::EventsAdd(items) => {
                self.add(items.clone());
            }
            Action::EventsRemove(id) => {
                self.remove(id);
            }
            Action::EventsReset => self.reset(),
            _ => {}
        }
        Ok(())
    }
}
