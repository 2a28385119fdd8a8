//! Organizations catalog store.
//!
//! # Responsibility
//! - Hold every organization the user belongs to.
//! - Apply catalog actions: update, rename, removal, bulk load.
//!
//! # Invariants
//! - `add` reconciles by `id` so a renamed slug updates the same entry.
//! - Lookup and removal go by `slug`.
//! - `loaded` flips to true on the first bulk load and back on `reset`.
//! - Bulk loads notify with the full list; other mutations notify with ids.

use crate::dispatch::action::{Action, ActionKind};
use crate::dispatch::bus::{ActionBus, HandlerResult};
use crate::model::organization::Organization;
use crate::store::entity::{ChangedIds, EntityCollection, OneOrMany, RemoveNotifyPolicy};
use crate::store::listeners::ListenerSet;
use crate::store::notify::{Notifier, SubscriptionId};
use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const LISTENER_NAME: &str = "organizations_store";

const HANDLED_KINDS: &[ActionKind] = &[
    ActionKind::OrganizationsUpdate,
    ActionKind::OrganizationsChangeSlug,
    ActionKind::OrganizationsRemoveSuccess,
    ActionKind::OrganizationsLoad,
];

/// Notification payload of the organizations store.
#[derive(Debug, Clone, PartialEq)]
pub enum OrganizationsChange {
    /// Bulk load replaced the catalog with exactly these items.
    Loaded(Vec<Organization>),
    /// These organization ids were merged or appended.
    Updated(ChangedIds),
    /// Organizations under `slug` were removed; `ids` may be empty.
    Removed { slug: String, ids: ChangedIds },
}

#[derive(Debug)]
pub struct OrganizationsStore {
    items: RefCell<EntityCollection<Organization>>,
    loaded: Cell<bool>,
    remove_policy: RemoveNotifyPolicy,
    notifier: Notifier<OrganizationsChange>,
    listeners: ListenerSet,
}

impl OrganizationsStore {
    pub fn new(remove_policy: RemoveNotifyPolicy) -> Self {
        Self {
            items: RefCell::new(EntityCollection::new()),
            loaded: Cell::new(false),
            remove_policy,
            notifier: Notifier::new(),
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

    /// Clears the catalog and the `loaded` flag without notifying.
    pub fn reset(&self) {
        self.items.borrow_mut().clear();
        self.loaded.set(false);
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    pub fn on_update(&self, org: Organization) -> ChangedIds {
        self.add(org)
    }

    /// Applies a slug rename. Equal slugs are a no-op.
    pub fn on_change_slug(&self, prev: &Organization, next: Organization) {
        if prev.slug == next.slug {
            return;
        }
        self.remove(&prev.slug);
        self.add(next);
    }

    pub fn on_remove_success(&self, slug: &str) -> ChangedIds {
        self.remove(slug)
    }

    pub fn get(&self, slug: &str) -> Option<Organization> {
        self.items
            .borrow()
            .find(|org| org.slug == slug)
            .cloned()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Organization> {
        self.items.borrow().get(id).cloned()
    }

    pub fn get_all(&self) -> Vec<Organization> {
        self.items.borrow().items().to_vec()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Removes every organization with `slug`. Returns the removed ids.
    pub fn remove(&self, slug: &str) -> ChangedIds {
        let ids = self.items.borrow_mut().remove_where(|org| org.slug == slug);
        debug!(
            "event=store_remove module={LISTENER_NAME} status={} slug={slug}",
            if ids.is_empty() { "missing" } else { "ok" }
        );
        if !ids.is_empty() || self.remove_policy == RemoveNotifyPolicy::Always {
            self.notifier.emit(&OrganizationsChange::Removed {
                slug: slug.to_string(),
                ids: ids.clone(),
            });
        }
        ids
    }

    /// Merges by `id` or appends. One notification per call.
    pub fn add(&self, items: impl Into<OneOrMany<Organization>>) -> ChangedIds {
        let ids = self.items.borrow_mut().upsert(items.into().into_vec());
        debug!(
            "event=store_add module={LISTENER_NAME} status=ok touched={}",
            ids.len()
        );
        self.notifier.emit(&OrganizationsChange::Updated(ids.clone()));
        ids
    }

    /// Replaces the catalog and marks it loaded.
    pub fn load(&self, items: Vec<Organization>) {
        self.items.borrow_mut().replace_all(items.clone());
        self.loaded.set(true);
        debug!(
            "event=store_load module={LISTENER_NAME} status=ok count={}",
            items.len()
        );
        self.notifier.emit(&OrganizationsChange::Loaded(items));
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&OrganizationsChange) + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn on_action(&self, action: &Action) -> HandlerResult {
        match action {
            Action::OrganizationsUpdate(org) => {
                self.on_update(org.clone());
            }
            Action::OrganizationsChangeSlug { prev, next } => {
                self.on_change_slug(prev, next.clone());
            }
            Action::OrganizationsRemoveSuccess(slug) => {
                self.on_remove_success(slug);
            }
            Action::OrganizationsLoad(items) => self.load(items.clone()),
            _ => {}
        }
        Ok(())
    }
}
