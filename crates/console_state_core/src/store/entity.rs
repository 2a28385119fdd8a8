//! Generic identified-entity collection and its notifying store.
//!
//! # Responsibility
//! - Keep an ordered collection of entities keyed by `Entity::entity_id`.
//! - Reconcile repeated identifiers by merging in place.
//! - Batch every mutating call into a single change notification.
//!
//! # Invariants
//! - Identifiers are unique inside one collection.
//! - New identifiers append; known identifiers keep their position.
//! - `reset` never notifies.

use crate::model::entity::Entity;
use crate::store::notify::{Notifier, SubscriptionId};
use log::debug;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Identifiers touched by one store operation.
pub type ChangedIds = BTreeSet<String>;

/// Whether removing an unknown identifier still notifies subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveNotifyPolicy {
    /// Notify with the requested identifier even when nothing was removed.
    #[default]
    Always,
    /// Notify only when an entity was actually removed.
    OnlyWhenRemoved,
}

/// Single item or ordered batch accepted by `add`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        Self::One(item)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items)
    }
}

/// Ordered entity collection without notification side effects.
#[derive(Debug, Clone)]
pub struct EntityCollection<T> {
    items: Vec<T>,
}

impl<T> Default for EntityCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> EntityCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces all items, preserving the supplied order.
    pub fn replace_all(&mut self, items: Vec<T>) -> ChangedIds {
        let ids = items
            .iter()
            .map(|item| item.entity_id().to_string())
            .collect();
        self.items = items;
        ids
    }

    /// Merges known identifiers in place and appends new ones.
    pub fn upsert(&mut self, items: Vec<T>) -> ChangedIds {
        let mut touched = ChangedIds::new();
        for item in items {
            touched.insert(item.entity_id().to_string());
            match self.position(item.entity_id()) {
                Some(idx) => self.items[idx].merge_from(item),
                None => self.items.push(item),
            }
        }
        touched
    }

    /// Removes the entity with `id`. Returns whether one was present.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Removes every entity matching `predicate`, returning their identifiers.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> ChangedIds {
        let mut removed = ChangedIds::new();
        self.items.retain(|item| {
            if predicate(item) {
                removed.insert(item.entity_id().to_string());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.entity_id() == id)
    }

    pub fn find(&self, predicate: impl FnMut(&&T) -> bool) -> Option<&T> {
        self.items.iter().find(predicate)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn ids(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| item.entity_id().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.entity_id() == id)
    }
}

/// Entity collection that notifies subscribers with the touched identifiers.
#[derive(Debug)]
pub struct EntityStore<T> {
    name: &'static str,
    collection: RefCell<EntityCollection<T>>,
    remove_policy: RemoveNotifyPolicy,
    notifier: Notifier<ChangedIds>,
}

impl<T: Entity> EntityStore<T> {
    /// Creates an empty store. `name` only labels log lines.
    pub fn new(name: &'static str, remove_policy: RemoveNotifyPolicy) -> Self {
        Self {
            name,
            collection: RefCell::new(EntityCollection::new()),
            remove_policy,
            notifier: Notifier::new(),
        }
    }

    pub fn reset(&self) {
        self.collection.borrow_mut().clear();
        debug!("event=store_reset module={} status=ok", self.name);
    }

    /// Replaces the collection and notifies with the loaded identifiers.
    pub fn load_initial_data(&self, items: Vec<T>) -> ChangedIds {
        let ids = self.collection.borrow_mut().replace_all(items);
        debug!(
            "event=store_load module={} status=ok count={}",
            self.name,
            ids.len()
        );
        self.notifier.emit(&ids);
        ids
    }

    /// Adds one item or a batch; one notification covers the whole call.
    pub fn add(&self, items: impl Into<OneOrMany<T>>) -> ChangedIds {
        let touched = self.collection.borrow_mut().upsert(items.into().into_vec());
        debug!(
            "event=store_add module={} status=ok touched={}",
            self.name,
            touched.len()
        );
        self.notifier.emit(&touched);
        touched
    }

    /// Removes `id`. Returns whether an entity was removed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.collection.borrow_mut().remove(id);
        debug!(
            "event=store_remove module={} status={} id={}",
            self.name,
            if removed { "ok" } else { "missing" },
            id
        );
        if removed || self.remove_policy == RemoveNotifyPolicy::Always {
            self.notifier.emit(&ChangedIds::from([id.to_string()]));
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.collection.borrow().get(id).cloned()
    }

    pub fn get_all(&self) -> Vec<T> {
        self.collection.borrow().items().to_vec()
    }

    pub fn get_all_ids(&self) -> Vec<String> {
        self.collection.borrow().ids()
    }

    pub fn len(&self) -> usize {
        self.collection.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.borrow().is_empty()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangedIds) + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityCollection, OneOrMany};
    use crate::model::record::Record;
    use serde_json::json;

    fn record(id: &str, name: &str) -> Record {
        Record::from_value(json!({"id": id, "name": name})).unwrap()
    }

    #[test]
    fn upsert_merges_duplicates_inside_one_batch() {
        let mut collection = EntityCollection::new();
        let touched = collection.upsert(vec![record("1", "a"), record("1", "b")]);

        assert_eq!(touched.len(), 1);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("1").unwrap().get_str("name"), Some("b"));
    }

    #[test]
    fn remove_where_reports_removed_ids() {
        let mut collection = EntityCollection::new();
        collection.upsert(vec![record("1", "a"), record("2", "b"), record("3", "a")]);

        let removed = collection.remove_where(|item| item.get_str("name") == Some("a"));

        assert_eq!(removed.into_iter().collect::<Vec<_>>(), vec!["1", "3"]);
        assert_eq!(collection.ids(), vec!["2"]);
    }

    #[test]
    fn one_or_many_deserializes_both_shapes() {
        let one: OneOrMany<Record> = serde_json::from_value(json!({"id": "1"})).unwrap();
        assert_eq!(one.into_vec().len(), 1);

        let many: OneOrMany<Record> =
            serde_json::from_value(json!([{"id": "1"}, {"id": "2"}])).unwrap();
        assert_eq!(many.into_vec().len(), 2);
    }
}
