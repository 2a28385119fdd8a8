use console_state_core::{ChangedIds, EventStore, Record, RemoveNotifyPolicy};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn event(value: Value) -> Record {
    Record::from_value(value).expect("fixture should be a valid event")
}

fn recording_store(policy: RemoveNotifyPolicy) -> (EventStore, Rc<RefCell<Vec<ChangedIds>>>) {
    let store = EventStore::new(policy);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |ids: &ChangedIds| sink.borrow_mut().push(ids.clone()));
    (store, seen)
}

fn ids(values: &[&str]) -> ChangedIds {
    values.iter().map(|value| value.to_string()).collect()
}

fn as_values(items: Vec<Record>) -> Vec<Value> {
    items.into_iter().map(Record::into_value).collect()
}

#[test]
fn add_merges_known_ids_in_place_and_keeps_order() {
    let store = EventStore::new(RemoveNotifyPolicy::Always);

    store.add(vec![
        event(json!({"id": "1", "name": "a"})),
        event(json!({"id": "2", "name": "b"})),
    ]);
    store.add(vec![event(json!({"id": "1", "name": "a2"}))]);

    assert_eq!(
        as_values(store.get_all_items()),
        vec![
            json!({"id": "1", "name": "a2"}),
            json!({"id": "2", "name": "b"}),
        ]
    );
}

#[test]
fn add_deep_merges_nested_fields_across_calls() {
    let store = EventStore::new(RemoveNotifyPolicy::Always);

    store.add(event(json!({
        "id": "e1",
        "title": "TypeError",
        "tags": [{"key": "browser", "value": "firefox"}],
        "contexts": {"os": {"name": "linux"}, "runtime": {"name": "node"}}
    })));
    store.add(event(json!({
        "id": "e1",
        "tags": [],
        "contexts": {"os": {"version": "6.1"}}
    })));

    let merged = store.get("e1").expect("event should exist");
    assert_eq!(
        merged.into_value(),
        json!({
            "id": "e1",
            "title": "TypeError",
            "tags": [],
            "contexts": {"os": {"name": "linux", "version": "6.1"}, "runtime": {"name": "node"}}
        })
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn add_batch_emits_exactly_one_notification() {
    let (store, seen) = recording_store(RemoveNotifyPolicy::Always);
    store.add(event(json!({"id": "1"})));

    let touched = store.add(vec![
        event(json!({"id": "1", "seen": true})),
        event(json!({"id": "2"})),
        event(json!({"id": "3"})),
    ]);

    assert_eq!(touched, ids(&["1", "2", "3"]));
    assert_eq!(*seen.borrow(), vec![ids(&["1"]), ids(&["1", "2", "3"])]);
}

#[test]
fn load_initial_data_replaces_everything_in_order() {
    let (store, seen) = recording_store(RemoveNotifyPolicy::Always);
    store.add(vec![event(json!({"id": "old"}))]);

    let loaded = store.load_initial_data(vec![
        event(json!({"id": "b", "n": 2})),
        event(json!({"id": "a", "n": 1})),
    ]);

    assert_eq!(loaded, ids(&["a", "b"]));
    assert_eq!(store.get_all_item_ids(), vec!["b", "a"]);
    assert!(store.get("old").is_none());
    assert_eq!(seen.borrow().last(), Some(&ids(&["a", "b"])));

    store.load_initial_data(vec![event(json!({"id": "c"}))]);
    assert_eq!(store.get_all_item_ids(), vec!["c"]);
}

#[test]
fn remove_drops_exactly_one_entity() {
    let (store, seen) = recording_store(RemoveNotifyPolicy::Always);
    store.load_initial_data(vec![
        event(json!({"id": "1"})),
        event(json!({"id": "2"})),
        event(json!({"id": "3"})),
    ]);

    assert!(store.remove("2"));

    assert!(store.get("2").is_none());
    assert_eq!(store.len(), 2);
    assert_eq!(store.get_all_item_ids(), vec!["1", "3"]);
    assert_eq!(seen.borrow().last(), Some(&ids(&["2"])));
}

#[test]
fn remove_of_unknown_id_follows_notify_policy() {
    let (always, always_seen) = recording_store(RemoveNotifyPolicy::Always);
    assert!(!always.remove("ghost"));
    assert_eq!(*always_seen.borrow(), vec![ids(&["ghost"])]);

    let (strict, strict_seen) = recording_store(RemoveNotifyPolicy::OnlyWhenRemoved);
    assert!(!strict.remove("ghost"));
    assert!(strict_seen.borrow().is_empty());
}

#[test]
fn reset_clears_without_notifying() {
    let (store, seen) = recording_store(RemoveNotifyPolicy::Always);
    store.add(event(json!({"id": "1"})));
    let before = seen.borrow().len();

    store.reset();

    assert!(store.is_empty());
    assert_eq!(seen.borrow().len(), before);
}

#[test]
fn subscribers_can_read_the_store_during_notification() {
    let store = Rc::new(EventStore::new(RemoveNotifyPolicy::Always));
    let observed = Rc::new(RefCell::new(Vec::new()));

    let reader = Rc::clone(&store);
    let sink = Rc::clone(&observed);
    store.subscribe(move |_| sink.borrow_mut().push(reader.len()));

    store.add(vec![event(json!({"id": "1"})), event(json!({"id": "2"}))]);
    store.remove("1");

    assert_eq!(*observed.borrow(), vec![2, 1]);
}

#[test]
fn returned_items_are_snapshots() {
    let store = EventStore::new(RemoveNotifyPolicy::Always);
    store.add(event(json!({"id": "1", "level": "error"})));

    let mut copy = store.get("1").unwrap();
    copy.deep_merge(event(json!({"id": "1", "level": "info"})));
    assert_eq!(copy.get_str("level"), Some("info"));

    assert_eq!(store.get("1").unwrap().get_str("level"), Some("error"));
}

#[test]
fn unsubscribed_callbacks_stop_receiving() {
    let store = EventStore::new(RemoveNotifyPolicy::Always);
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let subscription = store.subscribe(move |_| *counter.borrow_mut() += 1);

    store.add(event(json!({"id": "1"})));
    assert!(store.unsubscribe(subscription));
    store.add(event(json!({"id": "2"})));

    assert_eq!(*calls.borrow(), 1);
}
