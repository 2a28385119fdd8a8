//! Client-side entity and context stores.
//!
//! # Responsibility
//! - Own in-memory collections and mutate them only through store methods.
//! - Announce every mutating call with exactly one change notification.
//!
//! # Invariants
//! - Reads return owned snapshots; callers cannot write into store state.
//! - No store borrow is held while subscribers run.

pub mod entity;
pub mod event_store;
pub mod latest_context_store;
pub mod listeners;
pub mod notify;
pub mod organizations_store;
