//! Action dispatch: the closed action set and the bus that delivers it.
//!
//! # Responsibility
//! - Replace duck-typed action payloads with one exhaustive enum.
//! - Deliver actions to store handlers in order, one at a time.
//!
//! # Invariants
//! - Handlers never observe a half-delivered action from another publish.
//! - A failing handler is isolated from the rest of the bus.

pub mod action;
pub mod bus;
