//! Domain models held by the client stores.
//!
//! # Responsibility
//! - Define the entity shapes the stores reconcile and hand out.
//! - Keep identity and merge rules next to the data they govern.
//!
//! # Invariants
//! - Every stored entity exposes a stable identifier through `Entity`.
//! - Stores hand out clones; models never alias store-owned state.

pub mod entity;
pub mod organization;
pub mod project;
pub mod record;
