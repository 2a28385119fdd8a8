//! Client-side state stores for the monitoring console.
//! Entity catalogs, the latest active context, and the action bus that
//! keeps them in step.

pub mod config;
pub mod dispatch;
pub mod hub;
pub mod logging;
pub mod model;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use dispatch::action::{Action, ActionKind};
pub use dispatch::bus::{
    ActionBus, DispatchOutcome, DispatchReport, HandlerError, HandlerResult, ListenerHandle,
};
pub use hub::StoreHub;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entity::Entity;
pub use model::organization::{Organization, OrganizationDetailMode, OrganizationStatus};
pub use model::project::{Environment, Project};
pub use model::record::{Record, RecordError};
pub use store::entity::{ChangedIds, EntityCollection, EntityStore, OneOrMany, RemoveNotifyPolicy};
pub use store::event_store::EventStore;
pub use store::latest_context_store::{LatestContext, LatestContextStore};
pub use store::notify::{Notifier, SubscriptionId};
pub use store::organizations_store::{OrganizationsChange, OrganizationsStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
