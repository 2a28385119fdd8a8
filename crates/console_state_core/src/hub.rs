//! Store hub: one bus plus one instance of every store.
//!
//! # Responsibility
//! - Construct and wire the stores explicitly instead of through globals.
//! - Provide the lifecycle hooks: start, restart (logout), dispose.
//!
//! # Invariants
//! - Listener registration order is fixed: organizations catalog, latest
//!   context, events. Actions handled by several stores reach them in that
//!   order.
//! - After `dispose` no hub listener remains on the bus.

use crate::config::CoreConfig;
use crate::dispatch::action::Action;
use crate::dispatch::bus::{ActionBus, DispatchOutcome, DispatchReport};
use crate::logging::{init_logging, LoggingError};
use crate::store::event_store::EventStore;
use crate::store::latest_context_store::LatestContextStore;
use crate::store::organizations_store::OrganizationsStore;
use log::info;
use std::cell::Cell;
use std::rc::Rc;

/// Owner of the action bus and the stores attached to it.
#[derive(Debug)]
pub struct StoreHub {
    bus: Rc<ActionBus>,
    events: Rc<EventStore>,
    organizations: Rc<OrganizationsStore>,
    latest_context: Rc<LatestContextStore>,
    attached: Cell<bool>,
}

impl StoreHub {
    /// Builds the stores and attaches them to a fresh bus.
    pub fn start(config: &CoreConfig) -> Self {
        let bus = Rc::new(ActionBus::new());
        let hub = Self {
            events: Rc::new(EventStore::new(config.remove_notify)),
            organizations: Rc::new(OrganizationsStore::new(config.remove_notify)),
            latest_context: Rc::new(LatestContextStore::new()),
            bus,
            attached: Cell::new(false),
        };
        hub.attach();
        info!(
            "event=hub_start module=hub status=ok listeners={}",
            hub.bus.total_listeners()
        );
        hub
    }

    /// Initializes logging from `config` when a directory is set, then starts.
    pub fn start_with_logging(config: &CoreConfig) -> Result<Self, LoggingError> {
        if let Some(log_dir) = config.log_dir.as_deref() {
            init_logging(&config.log_level, log_dir)?;
        }
        Ok(Self::start(config))
    }

    pub fn bus(&self) -> &Rc<ActionBus> {
        &self.bus
    }

    pub fn events(&self) -> &Rc<EventStore> {
        &self.events
    }

    pub fn organizations(&self) -> &Rc<OrganizationsStore> {
        &self.organizations
    }

    pub fn latest_context(&self) -> &Rc<LatestContextStore> {
        &self.latest_context
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    pub fn dispatch(&self, action: Action) -> DispatchOutcome {
        self.bus.publish(action)
    }

    /// Delivery totals since the hub started.
    pub fn dispatch_totals(&self) -> DispatchReport {
        self.bus.totals()
    }

    /// Empties every store, as on logout. Listeners stay attached.
    pub fn restart(&self) {
        self.organizations.reset();
        self.latest_context.reset();
        self.events.reset();
        info!("event=hub_restart module=hub status=ok");
    }

    /// Detaches every store from the bus. Returns how many listeners went.
    pub fn dispose(&self) -> usize {
        if !self.attached.replace(false) {
            return 0;
        }
        let removed = self.organizations.detach(&self.bus)
            + self.latest_context.detach(&self.bus)
            + self.events.detach(&self.bus);
        info!("event=hub_dispose module=hub status=ok listeners={removed}");
        removed
    }

    /// Re-attaches the stores after `dispose`. No-op when already attached.
    pub fn attach(&self) {
        if self.attached.replace(true) {
            return;
        }
        self.organizations.attach(&self.bus);
        self.latest_context.attach(&self.bus);
        self.events.attach(&self.bus);
    }
}

impl Drop for StoreHub {
    fn drop(&mut self) {
        self.dispose();
    }
}
