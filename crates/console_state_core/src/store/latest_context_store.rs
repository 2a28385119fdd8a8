//! Latest active context: organization, project, last project, environment.
//!
//! # Responsibility
//! - Track what the user is currently looking at across organization and
//!   project switches.
//! - Keep the active organization/project payloads fresh when the matching
//!   entity is updated elsewhere.
//!
//! # Invariants
//! - Clearing or switching the active project moves it into `last_project`;
//!   an empty active slot never overwrites `last_project`.
//! - Activating a different organization clears the active project the same
//!   way. Clearing the organization displaces it too, so `last_project`
//!   always names the project active before the latest switch.
//! - Organization updates only apply when their slug matches the active one.
//! - Every handled transition notifies with the full state, except ignored
//!   organization updates.

use crate::dispatch::action::{Action, ActionKind};
use crate::dispatch::bus::{ActionBus, HandlerResult};
use crate::model::organization::Organization;
use crate::model::project::{Environment, Project};
use crate::store::listeners::ListenerSet;
use crate::store::notify::{Notifier, SubscriptionId};
use log::debug;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

const LISTENER_NAME: &str = "latest_context_store";

const HANDLED_KINDS: &[ActionKind] = &[
    ActionKind::ProjectSetActive,
    ActionKind::ProjectUpdateSuccess,
    ActionKind::OrganizationsSetActive,
    ActionKind::OrganizationsUpdate,
    ActionKind::OrganizationUpdate,
    ActionKind::EnvironmentSetActive,
];

/// Snapshot of the active context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatestContext {
    pub organization: Option<Organization>,
    pub project: Option<Project>,
    /// Project displaced by the most recent project switch.
    pub last_project: Option<Project>,
    pub environment: Option<Environment>,
}

#[derive(Debug, Default)]
pub struct LatestContextStore {
    state: RefCell<LatestContext>,
    notifier: Notifier<LatestContext>,
    listeners: ListenerSet,
}

impl LatestContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(self: &Rc<Self>, bus: &ActionBus) {
        self.listeners
            .attach(bus, self, LISTENER_NAME, HANDLED_KINDS, Self::on_action);
    }

    pub fn detach(&self, bus: &ActionBus) -> usize {
        self.listeners.detach(bus)
    }

    pub fn get(&self) -> LatestContext {
        self.state.borrow().clone()
    }

    /// Returns every field to `None` and hands back the fresh state.
    pub fn reset(&self) -> LatestContext {
        let fresh = LatestContext::default();
        *self.state.borrow_mut() = fresh.clone();
        fresh
    }

    pub fn on_set_active_project(&self, project: Option<Project>) {
        self.transition("set_active_project", |state| {
            let same = match (&project, &state.project) {
                (Some(next), Some(current)) => next.slug == current.slug,
                _ => false,
            };
            if !same {
                displace_project(state);
                state.project = project;
            }
        });
    }

    /// Replaces the active project without checking which project it is.
    pub fn on_update_project(&self, project: Option<Project>) {
        self.transition("update_project", |state| state.project = project);
    }

    pub fn on_set_active_organization(&self, organization: Option<Organization>) {
        self.transition("set_active_organization", |state| match organization {
            None => {
                state.organization = None;
                displace_project(state);
            }
            Some(next) => {
                let same = state
                    .organization
                    .as_ref()
                    .is_some_and(|current| current.slug == next.slug);
                if !same {
                    state.organization = Some(next);
                    displace_project(state);
                }
            }
        });
    }

    /// Refreshes the active organization. Returns whether it was applied.
    pub fn on_update_organization(&self, organization: Option<Organization>) -> bool {
        let Some(next) = organization else {
            return false;
        };
        let matches_active = self
            .state
            .borrow()
            .organization
            .as_ref()
            .is_some_and(|current| current.slug == next.slug);
        if !matches_active {
            debug!(
                "event=context_update_ignored module={LISTENER_NAME} status=skipped slug={}",
                next.slug
            );
            return false;
        }
        self.transition("update_organization", |state| {
            state.organization = Some(next)
        });
        true
    }

    pub fn on_set_active_environment(&self, environment: Option<Environment>) {
        self.transition("set_active_environment", |state| {
            state.environment = environment
        });
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LatestContext) + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn transition(&self, name: &str, apply: impl FnOnce(&mut LatestContext)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            apply(&mut state);
            state.clone()
        };
        debug!(
            "event=context_{name} module={LISTENER_NAME} status=ok organization={} project={}",
            slug_or_none(snapshot.organization.as_ref().map(|org| org.slug.as_str())),
            slug_or_none(snapshot.project.as_ref().map(|project| project.slug.as_str()))
        );
        self.notifier.emit(&snapshot);
    }

    fn on_action(&self, action: &Action) -> HandlerResult {
        match action {
            Action::ProjectSetActive(project) => self.on_set_active_project(project.clone()),
            Action::ProjectUpdateSuccess(project) => self.on_update_project(project.clone()),
            Action::OrganizationsSetActive(org) => self.on_set_active_organization(org.clone()),
            Action::OrganizationsUpdate(org) => {
                self.on_update_organization(Some(org.clone()));
            }
            Action::OrganizationUpdate(org) => {
                self.on_update_organization(org.clone());
            }
            Action::EnvironmentSetActive(environment) => {
                self.on_set_active_environment(environment.clone())
            }
            _ => {}
        }
        Ok(())
    }
}

/// Moves the active project, if any, into `last_project`.
///
/// An empty active slot leaves `last_project` untouched.
fn displace_project(state: &mut LatestContext) {
    if state.project.is_some() {
        state.last_project = state.project.take();
    }
}

fn slug_or_none(slug: Option<&str>) -> &str {
    slug.unwrap_or("none")
}
