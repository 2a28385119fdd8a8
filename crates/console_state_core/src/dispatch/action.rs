//! Closed set of actions understood by the stores.
//!
//! # Invariants
//! - Every `Action` maps to exactly one `ActionKind`.
//! - JSON form is `{"type": "<kind>", "payload": ...}` with snake_case kinds.

use crate::model::organization::Organization;
use crate::model::project::{Environment, Project};
use crate::model::record::Record;
use crate::store::entity::OneOrMany;
use serde::Deserialize;
use std::fmt::{Display, Formatter};

/// Intent or network result announced on the bus.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    /// A project became (or stopped being) the one the user is looking at.
    ProjectSetActive(Option<Project>),
    /// A project save request completed.
    ProjectUpdateSuccess(Option<Project>),
    /// An organization became (or stopped being) active.
    OrganizationsSetActive(Option<Organization>),
    /// Catalog-level organization update.
    OrganizationsUpdate(Organization),
    /// Detail-level organization update; only the latest context listens.
    OrganizationUpdate(Option<Organization>),
    /// Organization renamed from `prev.slug` to `next.slug`.
    OrganizationsChangeSlug {
        prev: Organization,
        next: Organization,
    },
    /// Organization deletion request completed.
    OrganizationsRemoveSuccess(String),
    /// Organization list fetched.
    OrganizationsLoad(Vec<Organization>),
    EnvironmentSetActive(Option<Environment>),
    EventsLoadInitial(Vec<Record>),
    EventsAdd(OneOrMany<Record>),
    EventsRemove(String),
    EventsReset,
}

/// Payload-free discriminant used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    ProjectSetActive,
    ProjectUpdateSuccess,
    OrganizationsSetActive,
    OrganizationsUpdate,
    OrganizationUpdate,
    OrganizationsChangeSlug,
    OrganizationsRemoveSuccess,
    OrganizationsLoad,
    EnvironmentSetActive,
    EventsLoadInitial,
    EventsAdd,
    EventsRemove,
    EventsReset,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::ProjectSetActive(_) => ActionKind::ProjectSetActive,
            Self::ProjectUpdateSuccess(_) => ActionKind::ProjectUpdateSuccess,
            Self::OrganizationsSetActive(_) => ActionKind::OrganizationsSetActive,
            Self::OrganizationsUpdate(_) => ActionKind::OrganizationsUpdate,
            Self::OrganizationUpdate(_) => ActionKind::OrganizationUpdate,
            Self::OrganizationsChangeSlug { .. } => ActionKind::OrganizationsChangeSlug,
            Self::OrganizationsRemoveSuccess(_) => ActionKind::OrganizationsRemoveSuccess,
            Self::OrganizationsLoad(_) => ActionKind::OrganizationsLoad,
            Self::EnvironmentSetActive(_) => ActionKind::EnvironmentSetActive,
            Self::EventsLoadInitial(_) => ActionKind::EventsLoadInitial,
            Self::EventsAdd(_) => ActionKind::EventsAdd,
            Self::EventsRemove(_) => ActionKind::EventsRemove,
            Self::EventsReset => ActionKind::EventsReset,
        }
    }
}

impl ActionKind {
    /// Stable name used in logs and action scripts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProjectSetActive => "project_set_active",
            Self::ProjectUpdateSuccess => "project_update_success",
            Self::OrganizationsSetActive => "organizations_set_active",
            Self::OrganizationsUpdate => "organizations_update",
            Self::OrganizationUpdate => "organization_update",
            Self::OrganizationsChangeSlug => "organizations_change_slug",
            Self::OrganizationsRemoveSuccess => "organizations_remove_success",
            Self::OrganizationsLoad => "organizations_load",
            Self::EnvironmentSetActive => "environment_set_active",
            Self::EventsLoadInitial => "events_load_initial",
            Self::EventsAdd => "events_add",
            Self::EventsRemove => "events_remove",
            Self::EventsReset => "events_reset",
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
