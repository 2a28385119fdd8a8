//! Organization domain model.
//!
//! # Responsibility
//! - Define the organization shape tracked by the organizations catalog and
//!   the latest context.
//! - Derive the detail-page mode from the lifecycle status.
//!
//! # Invariants
//! - `id` is the reconciliation key; `slug` is the lookup key and may change.
//! - Merging is shallow: every field present on the incoming copy replaces
//!   the existing one; fields it does not carry are kept.

use crate::model::entity::Entity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status id marking an organization queued for deletion.
pub const STATUS_PENDING_DELETION: &str = "pending_deletion";
/// Status id marking an organization whose deletion already started.
pub const STATUS_DELETION_IN_PROGRESS: &str = "deletion_in_progress";
/// Access scope required to cancel a scheduled deletion.
pub const ACCESS_ORG_ADMIN: &str = "org:admin";

/// Lifecycle status reported for an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationStatus {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Organization record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrganizationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Vec<String>>,
    /// Remaining payload fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which detail view an organization should be presented with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationDetailMode {
    /// Normal organization pages.
    Active,
    /// Deletion is scheduled; admins may still restore it.
    DeletionPending { can_restore: bool },
    /// Deletion has begun and cannot be cancelled.
    DeletionInProgress,
}

impl Organization {
    pub fn new(id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            name: None,
            status: None,
            access: None,
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, id: impl Into<String>) -> Self {
        self.status = Some(OrganizationStatus {
            id: id.into(),
            name: String::new(),
        });
        self
    }

    pub fn with_access<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.access = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Display name, empty when the payload never carried one.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn access(&self) -> &[String] {
        self.access.as_deref().unwrap_or_default()
    }

    pub fn has_access(&self, scope: &str) -> bool {
        self.access().iter().any(|granted| granted == scope)
    }

    /// Maps `status.id` onto the detail view to present.
    pub fn detail_mode(&self) -> OrganizationDetailMode {
        match self.status.as_ref().map(|status| status.id.as_str()) {
            Some(STATUS_PENDING_DELETION) => OrganizationDetailMode::DeletionPending {
                can_restore: self.has_access(ACCESS_ORG_ADMIN),
            },
            Some(STATUS_DELETION_IN_PROGRESS) => OrganizationDetailMode::DeletionInProgress,
            _ => OrganizationDetailMode::Active,
        }
    }
}

impl Entity for Organization {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn merge_from(&mut self, incoming: Self) {
        let Organization {
            id,
            slug,
            name,
            status,
            access,
            extra,
        } = incoming;
        self.id = id;
        self.slug = slug;
        if name.is_some() {
            self.name = name;
        }
        if status.is_some() {
            self.status = status;
        }
        if access.is_some() {
            self.access = access;
        }
        self.extra.extend(extra);
    }
}
