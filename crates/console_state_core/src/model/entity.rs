//! Identity and merge contract shared by every stored entity.

use crate::model::record::Record;

/// An identified value that a store can reconcile against a newer copy.
pub trait Entity: Clone {
    /// Stable identifier used for lookup and reconciliation.
    fn entity_id(&self) -> &str;

    /// Folds a newer copy of the same entity into `self`.
    ///
    /// Incoming values win on conflict.
    fn merge_from(&mut self, incoming: Self);
}

impl Entity for Record {
    fn entity_id(&self) -> &str {
        self.id()
    }

    fn merge_from(&mut self, incoming: Self) {
        self.deep_merge(incoming);
    }
}
