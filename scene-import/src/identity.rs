//! Original id to live node associations.

use std::collections::BTreeMap;
use std::sync::Arc;

use scene_core::{NodeId, SceneRecord};
use serde::Serialize;

/// Callback invoked once per created node, and again for each group
/// replacement, with `(original_id, live_node, record)`.
pub type OnNodeCreated = Arc<dyn Fn(&str, NodeId, &SceneRecord) + Send + Sync>;

/// Maps original record ids to the live nodes built from them.
///
/// Records without an id are not tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentityMap {
    entries: BTreeMap<String, NodeId>,
}

impl IdentityMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly created node. Ignored when `id` is empty.
    pub fn insert(&mut self, id: &str, node: NodeId) {
        if !id.is_empty() {
            self.entries.insert(id.to_string(), node);
        }
    }

    /// Repoint an entry after its node was replaced. Returns whether an
    /// entry was updated.
    pub fn replace(&mut self, id: &str, node: NodeId) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                *entry = node;
                true
            }
            None => false,
        }
    }

    /// Live node built from `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.entries.get(id).copied()
    }

    /// Whether `id` is tracked.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of tracked records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked original ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Fold another map into this one.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }
}
