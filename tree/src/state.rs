use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{NodeKey, TreeError, WidgetTree};

/// Widget states keyed by id, as captured by
/// [`WidgetTree::snapshot_descendants`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSnapshot(IndexMap<String, Value>);

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, state: Value) -> Option<Value> {
        self.0.insert(id.into(), state)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(id, state)| (id.as_str(), state))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl WidgetTree {
    /// Capture the state of every stateful descendant that has an id.
    pub fn snapshot_descendants(&self, key: NodeKey) -> Result<StateSnapshot, TreeError> {
        let mut snapshot = StateSnapshot::new();
        for descendant in self.descendants(key)? {
            let node = self.node(descendant)?;
            let Some(id) = node.id.as_deref() else {
                continue;
            };
            let Some(stateful) = node.widget.as_deref().and_then(|w| w.as_stateful()) else {
                continue;
            };
            if snapshot.insert(id, stateful.state()).is_some() {
                warn!(id, "identifier appears twice in snapshot; keeping the later state");
            }
        }
        debug!(root = %key, entries = snapshot.len(), "snapshot");
        Ok(snapshot)
    }

    /// Restore states onto descendants whose id is in `snapshot`. Ids with no
    /// live descendant are ignored. Returns how many nodes were restored.
    pub fn restore_descendants(
        &mut self,
        key: NodeKey,
        snapshot: &StateSnapshot,
    ) -> Result<usize, TreeError> {
        let mut restored = 0;
        for descendant in self.descendants(key)? {
            let node = self.node_mut(descendant)?;
            let Some(id) = node.id.as_deref() else {
                continue;
            };
            let Some(state) = snapshot.get(id) else {
                continue;
            };
            let id = id.to_string();
            let Some(stateful) = node.widget.as_deref_mut().and_then(|w| w.as_stateful_mut())
            else {
                continue;
            };
            stateful
                .set_state(state.clone())
                .map_err(|source| TreeError::InvalidState { id, source })?;
            restored += 1;
        }
        debug!(
            root = %key,
            restored,
            ignored = snapshot.len().saturating_sub(restored),
            "restore"
        );
        Ok(restored)
    }
}
