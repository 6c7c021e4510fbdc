//! Deep copy of a subtree with identifier rewriting, and the record kept by
//! widgets that replicate subtrees.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::node::NodeData;
use crate::{NodeKey, TreeError, WidgetTree};

/// Correlates an original subtree with its copy.
#[derive(Debug, Clone, Default)]
pub struct CopyMap {
    suffix: String,
    keys: HashMap<NodeKey, NodeKey>,
    ids: IndexMap<String, NodeKey>,
}

impl CopyMap {
    fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            ..Default::default()
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The clone of `original`, if it was part of the copied subtree.
    pub fn key(&self, original: NodeKey) -> Option<NodeKey> {
        self.keys.get(&original).copied()
    }

    /// The clone of the node that had `original_id` before copying.
    pub fn clone_of(&self, original_id: &str) -> Option<NodeKey> {
        self.ids.get(original_id).copied()
    }

    pub fn rewrite_id(&self, id: &str) -> String {
        format!("{id}{}", self.suffix)
    }
}

/// Result of [`WidgetTree::copy`].
#[derive(Debug, Clone)]
pub struct Copied {
    pub root: NodeKey,
    /// Original id to clone, for every copied node that had an id. Ids are
    /// only unique per container, so an id used in two containers of the
    /// copied subtree maps to the later clone in pre-order.
    pub ids: IndexMap<String, NodeKey>,
}

impl Copied {
    pub fn clone_of(&self, original_id: &str) -> Option<NodeKey> {
        self.ids.get(original_id).copied()
    }
}

/// Replication key to (original id to clone).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationRecord(IndexMap<String, IndexMap<String, NodeKey>>);

impl ReplicationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add clones for `replication_key`, merging with what is already there.
    pub fn insert(&mut self, replication_key: impl Into<String>, ids: IndexMap<String, NodeKey>) {
        self.0.entry(replication_key.into()).or_default().extend(ids);
    }

    pub fn clone_of(&self, replication_key: &str, original_id: &str) -> Option<NodeKey> {
        self.0.get(replication_key)?.get(original_id).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, replication_key: &str) -> Option<&IndexMap<String, NodeKey>> {
        self.0.get(replication_key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Point every recorded clone at its own copy under `map`. Entries whose
    /// node was not part of the copy are dropped.
    pub fn remap(&mut self, map: &CopyMap) {
        for clones in self.0.values_mut() {
            *clones = clones
                .iter()
                .filter_map(|(id, &key)| Some((id.clone(), map.key(key)?)))
                .collect();
        }
    }
}

impl WidgetTree {
    /// Copy the subtree at `key` into a new, detached subtree.
    ///
    /// - Every id in the copy gets `suffix` appended.
    /// - Children, composites, id indexes and resources are rebuilt for the
    ///   copy; nothing mutable is shared with the original.
    /// - Each cloned widget is then given the chance to [`remap`] node keys it
    ///   holds.
    ///
    /// [`remap`]: crate::Widget::remap
    pub fn copy(&mut self, key: NodeKey, suffix: &str) -> Result<Copied, TreeError> {
        let mut map = CopyMap::new(suffix);
        let root = self.copy_node(key, None, &mut map)?;

        for &clone in map.keys.values() {
            if let Some(widget) = self.node_mut(clone)?.widget.as_deref_mut() {
                widget.remap(&map);
            }
        }

        debug!(original = %key, clone = %root, suffix, nodes = map.keys.len(), "copied subtree");
        Ok(Copied { root, ids: map.ids })
    }

    fn copy_node(
        &mut self,
        original: NodeKey,
        parent: Option<NodeKey>,
        map: &mut CopyMap,
    ) -> Result<NodeKey, TreeError> {
        let source = self.node(original)?;
        let widget = source
            .widget
            .as_deref()
            .ok_or(TreeError::WidgetInUse(original))?
            .clone_widget();
        let data = NodeData {
            widget: Some(widget),
            kind: source.kind,
            id: source.id.as_deref().map(|id| map.rewrite_id(id)),
            parent,
            visible: source.visible,
            children: Vec::with_capacity(source.children.len()),
            children_by_id: IndexMap::new(),
            composites: IndexMap::new(),
            composites_created: source.composites_created,
            resources: source.resources.clone(),
            messages: source.messages.clone(),
            initialized: source.initialized,
            processed: source.processed,
        };
        let original_id = source.id.clone();
        let children = source.children.clone();
        let composites: Vec<(String, NodeKey)> = source
            .composites
            .iter()
            .map(|(name, &key)| (name.clone(), key))
            .collect();

        let clone = self.push(data);
        map.keys.insert(original, clone);
        if let Some(id) = original_id {
            if let Some(earlier) = map.ids.insert(id.clone(), clone) {
                warn!(id = %id, %earlier, %clone, "identifier appears twice in copy; keeping the later clone");
            }
        }

        for (name, composite) in composites {
            let composite_clone = self.copy_node(composite, Some(clone), map)?;
            self.node_mut(clone)?
                .composites
                .insert(name, composite_clone);
        }
        for child in children {
            let child_clone = self.copy_node(child, Some(clone), map)?;
            let child_id = self.node(child_clone)?.id.clone();
            let node = self.node_mut(clone)?;
            node.children.push(child_clone);
            if let Some(id) = child_id {
                node.children_by_id.insert(id, child_clone);
            }
        }

        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Field, Label, Linker, Pair, Panel};
    use bough_resource::Resource;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_copy_rewrites_ids_and_indexes() {
        let mut tree = WidgetTree::new();
        let group = tree.create_with_id(Panel::default(), "group");
        let field = tree.create_with_id(Field::with_value("a"), "field");
        tree.append(group, field).unwrap();
        tree.declare(field, Resource::script("/field.js")).unwrap();

        let copied = tree.copy(group, "_2").unwrap();

        assert_eq!(tree.id(copied.root).unwrap(), Some("group_2"));
        assert_eq!(tree.parent(copied.root).unwrap(), None);
        let clone = tree.require_by_id(copied.root, "field_2").unwrap();
        assert_eq!(copied.clone_of("field"), Some(clone));
        assert_ne!(clone, field);
        assert_eq!(tree.parent(clone).unwrap(), Some(copied.root));
        assert_eq!(tree.lookup_by_id(copied.root, "field").unwrap(), None);
        assert!(tree.resources(clone).unwrap().contains(&Resource::script("/field.js")));

        // original untouched
        assert_eq!(tree.children(group).unwrap(), &[field]);
        assert_eq!(tree.id(field).unwrap(), Some("field"));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut tree = WidgetTree::new();
        let group = tree.create(Panel::default());
        let field = tree.create_with_id(Field::with_value("a"), "field");
        tree.append(group, field).unwrap();

        let copied = tree.copy(group, "_x").unwrap();
        let clone = copied.clone_of("field").unwrap();
        tree.widget_as_mut::<Field>(clone).unwrap().value = "b".to_string();
        let extra = tree.create(Label::new("extra"));
        tree.append(copied.root, extra).unwrap();

        assert_eq!(tree.widget_as::<Field>(field).unwrap().value, "a");
        assert_eq!(tree.children(group).unwrap().len(), 1);
        assert_eq!(tree.children(copied.root).unwrap().len(), 2);
    }

    #[test]
    fn test_copy_keeps_later_clone_for_repeated_id() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Panel::default());
        let left = tree.create(Panel::default());
        let right = tree.create(Panel::default());
        tree.append(root, left).unwrap();
        tree.append(root, right).unwrap();
        let a = tree.create_with_id(Field::default(), "name");
        let b = tree.create_with_id(Field::default(), "name");
        tree.append(left, a).unwrap();
        tree.append(right, b).unwrap();

        let copied = tree.copy(root, "_1").unwrap();

        let clones = tree.children(copied.root).unwrap().to_vec();
        let right_clone = tree.require_by_id(clones[1], "name_1").unwrap();
        assert_eq!(copied.clone_of("name"), Some(right_clone));
        assert!(tree.require_by_id(clones[0], "name_1").is_ok());
    }

    #[test]
    fn test_copy_carries_composites() {
        let mut tree = WidgetTree::new();
        let pair = tree.create_with_id(Pair::default(), "pair");
        tree.confirm_composites(pair).unwrap();

        let copied = tree.copy(pair, "_1").unwrap();

        assert!(tree.composites_created(copied.root).unwrap());
        let left = tree.composite(copied.root, "left").unwrap().unwrap();
        assert_eq!(tree.id(left).unwrap(), Some("pair_left_1"));
        assert_eq!(tree.parent(left).unwrap(), Some(copied.root));
        assert_ne!(Some(left), tree.composite(pair, "left").unwrap());

        let (html, _) = tree.display_to_string(copied.root).unwrap();
        assert_eq!(html, "LR");
    }

    #[test]
    fn test_copy_remaps_held_keys() {
        let mut tree = WidgetTree::new();
        let linker = tree.create(Linker::default());
        let target = tree.create_with_id(Label::new("t"), "target");
        let outside = tree.create(Label::new("o"));
        tree.append(linker, target).unwrap();
        tree.widget_as_mut::<Linker>(linker).unwrap().target = Some(target);

        let copied = tree.copy(linker, "_c").unwrap();
        let linked = tree.widget_as::<Linker>(copied.root).unwrap().target;
        assert_eq!(linked, copied.clone_of("target"));

        tree.widget_as_mut::<Linker>(linker).unwrap().target = Some(outside);
        let copied = tree.copy(linker, "_d").unwrap();
        assert_eq!(tree.widget_as::<Linker>(copied.root).unwrap().target, None);
    }

    #[test]
    fn test_replication_record_remaps() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Panel::default());
        let row = tree.create(Panel::default());
        tree.append(root, row).unwrap();
        let field = tree.create_with_id(Field::default(), "field_a");
        tree.append(row, field).unwrap();

        let mut record = ReplicationRecord::new();
        record.insert("a", IndexMap::from([("field".to_string(), field)]));
        assert_eq!(record.clone_of("a", "field"), Some(field));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a"]);

        let mut map = CopyMap::new("_2");
        let copied_root = tree.copy_node(root, None, &mut map).unwrap();
        record.remap(&map);

        let clone = record.clone_of("a", "field").unwrap();
        assert_ne!(clone, field);
        assert_eq!(tree.id(clone).unwrap(), Some("field_a_2"));
        assert_eq!(tree.descendants(copied_root).unwrap()[1], clone);
    }
}
