use bough_resource::{Resource, ResourceSet};
use indexmap::IndexMap;
use tracing::trace;

use crate::node::NodeData;
use crate::{Message, NodeKey, TreeError, Widget};

pub const DEFAULT_AUTO_ID_PREFIX: &str = "auto";

/// Where to splice a node into a container's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Start,
    End,
    Before(NodeKey),
    After(NodeKey),
}

/// An arena of widget nodes.
///
/// Assumptions:
/// - Keys index into `nodes` and are never reused; removing a node from its
///   container only detaches it.
/// - A node is a child of at most one container, or a composite of at most
///   one owner, never both.
/// - `children` is the single source of truth for order; `children_by_id`
///   mirrors the children that have an id.
#[derive(Debug)]
pub struct WidgetTree {
    nodes: Vec<NodeData>,
    auto_id_prefix: String,
    auto_id_counter: usize,
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            auto_id_prefix: DEFAULT_AUTO_ID_PREFIX.to_string(),
            auto_id_counter: 0,
        }
    }

    pub fn with_auto_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auto_id_prefix = prefix.into();
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + use<> {
        (0..self.nodes.len()).map(NodeKey)
    }

    /// Add a detached node holding `widget`.
    pub fn create(&mut self, widget: impl Widget) -> NodeKey {
        self.create_boxed(Box::new(widget))
    }

    pub fn create_boxed(&mut self, widget: Box<dyn Widget>) -> NodeKey {
        self.push(NodeData::new(widget))
    }

    /// Add a detached node with an id.
    pub fn create_with_id(&mut self, widget: impl Widget, id: impl Into<String>) -> NodeKey {
        let key = self.create(widget);
        self.nodes[key.0].id = Some(id.into());
        key
    }

    pub(crate) fn push(&mut self, node: NodeData) -> NodeKey {
        let key = NodeKey(self.nodes.len());
        self.nodes.push(node);
        key
    }

    pub(crate) fn node(&self, key: NodeKey) -> Result<&NodeData, TreeError> {
        self.nodes.get(key.0).ok_or(TreeError::NodeMissing(key))
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Result<&mut NodeData, TreeError> {
        self.nodes.get_mut(key.0).ok_or(TreeError::NodeMissing(key))
    }

    /// Run `f` with the node's widget taken out of the arena, so the widget
    /// can be mutated while the rest of the tree stays reachable.
    pub(crate) fn with_widget<R, F>(&mut self, key: NodeKey, f: F) -> Result<R, TreeError>
    where
        F: FnOnce(&mut dyn Widget, &mut WidgetTree) -> Result<R, TreeError>,
    {
        let mut widget = self
            .node_mut(key)?
            .widget
            .take()
            .ok_or(TreeError::WidgetInUse(key))?;
        let result = f(widget.as_mut(), self);
        self.nodes[key.0].widget = Some(widget);
        result
    }

    pub fn widget(&self, key: NodeKey) -> Result<&dyn Widget, TreeError> {
        self.node(key)?
            .widget
            .as_deref()
            .ok_or(TreeError::WidgetInUse(key))
    }

    pub fn widget_mut(&mut self, key: NodeKey) -> Result<&mut dyn Widget, TreeError> {
        match self.node_mut(key)?.widget.as_deref_mut() {
            Some(widget) => Ok(widget),
            None => Err(TreeError::WidgetInUse(key)),
        }
    }

    pub fn widget_as<T: Widget>(&self, key: NodeKey) -> Option<&T> {
        self.widget(key).ok()?.downcast_ref::<T>()
    }

    pub fn widget_as_mut<T: Widget>(&mut self, key: NodeKey) -> Option<&mut T> {
        self.widget_mut(key).ok()?.downcast_mut::<T>()
    }

    pub fn kind(&self, key: NodeKey) -> Result<&'static str, TreeError> {
        Ok(self.node(key)?.kind)
    }

    pub fn id(&self, key: NodeKey) -> Result<Option<&str>, TreeError> {
        Ok(self.node(key)?.id.as_deref())
    }

    /// Set or clear a node's id, keeping its container's index in sync.
    pub fn set_id(&mut self, key: NodeKey, id: Option<String>) -> Result<(), TreeError> {
        let node = self.node(key)?;
        let old_id = node.id.clone();
        if old_id == id {
            return Ok(());
        }

        if let Some(parent) = node.parent {
            let container = self.node(parent)?;
            let is_child = container.children.contains(&key);
            if is_child {
                if let Some(new_id) = &id {
                    if container.children_by_id.contains_key(new_id) {
                        return Err(TreeError::DuplicateIdentifier {
                            id: new_id.clone(),
                            container: parent,
                        });
                    }
                }
                let container = self.node_mut(parent)?;
                if let Some(old_id) = &old_id {
                    container.children_by_id.shift_remove(old_id);
                }
                if let Some(new_id) = &id {
                    container.children_by_id.insert(new_id.clone(), key);
                }
            }
        }

        self.node_mut(key)?.id = id;
        Ok(())
    }

    pub fn parent(&self, key: NodeKey) -> Result<Option<NodeKey>, TreeError> {
        Ok(self.node(key)?.parent)
    }

    pub fn visible(&self, key: NodeKey) -> Result<bool, TreeError> {
        Ok(self.node(key)?.visible)
    }

    pub fn set_visible(&mut self, key: NodeKey, visible: bool) -> Result<(), TreeError> {
        self.node_mut(key)?.visible = visible;
        Ok(())
    }

    /// Own flag and every ancestor's flag. Stops at the first invisible node.
    pub fn is_visible(&self, key: NodeKey) -> Result<bool, TreeError> {
        let mut current = Some(key);
        while let Some(key) = current {
            let node = self.node(key)?;
            if !node.visible {
                return Ok(false);
            }
            current = node.parent;
        }
        Ok(true)
    }

    pub fn is_initialized(&self, key: NodeKey) -> Result<bool, TreeError> {
        Ok(self.node(key)?.initialized)
    }

    pub fn is_processed(&self, key: NodeKey) -> Result<bool, TreeError> {
        Ok(self.node(key)?.processed)
    }

    /// First ancestor whose widget matches `predicate`.
    pub fn ancestor_where<P>(&self, key: NodeKey, predicate: P) -> Result<Option<NodeKey>, TreeError>
    where
        P: Fn(&dyn Widget) -> bool,
    {
        let mut current = self.node(key)?.parent;
        while let Some(ancestor) = current {
            let node = self.node(ancestor)?;
            if node.widget.as_deref().is_some_and(|widget| predicate(widget)) {
                return Ok(Some(ancestor));
            }
            current = node.parent;
        }
        Ok(None)
    }

    pub fn ancestor_of<T: Widget>(&self, key: NodeKey) -> Result<Option<(NodeKey, &T)>, TreeError> {
        let Some(ancestor) = self.ancestor_where(key, |widget| widget.is::<T>())? else {
            return Ok(None);
        };
        Ok(self.widget_as::<T>(ancestor).map(|widget| (ancestor, widget)))
    }

    /// Like [`Self::ancestor_of`], but a missing ancestor is an error.
    pub fn require_ancestor_of<T: Widget>(
        &self,
        key: NodeKey,
        ancestor: &'static str,
    ) -> Result<(NodeKey, &T), TreeError> {
        self.ancestor_of::<T>(key)?
            .ok_or(TreeError::MissingAncestor { node: key, ancestor })
    }

    fn is_ancestor(&self, candidate: NodeKey, key: NodeKey) -> Result<bool, TreeError> {
        let mut current = self.node(key)?.parent;
        while let Some(ancestor) = current {
            if ancestor == candidate {
                return Ok(true);
            }
            current = self.node(ancestor)?.parent;
        }
        Ok(false)
    }

    pub fn append(&mut self, parent: NodeKey, node: NodeKey) -> Result<(), TreeError> {
        self.insert(parent, node, Position::End)
    }

    /// Attach `node` to `parent` at `position`.
    ///
    /// Every check runs before anything is mutated, so a failed insert leaves
    /// both nodes as they were.
    pub fn insert(
        &mut self,
        parent: NodeKey,
        node: NodeKey,
        position: Position,
    ) -> Result<(), TreeError> {
        if let Some(existing) = self.node(node)?.parent {
            return Err(TreeError::AlreadyAttached {
                node,
                parent: existing,
            });
        }
        if node == parent || self.is_ancestor(node, parent)? {
            return Err(TreeError::InsertIntoDescendant { node, parent });
        }
        let index = self.position_index(parent, position)?;
        self.check_accepts(parent, node)?;

        let id = self.node(node)?.id.clone();
        if let Some(id) = &id {
            if self.node(parent)?.children_by_id.contains_key(id) {
                return Err(TreeError::DuplicateIdentifier {
                    id: id.clone(),
                    container: parent,
                });
            }
        }

        let container = self.node_mut(parent)?;
        container.children.insert(index, node);
        if let Some(id) = id {
            container.children_by_id.insert(id, node);
        }
        self.node_mut(node)?.parent = Some(parent);
        trace!(%parent, %node, index, "inserted node");

        self.notify_added(parent, node);
        Ok(())
    }

    /// Detach `node` from `parent`. Returns `None` if it was not a child.
    pub fn remove(&mut self, parent: NodeKey, node: NodeKey) -> Option<NodeKey> {
        let index = self
            .nodes
            .get(parent.0)?
            .children
            .iter()
            .position(|&child| child == node)?;
        let id = self.nodes[node.0].id.clone();

        let container = &mut self.nodes[parent.0];
        container.children.remove(index);
        if let Some(id) = id {
            if container.children_by_id.get(&id) == Some(&node) {
                container.children_by_id.shift_remove(&id);
            }
        }
        self.nodes[node.0].parent = None;
        trace!(%parent, %node, "removed node");
        Some(node)
    }

    /// Put `new` in `old`'s place and return `old`, now detached.
    pub fn replace(
        &mut self,
        parent: NodeKey,
        old: NodeKey,
        new: NodeKey,
    ) -> Result<NodeKey, TreeError> {
        if let Some(existing) = self.node(new)?.parent {
            return Err(TreeError::AlreadyAttached {
                node: new,
                parent: existing,
            });
        }
        if new == parent || self.is_ancestor(new, parent)? {
            return Err(TreeError::InsertIntoDescendant { node: new, parent });
        }
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|&child| child == old)
            .ok_or_else(|| TreeError::NotFound {
                container: parent,
                what: format!("child {old}"),
            })?;
        self.check_accepts(parent, new)?;

        let old_id = self.node(old)?.id.clone();
        let new_id = self.node(new)?.id.clone();
        if let Some(id) = &new_id {
            if let Some(&existing) = self.node(parent)?.children_by_id.get(id) {
                if existing != old {
                    return Err(TreeError::DuplicateIdentifier {
                        id: id.clone(),
                        container: parent,
                    });
                }
            }
        }

        let container = self.node_mut(parent)?;
        container.children[index] = new;
        if let Some(id) = &old_id {
            container.children_by_id.shift_remove(id);
        }
        if let Some(id) = new_id {
            container.children_by_id.insert(id, new);
        }
        self.node_mut(old)?.parent = None;
        self.node_mut(new)?.parent = Some(parent);
        trace!(%parent, %old, %new, "replaced node");

        self.notify_added(parent, new);
        Ok(old)
    }

    fn position_index(&self, parent: NodeKey, position: Position) -> Result<usize, TreeError> {
        let children = &self.node(parent)?.children;
        let find = |reference: NodeKey| {
            children
                .iter()
                .position(|&child| child == reference)
                .ok_or_else(|| TreeError::NotFound {
                    container: parent,
                    what: format!("reference {reference}"),
                })
        };
        match position {
            Position::Start => Ok(0),
            Position::End => Ok(children.len()),
            Position::Before(reference) => find(reference),
            Position::After(reference) => find(reference).map(|index| index + 1),
        }
    }

    // A container busy in one of its own hooks inserts without the check.
    fn check_accepts(&self, parent: NodeKey, child: NodeKey) -> Result<(), TreeError> {
        let container = self.node(parent)?.widget.as_deref();
        let widget = self.node(child)?.widget.as_deref();
        let (Some(container), Some(widget)) = (container, widget) else {
            return Ok(());
        };
        if container.accepts_child(widget) {
            Ok(())
        } else {
            Err(TreeError::InvalidChildType {
                container: parent,
                kind: container.kind(),
                child_kind: widget.kind(),
            })
        }
    }

    fn notify_added(&mut self, parent: NodeKey, added: NodeKey) {
        let mut current = Some(parent);
        while let Some(key) = current {
            current = self.nodes[key.0].parent;
            let Some(mut widget) = self.nodes[key.0].widget.take() else {
                continue;
            };
            if let Some(added_widget) = self.nodes[added.0].widget.as_deref() {
                widget.descendant_added(added, added_widget);
            }
            self.nodes[key.0].widget = Some(widget);
        }
    }

    pub fn children(&self, key: NodeKey) -> Result<&[NodeKey], TreeError> {
        Ok(&self.node(key)?.children)
    }

    pub fn first_child(&self, key: NodeKey) -> Result<Option<NodeKey>, TreeError> {
        Ok(self.node(key)?.children.first().copied())
    }

    /// Children whose widget matches `predicate`, in order.
    pub fn children_where<P>(&self, key: NodeKey, predicate: P) -> Result<Vec<NodeKey>, TreeError>
    where
        P: Fn(&dyn Widget) -> bool,
    {
        let node = self.node(key)?;
        let mut matches = Vec::new();
        for &child in &node.children {
            if self.node(child)?.widget.as_deref().is_some_and(|widget| predicate(widget)) {
                matches.push(child);
            }
        }
        Ok(matches)
    }

    pub fn children_of<T: Widget>(&self, key: NodeKey) -> Result<Vec<NodeKey>, TreeError> {
        self.children_where(key, |widget| widget.is::<T>())
    }

    pub fn lookup_by_id(&self, key: NodeKey, id: &str) -> Result<Option<NodeKey>, TreeError> {
        Ok(self.node(key)?.children_by_id.get(id).copied())
    }

    pub fn require_by_id(&self, key: NodeKey, id: &str) -> Result<NodeKey, TreeError> {
        self.lookup_by_id(key, id)?
            .ok_or_else(|| TreeError::NotFound {
                container: key,
                what: format!("id \"{id}\""),
            })
    }

    /// Descendants reached through children, pre-order, excluding `key`.
    pub fn descendants(&self, key: NodeKey) -> Result<Vec<NodeKey>, TreeError> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeKey> = self.node(key)?.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.node(current)?.children.iter().rev().copied());
        }
        Ok(order)
    }

    /// First descendant (through children) with `id`, pre-order.
    pub fn find_descendant_by_id(
        &self,
        key: NodeKey,
        id: &str,
    ) -> Result<Option<NodeKey>, TreeError> {
        for descendant in self.descendants(key)? {
            if self.node(descendant)?.id.as_deref() == Some(id) {
                return Ok(Some(descendant));
            }
        }
        Ok(None)
    }

    /// `key`, its composites and its children, recursively, pre-order.
    pub(crate) fn subtree(&self, key: NodeKey) -> Result<Vec<NodeKey>, TreeError> {
        let mut order = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            order.push(current);
            let node = self.node(current)?;
            stack.extend(node.children.iter().rev().copied());
            stack.extend(node.composites.values().rev().copied());
        }
        Ok(order)
    }

    pub fn composite(&self, owner: NodeKey, name: &str) -> Result<Option<NodeKey>, TreeError> {
        Ok(self.node(owner)?.composites.get(name).copied())
    }

    pub fn composites(&self, owner: NodeKey) -> Result<Vec<(&str, NodeKey)>, TreeError> {
        Ok(self
            .node(owner)?
            .composites
            .iter()
            .map(|(name, &key)| (name.as_str(), key))
            .collect())
    }

    pub fn composites_created(&self, owner: NodeKey) -> Result<bool, TreeError> {
        Ok(self.node(owner)?.composites_created)
    }

    pub(crate) fn next_auto_id(&mut self, key: NodeKey) -> Result<String, TreeError> {
        let siblings = match self.node(key)?.parent {
            Some(parent) => Some(&self.node(parent)?.children_by_id),
            None => None,
        };
        let mut counter = self.auto_id_counter;
        let id = loop {
            counter += 1;
            let candidate = format!("{}{}", self.auto_id_prefix, counter);
            if !siblings.is_some_and(|ids: &IndexMap<String, NodeKey>| ids.contains_key(&candidate))
            {
                break candidate;
            }
        };
        self.auto_id_counter = counter;
        Ok(id)
    }

    /// Declare a resource this node needs. Returns false if already declared.
    pub fn declare(&mut self, key: NodeKey, resource: Resource) -> Result<bool, TreeError> {
        Ok(self.node_mut(key)?.resources.declare(resource))
    }

    /// The node's own declarations.
    pub fn resources(&self, key: NodeKey) -> Result<&ResourceSet, TreeError> {
        Ok(&self.node(key)?.resources)
    }

    /// Everything the subtree might need, visible or not.
    pub fn collect(&self, key: NodeKey) -> Result<ResourceSet, TreeError> {
        let mut set = ResourceSet::new();
        for node in self.subtree(key)? {
            set.extend_from(&self.node(node)?.resources);
        }
        Ok(set)
    }

    /// What the subtree needs if displayed now: empty when it is hidden.
    pub fn collect_if_visible(&self, key: NodeKey) -> Result<ResourceSet, TreeError> {
        if !self.is_visible(key)? {
            return Ok(ResourceSet::new());
        }
        self.collect(key)
    }

    pub fn add_message(&mut self, key: NodeKey, message: Message) -> Result<(), TreeError> {
        self.node_mut(key)?.messages.push(message);
        Ok(())
    }

    /// The node's own messages.
    pub fn own_messages(&self, key: NodeKey) -> Result<&[Message], TreeError> {
        Ok(&self.node(key)?.messages)
    }

    /// Messages of the node and everything below it, in traversal order.
    pub fn messages(&self, key: NodeKey) -> Result<Vec<(NodeKey, Message)>, TreeError> {
        let mut messages = Vec::new();
        for node in self.subtree(key)? {
            for message in &self.node(node)?.messages {
                messages.push((node, message.clone()));
            }
        }
        Ok(messages)
    }

    pub fn has_messages(&self, key: NodeKey) -> Result<bool, TreeError> {
        for node in self.subtree(key)? {
            if !self.node(node)?.messages.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
