//! The three request passes: `init`, `process`, `display`.
//!
//! - `init` and `process` are pre-order: a node's own hook runs before its
//!   composites, then its children, in insertion order.
//! - Each node is initialized and processed at most once; a second call is a
//!   no-op for nodes already through that phase.
//! - `display` lets the widget decide where its children go. A hidden node
//!   writes nothing and records no resources.
//! - Any error aborts the whole pass.

use std::fmt::Write;

use bough_resource::ResourceSet;
use tracing::{debug, trace};

use crate::{FormData, Message, NodeKey, Phase, TreeError, Widget, WidgetTree};

/// Handed to [`Widget::create_composites`].
pub struct CompositeContext<'a> {
    tree: &'a mut WidgetTree,
    owner: NodeKey,
}

impl CompositeContext<'_> {
    pub fn owner(&self) -> NodeKey {
        self.owner
    }

    /// Create a sub-widget owned by this node, registered under `name`.
    ///
    /// Its id is `"{owner_id}_{name}"` when the owner has an id.
    pub fn add(&mut self, name: &str, widget: impl Widget) -> Result<NodeKey, TreeError> {
        self.add_boxed(name, Box::new(widget))
    }

    pub fn add_boxed(&mut self, name: &str, widget: Box<dyn Widget>) -> Result<NodeKey, TreeError> {
        let owner = self.tree.node(self.owner)?;
        if owner.composites.contains_key(name) {
            return Err(TreeError::DuplicateIdentifier {
                id: name.to_string(),
                container: self.owner,
            });
        }
        let id = owner.id.as_ref().map(|owner_id| format!("{owner_id}_{name}"));

        let key = self.tree.create_boxed(widget);
        let node = self.tree.node_mut(key)?;
        node.id = id;
        node.parent = Some(self.owner);
        self.tree
            .node_mut(self.owner)?
            .composites
            .insert(name.to_string(), key);
        trace!(owner = %self.owner, name, %key, "created composite");
        Ok(key)
    }
}

/// Handed to [`Widget::init`]. The widget itself is out of the tree while
/// its hook runs; everything else is reachable.
pub struct InitContext<'a> {
    tree: &'a mut WidgetTree,
    key: NodeKey,
}

impl InitContext<'_> {
    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn id(&self) -> Option<&str> {
        self.tree.id(self.key).ok().flatten()
    }

    pub fn tree(&self) -> &WidgetTree {
        self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        self.tree
    }
}

/// Handed to [`Widget::process`].
pub struct ProcessContext<'a> {
    tree: &'a WidgetTree,
    key: NodeKey,
    messages: Vec<Message>,
}

impl<'a> ProcessContext<'a> {
    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn id(&self) -> Option<&'a str> {
        self.tree.id(self.key).ok().flatten()
    }

    pub fn tree(&self) -> &'a WidgetTree {
        self.tree
    }

    /// Submitted values of the nearest form-like ancestor.
    pub fn form_data(&self) -> Result<&'a FormData, TreeError> {
        let mut current = self.tree.parent(self.key)?;
        while let Some(ancestor) = current {
            let data = self
                .tree
                .widget(ancestor)
                .ok()
                .and_then(|widget| widget.form_data());
            if let Some(data) = data {
                return Ok(data);
            }
            current = self.tree.parent(ancestor)?;
        }
        Err(TreeError::MissingAncestor {
            node: self.key,
            ancestor: "form",
        })
    }

    /// The value submitted under this node's id, if any. A node without an id
    /// is never submitted.
    pub fn submitted_value(&self) -> Result<Option<&'a str>, TreeError> {
        let data = self.form_data()?;
        Ok(self.id().and_then(|id| data.get(id)))
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// Handed to [`Widget::display`].
pub struct DisplayContext<'a> {
    tree: &'a WidgetTree,
    key: NodeKey,
    out: &'a mut dyn Write,
    used: &'a mut ResourceSet,
}

impl<'a> DisplayContext<'a> {
    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn id(&self) -> Option<&'a str> {
        self.tree.id(self.key).ok().flatten()
    }

    pub fn tree(&self) -> &'a WidgetTree {
        self.tree
    }

    pub fn messages(&self) -> &'a [Message] {
        self.tree.own_messages(self.key).unwrap_or_default()
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), TreeError> {
        self.out.write_str(s)?;
        Ok(())
    }

    pub fn display_children(&mut self) -> Result<(), TreeError> {
        let children = self.tree.children(self.key)?;
        for &child in children {
            display_node(self.tree, child, &mut *self.out, &mut *self.used)?;
        }
        Ok(())
    }

    pub fn display_child(&mut self, child: NodeKey) -> Result<(), TreeError> {
        display_node(self.tree, child, &mut *self.out, &mut *self.used)
    }

    /// Display the composite registered under `name`.
    pub fn display_composite(&mut self, name: &str) -> Result<(), TreeError> {
        let composite = self
            .tree
            .composite(self.key, name)?
            .ok_or_else(|| TreeError::MissingWidget {
                owner: self.key,
                name: name.to_string(),
            })?;
        display_node(self.tree, composite, &mut *self.out, &mut *self.used)
    }
}

fn display_node(
    tree: &WidgetTree,
    key: NodeKey,
    out: &mut dyn Write,
    used: &mut ResourceSet,
) -> Result<(), TreeError> {
    if !tree.is_visible(key)? {
        trace!(%key, "skipped hidden node");
        return Ok(());
    }
    let node = tree.node(key)?;
    let widget = node.widget.as_deref().ok_or(TreeError::WidgetInUse(key))?;
    used.extend_from(&node.resources);
    trace!(%key, kind = node.kind, "display");
    let mut ctx = DisplayContext {
        tree,
        key,
        out,
        used,
    };
    widget.display(&mut ctx)
}

impl WidgetTree {
    /// Create the node's composites if they do not exist yet.
    pub fn confirm_composites(&mut self, key: NodeKey) -> Result<(), TreeError> {
        if self.node(key)?.composites_created {
            return Ok(());
        }
        self.node_mut(key)?.composites_created = true;
        self.with_widget(key, |widget, tree| {
            widget.create_composites(&mut CompositeContext { tree, owner: key })
        })
    }

    #[tracing::instrument(skip_all, fields(root = %key))]
    pub fn init(&mut self, key: NodeKey) -> Result<(), TreeError> {
        debug!("init");
        self.init_node(key)
    }

    fn init_node(&mut self, key: NodeKey) -> Result<(), TreeError> {
        let node = self.node(key)?;
        if node.initialized {
            return Ok(());
        }

        if node.id.is_none() && self.widget(key)?.requires_id() {
            let id = self.next_auto_id(key)?;
            trace!(%key, id = %id, "assigned auto id");
            self.set_id(key, Some(id))?;
        }
        self.confirm_composites(key)?;
        self.with_widget(key, |widget, tree| {
            widget.init(&mut InitContext { tree, key })
        })?;
        self.node_mut(key)?.initialized = true;
        trace!(%key, kind = self.node(key)?.kind, "initialized");

        if !self.widget(key)?.descend(Phase::Init) {
            return Ok(());
        }
        let node = self.node(key)?;
        let composites: Vec<NodeKey> = node.composites.values().copied().collect();
        let children = node.children.clone();
        for composite in composites {
            self.init_node(composite)?;
        }
        for child in children {
            self.init_node(child)?;
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(root = %key))]
    pub fn process(&mut self, key: NodeKey) -> Result<(), TreeError> {
        debug!("process");
        self.process_node(key)
    }

    fn process_node(&mut self, key: NodeKey) -> Result<(), TreeError> {
        if self.node(key)?.processed {
            trace!(%key, "already processed");
            return Ok(());
        }
        if !self.node(key)?.initialized {
            self.init_node(key)?;
        }

        let messages = self.with_widget(key, |widget, tree| {
            let mut ctx = ProcessContext {
                tree,
                key,
                messages: Vec::new(),
            };
            widget.process(&mut ctx)?;
            Ok(ctx.messages)
        })?;
        let node = self.node_mut(key)?;
        node.messages.extend(messages);
        node.processed = true;
        trace!(%key, kind = node.kind, "processed");

        if !self.widget(key)?.descend(Phase::Process) {
            return Ok(());
        }
        let node = self.node(key)?;
        let composites: Vec<NodeKey> = node.composites.values().copied().collect();
        let children = node.children.clone();
        for composite in composites {
            self.process_node(composite)?;
        }
        for child in children {
            self.process_node(child)?;
        }
        Ok(())
    }

    /// Write the subtree's markup to `out`. Returns the resources of every
    /// node that was actually displayed.
    #[tracing::instrument(skip_all, fields(root = %key))]
    pub fn display(&self, key: NodeKey, out: &mut dyn Write) -> Result<ResourceSet, TreeError> {
        let mut used = ResourceSet::new();
        display_node(self, key, out, &mut used)?;
        debug!(resources = used.len(), "displayed");
        Ok(used)
    }

    /// Display into a fresh `String`.
    pub fn display_to_string(&self, key: NodeKey) -> Result<(String, ResourceSet), TreeError> {
        let mut out = String::new();
        let used = self.display(key, &mut out)?;
        Ok((out, used))
    }
}
