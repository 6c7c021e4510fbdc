use std::fmt::{self, Display};

use bough_resource::ResourceSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Widget;

/// Handle to a node in a [`crate::WidgetTree`]. Only meaningful for the tree
/// that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey(pub(crate) usize);

impl NodeKey {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// A validation or status message attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        };
        write!(f, "{level}: {}", self.text)
    }
}

#[derive(Debug)]
pub(crate) struct NodeData {
    /// `None` only while the widget runs one of its own hooks.
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) kind: &'static str,
    pub(crate) id: Option<String>,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) visible: bool,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) children_by_id: IndexMap<String, NodeKey>,
    pub(crate) composites: IndexMap<String, NodeKey>,
    pub(crate) composites_created: bool,
    pub(crate) resources: ResourceSet,
    pub(crate) messages: Vec<Message>,
    pub(crate) initialized: bool,
    pub(crate) processed: bool,
}

impl NodeData {
    pub(crate) fn new(widget: Box<dyn Widget>) -> Self {
        let kind = widget.kind();
        Self {
            widget: Some(widget),
            kind,
            id: None,
            parent: None,
            visible: true,
            children: Vec::new(),
            children_by_id: IndexMap::new(),
            composites: IndexMap::new(),
            composites_created: false,
            resources: ResourceSet::new(),
            messages: Vec::new(),
            initialized: false,
            processed: false,
        }
    }
}
