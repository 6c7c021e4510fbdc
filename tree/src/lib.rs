//! Server-side widget trees: identified nodes in an arena, driven through
//! `init`, `process` and `display` on each request.
//!
//! Assumptions for WidgetTree:
//! - Nodes are addressed by [`NodeKey`]; keys stay valid for the life of the
//!   tree, detached nodes included.
//! - Ids are unique among the children of one container, not tree-wide.
//! - Composites are owned by one node, are not part of its children, and are
//!   visited after the node itself and before its children.
//! - Widgets are cloned with [`WidgetClone`]; a copy never shares mutable
//!   state with its original.

mod copy;
mod error;
mod form;
mod node;
mod state;
mod traverse;
mod tree;
mod widget;

#[cfg(test)]
mod testing;

pub use crate::copy::{Copied, CopyMap, ReplicationRecord};
pub use crate::error::TreeError;
pub use crate::form::FormData;
pub use crate::node::{Message, MessageLevel, NodeKey};
pub use crate::state::StateSnapshot;
pub use crate::traverse::{CompositeContext, DisplayContext, InitContext, ProcessContext};
pub use crate::tree::{DEFAULT_AUTO_ID_PREFIX, Position, WidgetTree};
pub use crate::widget::{AsAny, Phase, Stateful, Widget, WidgetClone};
