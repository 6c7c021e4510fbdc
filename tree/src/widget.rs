use std::any::Any;
use std::fmt::Debug;

use serde_json::Value;

use crate::{
    CompositeContext, CopyMap, DisplayContext, FormData, InitContext, NodeKey, ProcessContext,
    TreeError,
};

/// Traversal phases a widget can opt out of descending in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Process,
}

/// Widget behavior stored in a tree node.
///
/// Structure (id, parent, children, visibility, resources) lives in the tree;
/// a widget only holds its own values and decides what to do in each phase.
/// Every hook has a default so leaf widgets implement only what they use.
pub trait Widget: AsAny + WidgetClone + Debug + Send + 'static {
    /// Short name of the widget type, used in errors, logs and generated ids.
    fn kind(&self) -> &'static str;

    /// Whether `init` should allocate an id when none was assigned.
    fn requires_id(&self) -> bool {
        false
    }

    /// Whether this widget can contain `child`. Checked on insert and replace.
    fn accepts_child(&self, _child: &dyn Widget) -> bool {
        true
    }

    /// Called on the container and every ancestor above it after `added` is
    /// inserted anywhere below.
    fn descendant_added(&mut self, _key: NodeKey, _added: &dyn Widget) {}

    /// Create owned sub-widgets. Runs at most once per node.
    fn create_composites(&mut self, _ctx: &mut CompositeContext<'_>) -> Result<(), TreeError> {
        Ok(())
    }

    fn init(&mut self, _ctx: &mut InitContext<'_>) -> Result<(), TreeError> {
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext<'_>) -> Result<(), TreeError> {
        Ok(())
    }

    /// Whether the tree should continue into composites and children after
    /// this widget's own hook for `phase`.
    fn descend(&self, _phase: Phase) -> bool {
        true
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        ctx.display_children()
    }

    /// Submitted form values, for form-like widgets.
    fn form_data(&self) -> Option<&FormData> {
        None
    }

    fn as_stateful(&self) -> Option<&dyn Stateful> {
        None
    }

    fn as_stateful_mut(&mut self) -> Option<&mut dyn Stateful> {
        None
    }

    /// Point any node keys this widget holds at their clones. Called on every
    /// cloned widget once its whole subtree has been copied.
    fn remap(&mut self, _map: &CopyMap) {}
}

/// Widgets whose value can be captured and restored across requests.
pub trait Stateful {
    fn state(&self) -> Value;

    fn set_state(&mut self, state: Value) -> Result<(), serde_json::Error>;
}

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub trait WidgetClone {
    fn clone_widget(&self) -> Box<dyn Widget>;
}

impl<T> WidgetClone for T
where
    T: Widget + Clone,
{
    fn clone_widget(&self) -> Box<dyn Widget> {
        Box::new(self.clone())
    }
}

impl dyn Widget + '_ {
    pub fn is<T: Widget>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Widget>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Widget>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}
