//! A small catalog of widgets built on `bough-tree`.
//!
//! Every widget here derives `Deserialize` so pages can describe it with
//! plain props; see [`registry::build`].

mod content;
mod form;
mod frame;
mod input;
mod menu;
pub mod registry;
mod replicator;
mod search;

use bough_tree::{DisplayContext, MessageLevel, TreeError};
use bough_view::{Render, Tag};

pub use crate::content::Content;
pub use crate::form::Form;
pub use crate::frame::Frame;
pub use crate::input::{Button, Checkbox, Entry};
pub use crate::menu::{Menu, MenuItem};
pub use crate::registry::{BuildError, build};
pub use crate::replicator::Replicator;
pub use crate::search::SearchBox;

/// Write the node's own messages as `<span class="message {level}">`.
pub(crate) fn display_messages(ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
    for message in ctx.messages() {
        let level = match message.level {
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        };
        let tag = Tag::new("span").attr("class", format!("message {level}"));
        tag.open(ctx.out())?;
        message.text.render(ctx.out())?;
        tag.close(ctx.out())?;
    }
    Ok(())
}
