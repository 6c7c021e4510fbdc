//! Markup output helpers shared by every widget.
//!
//! Widgets write straight into a [`std::fmt::Write`] sink; nothing here
//! buffers or builds a document tree.

mod markup;
mod render;

pub use crate::markup::{Tag, escape_html};
pub use crate::render::{Render, render_to_string};
