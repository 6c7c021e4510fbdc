use bough_tree::{CompositeContext, DisplayContext, NodeKey, TreeError, Widget, WidgetTree};
use bough_view::Tag;
use serde::Deserialize;

use crate::{Button, Entry};

/// A text entry and a submit button, owned as the composites `entry` and
/// `button`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchBox {
    pub placeholder: Option<String>,
    pub button_text: String,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self {
            placeholder: None,
            button_text: "Search".to_string(),
        }
    }
}

impl SearchBox {
    pub const ENTRY: &'static str = "entry";
    pub const BUTTON: &'static str = "button";

    /// The submitted query, once `key` has been processed.
    pub fn query(tree: &WidgetTree, key: NodeKey) -> Result<Option<&str>, TreeError> {
        let Some(entry) = tree.composite(key, Self::ENTRY)? else {
            return Ok(None);
        };
        Ok(tree
            .widget_as::<Entry>(entry)
            .map(|entry| entry.value.as_str())
            .filter(|value| !value.is_empty()))
    }

    /// Whether the search button submitted the form.
    pub fn searched(tree: &WidgetTree, key: NodeKey) -> Result<bool, TreeError> {
        let Some(button) = tree.composite(key, Self::BUTTON)? else {
            return Ok(false);
        };
        Ok(tree
            .widget_as::<Button>(button)
            .is_some_and(|button| button.clicked()))
    }
}

impl Widget for SearchBox {
    fn kind(&self) -> &'static str {
        "search-box"
    }

    fn requires_id(&self) -> bool {
        true
    }

    fn accepts_child(&self, _child: &dyn Widget) -> bool {
        false
    }

    fn create_composites(&mut self, ctx: &mut CompositeContext<'_>) -> Result<(), TreeError> {
        ctx.add(
            Self::ENTRY,
            Entry {
                placeholder: self.placeholder.clone(),
                ..Entry::new()
            },
        )?;
        ctx.add(Self::BUTTON, Button::new(self.button_text.clone()))?;
        Ok(())
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        let tag = Tag::new("div").attr_opt("id", ctx.id()).attr("class", "search");
        tag.open(ctx.out())?;
        ctx.display_composite(Self::ENTRY)?;
        ctx.display_composite(Self::BUTTON)?;
        tag.close(ctx.out())?;
        Ok(())
    }
}
