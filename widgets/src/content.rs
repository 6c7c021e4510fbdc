use bough_tree::{DisplayContext, TreeError, Widget};
use bough_view::Render;
use serde::Deserialize;

/// Static text, escaped on display.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Content {
    pub text: String,
}

impl Content {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Widget for Content {
    fn kind(&self) -> &'static str {
        "content"
    }

    fn accepts_child(&self, _child: &dyn Widget) -> bool {
        false
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        self.text.render(ctx.out())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bough_tree::WidgetTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_content_escapes_text() {
        let mut tree = WidgetTree::new();
        let content = tree.create(Content::new("1 < 2 & 3"));
        let (html, _) = tree.display_to_string(content).unwrap();
        assert_eq!(html, "1 &lt; 2 &amp; 3");
    }
}
