use bough_tree::{DisplayContext, TreeError, Widget};
use bough_view::{Render, Tag};
use serde::Deserialize;

/// A titled group of widgets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Frame {
    pub title: Option<String>,
}

impl Frame {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

impl Widget for Frame {
    fn kind(&self) -> &'static str {
        "frame"
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        let fieldset = Tag::new("fieldset").attr_opt("id", ctx.id());
        fieldset.open(ctx.out())?;
        if let Some(title) = &self.title {
            let legend = Tag::new("legend");
            legend.open(ctx.out())?;
            title.render(ctx.out())?;
            legend.close(ctx.out())?;
        }
        ctx.display_children()?;
        fieldset.close(ctx.out())?;
        Ok(())
    }
}
