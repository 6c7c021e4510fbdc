use bough_tree::{DisplayContext, NodeKey, TreeError, Widget};
use bough_view::{Render, Tag};
use serde::Deserialize;
use tracing::trace;

/// A list of [`MenuItem`]s. Anything else is refused as a child.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Menu {
    #[serde(skip)]
    items: usize,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many items were ever added below this menu.
    pub fn items(&self) -> usize {
        self.items
    }
}

impl Widget for Menu {
    fn kind(&self) -> &'static str {
        "menu"
    }

    fn accepts_child(&self, child: &dyn Widget) -> bool {
        child.is::<MenuItem>()
    }

    fn descendant_added(&mut self, key: NodeKey, added: &dyn Widget) {
        if added.is::<MenuItem>() {
            self.items += 1;
            trace!(%key, items = self.items, "menu item added");
        }
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        let tag = Tag::new("ul").attr_opt("id", ctx.id()).attr("class", "menu");
        tag.open(ctx.out())?;
        ctx.display_children()?;
        tag.close(ctx.out())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MenuItem {
    pub text: String,
    pub href: Option<String>,
}

impl MenuItem {
    pub fn new(text: impl Into<String>, href: Option<&str>) -> Self {
        Self {
            text: text.into(),
            href: href.map(str::to_string),
        }
    }
}

impl Widget for MenuItem {
    fn kind(&self) -> &'static str {
        "menu-item"
    }

    fn accepts_child(&self, child: &dyn Widget) -> bool {
        child.is::<Menu>()
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        let li = Tag::new("li");
        li.open(ctx.out())?;
        match &self.href {
            Some(href) => {
                let a = Tag::new("a").attr("href", href.as_str());
                a.open(ctx.out())?;
                self.text.render(ctx.out())?;
                a.close(ctx.out())?;
            }
            None => self.text.render(ctx.out())?,
        }
        ctx.display_children()?;
        li.close(ctx.out())?;
        Ok(())
    }
}
