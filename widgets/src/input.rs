use bough_tree::{DisplayContext, Message, ProcessContext, Stateful, TreeError, Widget};
use bough_view::{Render, Tag};
use serde::Deserialize;
use serde_json::Value;

use crate::display_messages;

fn display_label(
    ctx: &mut DisplayContext<'_>,
    label: Option<&str>,
    id: Option<&str>,
) -> Result<(), TreeError> {
    let Some(label) = label else {
        return Ok(());
    };
    let tag = Tag::new("label").attr_opt("for", id);
    tag.open(ctx.out())?;
    label.render(ctx.out())?;
    tag.close(ctx.out())?;
    Ok(())
}

/// A single-line text input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Entry {
    pub label: Option<String>,
    pub value: String,
    pub placeholder: Option<String>,
    pub required: bool,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl Widget for Entry {
    fn kind(&self) -> &'static str {
        "entry"
    }

    fn requires_id(&self) -> bool {
        true
    }

    fn accepts_child(&self, _child: &dyn Widget) -> bool {
        false
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), TreeError> {
        if let Some(value) = ctx.submitted_value()? {
            self.value = value.trim().to_string();
        }
        if self.required && self.value.is_empty() {
            let name = self.label.as_deref().or(ctx.id()).unwrap_or("value");
            ctx.add_message(Message::error(format!("{name} is required")));
        }
        Ok(())
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        let id = ctx.id();
        display_label(ctx, self.label.as_deref(), id)?;
        Tag::new("input")
            .attr("type", "text")
            .attr_opt("id", id)
            .attr_opt("name", id)
            .attr("value", self.value.as_str())
            .attr_opt("placeholder", self.placeholder.as_deref())
            .flag("required", self.required)
            .empty(ctx.out())?;
        display_messages(ctx)
    }

    fn as_stateful(&self) -> Option<&dyn Stateful> {
        Some(self)
    }

    fn as_stateful_mut(&mut self) -> Option<&mut dyn Stateful> {
        Some(self)
    }
}

impl Stateful for Entry {
    fn state(&self) -> Value {
        Value::String(self.value.clone())
    }

    fn set_state(&mut self, state: Value) -> Result<(), serde_json::Error> {
        self.value = serde_json::from_value(state)?;
        Ok(())
    }
}

/// A boolean input. Unchecked boxes are not submitted, so a submitted form
/// without this box's id unchecks it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Checkbox {
    pub label: Option<String>,
    pub checked: bool,
}

impl Widget for Checkbox {
    fn kind(&self) -> &'static str {
        "checkbox"
    }

    fn requires_id(&self) -> bool {
        true
    }

    fn accepts_child(&self, _child: &dyn Widget) -> bool {
        false
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), TreeError> {
        let data = ctx.form_data()?;
        if !data.is_empty() {
            self.checked = ctx.id().is_some_and(|id| data.contains(id));
        }
        Ok(())
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        let id = ctx.id();
        Tag::new("input")
            .attr("type", "checkbox")
            .attr_opt("id", id)
            .attr_opt("name", id)
            .attr("value", "on")
            .flag("checked", self.checked)
            .empty(ctx.out())?;
        display_label(ctx, self.label.as_deref(), id)?;
        display_messages(ctx)
    }

    fn as_stateful(&self) -> Option<&dyn Stateful> {
        Some(self)
    }

    fn as_stateful_mut(&mut self) -> Option<&mut dyn Stateful> {
        Some(self)
    }
}

impl Stateful for Checkbox {
    fn state(&self) -> Value {
        Value::Bool(self.checked)
    }

    fn set_state(&mut self, state: Value) -> Result<(), serde_json::Error> {
        self.checked = serde_json::from_value(state)?;
        Ok(())
    }
}

/// A submit button. `clicked` is true after `process` when the submitted
/// form carries the button's id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Button {
    pub text: String,
    #[serde(skip)]
    clicked: bool,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            clicked: false,
        }
    }

    pub fn clicked(&self) -> bool {
        self.clicked
    }
}

impl Widget for Button {
    fn kind(&self) -> &'static str {
        "button"
    }

    fn requires_id(&self) -> bool {
        true
    }

    fn accepts_child(&self, _child: &dyn Widget) -> bool {
        false
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), TreeError> {
        self.clicked = ctx.submitted_value()?.is_some();
        Ok(())
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        let id = ctx.id();
        let tag = Tag::new("button")
            .attr("type", "submit")
            .attr_opt("name", id)
            .attr("value", "1");
        tag.open(ctx.out())?;
        self.text.render(ctx.out())?;
        tag.close(ctx.out())?;
        Ok(())
    }
}
