use bough_tree::{DisplayContext, FormData, Phase, TreeError, Widget};
use bough_view::Tag;
use serde::Deserialize;

/// The form-like container: holds the submitted values every input below it
/// reads during `process`. Inputs are only processed once the form has been
/// submitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Form {
    pub action: Option<String>,
    pub method: String,
    #[serde(skip)]
    data: FormData,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            action: None,
            method: "post".to_string(),
            data: FormData::new(),
        }
    }
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, data: FormData) {
        self.data = data;
    }

    pub fn is_submitted(&self) -> bool {
        !self.data.is_empty()
    }
}

impl Widget for Form {
    fn kind(&self) -> &'static str {
        "form"
    }

    fn requires_id(&self) -> bool {
        true
    }

    fn descend(&self, phase: Phase) -> bool {
        phase != Phase::Process || self.is_submitted()
    }

    fn form_data(&self) -> Option<&FormData> {
        Some(&self.data)
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        let tag = Tag::new("form")
            .attr_opt("id", ctx.id())
            .attr("method", self.method.as_str())
            .attr_opt("action", self.action.as_deref());
        tag.open(ctx.out())?;
        ctx.display_children()?;
        tag.close(ctx.out())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entry;
    use bough_tree::WidgetTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unsubmitted_form_skips_validation() {
        let mut tree = WidgetTree::new();
        let form = tree.create_with_id(Form::new(), "f");
        let entry = tree.create_with_id(Entry::labelled("Email").required(), "email");
        tree.append(form, entry).unwrap();

        tree.process(form).unwrap();

        assert!(!tree.widget_as::<Form>(form).unwrap().is_submitted());
        assert!(!tree.is_processed(entry).unwrap());
        assert!(tree.messages(form).unwrap().is_empty());
        let (html, _) = tree.display_to_string(form).unwrap();
        assert!(!html.contains("message"));
    }

    #[test]
    fn test_submitted_form_processes_inputs() {
        let mut tree = WidgetTree::new();
        let mut form = Form::new();
        form.submit(FormData::from_iter([("other", "x")]));
        let form = tree.create_with_id(form, "f");
        let entry = tree.create_with_id(Entry::labelled("Email").required(), "email");
        tree.append(form, entry).unwrap();

        tree.process(form).unwrap();

        assert!(tree.is_processed(entry).unwrap());
        assert_eq!(tree.messages(form).unwrap().len(), 1);
    }
}
