//! External resources (style sheets, scripts, comments) that widgets declare,
//! and the ordered de-duplicating set they are collected into.

use std::fmt::{self, Display, Write};

use bough_view::{Render, Tag, escape_html};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A resource a widget needs on the page. Equality is by value, so two
/// declarations of the same URI are the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Resource {
    StyleSheet(String),
    Script(String),
    Comment(String),
}

impl Resource {
    pub fn style_sheet(uri: impl Into<String>) -> Self {
        Resource::StyleSheet(uri.into())
    }

    pub fn script(uri: impl Into<String>) -> Self {
        Resource::Script(uri.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Resource::Comment(text.into())
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Resource::*;
        match self {
            StyleSheet(uri) => write!(f, "style-sheet({uri})"),
            Script(uri) => write!(f, "script({uri})"),
            Comment(text) => write!(f, "comment({text})"),
        }
    }
}

impl Render for Resource {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        match self {
            Resource::StyleSheet(uri) => Tag::new("link")
                .attr("rel", "stylesheet")
                .attr("type", "text/css")
                .attr("href", uri.as_str())
                .empty(out),
            Resource::Script(uri) => {
                let tag = Tag::new("script")
                    .attr("type", "text/javascript")
                    .attr("src", uri.as_str());
                tag.open(out)?;
                tag.close(out)
            }
            // "--" would end the comment early.
            Resource::Comment(text) => {
                write!(out, "<!-- {} -->", escape_html(&text.replace("--", "- -")))
            }
        }
    }
}

/// Insertion-ordered set of resources. Declaring an equal resource twice keeps
/// the first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceSet(IndexSet<Resource>);

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if an equal resource was already present.
    pub fn declare(&mut self, resource: Resource) -> bool {
        self.0.insert(resource)
    }

    /// Union `other` into `self`, keeping `self`'s order first.
    pub fn extend_from(&mut self, other: &ResourceSet) {
        for resource in other.iter() {
            if !self.0.contains(resource) {
                self.0.insert(resource.clone());
            }
        }
    }

    pub fn contains(&self, resource: &Resource) -> bool {
        self.0.contains(resource)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.0.iter()
    }

    pub fn style_sheets(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|resource| match resource {
            Resource::StyleSheet(uri) => Some(uri.as_str()),
            _ => None,
        })
    }

    pub fn scripts(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|resource| match resource {
            Resource::Script(uri) => Some(uri.as_str()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Resource> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        ResourceSet(iter.into_iter().collect())
    }
}

impl Extend<Resource> for ResourceSet {
    fn extend<I: IntoIterator<Item = Resource>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for ResourceSet {
    type Item = Resource;
    type IntoIter = indexmap::set::IntoIter<Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResourceSet {
    type Item = &'a Resource;
    type IntoIter = indexmap::set::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Style sheets first, then scripts, then comments; one line each.
impl Render for ResourceSet {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        let style_sheets = self
            .iter()
            .filter(|r| matches!(r, Resource::StyleSheet(_)));
        let scripts = self.iter().filter(|r| matches!(r, Resource::Script(_)));
        let comments = self.iter().filter(|r| matches!(r, Resource::Comment(_)));
        for resource in style_sheets.chain(scripts).chain(comments) {
            resource.render(out)?;
            out.write_char('\n')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bough_view::render_to_string;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_declare_dedups_by_value() {
        let mut set = ResourceSet::new();
        assert!(set.declare(Resource::style_sheet("a.css")));
        assert!(set.declare(Resource::script("a.js")));
        assert!(!set.declare(Resource::style_sheet("a.css")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_extend_from_keeps_stable_order() {
        let mut first: ResourceSet = [Resource::style_sheet("a.css"), Resource::script("a.js")]
            .into_iter()
            .collect();
        let second: ResourceSet = [Resource::script("b.js"), Resource::style_sheet("a.css")]
            .into_iter()
            .collect();
        first.extend_from(&second);
        let order: Vec<_> = first.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            order,
            vec!["style-sheet(a.css)", "script(a.js)", "script(b.js)"]
        );
    }

    #[test]
    fn test_render_once_per_resource() {
        let mut set = ResourceSet::new();
        set.declare(Resource::script("app.js"));
        set.declare(Resource::style_sheet("app.css"));
        set.declare(Resource::comment("built -- today"));
        set.declare(Resource::script("app.js"));
        assert_eq!(
            render_to_string(&set),
            concat!(
                "<link rel=\"stylesheet\" type=\"text/css\" href=\"app.css\" />\n",
                "<script type=\"text/javascript\" src=\"app.js\"></script>\n",
                "<!-- built - - today -->\n",
            )
        );
    }

    #[test]
    fn test_resource_serde_shape() {
        let json = r#"{ "type": "style-sheet", "value": "a.css" }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource, Resource::style_sheet("a.css"));
    }
}
