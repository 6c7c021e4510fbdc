use std::fmt::{self, Write};
use std::fs::read_to_string;
use std::io;
use std::path::{Path, PathBuf};

use bough_resource::{Resource, ResourceSet};
use bough_tree::{FormData, NodeKey, TreeError, WidgetTree};
use bough_view::{Render, Tag};
use bough_widgets::{BuildError, Form, build};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::Config;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("failed to read page file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse page file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to convert props of {kind} to json: {source}")]
    Props {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("failed to write page")]
    Write(#[from] fmt::Error),
}

#[derive(Debug, Clone, Deserialize)]
struct PageToml {
    pub title: Option<String>,
    pub root: WidgetToml,
}

/// One widget of a page file. Keys other than the structural ones are the
/// widget's props.
#[derive(Debug, Clone, Deserialize)]
struct WidgetToml {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<String>,
    #[serde(default = "visible_default")]
    pub visible: bool,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub children: Vec<WidgetToml>,
    #[serde(flatten)]
    pub props: toml::Table,
}

fn visible_default() -> bool {
    true
}

/// A widget tree built from a page file.
#[derive(Debug)]
pub struct Page {
    pub title: Option<String>,
    pub tree: WidgetTree,
    pub root: NodeKey,
}

impl Page {
    pub fn load(path: &Path, config: &Config) -> Result<Self, PageError> {
        let source = read_to_string(path).map_err(|source| PageError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&source, path, config)
    }

    /// Build a page from TOML text as if it were read from `path`.
    pub fn from_toml(source: &str, path: &Path, config: &Config) -> Result<Self, PageError> {
        let PageToml { title, root } =
            toml::from_str(source).map_err(|source| PageError::Parse {
                path: path.to_owned(),
                source,
            })?;

        let mut tree = WidgetTree::new().with_auto_id_prefix(config.auto_id_prefix.clone());
        let root = Self::build_widget(&mut tree, root)?;
        for resource in config.resources() {
            tree.declare(root, resource)?;
        }
        debug!(path = %path.display(), nodes = tree.len(), "built page");
        Ok(Page { title, tree, root })
    }

    fn build_widget(tree: &mut WidgetTree, widget: WidgetToml) -> Result<NodeKey, PageError> {
        let WidgetToml {
            kind,
            id,
            visible,
            resources,
            children,
            props,
        } = widget;

        let props = serde_json::to_value(&props).map_err(|source| PageError::Props {
            kind: kind.clone(),
            source,
        })?;
        let key = tree.create_boxed(build(&kind, props)?);
        trace!(%key, kind = %kind, "built widget");
        if id.is_some() {
            tree.set_id(key, id)?;
        }
        tree.set_visible(key, visible)?;
        for resource in resources {
            tree.declare(key, resource)?;
        }
        for child in children {
            let child = Self::build_widget(tree, child)?;
            tree.append(key, child)?;
        }
        Ok(key)
    }

    /// Hand `data` to every form on the page. Returns how many got it.
    pub fn submit(&mut self, data: &FormData) -> usize {
        let mut forms = 0;
        for key in self.tree.keys() {
            if let Some(form) = self.tree.widget_as_mut::<Form>(key) {
                form.submit(data.clone());
                forms += 1;
            }
        }
        forms
    }

    /// Display the tree inside a complete HTML document whose head links
    /// exactly the resources the displayed widgets use.
    pub fn render(&self, title: &str) -> Result<String, PageError> {
        let (body, used) = self.tree.display_to_string(self.root)?;
        let mut out = String::new();
        write_document(&mut out, title, &used, &body)?;
        Ok(out)
    }
}

fn write_document(
    out: &mut dyn Write,
    title: &str,
    resources: &ResourceSet,
    body: &str,
) -> fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    Tag::new("meta").attr("charset", "utf-8").empty(out)?;
    writeln!(out)?;
    let tag = Tag::new("title");
    tag.open(out)?;
    title.render(out)?;
    tag.close(out)?;
    writeln!(out)?;
    resources.render(out)?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "{body}")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}
