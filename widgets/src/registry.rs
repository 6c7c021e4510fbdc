//! Construct widgets by kind name from serde props.

use bough_tree::Widget;
use displaydoc::Display;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    Button, Checkbox, Content, Entry, Form, Frame, Menu, MenuItem, Replicator, SearchBox,
};

/// Every kind [`build`] understands.
pub const KINDS: &[&str] = &[
    "form",
    "frame",
    "entry",
    "checkbox",
    "content",
    "button",
    "search-box",
    "menu",
    "menu-item",
    "replicator",
];

#[derive(Debug, Error, Display)]
pub enum BuildError {
    /// Unknown widget type: {0}
    UnknownKind(String),
    /// Invalid props for {kind}: {source}
    InvalidProps {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Build a widget of `kind`. Missing or `null` props mean all defaults.
pub fn build(kind: &str, props: Value) -> Result<Box<dyn Widget>, BuildError> {
    let props = match props {
        Value::Null => Value::Object(Map::new()),
        props => props,
    };
    match kind {
        "form" => from_props::<Form>(kind, props),
        "frame" => from_props::<Frame>(kind, props),
        "entry" => from_props::<Entry>(kind, props),
        "checkbox" => from_props::<Checkbox>(kind, props),
        "content" => from_props::<Content>(kind, props),
        "button" => from_props::<Button>(kind, props),
        "search-box" => from_props::<SearchBox>(kind, props),
        "menu" => from_props::<Menu>(kind, props),
        "menu-item" => from_props::<MenuItem>(kind, props),
        "replicator" => from_props::<Replicator>(kind, props),
        _ => Err(BuildError::UnknownKind(kind.to_string())),
    }
}

fn from_props<W>(kind: &str, props: Value) -> Result<Box<dyn Widget>, BuildError>
where
    W: Widget + DeserializeOwned,
{
    let widget: W = serde_json::from_value(props).map_err(|source| BuildError::InvalidProps {
        kind: kind.to_string(),
        source,
    })?;
    Ok(Box::new(widget))
}
