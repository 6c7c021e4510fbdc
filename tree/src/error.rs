use std::fmt;

use thiserror::Error;

use crate::NodeKey;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("node {node} is already attached to {parent}")]
    AlreadyAttached { node: NodeKey, parent: NodeKey },

    #[error("duplicate identifier \"{id}\" in {container}")]
    DuplicateIdentifier { id: String, container: NodeKey },

    #[error("node {node} requires an enclosing {ancestor}, but none was found")]
    MissingAncestor {
        node: NodeKey,
        ancestor: &'static str,
    },

    #[error("{what} not found in {container}")]
    NotFound { container: NodeKey, what: String },

    #[error("{container} ({kind}) cannot contain a {child_kind}")]
    InvalidChildType {
        container: NodeKey,
        kind: &'static str,
        child_kind: &'static str,
    },

    #[error("{owner} has no sub-widget \"{name}\"")]
    MissingWidget { owner: NodeKey, name: String },

    #[error("cannot insert {node} into its own descendant {parent}")]
    InsertIntoDescendant { node: NodeKey, parent: NodeKey },

    #[error("node {0} is missing")]
    NodeMissing(NodeKey),

    #[error("widget of node {0} is in use")]
    WidgetInUse(NodeKey),

    #[error("invalid state for \"{id}\": {source}")]
    InvalidState {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write markup")]
    Write(#[from] fmt::Error),
}
