use bough_tree::{CopyMap, InitContext, NodeKey, ReplicationRecord, TreeError, Widget, WidgetTree};
use serde::Deserialize;
use tracing::debug;

/// Repeats its children once per key.
///
/// On `init` the children present at that point become prototypes: they are
/// detached, and for every key a copy of each is appended with `_{key}`
/// added to every id. The record answers which clone belongs to which key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Replicator {
    pub keys: Vec<String>,
    #[serde(skip)]
    prototypes: Vec<NodeKey>,
    #[serde(skip)]
    record: ReplicationRecord,
}

impl Replicator {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn record(&self) -> &ReplicationRecord {
        &self.record
    }

    /// The clone of the prototype with `original_id` made for `key`.
    pub fn clone_of(&self, key: &str, original_id: &str) -> Option<NodeKey> {
        self.record.clone_of(key, original_id)
    }

    pub fn prototypes(&self) -> &[NodeKey] {
        &self.prototypes
    }

    fn replicate(&mut self, tree: &mut WidgetTree, own: NodeKey) -> Result<(), TreeError> {
        self.prototypes = tree.children(own)?.to_vec();
        for &prototype in &self.prototypes {
            tree.remove(own, prototype);
        }

        for key in &self.keys {
            let suffix = format!("_{key}");
            for &prototype in &self.prototypes {
                let copied = tree.copy(prototype, &suffix)?;
                tree.append(own, copied.root)?;
                self.record.insert(key.clone(), copied.ids);
            }
        }
        debug!(
            node = %own,
            keys = self.keys.len(),
            prototypes = self.prototypes.len(),
            "replicated"
        );
        Ok(())
    }
}

impl Widget for Replicator {
    fn kind(&self) -> &'static str {
        "replicator"
    }

    fn init(&mut self, ctx: &mut InitContext<'_>) -> Result<(), TreeError> {
        let own = ctx.key();
        self.replicate(ctx.tree_mut(), own)
    }

    fn remap(&mut self, map: &CopyMap) {
        self.record.remap(map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Entry, Form, Frame};
    use bough_tree::FormData;
    use pretty_assertions::assert_eq;

    fn address_rows(tree: &mut WidgetTree, keys: &[&str]) -> NodeKey {
        let replicator = tree.create_with_id(Replicator::new(keys.iter().copied()), "rows");
        let row = tree.create_with_id(Frame::default(), "row");
        let street = tree.create_with_id(Entry::new(), "street");
        tree.append(replicator, row).unwrap();
        tree.append(row, street).unwrap();
        replicator
    }

    #[test]
    fn test_replicates_children_per_key() {
        let mut tree = WidgetTree::new();
        let mut form = Form::new();
        form.submit(FormData::from_iter([("street_home", "Main St")]));
        let form = tree.create_with_id(form, "f");
        let rows = address_rows(&mut tree, &["home", "work"]);
        tree.append(form, rows).unwrap();

        tree.process(form).unwrap();

        let children = tree.children(rows).unwrap().to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(tree.id(children[0]).unwrap(), Some("row_home"));
        assert_eq!(tree.id(children[1]).unwrap(), Some("row_work"));

        let replicator = tree.widget_as::<Replicator>(rows).unwrap();
        let home = replicator.clone_of("home", "street").unwrap();
        let work = replicator.clone_of("work", "street").unwrap();
        assert_eq!(replicator.clone_of("work", "row"), Some(children[1]));
        assert_eq!(tree.widget_as::<Entry>(home).unwrap().value, "Main St");
        assert_eq!(tree.widget_as::<Entry>(work).unwrap().value, "");

        let prototype = replicator.prototypes()[0];
        assert_eq!(tree.parent(prototype).unwrap(), None);
        assert!(!tree.is_processed(prototype).unwrap());
    }

    #[test]
    fn test_copying_replicator_remaps_record() {
        let mut tree = WidgetTree::new();
        let form = tree.create_with_id(Form::new(), "f");
        let rows = address_rows(&mut tree, &["a"]);
        tree.append(form, rows).unwrap();
        tree.init(form).unwrap();

        let copied = tree.copy(rows, "_2").unwrap();

        let original = tree.widget_as::<Replicator>(rows).unwrap();
        let clone = tree.widget_as::<Replicator>(copied.root).unwrap();
        let street = original.clone_of("a", "street").unwrap();
        let street_clone = clone.clone_of("a", "street").unwrap();
        assert_ne!(street, street_clone);
        assert_eq!(tree.id(street_clone).unwrap(), Some("street_a_2"));
        assert_eq!(copied.clone_of("street_a"), Some(street_clone));
    }
}
