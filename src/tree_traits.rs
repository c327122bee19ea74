/*
Workaround for error: https://doc.rust-lang.org/error_codes/E0116.html
Cannot define inherent `impl` for a type outside of the crate where the type is defined

define a trait that has the desired associated functions/types/constants and implement the trait for the type in question
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{SchemaContext, SchemaId, SchemaNavigator, SchemaNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label(node: &SchemaNode) -> String {
    let mut label = format!("{} ({})", node.qname(), node.kind());
    if let Some(value_type) = node.value_type() {
        label.push_str(&format!(": {}", value_type));
    }
    if node.is_augmenting() {
        label.push_str(" +augment");
    }
    label
}

// Implementation of to_tree_string for SchemaContext
impl TreeNodeConvert for SchemaContext {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(schema: &SchemaContext, id: SchemaId, parent_tree: &mut Tree<String>) {
            if let Some(node) = schema.node(id) {
                for &child_id in node.children() {
                    if let Some(child) = schema.node(child_id) {
                        let mut child_tree = Tree::new(label(child));
                        build_tree(schema, child_id, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        match self.node(self.root()) {
            Some(root) if !self.is_empty() => {
                let mut tree = Tree::new(root.qname().local_name().to_string());
                build_tree(self, self.root(), &mut tree);
                tree
            }
            _ => Tree::new("Empty schema".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QName, ScalarType, SchemaKind};

    #[test]
    fn given_empty_schema_when_converting_then_placeholder() {
        let schema = SchemaContext::new();
        assert_eq!(schema.to_tree_string().to_string().trim(), "Empty schema");
    }

    #[test]
    fn given_nested_schema_when_converting_then_children_are_indented_with_types() {
        let mut schema = SchemaContext::new();
        let root = schema.root();
        let system = schema
            .add_child(root, QName::new("urn:s", "system"), SchemaKind::Container)
            .unwrap();
        schema
            .add_leaf(system, QName::new("urn:s", "port"), ScalarType::Uint16)
            .unwrap();

        let rendered = schema.to_tree_string().to_string();

        assert!(rendered.starts_with("data"));
        assert!(rendered.contains("(urn:s)system (container)"));
        assert!(rendered.contains("(urn:s)port (leaf): uint16"));
    }
}
