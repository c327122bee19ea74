//! Composite builder: places incoming fields into the data tree.
//!
//! A schema path names the node to add relative to the composite it is added
//! to. A single element is a direct member; longer paths start with
//! choice/case pairs that are resolved (or created) on the way down.

use tracing::{debug, instrument, warn};

use crate::domain::augment::find_owning_augmentation;
use crate::domain::codec::ScalarValue;
use crate::domain::data::{ChoiceData, CompositeData, CompositeKind, DataNode, ScalarData};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::qname::QName;
use crate::domain::schema::{AugmentationId, SchemaId, SchemaKind, SchemaNavigator, SchemaNode};

/// Knobs of the placement algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Fail when an augmenting node matches no augmentation of its parent.
    /// When false such nodes become direct children.
    pub strict_augmentation: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strict_augmentation: true,
        }
    }
}

/// Schema access plus options, shared by every placement call.
pub struct BuildContext<'s, S: ?Sized> {
    schema: &'s S,
    options: BuildOptions,
}

impl<S: ?Sized> Clone for BuildContext<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for BuildContext<'_, S> {}

impl<'s, S: SchemaNavigator + ?Sized> BuildContext<'s, S> {
    pub fn new(schema: &'s S, options: BuildOptions) -> Self {
        Self { schema, options }
    }

    pub fn schema(&self) -> &'s S {
        self.schema
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }

    pub fn node(&self, id: SchemaId) -> DomainResult<&'s SchemaNode> {
        self.schema.node(id).ok_or(DomainError::UnknownSchemaNode(id))
    }

    fn qname(&self, id: SchemaId) -> DomainResult<&'s QName> {
        self.node(id).map(SchemaNode::qname)
    }
}

fn mismatch(node: &SchemaNode, expected: &'static str) -> DomainError {
    DomainError::StructuralMismatch {
        node: node.qname().clone(),
        expected,
        found: node.kind(),
    }
}

/// Dry run of placing `path` into a case that holds nothing yet.
fn check_fresh_case<S>(cx: &BuildContext<'_, S>, case: SchemaId, path: &[SchemaId]) -> DomainResult<()>
where
    S: SchemaNavigator + ?Sized,
{
    match CompositeData::new(case, CompositeKind::Case).step(cx, path)? {
        Step::Member { .. } => Ok(()),
        Step::Choice { case, rest, .. } => check_fresh_case(cx, case, rest),
    }
}

/// One level of a placement path, validated but not yet applied.
enum Step<'p> {
    Member {
        head: SchemaId,
        group: Option<AugmentationId>,
    },
    Choice {
        head: SchemaId,
        case: SchemaId,
        group: Option<AugmentationId>,
        rest: &'p [SchemaId],
    },
}

impl CompositeData {
    /// Locate or create the node named by `path` and return the leaf-most one.
    ///
    /// The returned node is always freshly created; choice and case nodes on
    /// the way are reused when already present. A failed call leaves the tree
    /// as it was.
    #[instrument(level = "trace", skip(self, cx), fields(parent = %self.schema))]
    pub fn add_child<'a, S>(&'a mut self, cx: &BuildContext<'_, S>, path: &[SchemaId]) -> DomainResult<&'a mut DataNode>
    where
        S: SchemaNavigator + ?Sized,
    {
        let (head, case_id, group, rest) = match self.step(cx, path)? {
            Step::Member { head, group } => {
                let head_node = cx.node(head)?;
                debug!(
                    "Adding {} {} to {}",
                    head_node.kind(),
                    head_node.qname(),
                    group.map_or_else(|| "direct children".to_string(), |g| g.to_string())
                );
                return Ok(self.push(group, DataNode::for_schema(head, head_node.kind())));
            }
            Step::Choice { head, case, group, rest } => (head, case, group, rest),
        };
        let head_node = cx.node(head)?;
        let case_node = cx.node(case_id)?;
        let existing = self.scope(group).iter().position(|node| {
            node.as_choice()
                .is_some_and(|c| cx.qname(c.schema()).is_ok_and(|q| q == head_node.qname()))
        });
        match existing.and_then(|index| self.scope(group)[index].as_choice()) {
            Some(choice) => {
                let selected = cx.qname(choice.case().schema())?;
                if selected != case_node.qname() {
                    return Err(DomainError::CaseConflict {
                        choice: head_node.qname().clone(),
                        existing: selected.clone(),
                        requested: case_node.qname().clone(),
                    });
                }
            }
            None => check_fresh_case(cx, case_id, rest)?,
        }

        let scope = self.scope_mut(group);
        let index = match existing {
            Some(index) => index,
            None => {
                debug!("Selecting case {} of choice {}", case_node.qname(), head_node.qname());
                scope.push(DataNode::Choice(ChoiceData::new(head, case_id)));
                scope.len() - 1
            }
        };
        let choice = scope[index]
            .as_choice_mut()
            .ok_or_else(|| mismatch(head_node, "choice"))?;

        choice.case_mut().add_child(cx, rest)
    }

    /// Validate the first level of `path` against this composite.
    fn step<'p, S>(&self, cx: &BuildContext<'_, S>, path: &'p [SchemaId]) -> DomainResult<Step<'p>>
    where
        S: SchemaNavigator + ?Sized,
    {
        if matches!(self.kind, CompositeKind::List | CompositeKind::LeafList) {
            return Err(mismatch(cx.node(self.schema)?, "container, list entry or case"));
        }

        let (&head, rest) = path.split_first().ok_or(DomainError::EmptySchemaPath)?;
        let head_node = cx.node(head)?;

        let Some((&case, rest)) = rest.split_first() else {
            let group = self.group_for(cx, head, head_node)?;
            return Ok(Step::Member { head, group });
        };

        if head_node.kind() != SchemaKind::Choice {
            return Err(mismatch(head_node, "choice"));
        }
        let case_node = cx.node(case)?;
        if case_node.kind() != SchemaKind::Case || !head_node.children().contains(&case) {
            return Err(mismatch(case_node, "case of the preceding choice"));
        }
        let group = self.group_for(cx, head, head_node)?;
        Ok(Step::Choice { head, case, group, rest })
    }

    /// Append an entry to a list node; the entry is bound to the list schema.
    pub fn add_list_entry<S>(&mut self, cx: &BuildContext<'_, S>) -> DomainResult<&mut CompositeData>
    where
        S: SchemaNavigator + ?Sized,
    {
        if self.kind != CompositeKind::List {
            return Err(mismatch(cx.node(self.schema)?, "list"));
        }
        let entry = DataNode::Composite(CompositeData::new(self.schema, CompositeKind::ListEntry));
        let node = self.push(None, entry);
        let node_schema = node.schema();
        node.as_composite_mut()
            .ok_or(DomainError::UnknownSchemaNode(node_schema))
    }

    /// Append one value to a leaf-list node.
    pub fn add_leaf_list_entry<S>(
        &mut self,
        cx: &BuildContext<'_, S>,
        value: Option<ScalarValue>,
    ) -> DomainResult<&mut ScalarData>
    where
        S: SchemaNavigator + ?Sized,
    {
        if self.kind != CompositeKind::LeafList {
            return Err(mismatch(cx.node(self.schema)?, "leaf-list"));
        }
        let entry = DataNode::LeafListEntry(ScalarData::with_value(self.schema, value));
        let node = self.push(None, entry);
        let node_schema = node.schema();
        node.as_scalar_mut()
            .ok_or(DomainError::UnknownSchemaNode(node_schema))
    }

    /// Augmentation group a new member goes to; `None` means direct children.
    fn group_for<S>(
        &self,
        cx: &BuildContext<'_, S>,
        child: SchemaId,
        child_node: &SchemaNode,
    ) -> DomainResult<Option<AugmentationId>>
    where
        S: SchemaNavigator + ?Sized,
    {
        if !child_node.is_augmenting() {
            return Ok(None);
        }
        match find_owning_augmentation(cx.schema(), self.schema, child) {
            Some(augmentation) => Ok(Some(augmentation)),
            None if cx.options().strict_augmentation => Err(DomainError::UnresolvedAugmentationTarget {
                parent: cx.qname(self.schema)?.clone(),
                child: child_node.qname().clone(),
            }),
            None => {
                warn!(
                    "No augmentation of {} owns {}, placing it among direct children",
                    cx.qname(self.schema)?,
                    child_node.qname()
                );
                Ok(None)
            }
        }
    }

    fn scope(&self, group: Option<AugmentationId>) -> &[DataNode] {
        match group {
            Some(augmentation) => self.augmentation_children(augmentation).unwrap_or_default(),
            None => &self.children,
        }
    }

    fn scope_mut(&mut self, group: Option<AugmentationId>) -> &mut Vec<DataNode> {
        match group {
            Some(augmentation) => self.augmentations.entry(augmentation).or_default(),
            None => &mut self.children,
        }
    }

    fn push(&mut self, group: Option<AugmentationId>, node: DataNode) -> &mut DataNode {
        let scope = self.scope_mut(group);
        scope.push(node);
        let last = scope.len() - 1;
        &mut scope[last]
    }
}

/// Owns a document tree under construction.
pub struct TreeBuilder<'s, S: ?Sized> {
    cx: BuildContext<'s, S>,
    root: CompositeData,
}

impl<'s, S: SchemaNavigator + ?Sized> TreeBuilder<'s, S> {
    /// Builder rooted at the schema's synthetic root.
    pub fn new(schema: &'s S, options: BuildOptions) -> Self {
        Self::with_root(schema, schema.root(), options)
    }

    /// Builder whose paths are relative to an arbitrary schema node.
    pub fn with_root(schema: &'s S, root: SchemaId, options: BuildOptions) -> Self {
        Self {
            cx: BuildContext::new(schema, options),
            root: CompositeData::new(root, CompositeKind::Generic),
        }
    }

    pub fn root(&self) -> &CompositeData {
        &self.root
    }

    /// Split borrow for drivers that recurse into the tree.
    pub fn parts_mut(&mut self) -> (BuildContext<'s, S>, &mut CompositeData) {
        (self.cx, &mut self.root)
    }

    pub fn add_child(&mut self, path: &[SchemaId]) -> DomainResult<&mut DataNode> {
        self.root.add_child(&self.cx, path)
    }

    pub fn finish(self) -> CompositeData {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::ScalarType;
    use crate::domain::schema::SchemaContext;

    const NS: &str = "urn:example:unit";

    #[test]
    fn list_nodes_only_accept_entries() {
        let mut ctx = SchemaContext::new();
        let root = ctx.root();
        let list = ctx.add_child(root, QName::new(NS, "items"), SchemaKind::List).unwrap();
        let name = ctx.add_leaf(list, QName::new(NS, "name"), ScalarType::String).unwrap();

        let mut builder = TreeBuilder::new(&ctx, BuildOptions::default());
        let (cx, root_data) = builder.parts_mut();
        let list_data = root_data
            .add_child(&cx, &[list])
            .unwrap()
            .as_composite_mut()
            .unwrap();

        assert!(matches!(
            list_data.add_child(&cx, &[name]),
            Err(DomainError::StructuralMismatch { .. })
        ));

        let entry = list_data.add_list_entry(&cx).unwrap();
        entry.add_child(&cx, &[name]).unwrap();
        assert_eq!(entry.kind(), CompositeKind::ListEntry);
        assert_eq!(entry.schema(), list);
        assert_eq!(list_data.children().len(), 1);
    }

    #[test]
    fn leaf_list_entry_requires_leaf_list() {
        let mut ctx = SchemaContext::new();
        let root = ctx.root();
        let c = ctx.add_child(root, QName::new(NS, "c"), SchemaKind::Container).unwrap();

        let mut builder = TreeBuilder::new(&ctx, BuildOptions::default());
        let (cx, root_data) = builder.parts_mut();
        let container = root_data.add_child(&cx, &[c]).unwrap().as_composite_mut().unwrap();

        let result = container.add_leaf_list_entry(&cx, Some(ScalarValue::Int(1)));
        assert!(matches!(result, Err(DomainError::StructuralMismatch { .. })));
    }

    #[test]
    fn case_outside_its_choice_is_rejected() {
        let mut ctx = SchemaContext::new();
        let root = ctx.root();
        let q = ctx.add_child(root, QName::new(NS, "q"), SchemaKind::Choice).unwrap();
        let other = ctx.add_child(root, QName::new(NS, "other"), SchemaKind::Choice).unwrap();
        let foreign = ctx.add_child(other, QName::new(NS, "foreign"), SchemaKind::Case).unwrap();
        let leaf = ctx.add_leaf(foreign, QName::new(NS, "p"), ScalarType::String).unwrap();

        let mut builder = TreeBuilder::new(&ctx, BuildOptions::default());
        let result = builder.add_child(&[q, foreign, leaf]);

        assert!(matches!(result, Err(DomainError::StructuralMismatch { .. })));
        assert!(builder.root().is_empty());
    }
}
