//! Schema model: node definitions, augmentations and the read-only navigator.
//!
//! Schema nodes live in a generational arena owned by [`SchemaContext`].
//! Data nodes refer to them through copyable [`SchemaId`] handles only.

use std::collections::BTreeSet;
use std::fmt;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::codec::ScalarType;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::qname::QName;

/// Namespace of the synthetic root every top-level node hangs off.
pub const ROOT_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    Leaf,
    LeafList,
    Container,
    List,
    #[serde(rename = "anyopaque", alias = "anydata", alias = "anyxml")]
    AnyOpaque,
    Choice,
    Case,
}

impl SchemaKind {
    /// Only containers and lists can be targets of augmentations.
    pub fn is_augmentation_target(self) -> bool {
        matches!(self, SchemaKind::Container | SchemaKind::List)
    }

    pub fn accepts_children(self) -> bool {
        matches!(
            self,
            SchemaKind::Container | SchemaKind::List | SchemaKind::Choice | SchemaKind::Case
        )
    }

    /// Leaves and leaf-lists carry a scalar type.
    pub fn is_typed(self) -> bool {
        matches!(self, SchemaKind::Leaf | SchemaKind::LeafList)
    }

    /// Choices and cases never appear as members of a document.
    pub fn is_data_node(self) -> bool {
        !matches!(self, SchemaKind::Choice | SchemaKind::Case)
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaKind::Leaf => "leaf",
            SchemaKind::LeafList => "leaf-list",
            SchemaKind::Container => "container",
            SchemaKind::List => "list",
            SchemaKind::AnyOpaque => "anyopaque",
            SchemaKind::Choice => "choice",
            SchemaKind::Case => "case",
        };
        f.write_str(name)
    }
}

/// Handle of a schema node inside a [`SchemaContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(Index);

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (idx, generation) = self.0.into_raw_parts();
        write!(f, "schema#{}.{}", idx, generation)
    }
}

/// Handle of an augmentation inside a [`SchemaContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AugmentationId(Index);

impl fmt::Display for AugmentationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (idx, generation) = self.0.into_raw_parts();
        write!(f, "augment#{}.{}", idx, generation)
    }
}

/// One schema definition.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    qname: QName,
    kind: SchemaKind,
    augmenting: bool,
    value_type: Option<ScalarType>,
    children: Vec<SchemaId>,
    augmentations: Vec<AugmentationId>,
}

impl SchemaNode {
    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// True when the node was injected into its parent by an augmentation.
    pub fn is_augmenting(&self) -> bool {
        self.augmenting
    }

    pub fn value_type(&self) -> Option<ScalarType> {
        self.value_type
    }

    /// Children in declaration order, augmenting ones included.
    pub fn children(&self) -> &[SchemaId] {
        &self.children
    }

    /// Augmentations targeting this node, in declaration order.
    pub fn augmentations(&self) -> &[AugmentationId] {
        &self.augmentations
    }
}

/// Set of nodes one augmentation injects into its target.
#[derive(Debug, Clone)]
pub struct AugmentationSchema {
    target: SchemaId,
    nodes: Vec<SchemaId>,
}

impl AugmentationSchema {
    pub fn target(&self) -> SchemaId {
        self.target
    }

    pub fn nodes(&self) -> &[SchemaId] {
        &self.nodes
    }
}

/// External identity of an augmentation: the QNames it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AugmentationIdentifier(BTreeSet<QName>);

impl AugmentationIdentifier {
    pub fn new(names: impl IntoIterator<Item = QName>) -> Self {
        Self(names.into_iter().collect())
    }

    pub fn names(&self) -> &BTreeSet<QName> {
        &self.0
    }
}

impl fmt::Display for AugmentationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "augmentation[{}]", self.0.iter().join(", "))
    }
}

/// Read-only queries the builder and writer need from a schema model.
pub trait SchemaNavigator {
    /// Synthetic root whose children are the top-level nodes of all modules.
    fn root(&self) -> SchemaId;

    fn node(&self, id: SchemaId) -> Option<&SchemaNode>;

    fn augmentation(&self, id: AugmentationId) -> Option<&AugmentationSchema>;

    /// Direct child of `parent` with the given name, choice and case nodes included.
    fn child_by_name(&self, parent: SchemaId, namespace: &str, local_name: &str) -> Option<SchemaId> {
        self.node(parent)?.children().iter().copied().find(|&child| {
            self.node(child)
                .is_some_and(|n| n.qname().matches(namespace, local_name))
        })
    }

    fn augmentations_of(&self, parent: SchemaId) -> &[AugmentationId] {
        self.node(parent).map(|n| n.augmentations()).unwrap_or(&[])
    }

    fn nodes_of(&self, augmentation: AugmentationId) -> &[SchemaId] {
        self.augmentation(augmentation)
            .map(|a| a.nodes())
            .unwrap_or(&[])
    }

    fn augmentation_identifier(&self, augmentation: AugmentationId) -> AugmentationIdentifier {
        AugmentationIdentifier::new(
            self.nodes_of(augmentation)
                .iter()
                .filter_map(|&id| self.node(id))
                .map(|n| n.qname().clone()),
        )
    }

    /// Schema path from `parent` to the data node named `local_name`.
    ///
    /// Direct data children win. Otherwise choices are searched depth-first in
    /// declaration order and the path contains every choice/case pair crossed,
    /// e.g. `[choice, case, leaf]`.
    fn find_child_path(
        &self,
        parent: SchemaId,
        namespace: &str,
        local_name: &str,
    ) -> Option<Vec<SchemaId>> {
        let parent_node = self.node(parent)?;

        let direct = parent_node.children().iter().copied().find(|&child| {
            self.node(child).is_some_and(|n| {
                n.kind().is_data_node() && n.qname().matches(namespace, local_name)
            })
        });
        if let Some(direct) = direct {
            return Some(vec![direct]);
        }

        for &child in parent_node.children() {
            let Some(choice) = self.node(child) else {
                continue;
            };
            if choice.kind() != SchemaKind::Choice {
                continue;
            }
            for &case in choice.children() {
                if let Some(tail) = self.find_child_path(case, namespace, local_name) {
                    let mut path = Vec::with_capacity(tail.len() + 2);
                    path.push(child);
                    path.push(case);
                    path.extend(tail);
                    return Some(path);
                }
            }
        }
        None
    }
}

/// A module contributing top-level nodes and augmentations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub namespace: String,
    pub revision: Option<String>,
}

impl Module {
    pub fn qname(&self, local_name: impl Into<String>) -> QName {
        let qname = QName::new(self.namespace.clone(), local_name);
        match &self.revision {
            Some(rev) => qname.with_revision(rev.clone()),
            None => qname,
        }
    }
}

/// Definition of a node about to be inserted.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub qname: QName,
    pub kind: SchemaKind,
    pub value_type: Option<ScalarType>,
}

impl NewNode {
    /// Leaves and leaf-lists default to `string`.
    pub fn new(qname: QName, kind: SchemaKind) -> Self {
        Self {
            qname,
            kind,
            value_type: kind.is_typed().then_some(ScalarType::String),
        }
    }

    pub fn typed(qname: QName, kind: SchemaKind, value_type: ScalarType) -> Self {
        Self {
            qname,
            kind,
            value_type: Some(value_type),
        }
    }
}

/// Arena-backed schema model.
#[derive(Debug)]
pub struct SchemaContext {
    nodes: Arena<SchemaNode>,
    augmentations: Arena<AugmentationSchema>,
    root: SchemaId,
    modules: Vec<Module>,
}

impl Default for SchemaContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaContext {
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = SchemaId(nodes.insert(SchemaNode {
            qname: QName::new(ROOT_NAMESPACE, "data"),
            kind: SchemaKind::Container,
            augmenting: false,
            value_type: None,
            children: Vec::new(),
            augmentations: Vec::new(),
        }));
        Self {
            nodes,
            augmentations: Arena::new(),
            root,
            modules: Vec::new(),
        }
    }

    pub fn add_module(&mut self, module: Module) -> DomainResult<()> {
        if self.module_by_name(&module.name).is_some() {
            return Err(DomainError::InvalidSchema(format!(
                "duplicate module: {}",
                module.name
            )));
        }
        debug!("Registering module {} ({})", module.name, module.namespace);
        self.modules.push(module);
        Ok(())
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module_by_name(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn add_child(&mut self, parent: SchemaId, qname: QName, kind: SchemaKind) -> DomainResult<SchemaId> {
        self.insert_node(parent, NewNode::new(qname, kind))
    }

    pub fn add_leaf(&mut self, parent: SchemaId, qname: QName, value_type: ScalarType) -> DomainResult<SchemaId> {
        self.insert_node(parent, NewNode::typed(qname, SchemaKind::Leaf, value_type))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, parent: SchemaId, new: NewNode) -> DomainResult<SchemaId> {
        self.attach(parent, new, false)
    }

    /// Register an augmentation of `target`; declaration order is kept.
    #[instrument(level = "trace", skip(self))]
    pub fn add_augmentation(&mut self, target: SchemaId) -> DomainResult<AugmentationId> {
        let target_node = self.get(target)?;
        if !target_node.kind.is_augmentation_target() {
            return Err(DomainError::InvalidSchema(format!(
                "{} {} cannot be an augmentation target",
                target_node.kind, target_node.qname
            )));
        }
        let id = AugmentationId(self.augmentations.insert(AugmentationSchema {
            target,
            nodes: Vec::new(),
        }));
        self.get_mut(target)?.augmentations.push(id);
        Ok(id)
    }

    pub fn add_augmenting_child(
        &mut self,
        augmentation: AugmentationId,
        qname: QName,
        kind: SchemaKind,
    ) -> DomainResult<SchemaId> {
        self.insert_augmenting_node(augmentation, NewNode::new(qname, kind))
    }

    pub fn add_augmenting_leaf(
        &mut self,
        augmentation: AugmentationId,
        qname: QName,
        value_type: ScalarType,
    ) -> DomainResult<SchemaId> {
        self.insert_augmenting_node(
            augmentation,
            NewNode::typed(qname, SchemaKind::Leaf, value_type),
        )
    }

    /// Insert a node into the augmentation's target, flagged as augmenting.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_augmenting_node(
        &mut self,
        augmentation: AugmentationId,
        new: NewNode,
    ) -> DomainResult<SchemaId> {
        let target = self
            .augmentations
            .get(augmentation.0)
            .map(|a| a.target)
            .ok_or_else(|| {
                DomainError::InvalidSchema(format!("unknown augmentation: {}", augmentation))
            })?;
        let id = self.attach(target, new, true)?;
        if let Some(aug) = self.augmentations.get_mut(augmentation.0) {
            aug.nodes.push(id);
        }
        Ok(id)
    }

    /// Resolve a `/`-free sequence of local names starting at the root.
    pub fn resolve_path<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Option<SchemaId> {
        names.into_iter().try_fold(self.root, |current, name| {
            self.node(current)?
                .children()
                .iter()
                .copied()
                .find(|&child| self.node(child).is_some_and(|n| n.qname().local_name() == name))
        })
    }

    fn attach(&mut self, parent: SchemaId, new: NewNode, augmenting: bool) -> DomainResult<SchemaId> {
        let parent_node = self.get(parent)?;
        let parent_kind = parent_node.kind;

        if !parent_kind.accepts_children() {
            return Err(DomainError::InvalidSchema(format!(
                "{} {} cannot have children",
                parent_kind, parent_node.qname
            )));
        }
        if parent_kind == SchemaKind::Choice && new.kind != SchemaKind::Case {
            return Err(DomainError::InvalidSchema(format!(
                "choice {} accepts only cases, got {} {}",
                parent_node.qname, new.kind, new.qname
            )));
        }
        if new.kind == SchemaKind::Case && parent_kind != SchemaKind::Choice {
            return Err(DomainError::InvalidSchema(format!(
                "case {} must be declared under a choice, not {} {}",
                new.qname, parent_kind, parent_node.qname
            )));
        }
        if new.kind.is_typed() != new.value_type.is_some() {
            return Err(DomainError::InvalidSchema(format!(
                "{} {}: only leaves and leaf-lists carry a type",
                new.kind, new.qname
            )));
        }
        let duplicate = parent_node
            .children
            .iter()
            .filter_map(|&c| self.node(c))
            .any(|n| n.qname == new.qname);
        if duplicate {
            return Err(DomainError::InvalidSchema(format!(
                "duplicate node {} under {}",
                new.qname, parent_node.qname
            )));
        }

        let id = SchemaId(self.nodes.insert(SchemaNode {
            qname: new.qname,
            kind: new.kind,
            augmenting,
            value_type: new.value_type,
            children: Vec::new(),
            augmentations: Vec::new(),
        }));
        self.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    fn get(&self, id: SchemaId) -> DomainResult<&SchemaNode> {
        self.nodes.get(id.0).ok_or(DomainError::UnknownSchemaNode(id))
    }

    fn get_mut(&mut self, id: SchemaId) -> DomainResult<&mut SchemaNode> {
        self.nodes.get_mut(id.0).ok_or(DomainError::UnknownSchemaNode(id))
    }
}

impl SchemaNavigator for SchemaContext {
    fn root(&self) -> SchemaId {
        self.root
    }

    fn node(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    fn augmentation(&self, id: AugmentationId) -> Option<&AugmentationSchema> {
        self.augmentations.get(id.0)
    }
}
