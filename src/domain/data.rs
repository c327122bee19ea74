//! Data tree nodes, each bound to exactly one schema node.

use std::fmt;

use indexmap::IndexMap;

use crate::domain::codec::ScalarValue;
use crate::domain::schema::{AugmentationId, SchemaId, SchemaKind};

/// Shape of a composite node; decides how it is framed on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Container,
    List,
    ListEntry,
    LeafList,
    /// Body of the selected case of a choice.
    Case,
    /// Document root, or a choice/case reached without its data path.
    Generic,
}

impl CompositeKind {
    /// Framed composites are wrapped in start/end markers when written.
    pub fn is_framed(self) -> bool {
        matches!(
            self,
            CompositeKind::Container
                | CompositeKind::List
                | CompositeKind::ListEntry
                | CompositeKind::LeafList
        )
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompositeKind::Container => "container",
            CompositeKind::List => "list",
            CompositeKind::ListEntry => "list-entry",
            CompositeKind::LeafList => "leaf-list",
            CompositeKind::Case => "case",
            CompositeKind::Generic => "composite",
        };
        f.write_str(name)
    }
}

/// Leaf, anyopaque or leaf-list entry content.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarData {
    schema: SchemaId,
    value: Option<ScalarValue>,
}

impl ScalarData {
    pub fn new(schema: SchemaId) -> Self {
        Self {
            schema,
            value: None,
        }
    }

    pub fn with_value(schema: SchemaId, value: Option<ScalarValue>) -> Self {
        Self { schema, value }
    }

    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    pub fn value(&self) -> Option<&ScalarValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<ScalarValue>) {
        self.value = value;
    }
}

/// Node with ordered direct children plus augmentation groups.
///
/// Groups keep the order in which their augmentation was first seen.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeData {
    pub(crate) schema: SchemaId,
    pub(crate) kind: CompositeKind,
    pub(crate) children: Vec<DataNode>,
    pub(crate) augmentations: IndexMap<AugmentationId, Vec<DataNode>>,
}

impl CompositeData {
    pub fn new(schema: SchemaId, kind: CompositeKind) -> Self {
        Self {
            schema,
            kind,
            children: Vec::new(),
            augmentations: IndexMap::new(),
        }
    }

    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    /// Direct (non-augmented) children in insertion order.
    pub fn children(&self) -> &[DataNode] {
        &self.children
    }

    /// Hint for sinks: number of direct children.
    pub fn size_hint(&self) -> usize {
        self.children.len()
    }

    /// Non-empty augmentation groups in first-seen order.
    pub fn augmentation_groups(&self) -> impl Iterator<Item = (AugmentationId, &[DataNode])> {
        self.augmentations
            .iter()
            .filter(|(_, nodes)| !nodes.is_empty())
            .map(|(&id, nodes)| (id, nodes.as_slice()))
    }

    pub fn augmentation_children(&self, augmentation: AugmentationId) -> Option<&[DataNode]> {
        self.augmentations.get(&augmentation).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.augmentations.values().all(Vec::is_empty)
    }
}

/// A choice instance and the one case selected for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceData {
    schema: SchemaId,
    case: CompositeData,
}

impl ChoiceData {
    pub fn new(schema: SchemaId, case: SchemaId) -> Self {
        Self {
            schema,
            case: CompositeData::new(case, CompositeKind::Case),
        }
    }

    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    pub fn case(&self) -> &CompositeData {
        &self.case
    }

    pub fn case_mut(&mut self) -> &mut CompositeData {
        &mut self.case
    }
}

/// One node of the data tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DataNode {
    Leaf(ScalarData),
    AnyOpaque(ScalarData),
    LeafListEntry(ScalarData),
    Composite(CompositeData),
    Choice(ChoiceData),
}

impl DataNode {
    /// Construct the empty node matching a schema kind.
    pub fn for_schema(schema: SchemaId, kind: SchemaKind) -> Self {
        match kind {
            SchemaKind::Leaf => DataNode::Leaf(ScalarData::new(schema)),
            SchemaKind::AnyOpaque => DataNode::AnyOpaque(ScalarData::new(schema)),
            SchemaKind::Container => {
                DataNode::Composite(CompositeData::new(schema, CompositeKind::Container))
            }
            SchemaKind::List => DataNode::Composite(CompositeData::new(schema, CompositeKind::List)),
            SchemaKind::LeafList => {
                DataNode::Composite(CompositeData::new(schema, CompositeKind::LeafList))
            }
            SchemaKind::Choice | SchemaKind::Case => {
                DataNode::Composite(CompositeData::new(schema, CompositeKind::Generic))
            }
        }
    }

    pub fn schema(&self) -> SchemaId {
        match self {
            DataNode::Leaf(s) | DataNode::AnyOpaque(s) | DataNode::LeafListEntry(s) => s.schema(),
            DataNode::Composite(c) => c.schema(),
            DataNode::Choice(c) => c.schema(),
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarData> {
        match self {
            DataNode::Leaf(s) | DataNode::AnyOpaque(s) | DataNode::LeafListEntry(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Option<&mut ScalarData> {
        match self {
            DataNode::Leaf(s) | DataNode::AnyOpaque(s) | DataNode::LeafListEntry(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeData> {
        match self {
            DataNode::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeData> {
        match self {
            DataNode::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&ChoiceData> {
        match self {
            DataNode::Choice(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_choice_mut(&mut self) -> Option<&mut ChoiceData> {
        match self {
            DataNode::Choice(c) => Some(c),
            _ => None,
        }
    }
}
