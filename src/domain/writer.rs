//! Tree writer: replays a finished data tree to a streaming sink.
//!
//! Output order is fixed: direct children in insertion order, then each
//! non-empty augmentation group in first-seen order. Choices are transparent,
//! only the selected case's content is written.

use std::io;

use tracing::instrument;

use crate::domain::codec::CodecRegistry;
use crate::domain::data::{CompositeData, CompositeKind, DataNode, ScalarData};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::qname::QName;
use crate::domain::schema::{AugmentationIdentifier, SchemaNavigator, SchemaNode};

/// Streaming receiver of a normalized data tree.
///
/// Every `start_*` call is balanced by exactly one `end_node`.
pub trait StreamSink {
    fn start_composite(&mut self, kind: CompositeKind, name: &QName, size_hint: usize) -> io::Result<()>;

    fn start_augmentation(&mut self, identifier: &AugmentationIdentifier) -> io::Result<()>;

    /// Leaf or leaf-list entry value, already encoded.
    fn leaf_value(&mut self, name: &QName, encoded: &str) -> io::Result<()>;

    fn any_opaque_value(&mut self, name: &QName, content: &str) -> io::Result<()>;

    fn end_node(&mut self) -> io::Result<()>;
}

impl<T: StreamSink + ?Sized> StreamSink for &mut T {
    fn start_composite(&mut self, kind: CompositeKind, name: &QName, size_hint: usize) -> io::Result<()> {
        (**self).start_composite(kind, name, size_hint)
    }

    fn start_augmentation(&mut self, identifier: &AugmentationIdentifier) -> io::Result<()> {
        (**self).start_augmentation(identifier)
    }

    fn leaf_value(&mut self, name: &QName, encoded: &str) -> io::Result<()> {
        (**self).leaf_value(name, encoded)
    }

    fn any_opaque_value(&mut self, name: &QName, content: &str) -> io::Result<()> {
        (**self).any_opaque_value(name, content)
    }

    fn end_node(&mut self) -> io::Result<()> {
        (**self).end_node()
    }
}

/// Read-only walker over a data tree.
pub struct TreeWriter<'a, S: ?Sized> {
    schema: &'a S,
    codecs: &'a CodecRegistry,
}

impl<'a, S: SchemaNavigator + ?Sized> TreeWriter<'a, S> {
    pub fn new(schema: &'a S, codecs: &'a CodecRegistry) -> Self {
        Self { schema, codecs }
    }

    #[instrument(level = "debug", skip_all, fields(schema = %node.schema()))]
    pub fn write<W: StreamSink + ?Sized>(&self, node: &DataNode, sink: &mut W) -> DomainResult<()> {
        match node {
            DataNode::Leaf(leaf) | DataNode::LeafListEntry(leaf) => self.write_leaf(leaf, sink),
            DataNode::AnyOpaque(opaque) => {
                let schema = self.node(opaque)?;
                let content = opaque.value().map(ToString::to_string).unwrap_or_default();
                sink.any_opaque_value(schema.qname(), &content)?;
                Ok(())
            }
            DataNode::Composite(composite) => self.write_composite(composite, sink),
            DataNode::Choice(choice) => self.write_body(choice.case(), sink),
        }
    }

    /// Write a composite, framing it when its kind requires.
    pub fn write_composite<W: StreamSink + ?Sized>(&self, composite: &CompositeData, sink: &mut W) -> DomainResult<()> {
        if !composite.kind().is_framed() {
            return self.write_body(composite, sink);
        }
        let schema = self
            .schema
            .node(composite.schema())
            .ok_or(DomainError::UnknownSchemaNode(composite.schema()))?;
        sink.start_composite(composite.kind(), schema.qname(), composite.size_hint())?;
        self.write_body(composite, sink)?;
        sink.end_node()?;
        Ok(())
    }

    fn write_body<W: StreamSink + ?Sized>(&self, composite: &CompositeData, sink: &mut W) -> DomainResult<()> {
        for child in composite.children() {
            self.write(child, sink)?;
        }
        for (augmentation, children) in composite.augmentation_groups() {
            sink.start_augmentation(&self.schema.augmentation_identifier(augmentation))?;
            for child in children {
                self.write(child, sink)?;
            }
            sink.end_node()?;
        }
        Ok(())
    }

    fn write_leaf<W: StreamSink + ?Sized>(&self, leaf: &ScalarData, sink: &mut W) -> DomainResult<()> {
        let schema = self.node(leaf)?;
        let encoded = match schema.value_type() {
            Some(value_type) => self.codecs.serialize(value_type, leaf.value())?,
            None => leaf.value().map(ToString::to_string).unwrap_or_default(),
        };
        sink.leaf_value(schema.qname(), &encoded)?;
        Ok(())
    }

    fn node(&self, scalar: &ScalarData) -> DomainResult<&'a SchemaNode> {
        self.schema
            .node(scalar.schema())
            .ok_or(DomainError::UnknownSchemaNode(scalar.schema()))
    }
}
