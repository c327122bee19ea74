//! JSON document driver.
//!
//! Walks a parsed JSON document (RFC 7951 member naming) and feeds every
//! member to the composite builder. Member names are either `module:name`
//! or plain `name`, in which case the parent's namespace applies.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    BuildContext, BuildOptions, CodecRegistry, CompositeData, DataNode, ScalarData, ScalarType,
    ScalarValue, SchemaContext, SchemaId, SchemaKind, SchemaNavigator, SchemaNode, TreeBuilder,
};

type Cx<'a> = BuildContext<'a, SchemaContext>;

/// Builds data trees from JSON documents against one schema.
pub struct DocumentBuilder<'a> {
    schema: &'a SchemaContext,
    codecs: &'a CodecRegistry,
    options: BuildOptions,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(schema: &'a SchemaContext, codecs: &'a CodecRegistry, options: BuildOptions) -> Self {
        Self {
            schema,
            codecs,
            options,
        }
    }

    pub fn build_str(&self, text: &str) -> ApplicationResult<CompositeData> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| ApplicationError::document("", e.to_string()))?;
        self.build(&document)
    }

    /// Assemble the tree for a whole document; any error rejects the document.
    #[instrument(level = "debug", skip_all)]
    pub fn build(&self, document: &Value) -> ApplicationResult<CompositeData> {
        let object = document
            .as_object()
            .ok_or_else(|| ApplicationError::document("", "top-level value must be an object"))?;

        let mut builder = TreeBuilder::new(self.schema, self.options);
        let (cx, root) = builder.parts_mut();
        self.fill_object(&cx, root, self.schema.root(), None, object, "")?;
        Ok(builder.finish())
    }

    fn fill_object(
        &self,
        cx: &Cx<'a>,
        target: &mut CompositeData,
        parent: SchemaId,
        parent_namespace: Option<&'a str>,
        object: &Map<String, Value>,
        pointer: &str,
    ) -> ApplicationResult<()> {
        for (member, value) in object {
            let pointer = format!("{}/{}", pointer, member);
            let (namespace, local_name) = self.split_member(member, parent_namespace, &pointer)?;

            let path = self
                .schema
                .find_child_path(parent, namespace, local_name)
                .ok_or_else(|| {
                    ApplicationError::document(&pointer, format!("no schema node for member '{}'", member))
                })?;
            let Some(&last) = path.last() else {
                return Err(ApplicationError::document(&pointer, "empty schema path"));
            };
            debug!("{} resolved through {} schema nodes", pointer, path.len());

            let node = target
                .add_child(cx, &path)
                .map_err(|source| ApplicationError::placement(&pointer, source))?;
            self.fill_node(cx, node, cx.node(last)?, last, value, &pointer)?;
        }
        Ok(())
    }

    fn fill_node(
        &self,
        cx: &Cx<'a>,
        node: &mut DataNode,
        schema_node: &'a SchemaNode,
        schema_id: SchemaId,
        value: &Value,
        pointer: &str,
    ) -> ApplicationResult<()> {
        let namespace = Some(schema_node.qname().namespace());

        match schema_node.kind() {
            SchemaKind::Leaf => {
                let decoded = self.decode(schema_node, value, pointer)?;
                scalar(node, pointer)?.set_value(Some(decoded));
            }
            SchemaKind::AnyOpaque => {
                scalar(node, pointer)?.set_value(Some(ScalarValue::String(value.to_string())));
            }
            SchemaKind::Container => {
                let object = expect_object(value, pointer)?;
                let container = composite(node, pointer)?;
                self.fill_object(cx, container, schema_id, namespace, object, pointer)?;
            }
            SchemaKind::List => {
                let list = composite(node, pointer)?;
                for (index, element) in expect_array(value, pointer)?.iter().enumerate() {
                    let pointer = format!("{}/{}", pointer, index);
                    let object = expect_object(element, &pointer)?;
                    let entry = list
                        .add_list_entry(cx)
                        .map_err(|source| ApplicationError::placement(&pointer, source))?;
                    self.fill_object(cx, entry, schema_id, namespace, object, &pointer)?;
                }
            }
            SchemaKind::LeafList => {
                let leaf_list = composite(node, pointer)?;
                for (index, element) in expect_array(value, pointer)?.iter().enumerate() {
                    let pointer = format!("{}/{}", pointer, index);
                    let decoded = self.decode(schema_node, element, &pointer)?;
                    leaf_list
                        .add_leaf_list_entry(cx, Some(decoded))
                        .map_err(|source| ApplicationError::placement(&pointer, source))?;
                }
            }
            SchemaKind::Choice | SchemaKind::Case => {
                return Err(ApplicationError::document(
                    pointer,
                    format!("{} {} cannot appear as a member", schema_node.kind(), schema_node.qname()),
                ));
            }
        }
        Ok(())
    }

    /// Resolve `module:name` or `name` into (namespace, local name).
    fn split_member<'m>(
        &self,
        member: &'m str,
        parent_namespace: Option<&'a str>,
        pointer: &str,
    ) -> ApplicationResult<(&'a str, &'m str)> {
        match member.split_once(':') {
            Some((prefix, local_name)) => {
                let module = self.schema.module_by_name(prefix).ok_or_else(|| {
                    ApplicationError::document(pointer, format!("unknown module '{}'", prefix))
                })?;
                Ok((module.namespace.as_str(), local_name))
            }
            None => parent_namespace
                .map(|namespace| (namespace, member))
                .ok_or_else(|| {
                    ApplicationError::document(pointer, "top-level members must be module-qualified")
                }),
        }
    }

    fn decode(&self, schema_node: &SchemaNode, value: &Value, pointer: &str) -> ApplicationResult<ScalarValue> {
        let text = match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            // `empty` leaves are encoded as [null]
            Value::Array(items) if items.len() == 1 && items[0].is_null() => None,
            Value::Array(_) | Value::Object(_) => {
                return Err(ApplicationError::document(pointer, "expected a scalar value"));
            }
        };
        let value_type = schema_node.value_type().unwrap_or(ScalarType::String);
        self.codecs
            .deserialize(value_type, text.as_deref())
            .map_err(|source| ApplicationError::placement(pointer, source))
    }
}

fn scalar<'n>(node: &'n mut DataNode, pointer: &str) -> ApplicationResult<&'n mut ScalarData> {
    node.as_scalar_mut()
        .ok_or_else(|| ApplicationError::document(pointer, "expected a scalar node"))
}

fn composite<'n>(node: &'n mut DataNode, pointer: &str) -> ApplicationResult<&'n mut CompositeData> {
    node.as_composite_mut()
        .ok_or_else(|| ApplicationError::document(pointer, "expected a composite node"))
}

fn expect_object<'v>(value: &'v Value, pointer: &str) -> ApplicationResult<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ApplicationError::document(pointer, "expected an object"))
}

fn expect_array<'v>(value: &'v Value, pointer: &str) -> ApplicationResult<&'v Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| ApplicationError::document(pointer, "expected an array"))
}
