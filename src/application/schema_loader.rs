//! Schema loading from TOML module definitions.
//!
//! ```toml
//! [[module]]
//! name = "system"
//! namespace = "urn:example:system"
//! revision = "2024-01-01"
//!
//! [[module.node]]
//! name = "system"
//! kind = "container"
//! children = [{ name = "hostname", kind = "leaf", type = "string" }]
//!
//! [[module.augment]]
//! target = "/system"
//! children = [{ name = "location", kind = "leaf" }]
//! ```
//!
//! Nodes of every module are created first, then augments are applied in
//! module order and declaration order within a module.


use serde::Deserialize;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Module, NewNode, ScalarType, SchemaContext, SchemaId, SchemaKind, SchemaNavigator};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDef {
    pub name: String,
    pub namespace: String,
    pub revision: Option<String>,
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeDef>,
    #[serde(default, rename = "augment")]
    pub augments: Vec<AugmentDef>,
}

impl ModuleDef {
    fn module(&self) -> Module {
        Module {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            revision: self.revision.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDef {
    pub name: String,
    pub kind: SchemaKind,
    #[serde(rename = "type")]
    pub value_type: Option<ScalarType>,
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AugmentDef {
    /// `/`-separated local names from the root, choices and cases included.
    pub target: String,
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

/// Build a schema from TOML text.
pub fn parse_schema(content: &str) -> ApplicationResult<SchemaContext> {
    let file: SchemaFile = toml::from_str(content).map_err(|e| ApplicationError::Schema {
        message: e.to_string(),
    })?;
    build_schema(&file)
}

pub fn build_schema(file: &SchemaFile) -> ApplicationResult<SchemaContext> {
    let mut ctx = SchemaContext::new();
    let root = ctx.root();

    for def in &file.modules {
        ctx.add_module(def.module())?;
    }

    for def in &file.modules {
        let module = def.module();
        for node in &def.nodes {
            insert_tree(&mut ctx, root, &module, node)?;
        }
    }

    for def in &file.modules {
        let module = def.module();
        for augment in &def.augments {
            let segments = augment.target.split('/').filter(|s| !s.is_empty());
            let target = ctx.resolve_path(segments).ok_or_else(|| ApplicationError::Schema {
                message: format!(
                    "module {}: augment target '{}' not found",
                    module.name, augment.target
                ),
            })?;
            let augmentation = ctx.add_augmentation(target)?;
            debug!("Module {} augments {}", module.name, augment.target);

            for node in &augment.children {
                let id = ctx.insert_augmenting_node(augmentation, new_node(&module, node)?)?;
                insert_children(&mut ctx, id, &module, &node.children)?;
            }
        }
    }

    Ok(ctx)
}

fn insert_tree(
    ctx: &mut SchemaContext,
    parent: SchemaId,
    module: &Module,
    def: &NodeDef,
) -> ApplicationResult<SchemaId> {
    let id = ctx.insert_node(parent, new_node(module, def)?)?;
    insert_children(ctx, id, module, &def.children)?;
    Ok(id)
}

fn insert_children(
    ctx: &mut SchemaContext,
    parent: SchemaId,
    module: &Module,
    children: &[NodeDef],
) -> ApplicationResult<()> {
    for child in children {
        insert_tree(ctx, parent, module, child)?;
    }
    Ok(())
}

fn new_node(module: &Module, def: &NodeDef) -> ApplicationResult<NewNode> {
    if !def.children.is_empty() && !def.kind.accepts_children() {
        return Err(ApplicationError::Schema {
            message: format!("{} '{}' cannot have children", def.kind, def.name),
        });
    }
    let qname = module.qname(def.name.as_str());
    match (def.kind.is_typed(), def.value_type) {
        (true, Some(value_type)) => Ok(NewNode::typed(qname, def.kind, value_type)),
        (_, None) => Ok(NewNode::new(qname, def.kind)),
        (false, Some(value_type)) => Err(ApplicationError::Schema {
            message: format!(
                "{} '{}' cannot declare type {}",
                def.kind, def.name, value_type
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
[[module]]
name = "sys"
namespace = "urn:example:sys"

[[module.node]]
name = "system"
kind = "container"
children = [
    { name = "hostname", kind = "leaf" },
    { name = "port", kind = "leaf", type = "uint16" },
]

[[module]]
name = "ext"
namespace = "urn:example:ext"
revision = "2024-05-01"

[[module.augment]]
target = "/system"
children = [{ name = "location", kind = "leaf" }]
"#;

    #[test]
    fn augments_are_applied_with_their_module_namespace() {
        let ctx = parse_schema(SCHEMA).unwrap();
        let system = ctx.resolve_path(["system"]).unwrap();

        let location = ctx.child_by_name(system, "urn:example:ext", "location").unwrap();
        let node = ctx.node(location).unwrap();

        assert!(node.is_augmenting());
        assert_eq!(node.qname().revision(), Some("2024-05-01"));
        assert_eq!(ctx.augmentations_of(system).len(), 1);
    }

    #[test]
    fn leaves_default_to_string() {
        let ctx = parse_schema(SCHEMA).unwrap();
        let hostname = ctx.resolve_path(["system", "hostname"]).unwrap();
        let port = ctx.resolve_path(["system", "port"]).unwrap();

        assert_eq!(ctx.node(hostname).unwrap().value_type(), Some(ScalarType::String));
        assert_eq!(ctx.node(port).unwrap().value_type(), Some(ScalarType::Uint16));
    }

    #[test]
    fn typed_container_is_rejected() {
        let text = r#"
[[module]]
name = "m"
namespace = "urn:m"
[[module.node]]
name = "c"
kind = "container"
type = "string"
"#;
        assert!(matches!(parse_schema(text), Err(ApplicationError::Schema { .. })));
    }

    #[test]
    fn missing_augment_target_is_rejected() {
        let text = r#"
[[module]]
name = "m"
namespace = "urn:m"
[[module.augment]]
target = "/nowhere"
children = [{ name = "x", kind = "leaf" }]
"#;
        let err = parse_schema(text).unwrap_err();
        assert!(err.to_string().contains("/nowhere"));
    }
}
