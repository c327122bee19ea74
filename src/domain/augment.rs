//! Augmentation resolution: which augmentation of a parent injects a child.

use tracing::instrument;

use crate::domain::schema::{AugmentationId, SchemaId, SchemaNavigator};

/// Find the augmentation of `parent` that contributes a node named like `child`.
///
/// Augmentations are scanned in declaration order and the first structural
/// match (by QName) wins. Parents that cannot be augmentation targets never
/// own one.
#[instrument(level = "trace", skip(schema))]
pub fn find_owning_augmentation<S>(schema: &S, parent: SchemaId, child: SchemaId) -> Option<AugmentationId>
where
    S: SchemaNavigator + ?Sized,
{
    let parent_node = schema.node(parent)?;
    if !parent_node.kind().is_augmentation_target() {
        return None;
    }
    let child_qname = schema.node(child)?.qname();

    schema
        .augmentations_of(parent)
        .iter()
        .copied()
        .find(|&augmentation| {
            schema
                .nodes_of(augmentation)
                .iter()
                .filter_map(|&id| schema.node(id))
                .any(|node| node.qname() == child_qname)
        })
}
