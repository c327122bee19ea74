//! Domain layer: schema model, data tree, placement and writing
//!
//! This layer is independent of external concerns (no file I/O, no CLI, no config loading).

pub mod augment;
pub mod builder;
pub mod codec;
pub mod data;
pub mod error;
pub mod qname;
pub mod schema;
pub mod writer;

pub use augment::find_owning_augmentation;
pub use builder::{BuildContext, BuildOptions, TreeBuilder};
pub use codec::{CodecRegistry, ScalarType, ScalarValue, ValueCodec};
pub use data::{ChoiceData, CompositeData, CompositeKind, DataNode, ScalarData};
pub use error::{DomainError, DomainResult};
pub use qname::QName;
pub use schema::{
    AugmentationId, AugmentationIdentifier, AugmentationSchema, Module, NewNode, SchemaContext,
    SchemaId, SchemaKind, SchemaNavigator, SchemaNode,
};
pub use writer::{StreamSink, TreeWriter};
