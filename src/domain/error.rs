//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::codec::ScalarType;
use crate::domain::qname::QName;
use crate::domain::schema::{SchemaId, SchemaKind};

/// Domain errors abort assembly of the current document.
/// None of them is recoverable at the point of detection.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("schema path is empty")]
    EmptySchemaPath,

    #[error("structural mismatch at {node}: expected {expected}, found {found}")]
    StructuralMismatch {
        node: QName,
        expected: &'static str,
        found: SchemaKind,
    },

    #[error("case conflict in choice {choice}: data from case {requested} given, but case {existing} was selected earlier")]
    CaseConflict {
        choice: QName,
        existing: QName,
        requested: QName,
    },

    #[error("invalid lexical value {value:?} for type {type_name}: {reason}")]
    InvalidLexicalValue {
        type_name: ScalarType,
        value: Option<String>,
        reason: String,
    },

    #[error("augmenting node {child} matches no augmentation of {parent}")]
    UnresolvedAugmentationTarget { parent: QName, child: QName },

    #[error("unknown schema node: {0}")]
    UnknownSchemaNode(SchemaId),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("stream sink failed: {0}")]
    Sink(#[from] std::io::Error),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
