//! Application layer: schema loading and document driving
//!
//! This layer feeds external input (TOML schemas, JSON documents) into the domain.

pub mod document;
pub mod error;
pub mod error_ext;
pub mod schema_loader;
pub mod services;

pub use document::DocumentBuilder;
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::PathContextExt;
pub use schema_loader::{build_schema, parse_schema, SchemaFile};
