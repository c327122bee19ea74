//! Error conversion helpers for reading and parsing input files
//!
//! Provides an extension trait that attaches the file path to any error.

use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting foreign results to `ApplicationResult` with context.
pub trait PathContextExt<T> {
    /// Add action and path context to an I/O or parse error.
    ///
    /// # Example
    /// ```ignore
    /// let text = std::fs::read_to_string(path).with_path_context("read schema", path)?;
    /// let file: SchemaFile = toml::from_str(&text).with_path_context("parse schema", path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T, E> PathContextExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}
