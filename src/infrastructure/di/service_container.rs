//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::TreeService;
use crate::config::Settings;
use crate::domain::CodecRegistry;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub tree: TreeService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let tree = TreeService::new(Arc::clone(&fs), Arc::new(CodecRegistry::new()));

        Self { settings, fs, tree }
    }

    /// Schema file to use: the explicit one, else the configured one.
    pub fn schema_path(&self, explicit: Option<&Path>) -> InfraResult<PathBuf> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| self.settings.schema.clone())
            .ok_or(InfraError::MissingSchema)?;
        if !self.fs.is_file(&path) {
            return Err(InfraError::io(
                format!("schema file {}", path.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a file"),
            ));
        }
        Ok(path)
    }
}
