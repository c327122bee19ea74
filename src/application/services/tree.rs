//! Data tree service
//!
//! Loads schemas, builds data trees from JSON documents and renders them.

use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::{parse_schema, ApplicationResult, DocumentBuilder, PathContextExt};
use crate::config::OutputFormat;
use crate::domain::{
    BuildOptions, CodecRegistry, CompositeData, DomainError, SchemaContext, TreeWriter,
};
use crate::infrastructure::sinks::{EventRecorder, TermTreeSink};
use crate::infrastructure::traits::FileSystem;

/// Service for building and rendering schema-governed data trees.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
    codecs: Arc<CodecRegistry>,
}

impl TreeService {
    pub fn new(fs: Arc<dyn FileSystem>, codecs: Arc<CodecRegistry>) -> Self {
        Self { fs, codecs }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load_schema(&self, path: &Path) -> ApplicationResult<SchemaContext> {
        let content = self.fs.read_to_string(path).with_path_context("read schema", path)?;
        let schema = parse_schema(&content)?;
        info!("Loaded schema {} ({} nodes)", path.display(), schema.len());
        Ok(schema)
    }

    /// Build the data tree of one JSON document.
    #[instrument(level = "debug", skip(self, schema))]
    pub fn build(
        &self,
        schema: &SchemaContext,
        document: &Path,
        options: BuildOptions,
    ) -> ApplicationResult<CompositeData> {
        let content = self
            .fs
            .read_to_string(document)
            .with_path_context("read document", document)?;
        let tree = DocumentBuilder::new(schema, &self.codecs, options).build_str(&content)?;
        debug!("build: {} top-level nodes", tree.size_hint());
        Ok(tree)
    }

    /// Write `tree` through the sink matching `format` and return the text.
    pub fn render(
        &self,
        schema: &SchemaContext,
        tree: &CompositeData,
        format: OutputFormat,
    ) -> ApplicationResult<String> {
        let writer = TreeWriter::new(schema, self.codecs.as_ref());
        match format {
            OutputFormat::Events => {
                let mut recorder = EventRecorder::new();
                writer.write_composite(tree, &mut recorder)?;
                Ok(recorder.events().iter().join("\n"))
            }
            OutputFormat::Tree => {
                let mut sink = TermTreeSink::new("data");
                writer.write_composite(tree, &mut sink)?;
                let rendered = sink.finish().map_err(DomainError::Sink)?;
                Ok(rendered.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::infrastructure::traits::MemoryFileSystem;

    const SCHEMA: &str = r#"
[[module]]
name = "sys"
namespace = "urn:sys"

[[module.node]]
name = "system"
kind = "container"
children = [{ name = "hostname", kind = "leaf" }]
"#;

    fn service() -> TreeService {
        let fs = MemoryFileSystem::new()
            .with_file("/s.toml", SCHEMA)
            .with_file("/d.json", r#"{"sys:system": {"hostname": "edge-1"}}"#);
        TreeService::new(Arc::new(fs), Arc::new(CodecRegistry::new()))
    }

    #[test]
    fn given_document_when_rendering_events_then_container_frames_leaf() {
        let service = service();
        let schema = service.load_schema(Path::new("/s.toml")).unwrap();
        let tree = service
            .build(&schema, Path::new("/d.json"), BuildOptions::default())
            .unwrap();

        let out = service.render(&schema, &tree, OutputFormat::Events).unwrap();

        assert_eq!(
            out,
            "start container (urn:sys)system (1)\nleaf (urn:sys)hostname = \"edge-1\"\nend"
        );
    }

    #[test]
    fn given_missing_document_when_building_then_error_names_path() {
        let service = service();
        let schema = service.load_schema(Path::new("/s.toml")).unwrap();

        let err = service
            .build(&schema, &PathBuf::from("/missing.json"), BuildOptions::default())
            .unwrap_err();

        assert!(err.to_string().contains("/missing.json"));
    }
}
