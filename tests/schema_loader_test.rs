//! Tests for loading schemas from TOML files

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use yangtree::application::services::TreeService;
use yangtree::application::{parse_schema, ApplicationError, ApplicationResult};
use yangtree::domain::{CodecRegistry, DomainError, SchemaContext, SchemaKind, SchemaNavigator};
use yangtree::infrastructure::traits::RealFileSystem;

fn load_schema(path: &Path) -> ApplicationResult<SchemaContext> {
    TreeService::new(Arc::new(RealFileSystem), Arc::new(CodecRegistry::new())).load_schema(path)
}

#[test]
fn given_schema_file_when_loading_then_modules_and_augmentations_are_registered() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("network.toml");
    fs::write(&path, include_str!("resources/network.toml")).unwrap();

    // Act
    let schema = load_schema(&path).unwrap();

    // Assert
    let names: Vec<&str> = schema.modules().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["net", "ext", "mon"]);

    let system = schema.resolve_path(["system"]).unwrap();
    assert_eq!(schema.augmentations_of(system).len(), 2);
    let interface = schema.resolve_path(["interfaces", "interface"]).unwrap();
    assert_eq!(schema.augmentations_of(interface).len(), 1);
}

#[test]
fn given_augmenting_choice_when_loading_then_only_the_injected_node_is_augmenting() {
    let schema = parse_schema(include_str!("resources/network.toml")).unwrap();

    let choice = schema.resolve_path(["system", "log-target"]).unwrap();
    let case = schema.resolve_path(["system", "log-target", "remote"]).unwrap();
    let leaf = schema
        .resolve_path(["system", "log-target", "remote", "log-host"])
        .unwrap();

    assert!(schema.node(choice).unwrap().is_augmenting());
    assert_eq!(schema.node(choice).unwrap().kind(), SchemaKind::Choice);
    assert!(!schema.node(case).unwrap().is_augmenting());
    assert!(!schema.node(leaf).unwrap().is_augmenting());
}

#[test]
fn given_data_node_inside_choice_when_finding_path_then_choice_and_case_are_included() {
    let schema = parse_schema(include_str!("resources/network.toml")).unwrap();
    let interface = schema.resolve_path(["interfaces", "interface"]).unwrap();

    let path = schema
        .find_child_path(interface, "urn:example:net", "prefix-length")
        .unwrap();

    let kinds: Vec<SchemaKind> = path
        .iter()
        .map(|&id| schema.node(id).unwrap().kind())
        .collect();
    assert_eq!(kinds, vec![SchemaKind::Choice, SchemaKind::Case, SchemaKind::Leaf]);
}

#[test]
fn given_missing_file_when_loading_then_operation_failed_names_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = load_schema(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[rstest]
#[case::leaf_in_choice(
    r#"
[[module]]
name = "m"
namespace = "urn:m"
[[module.node]]
name = "c"
kind = "choice"
children = [{ name = "l", kind = "leaf" }]
"#
)]
#[case::case_outside_choice(
    r#"
[[module]]
name = "m"
namespace = "urn:m"
[[module.node]]
name = "k"
kind = "case"
"#
)]
#[case::augment_of_leaf(
    r#"
[[module]]
name = "m"
namespace = "urn:m"
[[module.node]]
name = "l"
kind = "leaf"
[[module.augment]]
target = "/l"
children = [{ name = "x", kind = "leaf" }]
"#
)]
#[case::duplicate_module(
    r#"
[[module]]
name = "m"
namespace = "urn:m"
[[module]]
name = "m"
namespace = "urn:m2"
"#
)]
#[case::duplicate_sibling(
    r#"
[[module]]
name = "m"
namespace = "urn:m"
[[module.node]]
name = "a"
kind = "leaf"
[[module.node]]
name = "a"
kind = "container"
"#
)]
fn given_rule_violation_when_parsing_then_invalid_schema(#[case] text: &str) {
    let result = parse_schema(text);

    assert!(
        matches!(
            result,
            Err(ApplicationError::Domain(DomainError::InvalidSchema(_)))
        ),
        "{:?}",
        result.err()
    );
}

#[rstest]
#[case::leaf_with_children(
    r#"
[[module]]
name = "m"
namespace = "urn:m"
[[module.node]]
name = "l"
kind = "leaf"
children = [{ name = "x", kind = "leaf" }]
"#
)]
#[case::unknown_field(
    r#"
[[module]]
name = "m"
namespace = "urn:m"
prefix = "m"
"#
)]
#[case::unknown_kind(
    r#"
[[module]]
name = "m"
namespace = "urn:m"
[[module.node]]
name = "n"
kind = "notification"
"#
)]
fn given_malformed_definition_when_parsing_then_schema_error(#[case] text: &str) {
    let result = parse_schema(text);

    assert!(matches!(result, Err(ApplicationError::Schema { .. })), "{:?}", result.err());
}
