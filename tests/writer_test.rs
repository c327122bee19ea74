//! Tests for replaying data trees to a stream sink

use yangtree::domain::{
    AugmentationIdentifier, BuildContext, BuildOptions, CodecRegistry, CompositeData, CompositeKind,
    QName, ScalarType, ScalarValue, SchemaContext, SchemaId, SchemaKind, SchemaNavigator,
    TreeWriter,
};
use yangtree::infrastructure::sinks::{EventRecorder, SinkEvent};

const NS: &str = "urn:example:base";
const AUG: &str = "urn:example:aug";

struct Fixture {
    schema: SchemaContext,
    top: SchemaId,
    a: SchemaId,
    count: SchemaId,
    ch: SchemaId,
    x: SchemaId,
    p: SchemaId,
    servers: SchemaId,
    name: SchemaId,
    tags: SchemaId,
    m: SchemaId,
    k: SchemaId,
}

/// top {
///   a, count (uint8), choice ch { case x { p } },
///   list servers { name }, leaf-list tags
/// }
/// augmentation on top from AUG: m, k
fn fixture() -> Fixture {
    let mut schema = SchemaContext::new();
    let root = schema.root();
    let q = |ns: &str, name: &str| QName::new(ns, name);

    let top = schema.add_child(root, q(NS, "top"), SchemaKind::Container).unwrap();
    let a = schema.add_leaf(top, q(NS, "a"), ScalarType::String).unwrap();
    let count = schema.add_leaf(top, q(NS, "count"), ScalarType::Uint8).unwrap();
    let ch = schema.add_child(top, q(NS, "ch"), SchemaKind::Choice).unwrap();
    let x = schema.add_child(ch, q(NS, "x"), SchemaKind::Case).unwrap();
    let p = schema.add_leaf(x, q(NS, "p"), ScalarType::Int32).unwrap();
    let servers = schema.add_child(top, q(NS, "servers"), SchemaKind::List).unwrap();
    let name = schema.add_leaf(servers, q(NS, "name"), ScalarType::String).unwrap();
    let tags = schema
        .add_child(top, q(NS, "tags"), SchemaKind::LeafList)
        .unwrap();

    let aug = schema.add_augmentation(top).unwrap();
    let m = schema.add_augmenting_leaf(aug, q(AUG, "m"), ScalarType::String).unwrap();
    let k = schema.add_augmenting_leaf(aug, q(AUG, "k"), ScalarType::Boolean).unwrap();

    Fixture {
        schema,
        top,
        a,
        count,
        ch,
        x,
        p,
        servers,
        name,
        tags,
        m,
        k,
    }
}

fn set(top: &mut CompositeData, cx: &BuildContext<'_, SchemaContext>, path: &[SchemaId], value: ScalarValue) {
    top.add_child(cx, path)
        .unwrap()
        .as_scalar_mut()
        .unwrap()
        .set_value(Some(value));
}

fn record(fx: &Fixture, tree: &CompositeData) -> Vec<SinkEvent> {
    let codecs = CodecRegistry::new();
    let writer = TreeWriter::new(&fx.schema, &codecs);
    let mut recorder = EventRecorder::new();
    writer.write_composite(tree, &mut recorder).unwrap();
    recorder.into_events()
}

fn start(kind: CompositeKind, local: &str, size_hint: usize) -> SinkEvent {
    SinkEvent::StartComposite {
        kind,
        name: QName::new(NS, local),
        size_hint,
    }
}

fn leaf(ns: &str, local: &str, value: &str) -> SinkEvent {
    SinkEvent::Leaf {
        name: QName::new(ns, local),
        value: value.to_string(),
    }
}

fn augmentation() -> SinkEvent {
    SinkEvent::StartAugmentation(AugmentationIdentifier::new([
        QName::new(AUG, "m"),
        QName::new(AUG, "k"),
    ]))
}

#[test]
fn given_interleaved_direct_and_augmented_fields_when_writing_then_direct_first_then_groups() {
    // Arrange
    let fx = fixture();
    let cx = BuildContext::new(&fx.schema, BuildOptions::default());
    let mut top = CompositeData::new(fx.top, CompositeKind::Container);
    set(&mut top, &cx, &[fx.m], ScalarValue::String("m1".into()));
    set(&mut top, &cx, &[fx.a], ScalarValue::String("a1".into()));
    set(&mut top, &cx, &[fx.k], ScalarValue::Boolean(true));
    set(&mut top, &cx, &[fx.count], ScalarValue::Uint(7));

    // Act
    let events = record(&fx, &top);

    // Assert
    assert_eq!(
        events,
        vec![
            start(CompositeKind::Container, "top", 2),
            leaf(NS, "a", "a1"),
            leaf(NS, "count", "7"),
            augmentation(),
            leaf(AUG, "m", "m1"),
            leaf(AUG, "k", "true"),
            SinkEvent::End,
            SinkEvent::End,
        ]
    );
}

#[test]
fn given_same_fields_in_different_interleavings_then_output_is_identical() {
    let fx = fixture();
    let cx = BuildContext::new(&fx.schema, BuildOptions::default());

    let mut first = CompositeData::new(fx.top, CompositeKind::Container);
    set(&mut first, &cx, &[fx.a], ScalarValue::String("a1".into()));
    set(&mut first, &cx, &[fx.m], ScalarValue::String("m1".into()));
    set(&mut first, &cx, &[fx.count], ScalarValue::Uint(1));

    let mut second = CompositeData::new(fx.top, CompositeKind::Container);
    set(&mut second, &cx, &[fx.m], ScalarValue::String("m1".into()));
    set(&mut second, &cx, &[fx.a], ScalarValue::String("a1".into()));
    set(&mut second, &cx, &[fx.count], ScalarValue::Uint(1));

    assert_eq!(record(&fx, &first), record(&fx, &second));
}

#[test]
fn given_no_augmented_fields_when_writing_then_no_augmentation_events() {
    let fx = fixture();
    let cx = BuildContext::new(&fx.schema, BuildOptions::default());
    let mut top = CompositeData::new(fx.top, CompositeKind::Container);
    set(&mut top, &cx, &[fx.a], ScalarValue::String("a1".into()));

    let events = record(&fx, &top);

    assert!(events
        .iter()
        .all(|e| !matches!(e, SinkEvent::StartAugmentation(_))));
    assert_eq!(events.len(), 3);
}

#[test]
fn given_choice_when_writing_then_only_case_content_appears() {
    // Arrange
    let fx = fixture();
    let cx = BuildContext::new(&fx.schema, BuildOptions::default());
    let mut top = CompositeData::new(fx.top, CompositeKind::Container);
    set(&mut top, &cx, &[fx.ch, fx.x, fx.p], ScalarValue::Int(-5));
    set(&mut top, &cx, &[fx.a], ScalarValue::String("a1".into()));

    // Act
    let events = record(&fx, &top);

    // Assert
    assert_eq!(
        events,
        vec![
            start(CompositeKind::Container, "top", 2),
            leaf(NS, "p", "-5"),
            leaf(NS, "a", "a1"),
            SinkEvent::End,
        ]
    );
}

#[test]
fn given_list_and_leaf_list_when_writing_then_entries_are_framed_in_order() {
    // Arrange
    let fx = fixture();
    let cx = BuildContext::new(&fx.schema, BuildOptions::default());
    let mut top = CompositeData::new(fx.top, CompositeKind::Container);

    let list = top.add_child(&cx, &[fx.servers]).unwrap().as_composite_mut().unwrap();
    for server in ["s1", "s2"] {
        let entry = list.add_list_entry(&cx).unwrap();
        set(entry, &cx, &[fx.name], ScalarValue::String(server.into()));
    }
    let tags = top.add_child(&cx, &[fx.tags]).unwrap().as_composite_mut().unwrap();
    for tag in ["blue", "green"] {
        tags.add_leaf_list_entry(&cx, Some(ScalarValue::String(tag.into())))
            .unwrap();
    }

    // Act
    let events = record(&fx, &top);

    // Assert
    assert_eq!(
        events,
        vec![
            start(CompositeKind::Container, "top", 2),
            start(CompositeKind::List, "servers", 2),
            start(CompositeKind::ListEntry, "servers", 1),
            leaf(NS, "name", "s1"),
            SinkEvent::End,
            start(CompositeKind::ListEntry, "servers", 1),
            leaf(NS, "name", "s2"),
            SinkEvent::End,
            SinkEvent::End,
            start(CompositeKind::LeafList, "tags", 2),
            leaf(NS, "tags", "blue"),
            leaf(NS, "tags", "green"),
            SinkEvent::End,
            SinkEvent::End,
        ]
    );
}

#[test]
fn given_finished_tree_when_written_twice_then_same_events() {
    let fx = fixture();
    let cx = BuildContext::new(&fx.schema, BuildOptions::default());
    let mut top = CompositeData::new(fx.top, CompositeKind::Container);
    set(&mut top, &cx, &[fx.k], ScalarValue::Boolean(false));
    set(&mut top, &cx, &[fx.ch, fx.x, fx.p], ScalarValue::Int(1));

    assert_eq!(record(&fx, &top), record(&fx, &top));
}

#[test]
fn given_leaf_without_value_when_writing_then_empty_text() {
    let fx = fixture();
    let cx = BuildContext::new(&fx.schema, BuildOptions::default());
    let mut top = CompositeData::new(fx.top, CompositeKind::Container);
    top.add_child(&cx, &[fx.a]).unwrap();

    let events = record(&fx, &top);

    assert_eq!(events[1], leaf(NS, "a", ""));
}
