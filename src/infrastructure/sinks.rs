//! Stream sink implementations used for output and inspection.

use std::fmt;
use std::io;

use termtree::Tree;

use crate::domain::{AugmentationIdentifier, CompositeKind, QName, StreamSink};

/// One call made on a [`StreamSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    StartComposite {
        kind: CompositeKind,
        name: QName,
        size_hint: usize,
    },
    StartAugmentation(AugmentationIdentifier),
    Leaf {
        name: QName,
        value: String,
    },
    AnyOpaque {
        name: QName,
        content: String,
    },
    End,
}

impl fmt::Display for SinkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkEvent::StartComposite {
                kind,
                name,
                size_hint,
            } => write!(f, "start {} {} ({})", kind, name, size_hint),
            SinkEvent::StartAugmentation(identifier) => write!(f, "start {}", identifier),
            SinkEvent::Leaf { name, value } => write!(f, "leaf {} = {:?}", name, value),
            SinkEvent::AnyOpaque { name, content } => write!(f, "anyopaque {} = {}", name, content),
            SinkEvent::End => f.write_str("end"),
        }
    }
}

/// Records every sink call in order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<SinkEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SinkEvent> {
        self.events
    }
}

impl StreamSink for EventRecorder {
    fn start_composite(&mut self, kind: CompositeKind, name: &QName, size_hint: usize) -> io::Result<()> {
        self.events.push(SinkEvent::StartComposite {
            kind,
            name: name.clone(),
            size_hint,
        });
        Ok(())
    }

    fn start_augmentation(&mut self, identifier: &AugmentationIdentifier) -> io::Result<()> {
        self.events.push(SinkEvent::StartAugmentation(identifier.clone()));
        Ok(())
    }

    fn leaf_value(&mut self, name: &QName, encoded: &str) -> io::Result<()> {
        self.events.push(SinkEvent::Leaf {
            name: name.clone(),
            value: encoded.to_string(),
        });
        Ok(())
    }

    fn any_opaque_value(&mut self, name: &QName, content: &str) -> io::Result<()> {
        self.events.push(SinkEvent::AnyOpaque {
            name: name.clone(),
            content: content.to_string(),
        });
        Ok(())
    }

    fn end_node(&mut self) -> io::Result<()> {
        self.events.push(SinkEvent::End);
        Ok(())
    }
}

/// Builds a printable `termtree` while the tree is written.
pub struct TermTreeSink {
    stack: Vec<Tree<String>>,
}

impl TermTreeSink {
    pub fn new(root_label: impl Into<String>) -> Self {
        Self {
            stack: vec![Tree::new(root_label.into())],
        }
    }

    /// Return the finished tree; fails when start and end calls did not balance.
    pub fn finish(mut self) -> io::Result<Tree<String>> {
        match (self.stack.pop(), self.stack.is_empty()) {
            (Some(root), true) => Ok(root),
            _ => Err(unbalanced("unclosed node at end of output")),
        }
    }

    fn open(&mut self, label: String) {
        self.stack.push(Tree::new(label));
    }

    fn add(&mut self, label: String) -> io::Result<()> {
        self.attach(Tree::new(label))
    }

    fn attach(&mut self, node: Tree<String>) -> io::Result<()> {
        let top = self
            .stack
            .last_mut()
            .ok_or_else(|| unbalanced("no open node"))?;
        top.push(node);
        Ok(())
    }
}

impl StreamSink for TermTreeSink {
    fn start_composite(&mut self, kind: CompositeKind, name: &QName, _size_hint: usize) -> io::Result<()> {
        let label = match kind {
            CompositeKind::Container => name.local_name().to_string(),
            CompositeKind::ListEntry => format!("{}[]", name.local_name()),
            _ => format!("{} ({})", name.local_name(), kind),
        };
        self.open(label);
        Ok(())
    }

    fn start_augmentation(&mut self, identifier: &AugmentationIdentifier) -> io::Result<()> {
        self.open(identifier.to_string());
        Ok(())
    }

    fn leaf_value(&mut self, name: &QName, encoded: &str) -> io::Result<()> {
        self.add(format!("{} = {}", name.local_name(), encoded))
    }

    fn any_opaque_value(&mut self, name: &QName, content: &str) -> io::Result<()> {
        self.add(format!("{} = {}", name.local_name(), content))
    }

    fn end_node(&mut self) -> io::Result<()> {
        // the root label is never closed
        if self.stack.len() < 2 {
            return Err(unbalanced("end without start"));
        }
        match self.stack.pop() {
            Some(node) => self.attach(node),
            None => Err(unbalanced("end without start")),
        }
    }
}

fn unbalanced(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("unbalanced sink calls: {message}"))
}
