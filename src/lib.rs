//! Schema-governed data tree builder.
//!
//! Incoming fields are placed into a tree shaped by a schema model: choices
//! keep a single selected case, augmenting nodes are grouped under the
//! augmentation that declares them, and scalar values pass through typed
//! codecs. A finished tree is replayed to a [`domain::StreamSink`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
