//! Foundation types for ctxcap.
//!
//! This crate provides the document model shared by every other ctxcap
//! crate: the semi-structured documents handed over by the host event
//! pipeline, the tagged values they hold, and the metadata used to describe
//! where a key lives and what type its value has.
//!
//! # Key Types
//!
//! - [`Value`] / [`ValueKind`]: Closed tagged union of capturable values
//! - [`Document`]: Insertion-ordered string-keyed map of values
//! - [`TypeDescriptor`]: Optional-ness plus concrete type tag of a value slot
//! - [`KeyPath`]: Sequence of normalized keys locating a nesting level
//! - [`SourceId`]: UUID v7 identifier of the host event a document came from
//! - [`CapturedDocument`]: A document (or its absence) paired with its source

pub mod descriptor;
pub mod document;
pub mod error;
pub mod path;
pub mod source;
pub mod value;

pub use descriptor::{TypeDescriptor, TypeName};
pub use document::Document;
pub use error::{TypeError, TypeResult};
pub use path::KeyPath;
pub use source::{CapturedDocument, SourceId};
pub use value::{Value, ValueKind};
