//! Reporting for ctxcap.
//!
//! Turns a folded capture sequence into the diagnostic output handed to the
//! host log: the conflicts found among same-position keys, the merged
//! document, and a dump of every captured document.
//!
//! # Key Types
//!
//! - [`ConflictReport`] / [`Conflict`] -- Key-spelling and value-type disagreements per key path
//! - [`CaptureReport`] -- The complete report, renderable as text or serializable as JSON

pub mod conflict;
pub mod pretty;
pub mod report;

pub use conflict::{Conflict, ConflictReport, SpellingEntry, TypedEntry};
pub use pretty::{pretty_document, NIL_DATA_PLACEHOLDER, UNPRINTABLE_PLACEHOLDER};
pub use report::{CaptureReport, MergeSection};
