//! Merge engine for ctxcap.
//!
//! Folds a capture sequence into a single best-effort document while
//! recording, for every key at every nesting level, where it came from, how
//! it was spelled, and what type it held.
//!
//! # Key Types
//!
//! - [`KeyObservation`] / [`ObservationIndex`] -- Per-key observations grouped by normalized key
//! - [`deep_merge`] -- Left-biased recursive merge with a case-sensitivity policy
//! - [`MergeAccumulator`] -- Left fold of captured documents in arrival order

pub mod accumulator;
pub mod deep_merge;
pub mod index;

pub use accumulator::MergeAccumulator;
pub use deep_merge::deep_merge;
pub use index::{index_document, normalize_key, KeyObservation, ObservationIndex};
