use tracing::{debug, trace};

use ctxcap_types::{CapturedDocument, Document, KeyPath, SourceId};

use crate::deep_merge::deep_merge;
use crate::index::{index_document, ObservationIndex};

/// Running result of folding captured documents in arrival order.
///
/// `source_ids` always has one entry per folded document and `merged`
/// reflects exactly those documents. Folding is a strict left fold: the
/// same documents in a different order can produce a different result.
#[derive(Clone, Debug)]
pub struct MergeAccumulator {
    case_sensitive: bool,
    source_ids: Vec<SourceId>,
    merged: Document,
    observations: ObservationIndex,
}

impl MergeAccumulator {
    /// Start a fold from the first captured document.
    ///
    /// A document without data seeds an empty merge result.
    pub fn seed(first: &CapturedDocument, case_sensitive: bool) -> Self {
        let (merged, observations) = match &first.data {
            Some(data) => (
                data.clone(),
                index_document(data, first.id, case_sensitive, &KeyPath::root()),
            ),
            None => (Document::new(), ObservationIndex::new()),
        };
        Self {
            case_sensitive,
            source_ids: vec![first.id],
            merged,
            observations,
        }
    }

    /// Fold the next captured document into the running result.
    pub fn fold(&mut self, next: &CapturedDocument) {
        self.source_ids.push(next.id);
        let Some(data) = &next.data else {
            trace!(source = %next.id, "captured document has no data; nothing to merge");
            return;
        };

        self.observations.absorb(index_document(
            data,
            next.id,
            self.case_sensitive,
            &KeyPath::root(),
        ));
        let current = std::mem::take(&mut self.merged);
        self.merged = deep_merge(current, data, self.case_sensitive);
    }

    /// Fold a whole capture sequence. Returns `None` for an empty sequence.
    pub fn from_documents(documents: &[CapturedDocument], case_sensitive: bool) -> Option<Self> {
        let (first, rest) = documents.split_first()?;
        let mut acc = Self::seed(first, case_sensitive);
        for document in rest {
            acc.fold(document);
        }
        debug!(
            documents = acc.source_ids.len(),
            keys = acc.observations.len(),
            case_sensitive,
            "merged captured documents"
        );
        Some(acc)
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Sources in the order they were folded.
    pub fn source_ids(&self) -> &[SourceId] {
        &self.source_ids
    }

    pub fn merged(&self) -> &Document {
        &self.merged
    }

    pub fn observations(&self) -> &ObservationIndex {
        &self.observations
    }

    /// Consume the accumulator, yielding the merged document and observations.
    pub fn into_parts(self) -> (Document, ObservationIndex) {
        (self.merged, self.observations)
    }
}
