//! The complete capture report.

use std::fmt;

use serde::Serialize;

use ctxcap_merge::MergeAccumulator;
use ctxcap_types::{CapturedDocument, Document, SourceId};

use crate::conflict::ConflictReport;
use crate::pretty::pretty_document;

const MERGE_RESULT_HEADER: &str = "============== Merge Result ==============";
const CONFLICTS_HEADER: &str = "-------------- Value type/key merge conflicts --------------";
const MERGED_DOCUMENT_HEADER: &str = "-------------- Merge Document --------------";

/// Result of merging the capture sequence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergeSection {
    pub case_sensitive: bool,
    pub conflicts: ConflictReport,
    pub merged: Document,
}

/// Diagnostic report over one capture sequence.
///
/// Holds an optional merge section, the capture summary, and every captured
/// document. The text rendering (via `Display`) lists, in order: conflicts,
/// the merged document, the document count, the source ids in merge order,
/// and a dump of each document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CaptureReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeSection>,
    pub document_count: usize,
    pub source_ids: Vec<SourceId>,
    pub documents: Vec<CapturedDocument>,
}

impl CaptureReport {
    /// Build the report for `documents` in capture order.
    ///
    /// With `merge == false` no merge or conflict computation happens at all.
    pub fn generate(documents: Vec<CapturedDocument>, merge: bool, case_sensitive: bool) -> Self {
        let merge = if merge {
            MergeAccumulator::from_documents(&documents, case_sensitive).map(|acc| {
                let conflicts = ConflictReport::generate(acc.observations());
                let (merged, _) = acc.into_parts();
                MergeSection {
                    case_sensitive,
                    conflicts,
                    merged,
                }
            })
        } else {
            None
        };

        Self {
            merge,
            document_count: documents.len(),
            source_ids: documents.iter().map(|d| d.id).collect(),
            documents,
        }
    }

    /// Returns `true` if a merge section is present and holds conflicts.
    pub fn has_conflicts(&self) -> bool {
        self.merge.as_ref().is_some_and(|m| !m.conflicts.is_empty())
    }

    /// The report as plain text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CaptureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(merge) = &self.merge {
            writeln!(f, "{MERGE_RESULT_HEADER}")?;
            writeln!(f, "{CONFLICTS_HEADER}")?;
            write!(f, "{}", merge.conflicts)?;
            writeln!(f, "{MERGED_DOCUMENT_HEADER}")?;
            writeln!(f, "{}", pretty_document(Some(&merge.merged)))?;
        }

        writeln!(f, "Number of documents captured: {}", self.document_count)?;
        let ids: Vec<String> = self.source_ids.iter().map(ToString::to_string).collect();
        writeln!(f, "Document IDs in merged order: [{}]", ids.join(", "))?;
        for document in &self.documents {
            writeln!(f, "Document: {} - data:", document.id)?;
            writeln!(f, "{}", pretty_document(document.data.as_ref()))?;
        }
        Ok(())
    }
}
