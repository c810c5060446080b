//! Per-node outcomes and the report returned by an import call.

use std::time::Instant;

use scene_core::{BoundingBox, FontName, NodeId};
use serde::Serialize;

use crate::identity::IdentityMap;

/// Why a record was skipped or only partially imported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// No factory is registered for the type tag. The subtree is dropped.
    UnknownNodeType {
        /// The unrecognised tag.
        type_tag: String,
    },
    /// The requested font is not on the host; a substitute was loaded.
    FontUnavailable {
        /// Font the document asked for.
        requested: FontName,
        /// Font loaded instead.
        substitute: FontName,
    },
    /// The record had no usable geometry and got the default box.
    GeometryMissing,
    /// No local definition matched the component key; a plain frame was built.
    ComponentKeyNotFound {
        /// The unresolved key.
        key: String,
        /// Lookup error, if the lookup itself failed.
        reason: Option<String>,
    },
    /// A group placeholder ended up with no children and was kept as a frame.
    GroupConversionEmpty,
    /// A single host call failed; the node is partially configured.
    HostOperationFailure {
        /// Operation or property name.
        operation: String,
        /// Host error message.
        message: String,
    },
    /// A top-level value could not be read as a record.
    InvalidRecord {
        /// Deserialization error.
        message: String,
    },
}

impl IssueKind {
    /// Stable snake-case code of the issue kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownNodeType { .. } => "unknown_node_type",
            Self::FontUnavailable { .. } => "font_unavailable",
            Self::GeometryMissing => "geometry_missing",
            Self::ComponentKeyNotFound { .. } => "component_key_not_found",
            Self::GroupConversionEmpty => "group_conversion_empty",
            Self::HostOperationFailure { .. } => "host_operation_failure",
            Self::InvalidRecord { .. } => "invalid_record",
        }
    }
}

/// One non-fatal problem, tied to the record it concerns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportIssue {
    /// Original id of the record; empty for document-wide issues.
    pub record_id: String,
    /// What went wrong.
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl ImportIssue {
    /// Create an issue.
    #[must_use]
    pub fn new(record_id: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            record_id: record_id.into(),
            kind,
        }
    }

    /// A failed host call.
    #[must_use]
    pub fn host_failure(
        record_id: impl Into<String>,
        operation: impl Into<String>,
        error: &impl std::fmt::Display,
    ) -> Self {
        Self::new(
            record_id,
            IssueKind::HostOperationFailure {
                operation: operation.into(),
                message: error.to_string(),
            },
        )
    }
}

/// Counts and issues of an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    /// Live nodes created, group replacements excluded.
    pub created: usize,
    /// Records that produced no node.
    pub skipped: usize,
    /// Descendants lost because an ancestor was skipped.
    pub dropped: usize,
    /// Placeholders replaced by true groups.
    pub groups_converted: usize,
    /// Every issue, in the order it was found.
    pub issues: Vec<ImportIssue>,
}

impl ImportSummary {
    /// Record a created node.
    pub fn record_created(&mut self) {
        self.created += 1;
    }

    /// Record a skipped record together with its dropped descendants.
    pub fn record_skipped(&mut self, issue: ImportIssue, dropped: usize) {
        self.skipped += 1;
        self.dropped += dropped;
        self.issues.push(issue);
    }

    /// Record a warning about a node that was still created.
    pub fn record_issue(&mut self, issue: ImportIssue) {
        self.issues.push(issue);
    }

    /// Record a completed group conversion.
    pub fn record_group_converted(&mut self) {
        self.groups_converted += 1;
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: Self) {
        self.created += other.created;
        self.skipped += other.skipped;
        self.dropped += other.dropped;
        self.groups_converted += other.groups_converted;
        self.issues.extend(other.issues);
    }

    /// Number of issues with the given [`IssueKind::code`].
    #[must_use]
    pub fn count(&self, code: &str) -> usize {
        self.issues.iter().filter(|i| i.kind.code() == code).count()
    }

    /// Whether every record produced a node without warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.issues.is_empty()
    }
}

/// A progress notification, posted at each batch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportProgress {
    /// Roots processed so far.
    pub current: usize,
    /// Roots in the whole import.
    pub total: usize,
    /// Human-readable status.
    pub message: String,
}

/// Result of one import call.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Created roots in input order; failed roots are absent.
    pub roots: Vec<NodeId>,
    /// Original id to live node, replacements included.
    pub identity: IdentityMap,
    /// Counts and issues.
    pub summary: ImportSummary,
    /// Union of the roots' absolute bounds, or the default region.
    pub viewport: BoundingBox,
    /// Wall time of the call in milliseconds.
    pub duration_ms: u64,
}

impl ImportReport {
    pub(crate) fn finalize(&mut self, start_time: Instant) {
        self.duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_merge() {
        let mut a = ImportSummary::default();
        a.record_created();
        a.record_skipped(
            ImportIssue::new(
                "x",
                IssueKind::UnknownNodeType {
                    type_tag: "UNKNOWN_X".into(),
                },
            ),
            3,
        );

        let mut b = ImportSummary::default();
        b.record_created();
        b.record_group_converted();
        b.record_issue(ImportIssue::new("g", IssueKind::GroupConversionEmpty));

        a.merge(b);
        assert_eq!(a.created, 2);
        assert_eq!(a.skipped, 1);
        assert_eq!(a.dropped, 3);
        assert_eq!(a.groups_converted, 1);
        assert_eq!(a.count("unknown_node_type"), 1);
        assert_eq!(a.count("group_conversion_empty"), 1);
        assert!(!a.is_clean());
    }

    #[test]
    fn test_issue_serializes_flat() {
        let issue = ImportIssue::new("r1", IssueKind::GeometryMissing);
        let value = serde_json::to_value(&issue).expect("serialize");
        assert_eq!(value["record_id"], "r1");
        assert_eq!(value["kind"], "geometry_missing");
    }
}
