//! Group conversion, the finalize phase of a root.
//!
//! Runs after the reconstruction queue has drained. Each placeholder frame
//! built for a `GROUP` record is replaced, in creation order, by a true
//! group holding the placeholder's children. The group takes over the
//! placeholder's name, opacity, visibility, lock, rotation and position,
//! and the identity map and root list are repointed at it.
//!
//! The parent a placeholder is grouped into is read back from the host at
//! conversion time rather than taken from when the placeholder was built,
//! so a placeholder nested in an already converted group lands in that
//! group rather than in the removed outer placeholder.

use std::collections::HashMap;

use scene_core::{CanvasHost, NodeId, NodeProperty, SceneRecord};

use crate::identity::{IdentityMap, OnNodeCreated};
use crate::properties::PropertyWriter;
use crate::queue::GroupTask;
use crate::report::{ImportIssue, ImportSummary, IssueKind};

/// State the finalize phase updates.
pub struct GroupFinalizer<'a> {
    host: &'a dyn CanvasHost,
    on_created: Option<&'a OnNodeCreated>,
    /// Placeholder to the group that replaced it.
    replacements: HashMap<NodeId, NodeId>,
}

impl<'a> GroupFinalizer<'a> {
    /// Create a finalizer over `host`.
    #[must_use]
    pub fn new(host: &'a dyn CanvasHost, on_created: Option<&'a OnNodeCreated>) -> Self {
        Self {
            host,
            on_created,
            replacements: HashMap::new(),
        }
    }

    /// Convert every task, in order.
    pub fn run(
        &mut self,
        tasks: &[GroupTask<'_>],
        identity: &mut IdentityMap,
        root: &mut Option<NodeId>,
        summary: &mut ImportSummary,
    ) {
        for task in tasks {
            let Some(group) = self.convert(task, summary) else {
                continue;
            };
            self.replacements.insert(task.placeholder, group);
            summary.record_group_converted();

            if identity.replace(&task.record.id, group) {
                tracing::trace!(record_id = %task.record.id, "Identity repointed to group");
            }
            if *root == Some(task.placeholder) {
                *root = Some(group);
            }
            if let Some(callback) = self.on_created {
                callback(&task.record.id, group, task.record);
            }
        }
    }

    /// Group live node for a placeholder, or the placeholder when it was
    /// not converted.
    #[must_use]
    pub fn replacement(&self, placeholder: NodeId) -> NodeId {
        self.replacements
            .get(&placeholder)
            .copied()
            .unwrap_or(placeholder)
    }

    fn convert(&self, task: &GroupTask<'_>, summary: &mut ImportSummary) -> Option<NodeId> {
        let record: &SceneRecord = task.record;
        let placeholder = task.placeholder;
        let failure = |operation: &str, e: &dyn std::fmt::Display| {
            tracing::warn!(
                record_id = %record.id,
                operation,
                error = %e,
                "Group conversion step failed"
            );
            ImportIssue::new(
                record.id.clone(),
                IssueKind::HostOperationFailure {
                    operation: operation.to_string(),
                    message: e.to_string(),
                },
            )
        };

        let children = match self.host.children(Some(placeholder)) {
            Ok(children) => children,
            Err(e) => {
                summary.record_issue(failure("children", &e));
                return None;
            }
        };
        if children.is_empty() {
            tracing::info!(record_id = %record.id, "Empty group, keeping placeholder frame");
            summary.record_issue(ImportIssue::new(
                record.id.clone(),
                IssueKind::GroupConversionEmpty,
            ));
            return None;
        }

        let parent = match self.host.parent(placeholder) {
            Ok(parent) => parent,
            Err(e) => {
                tracing::debug!(
                    record_id = %record.id,
                    error = %e,
                    "Parent lookup failed, using recorded parent"
                );
                task.parent.map(|p| self.replacement(p))
            }
        };
        let index = self
            .host
            .children(parent)
            .ok()
            .and_then(|siblings| siblings.iter().position(|&n| n == placeholder));

        let snapshot = match self.host.snapshot(placeholder) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                summary.record_issue(failure("snapshot", &e));
                return None;
            }
        };
        let group = match self.host.group(&children, parent, index) {
            Ok(group) => group,
            Err(e) => {
                summary.record_issue(failure("group", &e));
                return None;
            }
        };

        let mut writer = PropertyWriter::new(self.host, group, &record.id);
        writer.set(NodeProperty::Name(snapshot.name));
        writer.set(NodeProperty::Opacity(snapshot.opacity));
        writer.set(NodeProperty::Visible(snapshot.visible));
        writer.set(NodeProperty::Locked(snapshot.locked));
        writer.set(NodeProperty::Rotation(snapshot.rotation));
        writer.set(NodeProperty::Position {
            x: snapshot.x,
            y: snapshot.y,
        });
        summary.issues.extend(writer.into_issues());

        if let Err(e) = self.host.remove_node(placeholder) {
            summary.record_issue(failure("remove_node", &e));
        }
        tracing::debug!(
            record_id = %record.id,
            children = children.len(),
            "Placeholder converted to group"
        );
        Some(group)
    }
}
