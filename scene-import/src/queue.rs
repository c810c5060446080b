//! Reconstruction queue.
//!
//! Builds one root's subtree breadth first from an explicit FIFO worklist,
//! so depth is bounded by node count rather than the call stack. For each
//! task the node is created, attached, configured, placed and styled, then
//! its children are queued. Group records are built as placeholder frames
//! and handed to [`crate::groups`] once the worklist drains.

use std::collections::VecDeque;
use std::sync::Arc;

use scene_core::{tags, CanvasHost, NodeId, NodeKind, SceneRecord, Vector};

use crate::component;
use crate::factory::{FactoryContext, FactoryRegistry, NodeFactory};
use crate::geometry::{self, GeometrySource};
use crate::identity::{IdentityMap, OnNodeCreated};
use crate::properties::{self, PropertyWriter};
use crate::report::{ImportIssue, ImportSummary, IssueKind};

/// One unit of work: a record and where its node goes.
#[derive(Debug, Clone, Copy)]
struct BuildTask<'r> {
    record: &'r SceneRecord,
    parent: Option<NodeId>,
    parent_origin: Vector,
}

/// A placeholder awaiting conversion into a true group.
#[derive(Debug, Clone, Copy)]
pub struct GroupTask<'r> {
    /// Placeholder frame standing in for the group.
    pub placeholder: NodeId,
    /// Parent the placeholder was attached to.
    pub parent: Option<NodeId>,
    /// The group record.
    pub record: &'r SceneRecord,
}

/// Everything the build phase produced for one root.
#[derive(Debug, Default)]
pub struct BuildOutput<'r> {
    /// Node built for the root record, if it could be created.
    pub root: Option<NodeId>,
    /// Original id to live node.
    pub identity: IdentityMap,
    /// Deferred group conversions, in creation order.
    pub groups: Vec<GroupTask<'r>>,
    /// Counts and issues.
    pub summary: ImportSummary,
}

enum Strategy {
    Instance(NodeId),
    Factory(Arc<dyn NodeFactory>),
}

/// Iterative builder for one root subtree.
pub struct ReconstructionQueue<'a> {
    host: &'a dyn CanvasHost,
    registry: &'a FactoryRegistry,
    ctx: FactoryContext<'a>,
    on_created: Option<&'a OnNodeCreated>,
}

impl<'a> ReconstructionQueue<'a> {
    /// Create a queue over `host`.
    #[must_use]
    pub fn new(
        host: &'a dyn CanvasHost,
        registry: &'a FactoryRegistry,
        ctx: FactoryContext<'a>,
        on_created: Option<&'a OnNodeCreated>,
    ) -> Self {
        Self {
            host,
            registry,
            ctx,
            on_created,
        }
    }

    /// Build `root` and its subtree under `parent` (the page when `None`).
    ///
    /// `parent_origin` is the absolute position that maps to the parent's
    /// origin; for page-level roots this is the global minimum.
    pub async fn build<'r>(
        &self,
        root: &'r SceneRecord,
        parent: Option<NodeId>,
        parent_origin: Vector,
    ) -> BuildOutput<'r> {
        let mut output = BuildOutput::default();
        let mut queue = VecDeque::from([BuildTask {
            record: root,
            parent,
            parent_origin,
        }]);
        let mut first = true;

        while let Some(task) = queue.pop_front() {
            let is_root = std::mem::take(&mut first);
            let record = task.record;

            let Some(strategy) = self.strategy(record, &mut output.summary).await else {
                continue;
            };
            let (node, kind, walks_children) = match &strategy {
                Strategy::Instance(node) => (*node, NodeKind::Instance, false),
                Strategy::Factory(factory) => match factory.create(self.host) {
                    Ok(node) => (node, factory.kind(), factory.walks_children()),
                    Err(e) => {
                        tracing::warn!(
                            record_id = %record.id,
                            error = %e,
                            "Node creation failed"
                        );
                        output.summary.record_skipped(
                            ImportIssue::host_failure(record.id.clone(), "create_node", &e),
                            record.descendant_count(),
                        );
                        continue;
                    }
                },
            };

            if let Err(e) = self.host.append_child(task.parent, node) {
                tracing::warn!(
                    record_id = %record.id,
                    error = %e,
                    "Attach failed, discarding node"
                );
                if let Err(e) = self.host.remove_node(node) {
                    tracing::debug!(record_id = %record.id, error = %e, "Discarding node failed");
                }
                output.summary.record_skipped(
                    ImportIssue::host_failure(record.id.clone(), "append_child", &e),
                    record.descendant_count(),
                );
                continue;
            }

            let resolved = geometry::resolve(record, task.parent_origin);
            let mut writer = PropertyWriter::new(self.host, node, &record.id);
            match &strategy {
                Strategy::Instance(_) => {
                    component::apply_overrides(&mut writer, record, &resolved);
                }
                Strategy::Factory(factory) => {
                    factory.configure(&self.ctx, &mut writer, record);
                    properties::apply_base(&mut writer, record);
                    geometry::apply(&mut writer, kind, &resolved);
                    properties::apply_appearance(&mut writer, record);
                }
            }
            // Instances keep the component's own size without a box.
            let factory_built = matches!(strategy, Strategy::Factory(_));
            if factory_built && resolved.source == GeometrySource::Default {
                tracing::debug!(record_id = %record.id, "No geometry, using default box");
                writer.record(ImportIssue::new(record.id.clone(), IssueKind::GeometryMissing));
            }

            output.summary.record_created();
            output.identity.insert(&record.id, node);
            if is_root {
                output.root = Some(node);
            }
            if let Some(callback) = self.on_created {
                callback(&record.id, node, record);
            }

            if record.is(tags::GROUP) {
                output.groups.push(GroupTask {
                    placeholder: node,
                    parent: task.parent,
                    record,
                });
            }

            if walks_children {
                queue.extend(record.children.iter().map(|child| BuildTask {
                    record: child,
                    parent: Some(node),
                    parent_origin: resolved.origin,
                }));
            } else if !record.children.is_empty() && kind != NodeKind::Instance {
                tracing::debug!(
                    record_id = %record.id,
                    kind = %kind,
                    children = record.children.len(),
                    "Kind does not take children, ignoring them"
                );
            }

            properties::apply_sizing_hints(&mut writer, record);
            output.summary.issues.extend(writer.into_issues());
        }

        output
    }

    /// Pick how to create the node for `record`; `None` skips it.
    async fn strategy(
        &self,
        record: &SceneRecord,
        summary: &mut ImportSummary,
    ) -> Option<Strategy> {
        if component::is_candidate(record) {
            match component::instantiate(self.host, record).await {
                Ok(node) => return Some(Strategy::Instance(node)),
                Err(issue) => {
                    summary.record_issue(issue);
                    return self.registry.get(tags::FRAME).map(Strategy::Factory);
                }
            }
        }

        if let Some(factory) = self.registry.get(&record.type_tag) {
            return Some(Strategy::Factory(factory));
        }

        let dropped = record.descendant_count();
        tracing::warn!(
            record_id = %record.id,
            type_tag = %record.type_tag,
            dropped,
            "Unknown node type, skipping subtree"
        );
        summary.record_skipped(
            ImportIssue::new(
                record.id.clone(),
                IssueKind::UnknownNodeType {
                    type_tag: record.type_tag.clone(),
                },
            ),
            dropped,
        );
        None
    }
}
