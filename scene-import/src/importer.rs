//! Import entry point.
//!
//! An [`Importer`] owns the host handle, the font cache and the factory
//! registry. Every call unwraps its input into top-level records and runs
//! the per-root pipeline (font preload, reconstruction queue, group
//! conversion) through the [`BatchScheduler`]. The font cache outlives
//! calls, so a font loaded once is never loaded again by the same importer.

use std::sync::Arc;
use std::time::Instant;

use scene_core::{Bounds, CanvasHost, NodeId, SceneRecord, Vector};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};
use crate::factory::{FactoryContext, FactoryRegistry};
use crate::fonts::FontCache;
use crate::geometry;
use crate::groups::GroupFinalizer;
use crate::identity::{IdentityMap, OnNodeCreated};
use crate::input::{self, Roots, Skipped};
use crate::queue::{BuildOutput, ReconstructionQueue};
use crate::report::{ImportIssue, ImportProgress, ImportReport, ImportSummary};
use crate::scheduler::BatchScheduler;

/// Everything one root produced.
#[derive(Debug, Default)]
struct RootOutcome {
    root: Option<NodeId>,
    identity: IdentityMap,
    summary: ImportSummary,
    bounds: Option<Bounds>,
}

/// Rebuilds serialized design documents on a host canvas.
#[derive(Clone)]
pub struct Importer {
    host: Arc<dyn CanvasHost>,
    fonts: Arc<FontCache>,
    registry: Arc<FactoryRegistry>,
    config: ImportConfig,
    progress: Option<UnboundedSender<ImportProgress>>,
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("fonts", &self.fonts)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl Importer {
    /// Create an importer with default configuration and factories.
    #[must_use]
    pub fn new(host: Arc<dyn CanvasHost>) -> Self {
        Self {
            host,
            fonts: Arc::new(FontCache::new()),
            registry: Arc::new(FactoryRegistry::with_defaults()),
            config: ImportConfig::default(),
            progress: None,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a font cache with other importers on the same host.
    #[must_use]
    pub fn with_font_cache(mut self, fonts: Arc<FontCache>) -> Self {
        self.fonts = fonts;
        self
    }

    /// Replace the factory registry.
    #[must_use]
    pub fn with_registry(mut self, registry: FactoryRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Post progress notifications to `tx`.
    #[must_use]
    pub fn with_progress(mut self, tx: UnboundedSender<ImportProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// The font cache.
    #[must_use]
    pub fn fonts(&self) -> &Arc<FontCache> {
        &self.fonts
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Parse`] for invalid JSON and
    /// [`ImportError::RootNotFound`] when the document holds no records.
    /// Per-node failures are reported in the returned summary instead.
    pub async fn import_json(
        &self,
        json: &str,
        on_created: Option<OnNodeCreated>,
    ) -> ImportResult<ImportReport> {
        let roots = input::parse_roots(json)?;
        Ok(self.import_roots(roots, on_created).await)
    }

    /// Import an already parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::RootNotFound`] when the document holds no
    /// records.
    pub async fn import_tree(
        &self,
        tree: &Value,
        on_created: Option<OnNodeCreated>,
    ) -> ImportResult<ImportReport> {
        let roots = input::collect_roots(tree)?;
        Ok(self.import_roots(roots, on_created).await)
    }

    /// Import top-level records directly.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::RootNotFound`] when `records` is empty.
    pub async fn import_records(
        &self,
        records: Vec<SceneRecord>,
        on_created: Option<OnNodeCreated>,
    ) -> ImportResult<ImportReport> {
        if records.is_empty() {
            return Err(ImportError::RootNotFound("no records given".to_string()));
        }
        let roots = Roots {
            records,
            skipped: Vec::new(),
        };
        Ok(self.import_roots(roots, on_created).await)
    }

    async fn import_roots(&self, roots: Roots, on_created: Option<OnNodeCreated>) -> ImportReport {
        let start_time = Instant::now();
        let Roots { records, skipped } = roots;
        let origin = geometry::global_origin(&records);
        tracing::info!(
            roots = records.len(),
            batch_size = self.config.batch_size,
            "Import started"
        );

        let scheduler = BatchScheduler::new(self.config.batch_size);
        let outcomes = scheduler
            .run(&records, self.progress.as_ref(), |record| {
                self.import_root(record, origin, on_created.as_ref())
            })
            .await;

        let mut report = ImportReport {
            roots: Vec::with_capacity(outcomes.len()),
            identity: IdentityMap::new(),
            summary: ImportSummary::default(),
            viewport: self.config.default_viewport,
            duration_ms: 0,
        };
        for Skipped { issue, dropped } in skipped {
            report.summary.record_skipped(issue, dropped);
        }

        let mut bounds: Option<Bounds> = None;
        for outcome in outcomes {
            report.roots.extend(outcome.root);
            report.identity.extend(outcome.identity);
            report.summary.merge(outcome.summary);
            if let Some(b) = outcome.bounds {
                bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
            }
        }
        if let Some(bounds) = bounds {
            report.viewport = bounds.to_box();
        }

        if self.config.focus_viewport && !report.roots.is_empty() {
            if let Err(e) = self.host.focus(&report.roots) {
                tracing::warn!(error = %e, "Focusing imported roots failed");
                report
                    .summary
                    .record_issue(ImportIssue::host_failure("", "focus", &e));
            }
        }

        report.finalize(start_time);
        tracing::info!(
            roots = report.roots.len(),
            created = report.summary.created,
            skipped = report.summary.skipped,
            issues = report.summary.issues.len(),
            duration_ms = report.duration_ms,
            "Import complete"
        );
        report
    }

    /// Per-root pipeline: preload fonts, build, convert groups.
    async fn import_root(
        &self,
        record: &SceneRecord,
        origin: Vector,
        on_created: Option<&OnNodeCreated>,
    ) -> RootOutcome {
        let font_issues = self
            .fonts
            .preload(&self.host, record, &self.config.default_font)
            .await;

        let ctx = FactoryContext {
            fonts: &self.fonts,
            default_font: &self.config.default_font,
        };
        let queue = ReconstructionQueue::new(self.host.as_ref(), &self.registry, ctx, on_created);
        let BuildOutput {
            mut root,
            mut identity,
            groups,
            mut summary,
        } = queue.build(record, None, origin).await;
        for issue in font_issues {
            summary.record_issue(issue);
        }

        GroupFinalizer::new(self.host.as_ref(), on_created).run(
            &groups,
            &mut identity,
            &mut root,
            &mut summary,
        );

        if root.is_none() {
            tracing::warn!(root = %record.label(), "Root could not be imported");
        }
        RootOutcome {
            root,
            identity,
            summary,
            bounds: root.and_then(|_| geometry::subtree_bounds(record)),
        }
    }
}
