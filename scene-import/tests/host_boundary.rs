//! Imports through a host that suspends on every async call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use scene_core::{
    CanvasHost, FontName, HostResult, MemoryCanvas, NodeId, NodeKind, NodeProperty, NodeSnapshot,
    SceneRecord, TypeStyle,
};
use scene_import::{FontCache, ImportConfig, Importer};

/// Delegates to a [`MemoryCanvas`], yielding before each async call and
/// counting font queries.
struct YieldingHost {
    inner: MemoryCanvas,
    font_queries: AtomicUsize,
}

impl YieldingHost {
    fn new() -> Self {
        Self {
            inner: MemoryCanvas::new(),
            font_queries: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CanvasHost for YieldingHost {
    fn create_node(&self, kind: NodeKind) -> HostResult<NodeId> {
        self.inner.create_node(kind)
    }

    fn append_child(&self, parent: Option<NodeId>, child: NodeId) -> HostResult<()> {
        self.inner.append_child(parent, child)
    }

    fn remove_node(&self, id: NodeId) -> HostResult<()> {
        self.inner.remove_node(id)
    }

    fn children(&self, parent: Option<NodeId>) -> HostResult<Vec<NodeId>> {
        self.inner.children(parent)
    }

    fn parent(&self, id: NodeId) -> HostResult<Option<NodeId>> {
        self.inner.parent(id)
    }

    fn node_kind(&self, id: NodeId) -> HostResult<NodeKind> {
        self.inner.node_kind(id)
    }

    fn set_property(&self, id: NodeId, property: NodeProperty) -> HostResult<()> {
        self.inner.set_property(id, property)
    }

    fn resize(&self, id: NodeId, width: f32, height: f32) -> HostResult<()> {
        self.inner.resize(id, width, height)
    }

    fn snapshot(&self, id: NodeId) -> HostResult<NodeSnapshot> {
        self.inner.snapshot(id)
    }

    fn group(
        &self,
        children: &[NodeId],
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> HostResult<NodeId> {
        self.inner.group(children, parent, index)
    }

    fn create_instance(&self, component: NodeId) -> HostResult<NodeId> {
        self.inner.create_instance(component)
    }

    fn focus(&self, nodes: &[NodeId]) -> HostResult<()> {
        self.inner.focus(nodes)
    }

    async fn font_available(&self, font: &FontName) -> HostResult<bool> {
        self.font_queries.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.inner.font_available(font).await
    }

    async fn load_font(&self, font: &FontName) -> HostResult<()> {
        tokio::task::yield_now().await;
        self.inner.load_font(font).await
    }

    async fn find_component(&self, key: &str) -> HostResult<Option<NodeId>> {
        tokio::task::yield_now().await;
        self.inner.find_component(key).await
    }
}

fn text(id: &str, family: &str, style: &str) -> SceneRecord {
    let mut record = SceneRecord::new(id, "TEXT");
    record.characters = Some(id.to_string());
    record.style = Some(TypeStyle {
        font_family: Some(family.to_string()),
        font_style: Some(style.to_string()),
        ..TypeStyle::default()
    });
    record
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_roots_share_font_loads() {
    let host = Arc::new(YieldingHost::new());
    let importer = Importer::new(host.clone())
        .with_config(ImportConfig::default().with_batch_size(10));

    let records: Vec<SceneRecord> = (0..10)
        .map(|i| text(&format!("t{i}"), "Roboto", "Medium"))
        .collect();
    let report = importer.import_records(records, None).await.expect("import");

    assert_eq!(report.roots.len(), 10);
    assert_eq!(host.inner.load_count(&FontName::new("Roboto", "Medium")), 1);
    assert_eq!(host.inner.load_count(&FontName::default()), 1);
    for root in &report.roots {
        let node = host.inner.node(*root).expect("node");
        assert_eq!(node.font, Some(FontName::new("Roboto", "Medium")));
    }
}

#[tokio::test]
async fn test_resolved_fonts_are_not_queried_again() {
    let host = Arc::new(YieldingHost::new());
    let importer = Importer::new(host.clone());

    importer
        .import_records(vec![text("a", "Inter", "Bold")], None)
        .await
        .expect("first");
    let after_first = host.font_queries.load(Ordering::SeqCst);
    importer
        .import_records(vec![text("b", "Inter", "Bold")], None)
        .await
        .expect("second");

    assert_eq!(host.font_queries.load(Ordering::SeqCst), after_first);
}

#[tokio::test]
async fn test_shared_cache_across_importers() {
    let host = Arc::new(YieldingHost::new());
    let fonts = Arc::new(FontCache::new());
    let first = Importer::new(host.clone()).with_font_cache(Arc::clone(&fonts));
    let second = Importer::new(host.clone()).with_font_cache(Arc::clone(&fonts));

    first
        .import_records(vec![text("a", "Roboto", "Light")], None)
        .await
        .expect("first");
    second
        .import_records(vec![text("b", "Roboto", "Light")], None)
        .await
        .expect("second");

    assert_eq!(host.inner.load_count(&FontName::new("Roboto", "Light")), 1);
    assert!(fonts.is_loaded(&FontName::new("Roboto", "Light")));
}
