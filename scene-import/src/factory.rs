//! Node factory registry.
//!
//! Each type tag maps to a [`NodeFactory`] that creates an empty live node
//! of the right kind and applies the fields only that kind understands.
//! Adding a node kind means registering one more factory; the
//! reconstruction queue never changes.

use std::collections::HashMap;
use std::sync::Arc;

use scene_core::{
    tags, AutoLayout, CanvasHost, FontName, HostResult, NodeId, NodeKind, NodeProperty,
    SceneRecord, TextRangeStyle,
};

use crate::fonts::FontCache;
use crate::properties::PropertyWriter;

/// Shared state available to factories while configuring a node.
#[derive(Debug, Clone, Copy)]
pub struct FactoryContext<'a> {
    /// Resolved and loaded fonts.
    pub fonts: &'a FontCache,
    /// Font used when nothing better is loaded.
    pub default_font: &'a FontName,
}

/// Creates and configures live nodes for one type tag.
pub trait NodeFactory: Send + Sync {
    /// Kind of node this factory creates.
    fn kind(&self) -> NodeKind;

    /// Create an empty, detached node.
    ///
    /// # Errors
    ///
    /// Returns the host error if creation fails.
    fn create(&self, host: &dyn CanvasHost) -> HostResult<NodeId> {
        host.create_node(self.kind())
    }

    /// Apply kind-specific fields. Runs after the node is attached.
    fn configure(
        &self,
        _ctx: &FactoryContext<'_>,
        _writer: &mut PropertyWriter<'_>,
        _record: &SceneRecord,
    ) {
    }

    /// Whether the record's children are imported under this node.
    fn walks_children(&self) -> bool {
        true
    }
}

/// Frames, sections, components and fallbacks for instances.
#[derive(Debug, Clone, Copy)]
pub struct ContainerFactory {
    kind: NodeKind,
}

impl ContainerFactory {
    /// Create a factory for a container kind.
    #[must_use]
    pub const fn new(kind: NodeKind) -> Self {
        Self { kind }
    }
}

impl NodeFactory for ContainerFactory {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn configure(
        &self,
        _ctx: &FactoryContext<'_>,
        writer: &mut PropertyWriter<'_>,
        record: &SceneRecord,
    ) {
        if self.kind.supports_auto_layout() {
            if let Some(layout) = auto_layout(record) {
                writer.set(NodeProperty::AutoLayout(layout));
            }
        }
        if let Some(clips) = record.clips_content {
            writer.set(NodeProperty::ClipsContent(clips));
        }
        if self.kind == NodeKind::Component {
            if let Some(key) = record.component_key() {
                writer.set(NodeProperty::ComponentKey(key.to_string()));
            }
        }
    }
}

fn auto_layout(record: &SceneRecord) -> Option<AutoLayout> {
    let mode = record
        .layout_mode
        .as_deref()
        .filter(|mode| !mode.eq_ignore_ascii_case("NONE"))?;
    Some(AutoLayout {
        mode: mode.to_ascii_uppercase(),
        item_spacing: record.item_spacing.unwrap_or(0.0),
        padding: [
            record.padding_left.unwrap_or(0.0),
            record.padding_right.unwrap_or(0.0),
            record.padding_top.unwrap_or(0.0),
            record.padding_bottom.unwrap_or(0.0),
        ],
        primary_axis_sizing: record.primary_axis_sizing_mode.clone(),
        counter_axis_sizing: record.counter_axis_sizing_mode.clone(),
        primary_axis_align: record.primary_axis_align_items.clone(),
        counter_axis_align: record.counter_axis_align_items.clone(),
    })
}

/// Stand-in frame for `GROUP` records, replaced by a true group once its
/// subtree exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupPlaceholderFactory;

impl NodeFactory for GroupPlaceholderFactory {
    fn kind(&self) -> NodeKind {
        NodeKind::Frame
    }

    fn configure(
        &self,
        _ctx: &FactoryContext<'_>,
        writer: &mut PropertyWriter<'_>,
        _record: &SceneRecord,
    ) {
        writer.set(NodeProperty::ClipsContent(false));
        writer.set(NodeProperty::Fills(Vec::new()));
    }
}

/// Rectangles, ellipses and lines.
#[derive(Debug, Clone, Copy)]
pub struct ShapeFactory {
    kind: NodeKind,
}

impl ShapeFactory {
    /// Create a factory for a plain shape kind.
    #[must_use]
    pub const fn new(kind: NodeKind) -> Self {
        Self { kind }
    }
}

impl NodeFactory for ShapeFactory {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn walks_children(&self) -> bool {
        false
    }
}

/// Stars and regular polygons.
#[derive(Debug, Clone, Copy)]
pub struct PolygonFactory {
    kind: NodeKind,
}

impl PolygonFactory {
    /// Create a factory for [`NodeKind::Star`] or [`NodeKind::Polygon`].
    #[must_use]
    pub const fn new(kind: NodeKind) -> Self {
        Self { kind }
    }
}

impl NodeFactory for PolygonFactory {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn configure(
        &self,
        _ctx: &FactoryContext<'_>,
        writer: &mut PropertyWriter<'_>,
        record: &SceneRecord,
    ) {
        if let Some(count) = record.point_count {
            writer.set(NodeProperty::PointCount(count));
        }
        if self.kind == NodeKind::Star {
            if let Some(radius) = record.inner_radius {
                writer.set(NodeProperty::InnerRadius(radius));
            }
        }
    }

    fn walks_children(&self) -> bool {
        false
    }
}

/// Free-form vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorFactory;

impl NodeFactory for VectorFactory {
    fn kind(&self) -> NodeKind {
        NodeKind::Vector
    }

    fn configure(
        &self,
        _ctx: &FactoryContext<'_>,
        writer: &mut PropertyWriter<'_>,
        record: &SceneRecord,
    ) {
        if let Some(paths) = &record.vector_paths {
            writer.set(NodeProperty::VectorPaths(paths.clone()));
        }
    }

    fn walks_children(&self) -> bool {
        false
    }
}

/// Text layers. The font is set first; everything after it needs the
/// font loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFactory;

impl NodeFactory for TextFactory {
    fn kind(&self) -> NodeKind {
        NodeKind::Text
    }

    fn configure(
        &self,
        ctx: &FactoryContext<'_>,
        writer: &mut PropertyWriter<'_>,
        record: &SceneRecord,
    ) {
        let font = ctx
            .fonts
            .resolve(record.requested_font().as_ref(), ctx.default_font);
        writer.set(NodeProperty::Font(font));

        let characters = record.characters.clone().unwrap_or_default();
        let length = characters.chars().count();
        writer.set(NodeProperty::Characters(characters));

        let style = record.style.clone().unwrap_or_default();
        if let Some(size) = style.font_size {
            writer.set(NodeProperty::FontSize(size));
        }
        if let Some(spacing) = style.letter_spacing {
            writer.set(NodeProperty::LetterSpacing(spacing));
        }
        if let Some(height) = style.line_height_px {
            writer.set(NodeProperty::LineHeight(height));
        }
        if style.text_align_horizontal.is_some() || style.text_align_vertical.is_some() {
            writer.set(NodeProperty::TextAlign {
                horizontal: style.text_align_horizontal,
                vertical: style.text_align_vertical,
            });
        }

        for segment in &record.styled_text_segments {
            let end = segment.end.min(length);
            if segment.start >= end {
                continue;
            }
            writer.set(NodeProperty::TextRange(TextRangeStyle {
                start: segment.start,
                end,
                font: segment
                    .font_name
                    .as_ref()
                    .map(|f| ctx.fonts.resolve(Some(f), ctx.default_font)),
                font_size: segment.font_size,
                fills: segment.fills.clone(),
            }));
        }
    }

    fn walks_children(&self) -> bool {
        false
    }
}

/// Type tag to factory lookup.
#[derive(Clone)]
pub struct FactoryRegistry {
    factories: HashMap<String, Arc<dyn NodeFactory>>,
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FactoryRegistry {
    /// A registry with no factories.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with every built-in node kind.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(tags::FRAME, Arc::new(ContainerFactory::new(NodeKind::Frame)));
        registry.register("SECTION", Arc::new(ContainerFactory::new(NodeKind::Section)));
        registry.register(
            tags::COMPONENT,
            Arc::new(ContainerFactory::new(NodeKind::Component)),
        );
        registry.register(
            tags::COMPONENT_SET,
            Arc::new(ContainerFactory::new(NodeKind::Frame)),
        );
        registry.register(tags::INSTANCE, Arc::new(ContainerFactory::new(NodeKind::Frame)));
        registry.register(
            "BOOLEAN_OPERATION",
            Arc::new(ContainerFactory::new(NodeKind::Frame)),
        );
        registry.register(tags::GROUP, Arc::new(GroupPlaceholderFactory));
        registry.register("RECTANGLE", Arc::new(ShapeFactory::new(NodeKind::Rectangle)));
        registry.register("ELLIPSE", Arc::new(ShapeFactory::new(NodeKind::Ellipse)));
        registry.register("LINE", Arc::new(ShapeFactory::new(NodeKind::Line)));
        registry.register("STAR", Arc::new(PolygonFactory::new(NodeKind::Star)));
        registry.register("POLYGON", Arc::new(PolygonFactory::new(NodeKind::Polygon)));
        registry.register(
            "REGULAR_POLYGON",
            Arc::new(PolygonFactory::new(NodeKind::Polygon)),
        );
        registry.register("VECTOR", Arc::new(VectorFactory));
        registry.register(tags::TEXT, Arc::new(TextFactory));
        registry
    }

    /// Register a factory, returning the one it replaces.
    pub fn register(
        &mut self,
        tag: &str,
        factory: Arc<dyn NodeFactory>,
    ) -> Option<Arc<dyn NodeFactory>> {
        self.factories.insert(tag.to_ascii_uppercase(), factory)
    }

    /// Factory for a type tag, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<Arc<dyn NodeFactory>> {
        self.factories.get(&tag.to_ascii_uppercase()).cloned()
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}
