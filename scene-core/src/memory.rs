//! In-memory host canvas.
//!
//! [`MemoryCanvas`] implements [`CanvasHost`] over a node arena behind an
//! `RwLock`. It follows the rules a real design canvas enforces (text needs
//! a loaded font, groups cannot be resized, `FILL` sizing needs an
//! auto-layout parent) so the import pipeline can be exercised end to end,
//! and it can be told to fail specific calls.
//!
//! Positions are parent-relative for every node kind, groups included.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use crate::error::{HostError, HostResult};
use crate::font::FontName;
use crate::geometry::{BoundingBox, Bounds, Vector};
use crate::host::CanvasHost;
use crate::node::{
    AutoLayout, LayoutSizing, NodeId, NodeKind, NodeProperty, NodeSnapshot, TextRangeStyle,
};
use crate::paint::{CornerRadii, Effect, Paint, VectorPath};

/// Smallest dimension the canvas accepts in `resize`.
pub const MIN_DIMENSION: f32 = 0.01;

/// Families registered by [`MemoryCanvas::new`].
const DEFAULT_FAMILIES: [&str; 2] = ["Inter", "Roboto"];

/// Styles registered for each default family, plus their italic variants.
const DEFAULT_STYLES: [&str; 9] = [
    "Thin",
    "ExtraLight",
    "Light",
    "Regular",
    "Medium",
    "SemiBold",
    "Bold",
    "ExtraBold",
    "Black",
];

/// State of one live node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeData {
    /// Node identity.
    pub id: NodeId,
    /// Node kind.
    pub kind: NodeKind,
    /// Layer name.
    pub name: String,
    /// Visibility.
    pub visible: bool,
    /// Lock state.
    pub locked: bool,
    /// Layer opacity.
    pub opacity: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Parent-relative x.
    pub x: f32,
    /// Parent-relative y.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Fill paints.
    pub fills: Vec<Paint>,
    /// Stroke paints.
    pub strokes: Vec<Paint>,
    /// Stroke width.
    pub stroke_weight: Option<f32>,
    /// Stroke alignment.
    pub stroke_align: Option<String>,
    /// Effects.
    pub effects: Vec<Effect>,
    /// Corner rounding.
    pub corner_radii: Option<CornerRadii>,
    /// Auto-layout settings.
    pub auto_layout: Option<AutoLayout>,
    /// Clip content.
    pub clips_content: bool,
    /// Horizontal sizing behaviour.
    pub sizing_horizontal: Option<LayoutSizing>,
    /// Vertical sizing behaviour.
    pub sizing_vertical: Option<LayoutSizing>,
    /// Star/polygon point count.
    pub point_count: Option<u32>,
    /// Star inner radius.
    pub inner_radius: Option<f32>,
    /// Vector paths.
    pub vector_paths: Vec<VectorPath>,
    /// Text font.
    pub font: Option<FontName>,
    /// Text content.
    pub characters: Option<String>,
    /// Text size.
    pub font_size: Option<f32>,
    /// Letter spacing.
    pub letter_spacing: Option<f32>,
    /// Line height.
    pub line_height: Option<f32>,
    /// Horizontal text alignment.
    pub text_align_horizontal: Option<String>,
    /// Vertical text alignment.
    pub text_align_vertical: Option<String>,
    /// Range styling.
    pub text_ranges: Vec<TextRangeStyle>,
    /// Stable key, for component definitions.
    pub component_key: Option<String>,
    /// Definition this instance was created from.
    pub main_component: Option<NodeId>,
    /// Instance overrides.
    pub component_properties: serde_json::Map<String, serde_json::Value>,
    /// Parent node, `None` at page level or when detached.
    pub parent: Option<NodeId>,
    /// Ordered children.
    pub children: Vec<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        let text = kind == NodeKind::Text;
        Self {
            id: NodeId::new(),
            kind,
            name: default_name(kind),
            visible: true,
            locked: false,
            opacity: 1.0,
            rotation: 0.0,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: None,
            stroke_align: None,
            effects: Vec::new(),
            corner_radii: None,
            auto_layout: None,
            clips_content: matches!(kind, NodeKind::Frame | NodeKind::Component),
            sizing_horizontal: None,
            sizing_vertical: None,
            point_count: None,
            inner_radius: None,
            vector_paths: Vec::new(),
            font: text.then(FontName::default),
            characters: text.then(String::new),
            font_size: text.then_some(12.0),
            letter_spacing: None,
            line_height: None,
            text_align_horizontal: None,
            text_align_vertical: None,
            text_ranges: Vec::new(),
            component_key: None,
            main_component: None,
            component_properties: serde_json::Map::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

fn default_name(kind: NodeKind) -> String {
    let tag = kind.as_str();
    let mut name = tag[..1].to_string();
    name.push_str(&tag[1..].to_ascii_lowercase());
    name
}

#[derive(Debug, Default)]
struct CanvasInner {
    nodes: HashMap<NodeId, NodeData>,
    /// Page-level node IDs in paint order.
    page: Vec<NodeId>,
    selection: Vec<NodeId>,
    viewport: Option<BoundingBox>,
    available_fonts: HashSet<FontName>,
    loaded_fonts: HashSet<FontName>,
    /// Every `load_font` call, in call order.
    font_loads: Vec<FontName>,
    components: HashMap<String, NodeId>,
    failing_font_families: HashSet<String>,
    /// Fonts whose next load fails once.
    flaky_font_loads: HashSet<FontName>,
    failing_properties: HashSet<&'static str>,
    component_lookup_fails: bool,
}

impl CanvasInner {
    fn get(&self, id: NodeId) -> HostResult<&NodeData> {
        self.nodes
            .get(&id)
            .ok_or_else(|| HostError::NodeNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: NodeId) -> HostResult<&mut NodeData> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| HostError::NodeNotFound(id.to_string()))
    }

    fn require_container(&self, parent: Option<NodeId>) -> HostResult<()> {
        if let Some(parent) = parent {
            let node = self.get(parent)?;
            if !node.kind.is_container() {
                return Err(HostError::NotAContainer(format!("{} ({})", parent, node.kind)));
            }
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: Option<NodeId>) -> bool {
        while let Some(current) = id {
            if current == ancestor {
                return true;
            }
            id = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        match parent {
            Some(parent) => {
                if let Some(node) = self.nodes.get_mut(&parent) {
                    node.children.retain(|&c| c != id);
                }
            }
            None => self.page.retain(|&c| c != id),
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    fn insert_into(&mut self, parent: Option<NodeId>, child: NodeId, index: Option<usize>) {
        let list = match parent {
            Some(parent) => match self.nodes.get_mut(&parent) {
                Some(node) => &mut node.children,
                None => return,
            },
            None => &mut self.page,
        };
        match index {
            Some(index) => list.insert(index.min(list.len()), child),
            None => list.push(child),
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
        }
    }

    fn absolute_origin(&self, id: NodeId) -> Vector {
        let mut origin = Vector::ZERO;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(&c)) {
            origin.x += node.x;
            origin.y += node.y;
            current = node.parent;
        }
        origin
    }

    fn absolute_box(&self, id: NodeId) -> HostResult<BoundingBox> {
        let node = self.get(id)?;
        let origin = self.absolute_origin(id);
        Ok(BoundingBox::new(origin.x, origin.y, node.width, node.height))
    }

    fn require_font_loaded(&self, font: &FontName) -> HostResult<()> {
        if self.loaded_fonts.contains(font) {
            Ok(())
        } else {
            Err(HostError::FontNotLoaded(font.to_string()))
        }
    }

    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }
}

/// An in-memory [`CanvasHost`].
///
/// # Example
///
/// ```
/// use scene_core::{CanvasHost, MemoryCanvas, NodeKind, NodeProperty};
///
/// let canvas = MemoryCanvas::new();
/// let frame = canvas.create_node(NodeKind::Frame).unwrap();
/// canvas.append_child(None, frame).unwrap();
/// canvas.set_property(frame, NodeProperty::Name("Card".into())).unwrap();
///
/// assert_eq!(canvas.page_nodes(), vec![frame]);
/// ```
#[derive(Debug)]
pub struct MemoryCanvas {
    inner: RwLock<CanvasInner>,
}

impl Default for MemoryCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCanvas {
    /// Create a canvas with the default font families available.
    #[must_use]
    pub fn new() -> Self {
        let fonts = DEFAULT_FAMILIES.iter().flat_map(|family| {
            DEFAULT_STYLES.iter().flat_map(move |style| {
                let italic = if *style == "Regular" {
                    "Italic".to_string()
                } else {
                    format!("{style} Italic")
                };
                [FontName::new(*family, *style), FontName::new(*family, italic)]
            })
        });
        Self::empty().with_fonts(fonts)
    }

    /// Create a canvas with no fonts available.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: RwLock::new(CanvasInner::default()),
        }
    }

    /// Make additional fonts available.
    #[must_use]
    pub fn with_fonts(self, fonts: impl IntoIterator<Item = FontName>) -> Self {
        self.write().available_fonts.extend(fonts);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, CanvasInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CanvasInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make one more font available.
    pub fn register_font(&self, font: FontName) {
        self.write().available_fonts.insert(font);
    }

    /// Create a detached component definition reachable by `key`.
    ///
    /// Children can be attached to the returned node with
    /// [`CanvasHost::append_child`]; instances copy that subtree.
    pub fn define_component(&self, key: &str, name: &str) -> NodeId {
        let mut node = NodeData::new(NodeKind::Component);
        node.name = name.to_string();
        node.component_key = Some(key.to_string());
        let id = node.id;

        let mut inner = self.write();
        inner.nodes.insert(id, node);
        inner.components.insert(key.to_string(), id);
        id
    }

    /// Make `font_available` fail for every style of `family`.
    pub fn fail_font_queries_for(&self, family: &str) {
        self.write()
            .failing_font_families
            .insert(family.to_string());
    }

    /// Make the next `load_font` call for `font` fail, even if the font
    /// is available.
    pub fn fail_next_font_load(&self, font: FontName) {
        self.write().flaky_font_loads.insert(font);
    }

    /// Make every `find_component` call fail.
    pub fn fail_component_lookups(&self) {
        self.write().component_lookup_fails = true;
    }

    /// Make `set_property` fail for the property with this name
    /// (see [`NodeProperty::name`]).
    pub fn fail_property(&self, name: &'static str) {
        self.write().failing_properties.insert(name);
    }

    /// Copy of a node's state.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeData> {
        self.read().nodes.get(&id).cloned()
    }

    /// Page-level nodes in paint order.
    #[must_use]
    pub fn page_nodes(&self) -> Vec<NodeId> {
        self.read().page.clone()
    }

    /// Number of nodes reachable from the page.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        let inner = self.read();
        inner.page.iter().map(|&id| inner.subtree(id).len()).sum()
    }

    /// A node followed by all of its descendants, depth first.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.read().subtree(id)
    }

    /// Absolute box of a node, walking up its parents.
    #[must_use]
    pub fn absolute_box(&self, id: NodeId) -> Option<BoundingBox> {
        self.read().absolute_box(id).ok()
    }

    /// Every `load_font` call made so far, in call order.
    #[must_use]
    pub fn font_loads(&self) -> Vec<FontName> {
        self.read().font_loads.clone()
    }

    /// How many times `font` was loaded.
    #[must_use]
    pub fn load_count(&self, font: &FontName) -> usize {
        self.read().font_loads.iter().filter(|f| *f == font).count()
    }

    /// Whether `font` has been loaded successfully.
    #[must_use]
    pub fn is_font_loaded(&self, font: &FontName) -> bool {
        self.read().loaded_fonts.contains(font)
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> Vec<NodeId> {
        self.read().selection.clone()
    }

    /// Region brought into view by the last `focus` call.
    #[must_use]
    pub fn viewport(&self) -> Option<BoundingBox> {
        self.read().viewport
    }

    /// The page as a JSON tree, for inspection and debugging output.
    #[must_use]
    pub fn to_tree_json(&self) -> serde_json::Value {
        let inner = self.read();
        serde_json::Value::Array(
            inner
                .page
                .iter()
                .map(|&id| tree_value(&inner, id))
                .collect(),
        )
    }
}

fn tree_value(inner: &CanvasInner, id: NodeId) -> serde_json::Value {
    let Some(node) = inner.nodes.get(&id) else {
        return serde_json::Value::Null;
    };
    let mut value = json!({
        "id": node.id,
        "kind": node.kind,
        "name": node.name,
        "x": node.x,
        "y": node.y,
        "width": node.width,
        "height": node.height,
    });
    if let Some(characters) = &node.characters {
        value["characters"] = json!(characters);
        value["font"] = json!(node.font);
    }
    if !node.children.is_empty() {
        value["children"] = node
            .children
            .iter()
            .map(|&child| tree_value(inner, child))
            .collect();
    }
    value
}

fn unsupported(property: &NodeProperty, kind: NodeKind) -> HostError {
    HostError::Unsupported {
        operation: property.name().to_string(),
        kind: kind.to_string(),
    }
}

#[async_trait]
impl CanvasHost for MemoryCanvas {
    fn create_node(&self, kind: NodeKind) -> HostResult<NodeId> {
        let node = NodeData::new(kind);
        let id = node.id;
        self.write().nodes.insert(id, node);
        Ok(id)
    }

    fn append_child(&self, parent: Option<NodeId>, child: NodeId) -> HostResult<()> {
        let mut inner = self.write();
        inner.get(child)?;
        inner.require_container(parent)?;
        if let Some(parent) = parent {
            if inner.is_ancestor(child, Some(parent)) {
                return Err(HostError::InvalidValue(format!(
                    "cannot attach {child} inside its own subtree"
                )));
            }
        }
        inner.detach(child);
        inner.insert_into(parent, child, None);
        Ok(())
    }

    fn remove_node(&self, id: NodeId) -> HostResult<()> {
        let mut inner = self.write();
        inner.get(id)?;
        inner.detach(id);
        let removed = inner.subtree(id);
        for node in &removed {
            inner.nodes.remove(node);
        }
        inner.selection.retain(|n| !removed.contains(n));
        inner.components.retain(|_, n| !removed.contains(n));
        Ok(())
    }

    fn children(&self, parent: Option<NodeId>) -> HostResult<Vec<NodeId>> {
        let inner = self.read();
        match parent {
            Some(parent) => Ok(inner.get(parent)?.children.clone()),
            None => Ok(inner.page.clone()),
        }
    }

    fn parent(&self, id: NodeId) -> HostResult<Option<NodeId>> {
        Ok(self.read().get(id)?.parent)
    }

    fn node_kind(&self, id: NodeId) -> HostResult<NodeKind> {
        Ok(self.read().get(id)?.kind)
    }

    #[allow(clippy::too_many_lines)]
    fn set_property(&self, id: NodeId, property: NodeProperty) -> HostResult<()> {
        let mut inner = self.write();
        if inner.failing_properties.contains(property.name()) {
            return Err(HostError::Unavailable(format!(
                "{} rejected by host",
                property.name()
            )));
        }

        let (kind, font, parent) = {
            let node = inner.get(id)?;
            (node.kind, node.font.clone(), node.parent)
        };
        let parent_has_layout = parent
            .and_then(|p| inner.nodes.get(&p))
            .is_some_and(|p| p.auto_layout.is_some());
        let own_layout = inner.get(id)?.auto_layout.is_some();

        // Validation pass, before any mutation.
        match &property {
            NodeProperty::Opacity(value) if !(0.0..=1.0).contains(value) => {
                return Err(HostError::InvalidValue(format!("opacity {value}")));
            }
            NodeProperty::Fills(_) | NodeProperty::Strokes(_) | NodeProperty::CornerRadii(_)
                if kind == NodeKind::Group =>
            {
                return Err(unsupported(&property, kind));
            }
            NodeProperty::AutoLayout(_) if !kind.supports_auto_layout() => {
                return Err(unsupported(&property, kind));
            }
            NodeProperty::ClipsContent(_) if !kind.is_container() || kind == NodeKind::Group => {
                return Err(unsupported(&property, kind));
            }
            NodeProperty::PointCount(count) => {
                if !matches!(kind, NodeKind::Star | NodeKind::Polygon) {
                    return Err(unsupported(&property, kind));
                }
                if *count < 3 {
                    return Err(HostError::InvalidValue(format!("point count {count}")));
                }
            }
            NodeProperty::InnerRadius(_) if kind != NodeKind::Star => {
                return Err(unsupported(&property, kind));
            }
            NodeProperty::VectorPaths(_) if kind != NodeKind::Vector => {
                return Err(unsupported(&property, kind));
            }
            NodeProperty::Font(_)
            | NodeProperty::Characters(_)
            | NodeProperty::FontSize(_)
            | NodeProperty::LetterSpacing(_)
            | NodeProperty::LineHeight(_)
            | NodeProperty::TextAlign { .. }
            | NodeProperty::TextRange(_)
                if kind != NodeKind::Text =>
            {
                return Err(unsupported(&property, kind));
            }
            NodeProperty::Font(requested) => inner.require_font_loaded(requested)?,
            NodeProperty::Characters(_)
            | NodeProperty::FontSize(_)
            | NodeProperty::LetterSpacing(_)
            | NodeProperty::LineHeight(_) => {
                if let Some(font) = &font {
                    inner.require_font_loaded(font)?;
                }
            }
            NodeProperty::TextRange(range) => {
                if let Some(font) = range.font.as_ref().or(font.as_ref()) {
                    inner.require_font_loaded(font)?;
                }
                if range.start > range.end {
                    return Err(HostError::InvalidValue(format!(
                        "range {}..{}",
                        range.start, range.end
                    )));
                }
            }
            NodeProperty::LayoutSizing {
                horizontal,
                vertical,
            } => {
                for sizing in [horizontal, vertical].into_iter().flatten() {
                    match sizing {
                        LayoutSizing::Fill if !parent_has_layout => {
                            return Err(HostError::InvalidValue(
                                "FILL sizing requires an auto-layout parent".to_string(),
                            ));
                        }
                        LayoutSizing::Hug if !own_layout && kind != NodeKind::Text => {
                            return Err(HostError::InvalidValue(
                                "HUG sizing requires auto-layout or text".to_string(),
                            ));
                        }
                        _ => {}
                    }
                }
            }
            NodeProperty::ComponentKey(_) if kind != NodeKind::Component => {
                return Err(unsupported(&property, kind));
            }
            NodeProperty::ComponentProperties(_) if kind != NodeKind::Instance => {
                return Err(unsupported(&property, kind));
            }
            _ => {}
        }

        let node = inner.get_mut(id)?;
        match property {
            NodeProperty::Name(name) => node.name = name,
            NodeProperty::Visible(visible) => node.visible = visible,
            NodeProperty::Locked(locked) => node.locked = locked,
            NodeProperty::Opacity(opacity) => node.opacity = opacity,
            NodeProperty::Rotation(rotation) => node.rotation = rotation,
            NodeProperty::Position { x, y } => {
                node.x = x;
                node.y = y;
            }
            NodeProperty::Fills(fills) => node.fills = fills,
            NodeProperty::Strokes(strokes) => node.strokes = strokes,
            NodeProperty::StrokeWeight(weight) => node.stroke_weight = Some(weight),
            NodeProperty::StrokeAlign(align) => node.stroke_align = Some(align),
            NodeProperty::Effects(effects) => node.effects = effects,
            NodeProperty::CornerRadii(radii) => node.corner_radii = Some(radii),
            NodeProperty::AutoLayout(layout) => node.auto_layout = Some(layout),
            NodeProperty::ClipsContent(clips) => node.clips_content = clips,
            NodeProperty::LayoutSizing {
                horizontal,
                vertical,
            } => {
                if horizontal.is_some() {
                    node.sizing_horizontal = horizontal;
                }
                if vertical.is_some() {
                    node.sizing_vertical = vertical;
                }
            }
            NodeProperty::PointCount(count) => node.point_count = Some(count),
            NodeProperty::InnerRadius(radius) => node.inner_radius = Some(radius),
            NodeProperty::VectorPaths(paths) => node.vector_paths = paths,
            NodeProperty::Font(font) => node.font = Some(font),
            NodeProperty::Characters(characters) => node.characters = Some(characters),
            NodeProperty::FontSize(size) => node.font_size = Some(size),
            NodeProperty::LetterSpacing(spacing) => node.letter_spacing = Some(spacing),
            NodeProperty::LineHeight(height) => node.line_height = Some(height),
            NodeProperty::TextAlign {
                horizontal,
                vertical,
            } => {
                node.text_align_horizontal = horizontal;
                node.text_align_vertical = vertical;
            }
            NodeProperty::TextRange(range) => node.text_ranges.push(range),
            NodeProperty::ComponentKey(key) => node.component_key = Some(key),
            NodeProperty::ComponentProperties(props) => node.component_properties.extend(props),
        }
        Ok(())
    }

    fn resize(&self, id: NodeId, width: f32, height: f32) -> HostResult<()> {
        let mut inner = self.write();
        let node = inner.get_mut(id)?;
        if !node.kind.supports_resize() {
            return Err(HostError::Unsupported {
                operation: "resize".to_string(),
                kind: node.kind.to_string(),
            });
        }
        if width < MIN_DIMENSION || height < MIN_DIMENSION || !width.is_finite() || !height.is_finite()
        {
            return Err(HostError::InvalidValue(format!("size {width}x{height}")));
        }
        node.width = width;
        node.height = height;
        Ok(())
    }

    fn snapshot(&self, id: NodeId) -> HostResult<NodeSnapshot> {
        let inner = self.read();
        let node = inner.get(id)?;
        Ok(NodeSnapshot {
            name: node.name.clone(),
            opacity: node.opacity,
            visible: node.visible,
            locked: node.locked,
            rotation: node.rotation,
            x: node.x,
            y: node.y,
        })
    }

    fn group(
        &self,
        children: &[NodeId],
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> HostResult<NodeId> {
        let mut inner = self.write();
        if children.is_empty() {
            return Err(HostError::InvalidValue(
                "cannot group an empty selection".to_string(),
            ));
        }
        inner.require_container(parent)?;

        let mut boxes = Vec::with_capacity(children.len());
        for &child in children {
            boxes.push((child, inner.absolute_box(child)?));
        }
        let bounds = boxes
            .iter()
            .fold(None, |acc, (_, b)| Bounds::extend(acc, b))
            .ok_or_else(|| HostError::InvalidValue("no bounds".to_string()))?;
        let parent_origin = parent.map_or(Vector::ZERO, |p| inner.absolute_origin(p));

        let mut group = NodeData::new(NodeKind::Group);
        group.x = bounds.min_x - parent_origin.x;
        group.y = bounds.min_y - parent_origin.y;
        group.width = bounds.width();
        group.height = bounds.height();
        let group_id = group.id;
        inner.nodes.insert(group_id, group);

        for (child, absolute) in boxes {
            inner.detach(child);
            inner.insert_into(Some(group_id), child, None);
            let node = inner.get_mut(child)?;
            node.x = absolute.x - bounds.min_x;
            node.y = absolute.y - bounds.min_y;
        }
        inner.insert_into(parent, group_id, index);
        Ok(group_id)
    }

    fn create_instance(&self, component: NodeId) -> HostResult<NodeId> {
        let mut inner = self.write();
        let definition = inner.get(component)?;
        if definition.kind != NodeKind::Component {
            return Err(HostError::InvalidValue(format!(
                "{component} is not a component definition"
            )));
        }

        let mut root = definition.clone();
        root.id = NodeId::new();
        root.kind = NodeKind::Instance;
        root.component_key = None;
        root.main_component = Some(component);
        root.parent = None;
        let root_id = root.id;

        // Clone the definition's subtree breadth first, remapping ids.
        let mut pending: Vec<(NodeId, NodeId)> = Vec::new();
        let mut cloned_children = Vec::with_capacity(root.children.len());
        for &child in &root.children {
            let new_id = NodeId::new();
            pending.push((child, new_id));
            cloned_children.push(new_id);
        }
        root.children = cloned_children;
        inner.nodes.insert(root_id, root);

        let mut parents: HashMap<NodeId, NodeId> = pending
            .iter()
            .map(|&(_, new_id)| (new_id, root_id))
            .collect();
        while let Some((source, new_id)) = pending.pop() {
            let mut copy = inner.get(source)?.clone();
            copy.id = new_id;
            copy.parent = parents.get(&new_id).copied();
            let mut children = Vec::with_capacity(copy.children.len());
            for &child in &copy.children {
                let child_id = NodeId::new();
                parents.insert(child_id, new_id);
                pending.push((child, child_id));
                children.push(child_id);
            }
            copy.children = children;
            inner.nodes.insert(new_id, copy);
        }
        Ok(root_id)
    }

    fn focus(&self, nodes: &[NodeId]) -> HostResult<()> {
        let mut inner = self.write();
        let mut bounds = None;
        for &id in nodes {
            bounds = Bounds::extend(bounds, &inner.absolute_box(id)?);
        }
        inner.selection = nodes.to_vec();
        inner.viewport = bounds.map(|b| b.to_box());
        Ok(())
    }

    async fn font_available(&self, font: &FontName) -> HostResult<bool> {
        let inner = self.read();
        if inner.failing_font_families.contains(&font.family) {
            return Err(HostError::Unavailable(format!(
                "font query failed for {font}"
            )));
        }
        Ok(inner.available_fonts.contains(font))
    }

    async fn load_font(&self, font: &FontName) -> HostResult<()> {
        let mut inner = self.write();
        inner.font_loads.push(font.clone());
        if inner.flaky_font_loads.remove(font) {
            return Err(HostError::Unavailable(format!("font load failed for {font}")));
        }
        if !inner.available_fonts.contains(font) {
            return Err(HostError::FontNotFound(font.to_string()));
        }
        inner.loaded_fonts.insert(font.clone());
        tracing::trace!(font = %font, "font loaded");
        Ok(())
    }

    async fn find_component(&self, key: &str) -> HostResult<Option<NodeId>> {
        let inner = self.read();
        if inner.component_lookup_fails {
            return Err(HostError::Unavailable(format!(
                "component lookup failed for {key}"
            )));
        }
        Ok(inner.components.get(key).copied())
    }
}
