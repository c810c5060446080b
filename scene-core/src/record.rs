//! Scene record wire model.
//!
//! A [`SceneRecord`] is one node of a serialized design document: a
//! container, shape, text layer, vector or component reference, with its
//! children in paint order. Records are read-only input; unknown fields are
//! ignored and every field except `type` is optional.
//!
//! ## Example
//!
//! ```json
//! {
//!   "id": "1:2",
//!   "type": "FRAME",
//!   "name": "Card",
//!   "absoluteBoundingBox": { "x": 0, "y": 0, "width": 320, "height": 200 },
//!   "fills": [{ "type": "SOLID", "color": { "r": 1, "g": 1, "b": 1 } }],
//!   "children": [
//!     { "id": "1:3", "type": "TEXT", "characters": "Hello",
//!       "style": { "fontFamily": "Inter", "fontWeight": 700, "fontSize": 24 } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::font::{style_for_weight, FontName};
use crate::geometry::{AffineTransform, BoundingBox, Vector};
use crate::paint::{Effect, Paint, VectorPath};

/// Type tags with dedicated handling in the import pipeline.
pub mod tags {
    /// Placeholder-then-group record.
    pub const GROUP: &str = "GROUP";
    /// Generic container.
    pub const FRAME: &str = "FRAME";
    /// Text layer.
    pub const TEXT: &str = "TEXT";
    /// Component instance.
    pub const INSTANCE: &str = "INSTANCE";
    /// Component definition.
    pub const COMPONENT: &str = "COMPONENT";
    /// Set of component variants.
    pub const COMPONENT_SET: &str = "COMPONENT_SET";
    /// Document wrapper, unwrapped on input.
    pub const DOCUMENT: &str = "DOCUMENT";
    /// Canvas/page layer, unwrapped on input.
    pub const CANVAS: &str = "CANVAS";
    /// Alternative page tag, unwrapped on input.
    pub const PAGE: &str = "PAGE";
}

/// Reference to a reusable component by stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    /// Stable key of the component definition.
    pub key: String,
}

/// Document-level text style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    /// Font family.
    #[serde(default)]
    pub font_family: Option<String>,
    /// Face style name; derived from `font_weight` when absent.
    #[serde(default)]
    pub font_style: Option<String>,
    /// Numeric weight, 100..=900.
    #[serde(default)]
    pub font_weight: Option<f32>,
    /// Italic flag.
    #[serde(default)]
    pub italic: Option<bool>,
    /// Font size in pixels.
    #[serde(default)]
    pub font_size: Option<f32>,
    /// Letter spacing in pixels.
    #[serde(default)]
    pub letter_spacing: Option<f32>,
    /// Line height in pixels.
    #[serde(default)]
    pub line_height_px: Option<f32>,
    /// `LEFT`, `CENTER`, `RIGHT` or `JUSTIFIED`.
    #[serde(default)]
    pub text_align_horizontal: Option<String>,
    /// `TOP`, `CENTER` or `BOTTOM`.
    #[serde(default)]
    pub text_align_vertical: Option<String>,
}

impl TypeStyle {
    /// The font this style asks for, if it names a family.
    #[must_use]
    pub fn font_name(&self) -> Option<FontName> {
        let family = self.font_family.as_deref()?;
        let style = match (&self.font_style, self.font_weight) {
            (Some(style), _) => style.clone(),
            (None, Some(weight)) => style_for_weight(weight, self.italic.unwrap_or(false)),
            (None, None) if self.italic.unwrap_or(false) => "Italic".to_string(),
            (None, None) => crate::font::DEFAULT_STYLE.to_string(),
        };
        Some(FontName::new(family, style))
    }
}

/// Styling of a character range of a text record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSegment {
    /// First character index (inclusive).
    pub start: usize,
    /// Last character index (exclusive).
    pub end: usize,
    /// Font of the range.
    #[serde(default, alias = "fontRef")]
    pub font_name: Option<FontName>,
    /// Font size of the range.
    #[serde(default)]
    pub font_size: Option<f32>,
    /// Fills of the range.
    #[serde(default)]
    pub fills: Option<Vec<Paint>>,
}

/// One node of a serialized design document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    /// Original identity of the record.
    #[serde(default)]
    pub id: String,
    /// Type tag selecting the node factory.
    #[serde(rename = "type", default)]
    pub type_tag: String,
    /// Layer name.
    #[serde(default)]
    pub name: Option<String>,
    /// Visibility.
    #[serde(default)]
    pub visible: Option<bool>,
    /// Lock state.
    #[serde(default)]
    pub locked: Option<bool>,
    /// Layer opacity.
    #[serde(default)]
    pub opacity: Option<f32>,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: Option<f32>,

    /// Absolute bounding box (geometry encoding a).
    #[serde(default, alias = "absoluteBox")]
    pub absolute_bounding_box: Option<BoundingBox>,
    /// Parent-relative transform (geometry encoding b).
    #[serde(default)]
    pub relative_transform: Option<AffineTransform>,
    /// Size accompanying `relative_transform`.
    #[serde(default)]
    pub size: Option<Vector>,
    /// Explicit x (geometry encoding c).
    #[serde(default)]
    pub x: Option<f32>,
    /// Explicit y.
    #[serde(default)]
    pub y: Option<f32>,
    /// Explicit width.
    #[serde(default)]
    pub width: Option<f32>,
    /// Explicit height.
    #[serde(default)]
    pub height: Option<f32>,

    /// Fill paints.
    #[serde(default)]
    pub fills: Option<Vec<Paint>>,
    /// Stroke paints.
    #[serde(default)]
    pub strokes: Option<Vec<Paint>>,
    /// Stroke width.
    #[serde(default)]
    pub stroke_weight: Option<f32>,
    /// Stroke alignment tag.
    #[serde(default)]
    pub stroke_align: Option<String>,
    /// Shadows and blurs.
    #[serde(default)]
    pub effects: Option<Vec<Effect>>,
    /// Uniform corner radius.
    #[serde(default)]
    pub corner_radius: Option<f32>,
    /// Per-corner radii `[tl, tr, br, bl]`.
    #[serde(default)]
    pub rectangle_corner_radii: Option<[f32; 4]>,

    /// Text content.
    #[serde(default)]
    pub characters: Option<String>,
    /// Explicit font of a text record.
    #[serde(default, alias = "fontRef")]
    pub font_name: Option<FontName>,
    /// Text style.
    #[serde(default)]
    pub style: Option<TypeStyle>,
    /// Per-range text styling.
    #[serde(default, alias = "segments")]
    pub styled_text_segments: Vec<TextSegment>,

    /// Component reference.
    #[serde(default)]
    pub component_ref: Option<ComponentRef>,
    /// Bare component key, equivalent to `component_ref.key`.
    #[serde(default)]
    pub component_key: Option<String>,
    /// Overrides for a resolved instance.
    #[serde(default)]
    pub component_properties: Option<serde_json::Map<String, serde_json::Value>>,

    /// Auto-layout direction.
    #[serde(default)]
    pub layout_mode: Option<String>,
    /// Primary axis sizing mode.
    #[serde(default)]
    pub primary_axis_sizing_mode: Option<String>,
    /// Counter axis sizing mode.
    #[serde(default)]
    pub counter_axis_sizing_mode: Option<String>,
    /// Primary axis alignment.
    #[serde(default)]
    pub primary_axis_align_items: Option<String>,
    /// Counter axis alignment.
    #[serde(default)]
    pub counter_axis_align_items: Option<String>,
    /// Gap between auto-laid-out children.
    #[serde(default)]
    pub item_spacing: Option<f32>,
    /// Left padding.
    #[serde(default)]
    pub padding_left: Option<f32>,
    /// Right padding.
    #[serde(default)]
    pub padding_right: Option<f32>,
    /// Top padding.
    #[serde(default)]
    pub padding_top: Option<f32>,
    /// Bottom padding.
    #[serde(default)]
    pub padding_bottom: Option<f32>,
    /// Clip content to bounds.
    #[serde(default)]
    pub clips_content: Option<bool>,
    /// Horizontal sizing hint, applied after the node is final.
    #[serde(default)]
    pub layout_sizing_horizontal: Option<String>,
    /// Vertical sizing hint, applied after the node is final.
    #[serde(default)]
    pub layout_sizing_vertical: Option<String>,

    /// Point count of stars and polygons.
    #[serde(default)]
    pub point_count: Option<u32>,
    /// Inner radius ratio of stars.
    #[serde(default)]
    pub inner_radius: Option<f32>,
    /// Vector paths.
    #[serde(default, alias = "fillGeometry")]
    pub vector_paths: Option<Vec<VectorPath>>,

    /// Children in paint order.
    #[serde(default)]
    pub children: Vec<SceneRecord>,
}

impl Drop for SceneRecord {
    fn drop(&mut self) {
        // Flatten the subtree so arbitrarily deep documents drop without
        // recursing once per level.
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut record) = pending.pop() {
            pending.append(&mut record.children);
        }
    }
}

impl SceneRecord {
    /// Create a bare record of the given type.
    #[must_use]
    pub fn new(id: impl Into<String>, type_tag: impl Into<String>) -> Self {
        let mut record = Self::default();
        record.id = id.into();
        record.type_tag = type_tag.into();
        record
    }

    /// Parse a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or does not describe a record.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether the type tag equals `tag`, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.type_tag.eq_ignore_ascii_case(tag)
    }

    /// Whether this record is a component instance.
    #[must_use]
    pub fn is_instance(&self) -> bool {
        self.is(tags::INSTANCE)
    }

    /// Whether this record is an instance, component or component set.
    #[must_use]
    pub fn is_component_like(&self) -> bool {
        self.is(tags::INSTANCE) || self.is(tags::COMPONENT) || self.is(tags::COMPONENT_SET)
    }

    /// Stable component key, from `componentRef` or `componentKey`.
    #[must_use]
    pub fn component_key(&self) -> Option<&str> {
        self.component_ref
            .as_ref()
            .map(|r| r.key.as_str())
            .or(self.component_key.as_deref())
            .filter(|key| !key.is_empty())
    }

    /// The font the whole text node asks for.
    #[must_use]
    pub fn requested_font(&self) -> Option<FontName> {
        self.font_name
            .clone()
            .or_else(|| self.style.as_ref().and_then(TypeStyle::font_name))
    }

    /// Every font this record itself references (node font and segment fonts).
    #[must_use]
    pub fn referenced_fonts(&self) -> Vec<FontName> {
        let mut fonts: Vec<FontName> = self.requested_font().into_iter().collect();
        fonts.extend(
            self.styled_text_segments
                .iter()
                .filter_map(|segment| segment.font_name.clone()),
        );
        fonts
    }

    /// Number of records below this one.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&SceneRecord> = self.children.iter().collect();
        while let Some(record) = stack.pop() {
            count += 1;
            stack.extend(record.children.iter());
        }
        count
    }

    /// Display label for logs: the name if present, else the id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
