//! Live node vocabulary - the handles, kinds and properties a host canvas
//! understands.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::font::FontName;
use crate::paint::{CornerRadii, Effect, Paint, VectorPath};

/// Opaque handle to a live node on the host canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new unique node ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a node ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// Generic container, optionally auto-laid-out.
    Frame,
    /// Logical grouping without its own coordinate space or appearance.
    Group,
    /// Canvas section.
    Section,
    /// Rectangle shape.
    Rectangle,
    /// Ellipse shape.
    Ellipse,
    /// Straight line.
    Line,
    /// Star shape.
    Star,
    /// Regular polygon.
    Polygon,
    /// Free-form vector network.
    Vector,
    /// Text layer.
    Text,
    /// Reusable component definition.
    Component,
    /// Instance of a reusable component.
    Instance,
}

impl NodeKind {
    /// Whether nodes of this kind can hold children.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Self::Frame | Self::Group | Self::Section | Self::Component | Self::Instance
        )
    }

    /// Whether `resize` is meaningful for this kind.
    #[must_use]
    pub const fn supports_resize(self) -> bool {
        !matches!(self, Self::Group)
    }

    /// Whether nodes of this kind can carry auto-layout settings.
    #[must_use]
    pub const fn supports_auto_layout(self) -> bool {
        matches!(self, Self::Frame | Self::Component | Self::Instance)
    }

    /// Display name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frame => "FRAME",
            Self::Group => "GROUP",
            Self::Section => "SECTION",
            Self::Rectangle => "RECTANGLE",
            Self::Ellipse => "ELLIPSE",
            Self::Line => "LINE",
            Self::Star => "STAR",
            Self::Polygon => "POLYGON",
            Self::Vector => "VECTOR",
            Self::Text => "TEXT",
            Self::Component => "COMPONENT",
            Self::Instance => "INSTANCE",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auto-layout settings of a container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoLayout {
    /// `HORIZONTAL` or `VERTICAL`.
    pub mode: String,
    /// Gap between children along the primary axis.
    pub item_spacing: f32,
    /// Padding, clockwise from left: left, right, top, bottom.
    pub padding: [f32; 4],
    /// `FIXED` or `AUTO` along the primary axis.
    pub primary_axis_sizing: Option<String>,
    /// `FIXED` or `AUTO` along the counter axis.
    pub counter_axis_sizing: Option<String>,
    /// Primary axis alignment.
    pub primary_axis_align: Option<String>,
    /// Counter axis alignment.
    pub counter_axis_align: Option<String>,
}

/// How a node sizes itself inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutSizing {
    /// Fixed size.
    Fixed,
    /// Shrink to content.
    Hug,
    /// Stretch to fill the auto-layout parent.
    Fill,
}

impl LayoutSizing {
    /// Parse a wire tag, ignoring case.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "FIXED" => Some(Self::Fixed),
            "HUG" => Some(Self::Hug),
            "FILL" => Some(Self::Fill),
            _ => None,
        }
    }
}

/// Styling applied to a character range of a text node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRangeStyle {
    /// First character index (inclusive).
    pub start: usize,
    /// Last character index (exclusive).
    pub end: usize,
    /// Font for the range.
    pub font: Option<FontName>,
    /// Font size for the range.
    pub font_size: Option<f32>,
    /// Fills for the range.
    pub fills: Option<Vec<Paint>>,
}

/// A single property assignment on a live node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "snake_case")]
pub enum NodeProperty {
    /// Layer name.
    Name(String),
    /// Visibility.
    Visible(bool),
    /// Lock state.
    Locked(bool),
    /// Layer opacity.
    Opacity(f32),
    /// Rotation in degrees.
    Rotation(f32),
    /// Parent-relative position.
    Position {
        /// X offset from the parent origin.
        x: f32,
        /// Y offset from the parent origin.
        y: f32,
    },
    /// Fill paints.
    Fills(Vec<Paint>),
    /// Stroke paints.
    Strokes(Vec<Paint>),
    /// Stroke width.
    StrokeWeight(f32),
    /// `INSIDE`, `OUTSIDE` or `CENTER`.
    StrokeAlign(String),
    /// Shadows and blurs.
    Effects(Vec<Effect>),
    /// Corner rounding.
    CornerRadii(CornerRadii),
    /// Auto-layout settings.
    AutoLayout(AutoLayout),
    /// Whether content outside the bounds is clipped.
    ClipsContent(bool),
    /// Sizing behaviour inside the parent.
    LayoutSizing {
        /// Horizontal sizing.
        horizontal: Option<LayoutSizing>,
        /// Vertical sizing.
        vertical: Option<LayoutSizing>,
    },
    /// Number of points of a star or polygon.
    PointCount(u32),
    /// Inner radius ratio of a star.
    InnerRadius(f32),
    /// Paths of a vector node.
    VectorPaths(Vec<VectorPath>),
    /// Font of a whole text node.
    Font(FontName),
    /// Text content.
    Characters(String),
    /// Font size of a whole text node.
    FontSize(f32),
    /// Letter spacing in pixels.
    LetterSpacing(f32),
    /// Line height in pixels.
    LineHeight(f32),
    /// Text alignment.
    TextAlign {
        /// Horizontal alignment tag.
        horizontal: Option<String>,
        /// Vertical alignment tag.
        vertical: Option<String>,
    },
    /// Styling for a character range.
    TextRange(TextRangeStyle),
    /// Stable key of a component definition.
    ComponentKey(String),
    /// Property overrides of a component instance.
    ComponentProperties(serde_json::Map<String, serde_json::Value>),
}

impl NodeProperty {
    /// Short name of the property, used in logs and failure reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Visible(_) => "visible",
            Self::Locked(_) => "locked",
            Self::Opacity(_) => "opacity",
            Self::Rotation(_) => "rotation",
            Self::Position { .. } => "position",
            Self::Fills(_) => "fills",
            Self::Strokes(_) => "strokes",
            Self::StrokeWeight(_) => "stroke_weight",
            Self::StrokeAlign(_) => "stroke_align",
            Self::Effects(_) => "effects",
            Self::CornerRadii(_) => "corner_radii",
            Self::AutoLayout(_) => "auto_layout",
            Self::ClipsContent(_) => "clips_content",
            Self::LayoutSizing { .. } => "layout_sizing",
            Self::PointCount(_) => "point_count",
            Self::InnerRadius(_) => "inner_radius",
            Self::VectorPaths(_) => "vector_paths",
            Self::Font(_) => "font",
            Self::Characters(_) => "characters",
            Self::FontSize(_) => "font_size",
            Self::LetterSpacing(_) => "letter_spacing",
            Self::LineHeight(_) => "line_height",
            Self::TextAlign { .. } => "text_align",
            Self::TextRange(_) => "text_range",
            Self::ComponentKey(_) => "component_key",
            Self::ComponentProperties(_) => "component_properties",
        }
    }
}

/// The properties a group conversion carries over from its placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Layer name.
    pub name: String,
    /// Layer opacity.
    pub opacity: f32,
    /// Visibility.
    pub visible: bool,
    /// Lock state.
    pub locked: bool,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Parent-relative x.
    pub x: f32,
    /// Parent-relative y.
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_roundtrip() {
        let id = NodeId::new();
        let parsed = NodeId::parse(&id.to_string()).expect("should parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_kind_capabilities() {
        assert!(NodeKind::Frame.is_container());
        assert!(!NodeKind::Rectangle.is_container());
        assert!(!NodeKind::Group.supports_resize());
        assert!(NodeKind::Text.supports_resize());
        assert!(!NodeKind::Text.supports_auto_layout());
    }

    #[test]
    fn test_layout_sizing_parse() {
        assert_eq!(LayoutSizing::parse("hug"), Some(LayoutSizing::Hug));
        assert_eq!(LayoutSizing::parse("FILL"), Some(LayoutSizing::Fill));
        assert_eq!(LayoutSizing::parse("STRETCH"), None);
    }

    #[test]
    fn test_property_names() {
        assert_eq!(NodeProperty::Opacity(0.5).name(), "opacity");
        assert_eq!(NodeProperty::Position { x: 0.0, y: 0.0 }.name(), "position");
    }
}
