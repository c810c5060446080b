//! Paints, effects and corner radii.

use serde::{Deserialize, Serialize};

use crate::geometry::Vector;

/// RGBA color. Stored as 4 x f32 in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha, opaque when absent.
    #[serde(default = "Color::opaque")]
    pub a: f32,
}

impl Color {
    /// Create a color.
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    const fn opaque() -> f32 {
        1.0
    }
}

/// A gradient stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Offset along the gradient, `0.0..=1.0`.
    pub position: f32,
    /// Stop color.
    pub color: Color,
}

/// A fill or stroke paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    /// Paint type tag, e.g. `SOLID`, `GRADIENT_LINEAR`, `IMAGE`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Solid color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Paint opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Whether the paint is rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Gradient stops for gradient paints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gradient_stops: Vec<ColorStop>,
    /// Image hash for image paints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Blend mode tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<String>,
}

impl Paint {
    /// A visible solid paint.
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self {
            kind: "SOLID".to_string(),
            color: Some(color),
            opacity: None,
            visible: None,
            gradient_stops: Vec::new(),
            image_ref: None,
            blend_mode: None,
        }
    }

    /// Paints are visible unless explicitly hidden.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }
}

/// A shadow or blur effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    /// Effect type tag, e.g. `DROP_SHADOW`, `LAYER_BLUR`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the effect is rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Blur radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    /// Shadow spread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<f32>,
    /// Shadow color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Shadow offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Vector>,
}

/// Corner rounding of a rectangle-like node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CornerRadii {
    /// Same radius on every corner.
    Uniform {
        /// Radius in pixels.
        radius: f32,
    },
    /// Individual radii, clockwise from top-left.
    PerCorner {
        /// Top-left radius.
        top_left: f32,
        /// Top-right radius.
        top_right: f32,
        /// Bottom-right radius.
        bottom_right: f32,
        /// Bottom-left radius.
        bottom_left: f32,
    },
}

impl CornerRadii {
    /// Build from the wire's `[tl, tr, br, bl]` array.
    #[must_use]
    pub const fn from_array(radii: [f32; 4]) -> Self {
        let [top_left, top_right, bottom_right, bottom_left] = radii;
        Self::PerCorner {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }
}

/// One vector path of a vector node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorPath {
    /// `NONZERO` or `EVENODD`.
    #[serde(default = "VectorPath::default_winding_rule")]
    pub winding_rule: String,
    /// SVG path data.
    #[serde(alias = "path")]
    pub data: String,
}

impl VectorPath {
    fn default_winding_rule() -> String {
        "NONZERO".to_string()
    }
}
