//! Font identities.

use serde::{Deserialize, Serialize};

/// Family used when nothing better is known.
pub const DEFAULT_FAMILY: &str = "Inter";

/// Style used when nothing better is known.
pub const DEFAULT_STYLE: &str = "Regular";

/// A (family, style) pair identifying one loadable font face.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontName {
    /// Font family, e.g. `Inter`.
    pub family: String,
    /// Face style, e.g. `Semi Bold Italic`.
    pub style: String,
}

impl FontName {
    /// Create a font name.
    #[must_use]
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

impl Default for FontName {
    fn default() -> Self {
        Self::new(DEFAULT_FAMILY, DEFAULT_STYLE)
    }
}

impl std::fmt::Display for FontName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

/// Map a numeric weight (100..=900) and italic flag to a face style name.
///
/// Weights are rounded to the nearest hundred. An italic regular face is
/// plain `Italic`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn style_for_weight(weight: f32, italic: bool) -> String {
    let bucket = ((weight / 100.0).round() as i32).clamp(1, 9);
    let base = match bucket {
        1 => "Thin",
        2 => "ExtraLight",
        3 => "Light",
        5 => "Medium",
        6 => "SemiBold",
        7 => "Bold",
        8 => "ExtraBold",
        9 => "Black",
        _ => DEFAULT_STYLE,
    };

    match (base, italic) {
        (DEFAULT_STYLE, true) => "Italic".to_string(),
        (base, true) => format!("{base} Italic"),
        (base, false) => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_for_weight() {
        assert_eq!(style_for_weight(400.0, false), "Regular");
        assert_eq!(style_for_weight(700.0, false), "Bold");
        assert_eq!(style_for_weight(640.0, false), "SemiBold");
        assert_eq!(style_for_weight(100.0, false), "Thin");
        assert_eq!(style_for_weight(950.0, false), "Black");
    }

    #[test]
    fn test_style_for_weight_italic() {
        assert_eq!(style_for_weight(400.0, true), "Italic");
        assert_eq!(style_for_weight(700.0, true), "Bold Italic");
    }

    #[test]
    fn test_default_font() {
        let font = FontName::default();
        assert_eq!(font.to_string(), "Inter Regular");
    }
}
