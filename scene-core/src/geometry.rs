//! Geometry encodings carried by scene records.

use serde::{Deserialize, Serialize};

/// A 2D vector, also used for points and sizes (`size: {x, y}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vector {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An absolute, axis-aligned bounding box in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    #[serde(alias = "w")]
    pub width: f32,
    /// Height in pixels.
    #[serde(alias = "h")]
    pub height: f32,
}

impl BoundingBox {
    /// Create a bounding box.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A 2x3 affine matrix `[[a, b, tx], [c, d, ty]]` positioning a node
/// relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform(pub [[f32; 3]; 2]);

impl AffineTransform {
    /// Pure translation.
    #[must_use]
    pub const fn translate(x: f32, y: f32) -> Self {
        Self([[1.0, 0.0, x], [0.0, 1.0, y]])
    }

    /// The translation component, i.e. the parent-local position.
    #[must_use]
    pub const fn translation(&self) -> Vector {
        Vector::new(self.0[0][2], self.0[1][2])
    }

    /// Rotation encoded by the matrix, in degrees (counter-clockwise).
    #[must_use]
    pub fn rotation_degrees(&self) -> f32 {
        let [[a, _, _], [c, _, _]] = self.0;
        -c.atan2(a).to_degrees()
    }
}

/// Min/max accumulator over absolute boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest x seen.
    pub min_x: f32,
    /// Smallest y seen.
    pub min_y: f32,
    /// Largest right edge seen.
    pub max_x: f32,
    /// Largest bottom edge seen.
    pub max_y: f32,
}

impl Bounds {
    /// Bounds covering exactly one box.
    #[must_use]
    pub fn from_box(b: &BoundingBox) -> Self {
        Self {
            min_x: b.x,
            min_y: b.y,
            max_x: b.x + b.width,
            max_y: b.y + b.height,
        }
    }

    /// Grow to include another box.
    pub fn include(&mut self, b: &BoundingBox) {
        *self = self.union(&Self::from_box(b));
    }

    /// Smallest bounds covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Fold an optional accumulator with a new box.
    #[must_use]
    pub fn extend(acc: Option<Self>, b: &BoundingBox) -> Option<Self> {
        Some(match acc {
            Some(mut bounds) => {
                bounds.include(b);
                bounds
            }
            None => Self::from_box(b),
        })
    }

    /// Top-left corner.
    #[must_use]
    pub const fn min(&self) -> Vector {
        Vector::new(self.min_x, self.min_y)
    }

    /// Width of the covered region.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Height of the covered region.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// The covered region as a box.
    #[must_use]
    pub fn to_box(&self) -> BoundingBox {
        BoundingBox::new(self.min_x, self.min_y, self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_union() {
        let mut bounds = Bounds::from_box(&BoundingBox::new(100.0, 100.0, 50.0, 50.0));
        bounds.include(&BoundingBox::new(200.0, 80.0, 10.0, 10.0));

        assert_eq!(bounds.min(), Vector::new(100.0, 80.0));
        assert!((bounds.width() - 110.0).abs() < f32::EPSILON);
        assert!((bounds.height() - 70.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extend_from_empty() {
        let bounds = Bounds::extend(None, &BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(
            bounds.map(|b| b.to_box()),
            Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0))
        );
    }

    #[test]
    fn test_transform_translation() {
        let t = AffineTransform::translate(12.0, -4.0);
        assert_eq!(t.translation(), Vector::new(12.0, -4.0));
        assert!(t.rotation_degrees().abs() < f32::EPSILON);
    }

    #[test]
    fn test_transform_rotation() {
        // 90 degrees counter-clockwise: a = cos, c = -sin
        let t = AffineTransform([[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]]);
        assert!((t.rotation_degrees() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_parse_short_box() {
        let b: BoundingBox =
            serde_json::from_str(r#"{"x": 1, "y": 2, "w": 3, "h": 4}"#).expect("should parse");
        assert_eq!(b, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    }
}
