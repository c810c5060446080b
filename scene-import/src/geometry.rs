//! Geometry resolution.
//!
//! Records carry position and size in one of three encodings, tried in
//! order:
//!
//! 1. `absoluteBoundingBox`: absolute box, made parent-relative by
//!    subtracting the parent origin. Instances that also carry a
//!    `relativeTransform` use its translation as-is.
//! 2. `relativeTransform` (+ `size`): parent-local translation.
//! 3. `x`/`y`/`width`/`height`: explicit values, 100x100 at (0, 0) when
//!    absent.
//!
//! The origin of a node is the absolute position its children are
//! resolved against. For page-level roots the parent origin is the global
//! minimum over every box in the input.

use scene_core::{Bounds, NodeKind, NodeProperty, SceneRecord, Vector};
use serde::Serialize;

use crate::properties::PropertyWriter;

/// Size used for missing dimensions.
pub const DEFAULT_SIZE: f32 = 100.0;

/// Smallest size applied to a node.
pub const MIN_SIZE: f32 = 1.0;

/// Which encoding produced a [`ResolvedGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometrySource {
    /// `absoluteBoundingBox`.
    AbsoluteBox,
    /// `relativeTransform`.
    RelativeTransform,
    /// Explicit `x`/`y`/`width`/`height`.
    Explicit,
    /// Nothing usable; defaults applied.
    Default,
}

/// Parent-relative placement of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedGeometry {
    /// Parent-relative x.
    pub x: f32,
    /// Parent-relative y.
    pub y: f32,
    /// Width, at least [`MIN_SIZE`].
    pub width: f32,
    /// Height, at least [`MIN_SIZE`].
    pub height: f32,
    /// Absolute origin handed to children as their parent origin.
    pub origin: Vector,
    /// Encoding used.
    pub source: GeometrySource,
}

/// Resolve a record's placement relative to `parent_origin`.
#[must_use]
pub fn resolve(record: &SceneRecord, parent_origin: Vector) -> ResolvedGeometry {
    if let Some(bbox) = record.absolute_bounding_box {
        let origin = Vector::new(bbox.x, bbox.y);
        let position = match record.relative_transform {
            Some(transform) if record.is_instance() => transform.translation(),
            _ => Vector::new(bbox.x - parent_origin.x, bbox.y - parent_origin.y),
        };
        return ResolvedGeometry {
            x: position.x,
            y: position.y,
            width: bbox.width.max(MIN_SIZE),
            height: bbox.height.max(MIN_SIZE),
            origin,
            source: GeometrySource::AbsoluteBox,
        };
    }

    if let Some(transform) = record.relative_transform {
        let position = transform.translation();
        let (width, height) = match record.size {
            Some(size) => (size.x, size.y),
            None => (
                record.width.unwrap_or(DEFAULT_SIZE),
                record.height.unwrap_or(DEFAULT_SIZE),
            ),
        };
        return ResolvedGeometry {
            x: position.x,
            y: position.y,
            width: width.max(MIN_SIZE),
            height: height.max(MIN_SIZE),
            origin: Vector::new(parent_origin.x + position.x, parent_origin.y + position.y),
            source: GeometrySource::RelativeTransform,
        };
    }

    let explicit = record.x.is_some()
        || record.y.is_some()
        || record.width.is_some()
        || record.height.is_some();
    let x = record.x.unwrap_or(0.0);
    let y = record.y.unwrap_or(0.0);
    ResolvedGeometry {
        x,
        y,
        width: record.width.unwrap_or(DEFAULT_SIZE).max(MIN_SIZE),
        height: record.height.unwrap_or(DEFAULT_SIZE).max(MIN_SIZE),
        origin: Vector::new(parent_origin.x + x, parent_origin.y + y),
        source: if explicit {
            GeometrySource::Explicit
        } else {
            GeometrySource::Default
        },
    }
}

/// Apply resolved geometry: size first when the kind can be resized, then
/// position.
pub fn apply(writer: &mut PropertyWriter<'_>, kind: NodeKind, geometry: &ResolvedGeometry) {
    if kind.supports_resize() {
        writer.resize(geometry.width, geometry.height);
    }
    apply_position(writer, geometry);
}

/// Apply only the position of resolved geometry.
pub fn apply_position(writer: &mut PropertyWriter<'_>, geometry: &ResolvedGeometry) {
    writer.set(NodeProperty::Position {
        x: geometry.x,
        y: geometry.y,
    });
}

/// Union of every absolute box in the subtree of `record`.
#[must_use]
pub fn subtree_bounds(record: &SceneRecord) -> Option<Bounds> {
    let mut bounds = None;
    let mut stack = vec![record];
    while let Some(current) = stack.pop() {
        if let Some(bbox) = &current.absolute_bounding_box {
            bounds = Bounds::extend(bounds, bbox);
        }
        stack.extend(current.children.iter());
    }
    bounds
}

/// Global minimum over every absolute box of every root, or the origin.
#[must_use]
pub fn global_origin<'a>(roots: impl IntoIterator<Item = &'a SceneRecord>) -> Vector {
    roots
        .into_iter()
        .filter_map(subtree_bounds)
        .reduce(|a, b| a.union(&b))
        .map_or(Vector::ZERO, |b| b.min())
}
