//! Property assignment with per-call failure isolation.
//!
//! Every host call for one node goes through a [`PropertyWriter`]. A failed
//! call is logged and recorded as an issue; the node keeps whatever was
//! already applied and the import moves on.

use scene_core::{
    CanvasHost, CornerRadii, LayoutSizing, NodeId, NodeProperty, SceneRecord,
};

use crate::report::ImportIssue;

/// Smallest rotation, in degrees, worth deriving from a transform.
const ROTATION_EPSILON: f32 = 0.01;

/// Applies properties to one live node, collecting failures.
pub struct PropertyWriter<'a> {
    host: &'a dyn CanvasHost,
    node: NodeId,
    record_id: &'a str,
    issues: Vec<ImportIssue>,
}

impl<'a> PropertyWriter<'a> {
    /// Create a writer for `node`, built from the record `record_id`.
    #[must_use]
    pub fn new(host: &'a dyn CanvasHost, node: NodeId, record_id: &'a str) -> Self {
        Self {
            host,
            node,
            record_id,
            issues: Vec::new(),
        }
    }

    /// The node being written.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The host the node lives on.
    #[must_use]
    pub fn host(&self) -> &'a dyn CanvasHost {
        self.host
    }

    /// Assign one property. Returns whether the host accepted it.
    pub fn set(&mut self, property: NodeProperty) -> bool {
        let name = property.name();
        match self.host.set_property(self.node, property) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    record_id = %self.record_id,
                    property = name,
                    error = %e,
                    "Host rejected property"
                );
                self.issues
                    .push(ImportIssue::host_failure(self.record_id, name, &e));
                false
            }
        }
    }

    /// Resize the node. Returns whether the host accepted it.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        match self.host.resize(self.node, width, height) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(record_id = %self.record_id, error = %e, "Resize failed");
                self.issues
                    .push(ImportIssue::host_failure(self.record_id, "resize", &e));
                false
            }
        }
    }

    /// Record an issue found while configuring the node.
    pub fn record(&mut self, issue: ImportIssue) {
        self.issues.push(issue);
    }

    /// Issues collected so far.
    #[must_use]
    pub fn issues(&self) -> &[ImportIssue] {
        &self.issues
    }

    /// Consume the writer, returning its issues.
    #[must_use]
    pub fn into_issues(self) -> Vec<ImportIssue> {
        self.issues
    }
}

/// Name, visibility, lock, opacity and rotation.
///
/// Rotation falls back to the one encoded by `relativeTransform`.
pub fn apply_base(writer: &mut PropertyWriter<'_>, record: &SceneRecord) {
    if let Some(name) = &record.name {
        writer.set(NodeProperty::Name(name.clone()));
    }
    if let Some(visible) = record.visible {
        writer.set(NodeProperty::Visible(visible));
    }
    if let Some(locked) = record.locked {
        writer.set(NodeProperty::Locked(locked));
    }
    if let Some(opacity) = record.opacity {
        writer.set(NodeProperty::Opacity(opacity.clamp(0.0, 1.0)));
    }

    let rotation = record.rotation.or_else(|| {
        record
            .relative_transform
            .map(|t| t.rotation_degrees())
            .filter(|r| r.abs() > ROTATION_EPSILON)
    });
    if let Some(rotation) = rotation {
        writer.set(NodeProperty::Rotation(rotation));
    }
}

/// Fills, strokes, effects and corner radii.
pub fn apply_appearance(writer: &mut PropertyWriter<'_>, record: &SceneRecord) {
    if let Some(fills) = &record.fills {
        writer.set(NodeProperty::Fills(fills.clone()));
    }
    if let Some(strokes) = &record.strokes {
        writer.set(NodeProperty::Strokes(strokes.clone()));
    }
    if let Some(weight) = record.stroke_weight {
        writer.set(NodeProperty::StrokeWeight(weight));
    }
    if let Some(align) = &record.stroke_align {
        writer.set(NodeProperty::StrokeAlign(align.clone()));
    }
    if let Some(effects) = &record.effects {
        writer.set(NodeProperty::Effects(effects.clone()));
    }

    let radii = match (record.rectangle_corner_radii, record.corner_radius) {
        (Some(radii), _) => Some(CornerRadii::from_array(radii)),
        (None, Some(radius)) if radius > 0.0 => Some(CornerRadii::Uniform { radius }),
        _ => None,
    };
    if let Some(radii) = radii {
        writer.set(NodeProperty::CornerRadii(radii));
    }
}

/// `layoutSizingHorizontal` / `layoutSizingVertical`, which only apply
/// once the node sits in its final parent.
pub fn apply_sizing_hints(writer: &mut PropertyWriter<'_>, record: &SceneRecord) {
    let horizontal = record
        .layout_sizing_horizontal
        .as_deref()
        .and_then(LayoutSizing::parse);
    let vertical = record
        .layout_sizing_vertical
        .as_deref()
        .and_then(LayoutSizing::parse);
    if horizontal.is_some() || vertical.is_some() {
        writer.set(NodeProperty::LayoutSizing {
            horizontal,
            vertical,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_core::{AffineTransform, MemoryCanvas, NodeKind, Paint, Color};

    fn node(canvas: &MemoryCanvas, kind: NodeKind) -> NodeId {
        let id = canvas.create_node(kind).expect("create");
        canvas.append_child(None, id).expect("attach");
        id
    }

    #[test]
    fn test_base_and_appearance() {
        let canvas = MemoryCanvas::new();
        let id = node(&canvas, NodeKind::Rectangle);
        let mut record = SceneRecord::new("r", "RECTANGLE");
        record.name = Some("Card".into());
        record.opacity = Some(1.5);
        record.fills = Some(vec![Paint::solid(Color::rgba(1.0, 0.0, 0.0, 1.0))]);
        record.corner_radius = Some(8.0);

        let mut writer = PropertyWriter::new(&canvas, id, &record.id);
        apply_base(&mut writer, &record);
        apply_appearance(&mut writer, &record);
        assert!(writer.issues().is_empty());

        let data = canvas.node(id).expect("node");
        assert_eq!(data.name, "Card");
        assert!((data.opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(data.fills.len(), 1);
        assert_eq!(data.corner_radii, Some(CornerRadii::Uniform { radius: 8.0 }));
    }

    #[test]
    fn test_rotation_from_transform() {
        let canvas = MemoryCanvas::new();
        let id = node(&canvas, NodeKind::Rectangle);
        let mut record = SceneRecord::new("r", "RECTANGLE");
        record.relative_transform = Some(AffineTransform([[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]]));

        let mut writer = PropertyWriter::new(&canvas, id, &record.id);
        apply_base(&mut writer, &record);

        let rotation = canvas.node(id).map(|n| n.rotation).unwrap_or_default();
        assert!((rotation - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_failures_are_isolated() {
        let canvas = MemoryCanvas::new();
        canvas.fail_property("fills");
        let id = node(&canvas, NodeKind::Rectangle);
        let mut record = SceneRecord::new("r", "RECTANGLE");
        record.fills = Some(Vec::new());
        record.stroke_weight = Some(2.0);

        let mut writer = PropertyWriter::new(&canvas, id, &record.id);
        apply_appearance(&mut writer, &record);

        let issues = writer.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind.code(), "host_operation_failure");
        assert_eq!(canvas.node(id).and_then(|n| n.stroke_weight), Some(2.0));
    }

    #[test]
    fn test_fill_hint_without_auto_layout_parent_is_reported() {
        let canvas = MemoryCanvas::new();
        let id = node(&canvas, NodeKind::Rectangle);
        let mut record = SceneRecord::new("r", "RECTANGLE");
        record.layout_sizing_horizontal = Some("FILL".into());

        let mut writer = PropertyWriter::new(&canvas, id, &record.id);
        apply_sizing_hints(&mut writer, &record);
        assert_eq!(writer.issues().len(), 1);
    }
}
