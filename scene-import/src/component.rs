//! Component and instance resolution.
//!
//! A record that references a component by key is instantiated from the
//! local definition when the host has one. The instance brings its own
//! subtree, so the record's JSON children are not walked and only the
//! position, base properties and explicit overrides are applied on top.
//! When the key is unknown, or looking it up fails, the caller builds a
//! plain frame instead and walks the children normally.

use scene_core::{CanvasHost, NodeId, NodeProperty, SceneRecord};

use crate::geometry::{self, ResolvedGeometry};
use crate::properties::{self, PropertyWriter};
use crate::report::{ImportIssue, IssueKind};

/// Whether `record` goes through component resolution at all.
#[must_use]
pub fn is_candidate(record: &SceneRecord) -> bool {
    record.is_component_like() && record.component_key().is_some()
}

/// Look up the record's component key and create a detached instance.
///
/// # Errors
///
/// Returns a [`IssueKind::ComponentKeyNotFound`] issue when the key has no
/// local definition, the lookup fails or the host cannot instantiate the
/// definition. The caller falls back to a plain frame.
pub async fn instantiate(
    host: &dyn CanvasHost,
    record: &SceneRecord,
) -> Result<NodeId, ImportIssue> {
    let key = record.component_key().unwrap_or_default();
    let not_found = |reason: Option<String>| {
        tracing::warn!(
            record_id = %record.id,
            key,
            reason = reason.as_deref().unwrap_or("no local definition"),
            "Component key not found, building a plain frame"
        );
        ImportIssue::new(
            record.id.clone(),
            IssueKind::ComponentKeyNotFound {
                key: key.to_string(),
                reason,
            },
        )
    };

    let definition = match host.find_component(key).await {
        Ok(Some(definition)) => definition,
        Ok(None) => return Err(not_found(None)),
        Err(e) => return Err(not_found(Some(e.to_string()))),
    };

    host.create_instance(definition)
        .map_err(|e| not_found(Some(e.to_string())))
}

/// Overlay a freshly attached instance: base properties, position and
/// `componentProperties`. Size and appearance come from the definition.
pub fn apply_overrides(
    writer: &mut PropertyWriter<'_>,
    record: &SceneRecord,
    geometry: &ResolvedGeometry,
) {
    properties::apply_base(writer, record);
    geometry::apply_position(writer, geometry);
    if let Some(overrides) = &record.component_properties {
        if !overrides.is_empty() {
            writer.set(NodeProperty::ComponentProperties(overrides.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_core::{tags, ComponentRef, MemoryCanvas, NodeKind};

    fn instance_record(key: &str) -> SceneRecord {
        let mut record = SceneRecord::new("i1", tags::INSTANCE);
        record.component_ref = Some(ComponentRef { key: key.into() });
        record
    }

    #[test]
    fn test_candidates() {
        assert!(is_candidate(&instance_record("k")));
        assert!(!is_candidate(&instance_record("")));

        let mut frame = SceneRecord::new("f", tags::FRAME);
        frame.component_key = Some("k".into());
        assert!(!is_candidate(&frame));
    }

    #[tokio::test]
    async fn test_found_definition_is_instantiated() {
        let canvas = MemoryCanvas::new();
        let definition = canvas.define_component("button", "Button");

        let node = instantiate(&canvas, &instance_record("button"))
            .await
            .expect("instantiated");

        let data = canvas.node(node).expect("node");
        assert_eq!(data.kind, NodeKind::Instance);
        assert_eq!(data.main_component, Some(definition));
    }

    #[tokio::test]
    async fn test_missing_key_reports_issue() {
        let canvas = MemoryCanvas::new();

        let issue = instantiate(&canvas, &instance_record("missing-key"))
            .await
            .expect_err("should fall back");

        assert_eq!(
            issue.kind,
            IssueKind::ComponentKeyNotFound {
                key: "missing-key".into(),
                reason: None
            }
        );
    }

    #[tokio::test]
    async fn test_failing_lookup_reports_reason() {
        let canvas = MemoryCanvas::new();
        canvas.define_component("button", "Button");
        canvas.fail_component_lookups();

        let issue = instantiate(&canvas, &instance_record("button"))
            .await
            .expect_err("should fall back");

        assert!(matches!(
            issue.kind,
            IssueKind::ComponentKeyNotFound {
                reason: Some(_),
                ..
            }
        ));
    }
}
