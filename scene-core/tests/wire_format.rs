//! Wire-format decoding of design-document records.

use scene_core::{tags, BoundingBox, FontName, SceneRecord};

#[test]
fn test_short_notation_aliases() {
    let record = SceneRecord::from_json(
        r#"{
            "id": "c1",
            "type": "RECTANGLE",
            "absoluteBox": {"x": 20, "y": 0, "w": 10, "h": 10},
            "fillGeometry": [{"windingRule": "EVENODD", "data": "M0 0 L1 1 Z"}],
            "unknownField": {"ignored": true}
        }"#,
    )
    .expect("decode");

    assert_eq!(
        record.absolute_bounding_box,
        Some(BoundingBox::new(20.0, 0.0, 10.0, 10.0))
    );
    assert_eq!(record.vector_paths.as_ref().map(|p| p.len()), Some(1));
}

#[test]
fn test_text_fonts() {
    let record = SceneRecord::from_json(
        r#"{
            "id": "t",
            "type": "TEXT",
            "characters": "Hello world",
            "style": {"fontFamily": "Inter", "fontWeight": 600, "italic": true, "fontSize": 14},
            "segments": [
                {"start": 0, "end": 5, "fontRef": {"family": "Roboto", "style": "Bold"}}
            ]
        }"#,
    )
    .expect("decode");

    assert!(record.is(tags::TEXT));
    assert_eq!(
        record.requested_font(),
        Some(FontName::new("Inter", "SemiBold Italic"))
    );
    assert_eq!(
        record.referenced_fonts(),
        vec![
            FontName::new("Inter", "SemiBold Italic"),
            FontName::new("Roboto", "Bold"),
        ]
    );
}

#[test]
fn test_component_key_forms() {
    let by_ref =
        SceneRecord::from_json(r#"{"type": "INSTANCE", "componentRef": {"key": "abc"}}"#)
            .expect("decode");
    let bare = SceneRecord::from_json(r#"{"type": "INSTANCE", "componentKey": "abc"}"#)
        .expect("decode");

    assert_eq!(by_ref.component_key(), Some("abc"));
    assert_eq!(bare.component_key(), Some("abc"));
    assert!(by_ref.is_instance());
    assert!(by_ref.id.is_empty());
}

#[test]
fn test_nested_children_count() {
    let record = SceneRecord::from_json(
        r#"{"id": "a", "type": "FRAME", "children": [
            {"id": "b", "type": "GROUP", "children": [{"id": "c", "type": "ELLIPSE"}]},
            {"id": "d", "type": "LINE"}
        ]}"#,
    )
    .expect("decode");

    assert_eq!(record.descendant_count(), 3);
    assert_eq!(record.label(), "a");
}
