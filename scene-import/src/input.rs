//! Top-level input unwrapping.
//!
//! Accepted shapes, unwrapped until records remain:
//!
//! - a single record, or an array of records
//! - `{"document": ...}`
//! - `{"nodes": {"<id>": {"document": ...}}}`
//! - an object with `children` but no `type`
//! - `DOCUMENT`, `CANVAS` and `PAGE` records, whose children are the content
//!
//! Records are read one node at a time from an explicit worklist, so
//! document depth is bounded by memory rather than the call stack, and a
//! malformed node only costs its own subtree.

use scene_core::{tags, SceneRecord};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ImportError, ImportResult};
use crate::report::{ImportIssue, IssueKind};

/// A value that could not be read as a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    /// Why it was skipped.
    pub issue: ImportIssue,
    /// Records below it that were lost with it.
    pub dropped: usize,
}

/// Records found in the input, in document order.
#[derive(Debug, Default)]
pub struct Roots {
    /// Top-level content records.
    pub records: Vec<SceneRecord>,
    /// Values that looked like records but could not be read.
    pub skipped: Vec<Skipped>,
}

/// Parse JSON text and unwrap it into top-level records.
///
/// Nesting depth is not limited.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] for invalid JSON and
/// [`ImportError::RootNotFound`] when no record is found.
pub fn parse_roots(json: &str) -> ImportResult<Roots> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;

    let roots = collect_roots(&value);
    dispose(value);
    roots
}

/// Unwrap a JSON value into top-level records.
///
/// # Errors
///
/// Returns [`ImportError::RootNotFound`] when no record is found.
pub fn collect_roots(value: &Value) -> ImportResult<Roots> {
    let mut roots = Roots::default();
    let mut stack = vec![value];

    while let Some(value) = stack.pop() {
        match value {
            Value::Array(items) => stack.extend(items.iter().rev()),
            Value::Object(map) => {
                let type_tag = map.get("type").and_then(Value::as_str);
                match type_tag {
                    Some(tag) if is_wrapper_tag(tag) => {
                        if let Some(children) = map.get("children") {
                            stack.push(children);
                        }
                    }
                    Some(_) => {
                        if let Some(record) = read_tree(value, &mut roots.skipped) {
                            roots.records.push(record);
                        }
                    }
                    None => {
                        if let Some(document) = map.get("document") {
                            stack.push(document);
                        } else if let Some(Value::Object(nodes)) = map.get("nodes") {
                            let entries: Vec<&Value> = nodes
                                .values()
                                .map(|entry| entry.get("document").unwrap_or(entry))
                                .collect();
                            stack.extend(entries.into_iter().rev());
                        } else if let Some(children) = map.get("children") {
                            stack.push(children);
                        } else {
                            roots.skipped.push(skip(value, "object has no type"));
                        }
                    }
                }
            }
            Value::Null => {}
            other => roots.skipped.push(skip(other, "not an object")),
        }
    }

    if roots.records.is_empty() {
        let reason = if roots.skipped.is_empty() {
            "input holds no records".to_string()
        } else {
            format!("{} unreadable values and no records", roots.skipped.len())
        };
        return Err(ImportError::RootNotFound(reason));
    }
    Ok(roots)
}

fn is_wrapper_tag(tag: &str) -> bool {
    [tags::DOCUMENT, tags::CANVAS, tags::PAGE]
        .iter()
        .any(|wrapper| wrapper.eq_ignore_ascii_case(tag))
}

/// Read a record and its subtree. Malformed nodes are skipped with their
/// descendants; `None` when the root itself is malformed.
fn read_tree(root: &Value, skipped: &mut Vec<Skipped>) -> Option<SceneRecord> {
    // Pre-order: every parent sits before its children.
    let mut read: Vec<(SceneRecord, Option<usize>)> = Vec::new();
    let mut stack: Vec<(&Value, Option<usize>)> = vec![(root, None)];

    while let Some((value, parent)) = stack.pop() {
        match read_node(value) {
            Ok((record, children)) => {
                let index = read.len();
                read.push((record, parent));
                stack.extend(children.iter().rev().map(|child| (child, Some(index))));
            }
            Err(message) => {
                let dropped = descendant_values(value);
                tracing::warn!(
                    record_id = value.get("id").and_then(serde_json::Value::as_str).unwrap_or_default(),
                    error = %message,
                    dropped,
                    "Skipping unreadable record"
                );
                skipped.push(Skipped {
                    issue: invalid(value, message),
                    dropped,
                });
            }
        }
    }

    // Fold back to front; a node's children are all attached by the time
    // it is moved into its own parent.
    let mut tree = None;
    while let Some((mut record, parent)) = read.pop() {
        record.children.reverse();
        match parent.and_then(|p| read.get_mut(p)) {
            Some((parent, _)) => parent.children.push(record),
            None => tree = Some(record),
        }
    }
    tree
}

/// One node's own fields, and its raw children.
fn read_node(value: &Value) -> Result<(SceneRecord, &[Value]), String> {
    let Value::Object(map) = value else {
        return Err("record is not an object".to_string());
    };
    let children: &[Value] = match map.get("children") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(_) => return Err("children is not an array".to_string()),
    };
    let fields: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| key.as_str() != "children")
        .map(|(key, field)| (key.clone(), field.clone()))
        .collect();
    let record = serde_json::from_value(Value::Object(fields)).map_err(|e| e.to_string())?;
    Ok((record, children))
}

fn children_of(value: &Value) -> &[Value] {
    value
        .get("children")
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

fn descendant_values(value: &Value) -> usize {
    let mut count = 0;
    let mut stack: Vec<&Value> = children_of(value).iter().collect();
    while let Some(current) = stack.pop() {
        count += 1;
        stack.extend(children_of(current));
    }
    count
}

/// Drop a parsed document without recursing once per level.
fn dispose(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(map) => pending.extend(map.into_iter().map(|(_, field)| field)),
            _ => {}
        }
    }
}

fn skip(value: &Value, message: &str) -> Skipped {
    Skipped {
        issue: invalid(value, message.to_string()),
        dropped: 0,
    }
}

fn invalid(value: &Value, message: String) -> ImportIssue {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default();
    ImportIssue::new(id, IssueKind::InvalidRecord { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(roots: &Roots) -> Vec<&str> {
        roots.records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_single_record() {
        let roots = collect_roots(&json!({"id": "r1", "type": "TEXT"})).expect("roots");
        assert_eq!(ids(&roots), vec!["r1"]);
    }

    #[test]
    fn test_array_keeps_order() {
        let roots = collect_roots(&json!([
            {"id": "a", "type": "FRAME"},
            {"id": "b", "type": "RECTANGLE"},
            {"id": "c", "type": "TEXT"}
        ]))
        .expect("roots");
        assert_eq!(ids(&roots), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_children_keep_order() {
        let roots = collect_roots(&json!({"id": "root", "type": "FRAME", "children": [
            {"id": "a", "type": "FRAME", "children": [
                {"id": "a1", "type": "RECTANGLE"},
                {"id": "a2", "type": "RECTANGLE"}
            ]},
            {"id": "b", "type": "TEXT"},
            {"id": "c", "type": "ELLIPSE"}
        ]}))
        .expect("roots");

        let root = &roots.records[0];
        let children: Vec<&str> = root.children.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(children, vec!["a", "b", "c"]);
        let nested: Vec<&str> = root.children[0]
            .children
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(nested, vec!["a1", "a2"]);
        assert_eq!(root.descendant_count(), 5);
    }

    #[test]
    fn test_document_wrapper() {
        let roots = collect_roots(&json!({
            "name": "File",
            "document": {
                "id": "0:0",
                "type": "DOCUMENT",
                "children": [{
                    "id": "0:1",
                    "type": "CANVAS",
                    "children": [
                        {"id": "1:1", "type": "FRAME"},
                        {"id": "1:2", "type": "FRAME"}
                    ]
                }]
            }
        }))
        .expect("roots");
        assert_eq!(ids(&roots), vec!["1:1", "1:2"]);
    }

    #[test]
    fn test_nodes_wrapper() {
        let roots = collect_roots(&json!({
            "nodes": {
                "1:1": {"document": {"id": "1:1", "type": "FRAME"}},
                "1:2": {"document": {"id": "1:2", "type": "GROUP"}}
            }
        }))
        .expect("roots");
        assert_eq!(roots.records.len(), 2);
    }

    #[test]
    fn test_children_without_type() {
        let roots = collect_roots(&json!({
            "children": [{"id": "a", "type": "FRAME"}]
        }))
        .expect("roots");
        assert_eq!(ids(&roots), vec!["a"]);
    }

    #[test]
    fn test_unreadable_entries_are_reported() {
        let roots = collect_roots(&json!([
            {"id": "a", "type": "FRAME"},
            {"id": "bad", "type": "FRAME", "children": "nope"},
            42
        ]))
        .expect("roots");
        assert_eq!(ids(&roots), vec!["a"]);
        assert_eq!(roots.skipped.len(), 2);
        assert_eq!(roots.skipped[0].issue.record_id, "bad");
    }

    #[test]
    fn test_malformed_node_drops_only_its_subtree() {
        let roots = collect_roots(&json!({"id": "root", "type": "FRAME", "children": [
            {"id": "ok1", "type": "RECTANGLE"},
            {"id": "ok2", "type": "FRAME", "children": [
                {"id": "bad", "type": "FRAME", "opacity": "0.5", "children": [
                    {"id": "lost", "type": "RECTANGLE"}
                ]},
                {"id": "ok3", "type": "ELLIPSE"}
            ]}
        ]}))
        .expect("roots");

        let root = &roots.records[0];
        assert_eq!(root.descendant_count(), 3);
        let kept: Vec<&str> = root.children[1]
            .children
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(kept, vec!["ok3"]);

        assert_eq!(roots.skipped.len(), 1);
        assert_eq!(roots.skipped[0].issue.record_id, "bad");
        assert_eq!(roots.skipped[0].dropped, 1);
    }

    #[test]
    fn test_deep_document_parses() {
        let depth = 5_000;
        let mut json = String::new();
        for i in 0..depth {
            json.push_str(&format!(r#"{{"id": "{i}", "type": "FRAME", "children": ["#));
        }
        json.push_str(r#"{"id": "leaf", "type": "RECTANGLE"}"#);
        json.push_str(&"]}".repeat(depth));

        let roots = parse_roots(&json).expect("roots");
        assert_eq!(roots.records[0].descendant_count(), depth);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matches!(
            collect_roots(&json!([])),
            Err(ImportError::RootNotFound(_))
        ));
        assert!(matches!(
            collect_roots(&json!({"type": "DOCUMENT", "children": []})),
            Err(ImportError::RootNotFound(_))
        ));
        assert!(matches!(parse_roots("{ invalid"), Err(ImportError::Parse(_))));
        assert!(matches!(parse_roots("[] trailing"), Err(ImportError::Parse(_))));
    }
}
