//! Runs the CLI pipeline against documents on disk.

use std::io::Write;
use std::path::PathBuf;

use scene_cli::{render, run, CliConfig};
use scene_core::FontName;
use scene_import::ImportConfig;
use tempfile::NamedTempFile;

fn config_for(path: PathBuf, include_tree: bool) -> CliConfig {
    CliConfig {
        input: path,
        extra_fonts: vec![FontName::new("Lato", "Bold")],
        import: ImportConfig::default(),
        include_tree,
        pretty: false,
    }
}

fn document(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

#[tokio::test]
async fn test_report_output() {
    let file = document(
        r#"{"document": {"id": "0:0", "type": "DOCUMENT", "children": [
            {"id": "1:1", "type": "FRAME", "name": "Card",
             "absoluteBoundingBox": {"x": 0, "y": 0, "width": 200, "height": 100},
             "children": [
                {"id": "1:2", "type": "TEXT", "characters": "Title",
                 "style": {"fontFamily": "Lato", "fontWeight": 700}},
                {"id": "1:3", "type": "UNKNOWN_X"}
             ]}
        ]}}"#,
    );

    let output = run(&config_for(file.path().to_path_buf(), false))
        .await
        .expect("run");

    assert_eq!(output["summary"]["created"], 2);
    assert_eq!(output["summary"]["skipped"], 1);
    assert_eq!(output["roots"].as_array().map(Vec::len), Some(1));
    assert!(output["identity"]["1:2"].is_string());
    assert_eq!(output["viewport"]["width"], 200.0);
    let kinds: Vec<&str> = output["summary"]["issues"]
        .as_array()
        .expect("issues")
        .iter()
        .filter_map(|issue| issue["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"unknown_node_type"));
}

#[tokio::test]
async fn test_tree_output() {
    let file = document(
        r#"{"id": "g", "type": "GROUP", "children": [
            {"id": "a", "type": "RECTANGLE", "absoluteBoundingBox": {"x": 0, "y": 0, "width": 10, "height": 10}}
        ]}"#,
    );

    let output = run(&config_for(file.path().to_path_buf(), true))
        .await
        .expect("run");

    let tree = output["tree"].as_array().expect("tree");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["kind"], "GROUP");
    assert_eq!(output["report"]["summary"]["groups_converted"], 1);
    assert!(render(&output, true).expect("render").contains('\n'));
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = run(&config_for(dir.path().join("missing.json"), false)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_empty_document_is_an_error() {
    let file = document("[]");
    let error = run(&config_for(file.path().to_path_buf(), false))
        .await
        .expect_err("empty");
    assert!(format!("{error:#}").contains("Failed to import"));
}
