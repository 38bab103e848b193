//! Integration tests for the published output layout

use crate::integration::test_utils::{build_config, write_file};
use serde_json::Value;
use std::fs;
use syllabus::error::BuildError;
use syllabus::manifest::VersionManifest;
use syllabus::publish::Publisher;
use syllabus::tree::TreeNode;
use tempfile::TempDir;

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_descriptor_fields_are_camel_case() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    write_file(ws, "content/universities/nub/index.md", "---\ntitle: North Uni\nsummary: Courses\n---\n");
    write_file(ws, "content/universities/nub/_collection_quiz/final.json", r#"{"title":"Final"}"#);
    write_file(ws, "content/universities/nub/intro_to-rust/index.md", "plain");

    let publisher = Publisher::new(build_config(ws));
    publisher.run().unwrap();

    let out = ws.join("docs/content-public/universities/nub");
    let meta = read_json(&out.join("meta.json"));
    assert_eq!(meta["label"], "North Uni");
    assert_eq!(meta["summary"], "Courses");
    assert_eq!(meta["hasIndex"], true);
    assert_eq!(meta["isBranch"], true);
    assert_eq!(meta["resources"]["collectionQuizzes"][0]["id"], "final");
    assert_eq!(meta["resources"]["collectionQuizzes"][0]["title"], "Final");
    assert!(meta["resources"].get("flashcardDecks").is_none());
    assert_eq!(meta["children"]["intro_to-rust"]["label"], "Intro To Rust");

    let child = read_json(&out.join("intro_to-rust/meta.json"));
    assert_eq!(child["isBranch"], false);
    assert!(child.get("children").is_none());
}

#[test]
fn test_manifest_matches_descriptors() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    write_file(ws, "content/universities/alpha/index.md", "a");
    write_file(ws, "content/universities/beta/index.md", "b");
    write_file(ws, "content/universities/beta/week_1/index.md", "w");

    let publisher = Publisher::new(build_config(ws));
    let report = publisher.run().unwrap();
    assert_eq!(report.node_count, 3);

    let manifest: VersionManifest =
        serde_json::from_str(&fs::read_to_string(ws.join("docs/version.json")).unwrap()).unwrap();
    assert_eq!(manifest.collection_ids().collect::<Vec<_>>(), vec!["alpha", "beta"]);
    for id in ["alpha", "beta"] {
        let meta: TreeNode = serde_json::from_str(
            &fs::read_to_string(ws.join(format!("docs/content-public/universities/{}/meta.json", id)))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.hash_of(id), Some(&meta.hash));
    }

    let raw = read_json(&ws.join("docs/version.json"));
    assert!(raw["generatedAt"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_unreadable_source_keeps_previous_publish() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    write_file(ws, "content/universities/nub/index.md", "v1");

    let publisher = Publisher::new(build_config(ws));
    publisher.run().unwrap();
    let manifest_before = fs::read_to_string(ws.join("docs/version.json")).unwrap();

    fs::remove_dir_all(ws.join("content/universities")).unwrap();
    let err = publisher.run().unwrap_err();
    assert!(matches!(err, BuildError::SourceRead { .. }));

    assert_eq!(fs::read_to_string(ws.join("docs/version.json")).unwrap(), manifest_before);
    assert!(ws.join("docs/content-public/universities/nub/meta.json").exists());
}

#[test]
fn test_assets_mirrored_next_to_descriptors() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    write_file(ws, "content/universities/nub/index.md", "idx");
    write_file(ws, "content/universities/nub/notes.md", "notes");
    write_file(ws, "content/universities/nub/diagram.png", "binary");
    write_file(ws, "content/universities/nub/_flashcards/deck.json", "{}");

    Publisher::new(build_config(ws)).run().unwrap();

    let out = ws.join("docs/content-public/universities/nub");
    assert!(out.join("index.md").exists());
    assert!(out.join("notes.md").exists());
    assert!(!out.join("diagram.png").exists());
    assert!(out.join("_flashcards/deck.json").exists());
}
