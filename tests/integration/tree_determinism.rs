//! Integration tests for tree building determinism

use crate::integration::test_utils::write_file;
use syllabus::tree::hasher::{aggregate_hashes, compute_leaf_hash};
use syllabus::tree::TreeBuilder;
use tempfile::TempDir;

fn blake3_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Test that the same tree produces the same root hash
#[test]
fn test_same_tree_same_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("course");
    write_file(&root, "index.md", "---\ntitle: Course\n---\nbody");
    write_file(&root, "week_1/index.md", "week one");
    write_file(&root, "week_1/_collection_quiz/q1.json", r#"{"title":"Quiz"}"#);

    let builder = TreeBuilder::new();
    assert_eq!(builder.compute_root(&root).unwrap(), builder.compute_root(&root).unwrap());
}

/// Identical content under different directory names hashes identically
#[test]
fn test_hash_ignores_location() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "one/index.md", "same");
    write_file(temp_dir.path(), "two/index.md", "same");

    let builder = TreeBuilder::new();
    assert_eq!(
        builder.compute_root(&temp_dir.path().join("one")).unwrap(),
        builder.compute_root(&temp_dir.path().join("two")).unwrap()
    );
}

/// Leaf hashes are byte-exact: whitespace edits change the hash
#[test]
fn test_whitespace_edit_changes_hash() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("course");
    write_file(&root, "index.md", "hello");
    let before = TreeBuilder::new().compute_root(&root).unwrap();

    write_file(&root, "index.md", "hello\n");
    let after = TreeBuilder::new().compute_root(&root).unwrap();
    assert_ne!(before, after);
}

/// root/{a: "hello", b: "world"} aggregates the two leaf hashes, sorted
#[test]
fn test_hello_world_root_hash() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("root");
    write_file(&root, "_flashcards/a.json", "hello");
    write_file(&root, "_flashcards/b.json", "world");

    let node = TreeBuilder::new().build(&root).unwrap();

    let h_hello = blake3_hex(b"hello");
    let h_world = blake3_hex(b"world");
    assert_eq!(compute_leaf_hash(b"hello").as_str(), h_hello);
    let mut sorted = vec![h_hello, h_world];
    sorted.sort();
    assert_eq!(node.hash.as_str(), blake3_hex(sorted.concat().as_bytes()));
    assert!(node.is_branch);
    assert!(!node.has_index);
}

/// A node's hash is exactly the aggregate of its units and children
#[test]
fn test_node_hash_matches_aggregate_of_parts() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("course");
    write_file(&root, "index.md", "intro");
    write_file(&root, "_collection_quiz/final.json", "{}");
    write_file(&root, "week_1/index.md", "week");

    let node = TreeBuilder::new().build(&root).unwrap();
    let child = &node.children["week_1"];
    let expected = aggregate_hashes(vec![
        compute_leaf_hash(b"intro"),
        compute_leaf_hash(b"{}"),
        child.hash.clone(),
    ]);
    assert_eq!(node.hash, expected);
    assert_eq!(child.hash, aggregate_hashes(vec![compute_leaf_hash(b"week")]));
}

/// Every node is finalized after all of its descendants
#[test]
fn test_post_order_finalization() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("course");
    write_file(&root, "a/x/index.md", "x");
    write_file(&root, "a/y/index.md", "y");
    write_file(&root, "b/index.md", "b");
    let root = dunce::canonicalize(&root).unwrap();

    let mut order = Vec::new();
    TreeBuilder::new()
        .build_with(&root, &mut |path, _node| {
            order.push(path.strip_prefix(&root).unwrap().to_path_buf());
        })
        .unwrap();

    let position = |rel: &str| order.iter().position(|p| p.as_os_str() == rel).unwrap();
    assert!(position("a/x") < position("a"));
    assert!(position("a/y") < position("a"));
    assert!(position("a") < position(""));
    assert!(position("b") < position(""));
    assert_eq!(order.len(), 5);
}
