//! A single-byte change propagates to every ancestor and nowhere else

use crate::integration::test_utils::write_file;
use syllabus::tree::{TreeBuilder, TreeNode};
use tempfile::TempDir;

fn fixture(root: &std::path::Path) {
    write_file(root, "index.md", "course");
    write_file(root, "unit_1/index.md", "unit one");
    write_file(root, "unit_1/lesson_a/index.md", "lesson a");
    write_file(root, "unit_1/lesson_b/index.md", "lesson b");
    write_file(root, "unit_1/lesson_b/_flashcards/terms.json", r#"{"title":"Terms"}"#);
    write_file(root, "unit_2/index.md", "unit two");
    write_file(root, "unit_2/lesson_c/index.md", "lesson c");
}

fn hash_at(node: &TreeNode, path: &[&str]) -> String {
    node.descendant(path).unwrap().hash.to_string()
}

#[test]
fn test_leaf_change_propagates_to_ancestors_only() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("course");
    fixture(&root);
    let before = TreeBuilder::new().build(&root).unwrap();

    write_file(&root, "unit_1/lesson_b/_flashcards/terms.json", r#"{"title":"Termz"}"#);
    let after = TreeBuilder::new().build(&root).unwrap();

    for changed in [&["unit_1", "lesson_b"][..], &["unit_1"][..], &[][..]] {
        assert_ne!(hash_at(&before, changed), hash_at(&after, changed), "{:?}", changed);
    }
    for unchanged in [
        &["unit_1", "lesson_a"][..],
        &["unit_2"][..],
        &["unit_2", "lesson_c"][..],
    ] {
        assert_eq!(hash_at(&before, unchanged), hash_at(&after, unchanged), "{:?}", unchanged);
    }
}

#[test]
fn test_index_change_in_sibling_leaves_other_subtree() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("course");
    fixture(&root);
    let before = TreeBuilder::new().build(&root).unwrap();

    write_file(&root, "unit_2/lesson_c/index.md", "lesson C");
    let after = TreeBuilder::new().build(&root).unwrap();

    assert_ne!(before.hash, after.hash);
    assert_ne!(hash_at(&before, &["unit_2"]), hash_at(&after, &["unit_2"]));
    assert_eq!(hash_at(&before, &["unit_1"]), hash_at(&after, &["unit_1"]));
}

#[test]
fn test_adding_empty_resource_folder_keeps_hash() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("course");
    fixture(&root);
    let before = TreeBuilder::new().build(&root).unwrap();

    std::fs::create_dir_all(root.join("unit_2").join("_collection_quiz")).unwrap();
    let after = TreeBuilder::new().build(&root).unwrap();

    assert_eq!(before.hash, after.hash);
    let unit_2 = after.descendant(&["unit_2"]).unwrap();
    let resources = unit_2.resources.as_ref().unwrap();
    assert_eq!(resources.collection_quizzes.as_deref(), Some(&[][..]));
}
