//! Integration tests for the two-level cache protocol, run against real
//! build output served from disk

use crate::integration::test_utils::{build_config, write_file, DirFetcher};
use std::path::Path;
use std::sync::Arc;
use syllabus::error::SyncError;
use syllabus::publish::Publisher;
use syllabus::sync::store::{self, MemoryCacheStore};
use syllabus::sync::{CollectionState, ManifestSource, SyncOptions, Synchronizer};
use tempfile::TempDir;

const ROOT_DESCRIPTOR: &str = "content-public/universities/root/meta.json";
const OTHER_DESCRIPTOR: &str = "content-public/universities/other/meta.json";

fn seed(ws: &Path) {
    write_file(ws, "content/universities/root/_flashcards/a.json", "hello");
    write_file(ws, "content/universities/root/_flashcards/b.json", "world");
    write_file(ws, "content/universities/other/index.md", "---\ntitle: Other\n---\n");
}

fn publish(ws: &Path) {
    Publisher::new(build_config(ws)).run().unwrap();
}

struct Harness {
    fetcher: Arc<DirFetcher>,
    store: Arc<MemoryCacheStore>,
    synchronizer: Synchronizer,
}

fn harness(ws: &Path) -> Harness {
    let fetcher = Arc::new(DirFetcher::new(&ws.join("docs")));
    let store = Arc::new(MemoryCacheStore::new());
    let synchronizer = Synchronizer::new(fetcher.clone(), store.clone(), SyncOptions::default());
    Harness {
        fetcher,
        store,
        synchronizer,
    }
}

fn state_of<'a>(report: &'a syllabus::sync::SyncReport, id: &str) -> &'a CollectionState {
    &report
        .collections
        .iter()
        .find(|result| result.id == id)
        .unwrap()
        .state
}

#[tokio::test]
async fn test_unchanged_hash_makes_no_descriptor_request() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    seed(ws);
    publish(ws);
    let h = harness(ws);

    let first = h.synchronizer.run().await.unwrap();
    assert_eq!(first.count("fetched"), 2);
    assert_eq!(h.fetcher.take_requests().len(), 3);

    let second = h.synchronizer.run().await.unwrap();
    assert_eq!(second.count("cache-hit"), 2);
    assert_eq!(h.fetcher.take_requests(), vec!["version.json".to_string()]);
    assert_eq!(state_of(&second, "other").document().unwrap().label, "Other");
}

#[tokio::test]
async fn test_changed_hash_replaces_only_that_entry() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    seed(ws);
    publish(ws);
    let h = harness(ws);

    h.synchronizer.run().await.unwrap();
    let cached_before = store::load_contents(h.store.as_ref());
    h.fetcher.take_requests();

    write_file(ws, "content/universities/root/_flashcards/b.json", "World");
    publish(ws);

    let report = h.synchronizer.run().await.unwrap();
    assert!(matches!(state_of(&report, "root"), CollectionState::Fetched(_)));
    assert!(matches!(state_of(&report, "other"), CollectionState::Hit(_)));
    assert_eq!(
        h.fetcher.take_requests(),
        vec!["version.json".to_string(), ROOT_DESCRIPTOR.to_string()]
    );

    let cached_after = store::load_contents(h.store.as_ref());
    assert_eq!(cached_after["other"], cached_before["other"]);
    assert_ne!(cached_after["root"].hash, cached_before["root"].hash);
    assert_eq!(Some(&cached_after["root"].hash), report.manifest.hash_of("root"));
}

#[tokio::test]
async fn test_failed_collection_does_not_block_others() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    seed(ws);
    publish(ws);
    let h = harness(ws);
    h.synchronizer.run().await.unwrap();
    let cached_before = store::load_contents(h.store.as_ref());

    write_file(ws, "content/universities/root/_flashcards/a.json", "hi");
    write_file(ws, "content/universities/other/index.md", "---\ntitle: Other 2\n---\n");
    publish(ws);
    h.fetcher.fail_matching("/root/");

    let mut seen = Vec::new();
    let report = h
        .synchronizer
        .run_with(|result| seen.push(result.id.clone()))
        .await
        .unwrap();
    seen.sort();
    assert_eq!(seen, vec!["other".to_string(), "root".to_string()]);

    match state_of(&report, "root") {
        CollectionState::Failed(message) => assert!(message.contains("root")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(state_of(&report, "other").document().unwrap().label, "Other 2");

    let cached_after = store::load_contents(h.store.as_ref());
    assert_eq!(cached_after["root"], cached_before["root"]);

    h.fetcher.heal();
    let retry = h.synchronizer.run().await.unwrap();
    assert!(matches!(state_of(&retry, "root"), CollectionState::Fetched(_)));
    assert!(matches!(state_of(&retry, "other"), CollectionState::Hit(_)));
}

#[tokio::test]
async fn test_manifest_outage_uses_cached_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    seed(ws);
    publish(ws);
    let h = harness(ws);
    let online = h.synchronizer.run().await.unwrap();
    h.fetcher.take_requests();

    h.fetcher.fail_matching("version.json");
    let offline = h.synchronizer.run().await.unwrap();
    assert_eq!(offline.manifest_source, ManifestSource::Cache);
    assert_eq!(offline.manifest, online.manifest);
    assert_eq!(offline.count("cache-hit"), 2);
    assert_eq!(h.fetcher.take_requests(), vec!["version.json".to_string()]);
}

#[tokio::test]
async fn test_first_visit_without_manifest_fails() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    seed(ws);
    publish(ws);
    let h = harness(ws);
    h.fetcher.fail_matching("version.json");

    let err = h.synchronizer.run().await.unwrap_err();
    assert!(matches!(err, SyncError::ManifestUnavailable));
    assert_eq!(err.to_string(), "Failed to load app data. Please try again later.");
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_corrupt_cache_triggers_full_refetch() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    seed(ws);
    publish(ws);
    let h = harness(ws);
    h.synchronizer.run().await.unwrap();

    use syllabus::sync::store::{CacheStore, CONTENT_KEY};
    h.store.set(CONTENT_KEY, "definitely not json").unwrap();
    h.fetcher.take_requests();

    let report = h.synchronizer.run().await.unwrap();
    assert_eq!(report.count("fetched"), 2);
    let requests = h.fetcher.take_requests();
    assert!(requests.contains(&ROOT_DESCRIPTOR.to_string()));
    assert!(requests.contains(&OTHER_DESCRIPTOR.to_string()));
}

#[tokio::test]
async fn test_fetch_nested_node() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path();
    seed(ws);
    write_file(ws, "content/universities/other/week_1/index.md", "---\ntitle: Week One\n---\n");
    publish(ws);
    let h = harness(ws);

    let node = h.synchronizer.fetch_node("other", &["week_1"]).await.unwrap();
    assert_eq!(node.label, "Week One");
    assert_eq!(
        h.fetcher.requests(),
        vec!["content-public/universities/other/week_1/meta.json".to_string()]
    );
    assert_eq!(h.fetcher.count_matching("week_1"), 1);
}
