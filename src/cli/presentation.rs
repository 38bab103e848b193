//! CLI presentation: text rendering of build, hash, sync and cache results.

use crate::manifest::VersionManifest;
use crate::publish::BuildReport;
use crate::sync::{CollectionResult, CollectionState, ManifestSource, SyncReport};
use crate::tree::TreeNode;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;

const HASH_WIDTH: usize = 16;

pub fn format_build_report(report: &BuildReport) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Collection", "Hash"]);
    for (id, hash) in &report.manifest.hashes {
        table.add_row(vec![id.as_str(), hash.short(HASH_WIDTH)]);
    }

    format!(
        "Build completed:\n  Collections: {}\n  Nodes: {}\n  Manifest: {}\n  Duration: {} ms\n{}",
        report.manifest.hashes.len(),
        report.node_count,
        report.manifest_path.display(),
        report.duration.as_millis(),
        table
    )
}

/// Render a hash tree down to `max_depth` levels below the root
pub fn format_hash_tree(root: &TreeNode, max_depth: Option<usize>) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Path", "Label", "Kind", "Hash"]);
    add_tree_rows(&mut table, ".", root, 0, max_depth);
    format!("Root hash: {}\n{}", root.hash, table)
}

fn add_tree_rows(
    table: &mut Table,
    path: &str,
    node: &TreeNode,
    depth: usize,
    max_depth: Option<usize>,
) {
    let kind = match (node.is_branch, node.has_index) {
        (true, true) => "branch+index",
        (true, false) => "branch",
        (false, _) => "leaf",
    };
    table.add_row(vec![path, node.label.as_str(), kind, node.hash.short(HASH_WIDTH)]);

    if max_depth.map_or(false, |max| depth >= max) {
        return;
    }
    for (name, child) in &node.children {
        let child_path = if path == "." {
            name.clone()
        } else {
            format!("{}/{}", path, name)
        };
        add_tree_rows(table, &child_path, child, depth + 1, max_depth);
    }
}

/// One line per resolved collection, printed as soon as it resolves
pub fn format_collection_line(result: &CollectionResult, color: bool) -> String {
    let state = result.state.name();
    let state = if !color {
        state.to_string()
    } else {
        match &result.state {
            CollectionState::Hit(_) => state.green().to_string(),
            CollectionState::Fetched(_) => state.cyan().to_string(),
            CollectionState::Failed(_) => state.red().to_string(),
        }
    };
    let detail = match &result.state {
        CollectionState::Hit(doc) | CollectionState::Fetched(doc) => doc.label.as_str(),
        CollectionState::Failed(message) => message.as_str(),
    };
    format!(
        "  {:<24} {:<10} {}  {}",
        result.id,
        state,
        result.hash.short(12),
        detail
    )
}

/// Closing summary of a sync run; per-collection lines are printed earlier
pub fn format_sync_summary(report: &SyncReport) -> String {
    let source = match report.manifest_source {
        ManifestSource::Network => "network",
        ManifestSource::Cache => "cache (network unavailable)",
    };
    format!(
        "Manifest from {} ({} collections, generated {})\n{} cached, {} fetched, {} failed in {} ms",
        source,
        report.manifest.hashes.len(),
        report.manifest.generated_at.to_rfc3339(),
        report.count("cache-hit"),
        report.count("fetched"),
        report.count("failed"),
        report.duration.as_millis()
    )
}

pub fn format_cached_manifest(manifest: Option<&VersionManifest>) -> String {
    let Some(manifest) = manifest else {
        return "No cached manifest.".to_string();
    };
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Collection", "Hash"]);
    for (id, hash) in &manifest.hashes {
        table.add_row(vec![id.as_str(), hash.short(HASH_WIDTH)]);
    }
    format!(
        "Cached manifest generated {}\n{}",
        manifest.generated_at.to_rfc3339(),
        table
    )
}
