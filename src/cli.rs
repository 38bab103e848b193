//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{CacheCommands, Cli, Commands, ConfigCommands, SchemeArg};
pub use presentation::{
    format_build_report, format_cached_manifest, format_collection_line, format_hash_tree,
    format_sync_summary,
};
pub use route::RunContext;
