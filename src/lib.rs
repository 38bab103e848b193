//! Syllabus: content-addressed course publishing
//!
//! Aggregates a directory tree of course material into hashed JSON
//! descriptors plus a version manifest, and keeps a client-side cache of
//! those descriptors current with a two-level hash check.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod publish;
pub mod sync;
pub mod tree;
pub mod types;
