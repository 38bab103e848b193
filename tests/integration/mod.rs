//! Integration tests for the Syllabus publisher and cache synchronizer

mod publish_layout;
mod sync_protocol;
mod test_utils;
mod tree_avalanche;
mod tree_determinism;
