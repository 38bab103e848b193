//! Configuration System
//!
//! Layered configuration for the publisher and the cache synchronizer:
//! defaults, then the user's global file, then workspace files, then
//! `SYLLABUS__SECTION__KEY` environment variables.

use crate::logging::LoggingConfig;
use crate::sync::scheme::PathScheme;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod loader;
mod sources;

pub use loader::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyllabusConfig {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source and publish layout for `syllabus build`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Content source root, relative to the workspace
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Publish root, relative to the workspace
    #[serde(default = "default_publish_root")]
    pub publish_root: PathBuf,

    /// Directory under both roots whose sub-directories are the collections
    #[serde(default = "default_collections_dir")]
    pub collections_dir: String,

    /// Directory under the publish root receiving descriptors and assets
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Manifest file name under the publish root
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Descriptor file name written in every published node directory
    #[serde(default = "default_descriptor_file")]
    pub descriptor_file: String,

    /// File extensions copied by the asset mirror
    #[serde(default = "default_mirror_extensions")]
    pub mirror_extensions: Vec<String>,
}

fn default_source_root() -> PathBuf {
    PathBuf::from("content")
}

fn default_publish_root() -> PathBuf {
    PathBuf::from("docs")
}

fn default_collections_dir() -> String {
    "universities".to_string()
}

fn default_content_dir() -> String {
    "content-public".to_string()
}

fn default_manifest_file() -> String {
    "version.json".to_string()
}

fn default_descriptor_file() -> String {
    "meta.json".to_string()
}

fn default_mirror_extensions() -> Vec<String> {
    vec!["json".to_string(), "md".to_string()]
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            publish_root: default_publish_root(),
            collections_dir: default_collections_dir(),
            content_dir: default_content_dir(),
            manifest_file: default_manifest_file(),
            descriptor_file: default_descriptor_file(),
            mirror_extensions: default_mirror_extensions(),
        }
    }
}

/// Addressing of collection descriptors on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    /// `{prefix}/{collection}/meta.json`, collections only
    Flat,
    /// `{prefix}/{collection}/{child}/.../meta.json`, any node
    Nested,
}

/// Client synchronizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Site base URL, e.g. `https://example.org/course-site`
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_scheme")]
    pub scheme: SchemeKind,

    /// Path between the base URL and the collection id
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    #[serde(default = "default_descriptor_file")]
    pub descriptor_file: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Persistent cache location (defaults to the user data directory)
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

fn default_scheme() -> SchemeKind {
    SchemeKind::Nested
}

fn default_prefix() -> String {
    "content-public/universities".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            scheme: default_scheme(),
            prefix: default_prefix(),
            manifest_file: default_manifest_file(),
            descriptor_file: default_descriptor_file(),
            timeout_ms: default_timeout_ms(),
            cache_path: None,
        }
    }
}

impl ClientConfig {
    /// Path scheme selected by this configuration
    pub fn path_scheme(&self) -> PathScheme {
        match self.scheme {
            SchemeKind::Flat => PathScheme::flat(&self.prefix, &self.descriptor_file),
            SchemeKind::Nested => PathScheme::nested(&self.prefix, &self.descriptor_file),
        }
    }

    /// Resolved cache location
    pub fn resolved_cache_path(&self) -> Option<PathBuf> {
        self.cache_path.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "syllabus")
                .map(|dirs| dirs.data_dir().join("cache"))
        })
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Build(String),
    Client(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Build(msg) => write!(f, "build: {}", msg),
            ValidationError::Client(msg) => write!(f, "client: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("collections_dir", &self.collections_dir),
            ("content_dir", &self.content_dir),
            ("manifest_file", &self.manifest_file),
            ("descriptor_file", &self.descriptor_file),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
            if value.contains("..") {
                return Err(format!("{} cannot contain '..'", name));
            }
        }
        if self.source_root.as_os_str().is_empty() || self.publish_root.as_os_str().is_empty() {
            return Err("source_root and publish_root cannot be empty".to_string());
        }
        Ok(())
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.is_empty() && reqwest::Url::parse(&self.base_url).is_err() {
            return Err(format!("base_url '{}' is not a valid URL", self.base_url));
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }
        if self.descriptor_file.trim().is_empty() || self.manifest_file.trim().is_empty() {
            return Err("manifest_file and descriptor_file cannot be empty".to_string());
        }
        Ok(())
    }
}

impl SyllabusConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.build.validate() {
            errors.push(ValidationError::Build(e));
        }
        if let Err(e) = self.client.validate() {
            errors.push(ValidationError::Client(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
