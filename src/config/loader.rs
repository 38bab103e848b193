//! Config loading facade.

use super::sources;
use super::SyllabusConfig;
use config::{Config, ConfigError, File};
use std::path::{Path, PathBuf};

/// Loads `SyllabusConfig` from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace
    ///
    /// Later sources override earlier ones: global file, workspace
    /// `config/config.toml`, `config/{SYLLABUS_ENV}.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<SyllabusConfig, ConfigError> {
        let builder = Config::builder();
        let builder = sources::add_global_file(builder)?;
        let builder = sources::add_workspace_files(builder, workspace_root)?;
        let builder = sources::add_environment(builder);
        builder.build()?.try_deserialize()
    }

    /// Load configuration from one explicit file (plus environment overrides)
    pub fn load_from_file(path: &Path) -> Result<SyllabusConfig, ConfigError> {
        let builder = Config::builder().add_source(File::from(path).required(true));
        let builder = sources::add_environment(builder);
        builder.build()?.try_deserialize()
    }

    /// Location of the global config file, if a home directory is known
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_config_path()
    }
}
