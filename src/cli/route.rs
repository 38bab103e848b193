//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::{CacheCommands, Commands, ConfigCommands, SchemeArg};
use crate::cli::presentation::{
    format_build_report, format_cached_manifest, format_collection_line, format_hash_tree,
    format_sync_summary,
};
use crate::config::{ConfigLoader, SyllabusConfig};
use crate::error::ApiError;
use crate::publish::Publisher;
use crate::sync::fetch::HttpFetcher;
use crate::sync::store::{self, CacheStore, MemoryCacheStore, SledCacheStore};
use crate::sync::{SyncOptions, Synchronizer};
use crate::tree::TreeBuilder;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace and resolved configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: SyllabusConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::with_config(workspace_root, config)
    }

    /// Create run context from an already loaded configuration.
    pub fn with_config(workspace_root: PathBuf, config: SyllabusConfig) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(messages.join("; "))
        })?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &SyllabusConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Build { source, publish } => {
                self.handle_build(source.as_deref(), publish.as_deref())
            }
            Commands::Hash { dir, depth } => self.handle_hash(dir, *depth),
            Commands::Sync {
                base_url,
                scheme,
                ephemeral,
            } => self.handle_sync(base_url.as_deref(), *scheme, *ephemeral),
            Commands::Cache { command } => self.handle_cache(command),
            Commands::Config {
                command: ConfigCommands::Show,
            } => toml::to_string_pretty(&self.config).map_err(|e| {
                ApiError::ConfigError(format!("Failed to render configuration: {}", e))
            }),
        };
        debug!(
            command = command.name(),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn handle_build(&self, source: Option<&Path>, publish: Option<&Path>) -> Result<String, ApiError> {
        let mut build = self.config.build.clone();
        build.source_root = self.resolve(source.unwrap_or(&build.source_root));
        build.publish_root = self.resolve(publish.unwrap_or(&build.publish_root));
        info!(
            source = %build.source_root.display(),
            publish = %build.publish_root.display(),
            "Publishing content"
        );

        let report = Publisher::new(build).run()?;
        Ok(format_build_report(&report))
    }

    fn handle_hash(&self, dir: &Path, depth: Option<usize>) -> Result<String, ApiError> {
        let root = TreeBuilder::new().build(&self.resolve(dir))?;
        Ok(format_hash_tree(&root, depth))
    }

    fn handle_sync(
        &self,
        base_url: Option<&str>,
        scheme: Option<SchemeArg>,
        ephemeral: bool,
    ) -> Result<String, ApiError> {
        let mut client = self.config.client.clone();
        if let Some(url) = base_url {
            client.base_url = url.to_string();
        }
        if let Some(scheme) = scheme {
            client.scheme = scheme.into();
        }
        client.validate().map_err(ApiError::ConfigError)?;
        if client.base_url.is_empty() {
            return Err(ApiError::ConfigError(
                "client.base_url is not set (use --base-url or the config file)".to_string(),
            ));
        }

        let timeout = Duration::from_millis(client.timeout_ms);
        let fetcher = Arc::new(HttpFetcher::new(&client.base_url, timeout)?);
        let store: Arc<dyn CacheStore> = if ephemeral {
            Arc::new(MemoryCacheStore::new())
        } else {
            Arc::new(self.open_cache()?)
        };
        let options = SyncOptions {
            scheme: client.path_scheme(),
            manifest_path: client.manifest_file.clone(),
            timeout,
        };
        let synchronizer = Synchronizer::new(fetcher, store, options);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to start async runtime: {}", e)))?;
        let color = std::io::stdout().is_terminal();
        let report = runtime.block_on(synchronizer.run_with(|result| {
            debug!(collection = %result.id, state = result.state.name(), "Collection resolved");
            println!("{}", format_collection_line(result, color));
        }))?;

        Ok(format_sync_summary(&report))
    }

    fn handle_cache(&self, command: &CacheCommands) -> Result<String, ApiError> {
        let cache = self.open_cache()?;
        match command {
            CacheCommands::Clear => {
                cache.clear()?;
                info!("Client cache cleared");
                Ok("Cache cleared.".to_string())
            }
            CacheCommands::Show => Ok(format_cached_manifest(store::load_manifest(&cache).as_ref())),
        }
    }

    fn open_cache(&self) -> Result<SledCacheStore, ApiError> {
        let path = self.config.client.resolved_cache_path().ok_or_else(|| {
            ApiError::ConfigError(
                "No cache location available; set client.cache_path".to_string(),
            )
        })?;
        let path = self.resolve(&path);
        std::fs::create_dir_all(&path).map_err(|e| {
            ApiError::ConfigError(format!("Failed to create cache directory {:?}: {}", path, e))
        })?;
        Ok(SledCacheStore::open(&path)?)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}
