//! Configuration loading
//!
//! `defaults/synctex.default.toml` is embedded into the binary so that the
//! documented defaults and the runtime behavior stay in sync. On top of it
//! [`Loader`] layers, in order: user files, `SYNCTEX_*` environment variables
//! (`SYNCTEX_CACHE__CAPACITY=0` sets `cache.capacity`) and single-key overrides.
//! The result deserializes into [`SyncConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

use super::forward::ForwardOptions;

const DEFAULT_TOML: &str = include_str!("../../defaults/synctex.default.toml");
const ENV_PREFIX: &str = "SYNCTEX";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub normalize_paths: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// How the command-line tool renders results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    Text,
}

impl SyncConfig {
    pub fn forward_options(&self) -> ForwardOptions {
        ForwardOptions {
            normalize_paths: self.search.normalize_paths,
        }
    }
}

/// Layers configuration sources over the embedded defaults.
///
/// Files are applied in the order they are added. Unless disabled, the
/// environment is applied after all files, and overrides win over everything.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
    environment: bool,
}

impl Loader {
    /// Defaults plus `SYNCTEX_<SECTION>__<KEY>` environment variables
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
            environment: true,
        }
    }

    /// Skip the environment layer
    pub fn without_env(mut self) -> Self {
        self.environment = false;
        self
    }

    /// Layer a TOML file, which must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml));
        self
    }

    /// Set one dotted key, e.g. `output.format`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        let mut builder = self.builder;
        if self.environment {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }
        builder.build()?.try_deserialize()
    }
}

/// The embedded defaults alone, ignoring the environment
pub fn load_defaults() -> Result<SyncConfig, ConfigError> {
    Loader::new().without_env().build()
}
