//! Primer configuration.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file, then
//! `LOOKALIKE_*` environment variables (`__` separates nested keys, e.g.
//! `LOOKALIKE_CACHE__DIR`). CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use lookalike_embed::config::ModelSource;
use lookalike_embed::DevicePreference;
use serde::{Deserialize, Serialize};

use crate::error::PrimeError;

pub const ENV_PREFIX: &str = "LOOKALIKE";
pub const DEFAULT_MODEL: &str = "ViT-B/32";
pub const DEFAULT_CACHE_DIR: &str = "./clip_models";
pub const DEFAULT_CACHE_FILE: &str = "ViT-B-32.safetensors";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrimerConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub device: DevicePreference,
    #[serde(default)]
    pub cuda_device_index: usize,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub source: ModelSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_cache_file")]
    pub file_name: String,
}

impl Default for PrimerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            device: DevicePreference::default(),
            cuda_device_index: 0,
            cache: CacheConfig::default(),
            source: ModelSource::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            file_name: default_cache_file(),
        }
    }
}

impl PrimerConfig {
    /// `<cache.dir>/<cache.file_name>`
    pub fn cache_path(&self) -> PathBuf {
        self.cache.dir.join(&self.cache.file_name)
    }

    /// Load defaults, the optional TOML file at `path`, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, PrimeError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "reading config file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        let cfg = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_cache_file() -> String {
    DEFAULT_CACHE_FILE.to_string()
}
