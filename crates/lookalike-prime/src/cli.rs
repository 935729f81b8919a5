use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lookalike_embed::DevicePreference;

use crate::config::PrimerConfig;

/// Delete the cached CLIP weights and load the model fresh, re-downloading it.
#[derive(Parser, Debug)]
#[command(name = "lookalike-prime", version, about)]
pub struct Args {
    /// TOML config file layered over the built-in defaults
    #[arg(long, env = "LOOKALIKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the cached model file (default: ./clip_models)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// File name of the cached weights inside the cache directory
    #[arg(long)]
    pub file_name: Option<String>,

    /// Model identifier to load (e.g. ViT-B/32)
    #[arg(long)]
    pub model: Option<String>,

    /// Accelerator selection; `auto` probes for a GPU
    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,

    /// Expected SHA-256 of the downloaded weights
    #[arg(long)]
    pub sha256: Option<String>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceArg {
    Auto,
    Cpu,
    Gpu,
}

impl From<DeviceArg> for DevicePreference {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Auto => DevicePreference::Auto,
            DeviceArg::Cpu => DevicePreference::Cpu,
            DeviceArg::Gpu => DevicePreference::Gpu,
        }
    }
}

impl Args {
    /// Flags win over every other config layer.
    pub fn apply_to(&self, config: &mut PrimerConfig) {
        if let Some(dir) = &self.cache_dir {
            config.cache.dir = dir.clone();
        }
        if let Some(name) = &self.file_name {
            config.cache.file_name = name.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(device) = self.device {
            config.device = device.into();
        }
        if let Some(sha) = &self.sha256 {
            config.source.sha256 = Some(sha.clone());
        }
    }
}
