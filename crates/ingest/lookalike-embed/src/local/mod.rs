use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::clip::{ClipConfig, ClipModel};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::Tokenizer;

use crate::config::ModelSource;
use crate::device::Accelerator;
use crate::download::{download_client, fetch_to};
use crate::error::ModelLoadError;
use crate::preprocess::{ImagePreprocessor, Preprocess, TextPreprocessor};

/// Model identifiers understood by [`ClipLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipVariant {
    VitB32,
}

impl ClipVariant {
    pub const ALL: &'static [ClipVariant] = &[ClipVariant::VitB32];

    pub fn name(self) -> &'static str {
        match self {
            ClipVariant::VitB32 => "ViT-B/32",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ModelLoadError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ModelLoadError::UnknownModel {
                name: name.to_string(),
                available: Self::available(),
            })
    }

    pub fn available() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.name()).collect()
    }

    pub fn config(self) -> ClipConfig {
        match self {
            ClipVariant::VitB32 => ClipConfig::vit_base_patch32(),
        }
    }
}

/// What the caller wants loaded and where its weights live on disk.
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    pub model: &'a str,
    pub accelerator: Accelerator,
    pub cache_path: &'a Path,
}

/// `load(model, device) -> (model, preprocess)`. Populating the cache file is a side effect.
pub trait ModelLoader {
    type Handle;

    fn load(&self, request: &LoadRequest<'_>) -> Result<Self::Handle, ModelLoadError>;
}

pub struct ClipHandle {
    pub variant: ClipVariant,
    pub model: ClipModel,
    pub preprocess: Preprocess,
    pub device: Device,
    pub accelerator: Accelerator,
}

impl std::fmt::Debug for ClipHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipHandle")
            .field("variant", &self.variant)
            .field("accelerator", &self.accelerator)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClipLoader {
    pub source: ModelSource,
    pub cuda_device_index: usize,
}

impl ClipLoader {
    pub fn new(source: ModelSource, cuda_device_index: usize) -> Self {
        Self {
            source,
            cuda_device_index,
        }
    }

    fn ensure_weights(&self, cache_path: &Path) -> Result<(), ModelLoadError> {
        if cache_path.is_file() {
            tracing::debug!(path = %cache_path.display(), "reusing cached weights");
            return Ok(());
        }
        let client = download_client()?;
        let url = self.source.weights_url();
        fetch_to(&client, &url, cache_path, self.source.sha256.as_deref())?;
        Ok(())
    }

    fn tokenizer(&self) -> Result<Tokenizer, ModelLoadError> {
        let api = Api::new()?;
        let repo = Repo::with_revision(
            self.source.repo.clone(),
            RepoType::Model,
            self.source.revision.clone(),
        );
        let path = api.repo(repo).get(&self.source.tokenizer_file)?;
        Ok(Tokenizer::from_file(path)?)
    }
}

impl ModelLoader for ClipLoader {
    type Handle = ClipHandle;

    fn load(&self, request: &LoadRequest<'_>) -> Result<ClipHandle, ModelLoadError> {
        let variant = ClipVariant::from_name(request.model)?;
        let device = request.accelerator.device(self.cuda_device_index)?;

        self.ensure_weights(request.cache_path)?;

        let tensors = candle_core::safetensors::load(request.cache_path, &device)?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let model = ClipModel::new(vb, &variant.config())?;
        tracing::info!(
            model = variant.name(),
            accelerator = %request.accelerator,
            "CLIP weights loaded"
        );

        let text = TextPreprocessor::new(self.tokenizer()?)?;

        Ok(ClipHandle {
            variant,
            model,
            preprocess: Preprocess {
                image: ImagePreprocessor::default(),
                text,
            },
            device,
            accelerator: request.accelerator,
        })
    }
}
