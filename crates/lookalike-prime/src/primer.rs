//! Reset the local CLIP cache entry and load the model.
//!
//! The steps are strictly sequential and none of them are retried: select the
//! accelerator, delete whatever sits at the cache path, then let the loader
//! download and load fresh weights. Deletion and load are not transactional;
//! a failed load leaves the cache path empty.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use lookalike_embed::{
    select_accelerator, Accelerator, AcceleratorProbe, ClipHandle, ClipLoader, CudaProbe,
    LoadRequest, ModelLoader,
};

use crate::config::PrimerConfig;
use crate::error::PrimeError;
use crate::events::{ConsoleSink, EventSink, PrimeEvent};

/// Outcome of a successful [`prime`].
#[derive(Debug)]
pub struct Primed<H> {
    pub accelerator: Accelerator,
    pub cache_path: PathBuf,
    pub deleted_stale: bool,
    pub handle: H,
}

pub fn prime<P, L, S>(
    config: &PrimerConfig,
    probe: &P,
    loader: &L,
    sink: &mut S,
) -> Result<Primed<L::Handle>, PrimeError>
where
    P: AcceleratorProbe,
    L: ModelLoader,
    S: EventSink,
{
    let _span = tracing::info_span!("prime", model = %config.model).entered();

    let accelerator = select_accelerator(config.device, probe)?;
    tracing::info!(%accelerator, preference = ?config.device, "accelerator selected");
    sink.emit(PrimeEvent::DeviceSelected(accelerator));

    let cache_path = config.cache_path();
    let deleted_stale = remove_stale(&cache_path, sink)?;

    if let Some(parent) = cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| PrimeError::filesystem("create_dir_all", parent, e))?;
    }

    let handle = loader
        .load(&LoadRequest {
            model: &config.model,
            accelerator,
            cache_path: &cache_path,
        })
        .inspect_err(|e| tracing::error!(error = %e, "model load failed"))?;

    tracing::info!(path = %cache_path.display(), "cache repopulated");
    sink.emit(PrimeEvent::Loaded {
        model: config.model.clone(),
    });

    Ok(Primed {
        accelerator,
        cache_path,
        deleted_stale,
        handle,
    })
}

/// Prime with the real CUDA probe, the hub-backed CLIP loader and stdout/stderr status lines.
pub fn prime_with_defaults(config: &PrimerConfig) -> Result<Primed<ClipHandle>, PrimeError> {
    let probe = CudaProbe {
        index: config.cuda_device_index,
    };
    let loader = ClipLoader::new(config.source.clone(), config.cuda_device_index);
    prime(config, &probe, &loader, &mut ConsoleSink::stdio())
}

fn remove_stale(path: &Path, sink: &mut impl EventSink) -> Result<bool, PrimeError> {
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no cached model to delete");
            Ok(false)
        }
        Err(e) => Err(PrimeError::filesystem("stat", path, e)),
        Ok(_) => {
            sink.emit(PrimeEvent::DeletingStale(path.to_path_buf()));
            tracing::info!(path = %path.display(), "deleting cached model");
            fs::remove_file(path).map_err(|e| PrimeError::filesystem("remove_file", path, e))?;
            Ok(true)
        }
    }
}
