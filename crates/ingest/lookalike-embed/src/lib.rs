//! lookalike-embed: the CLIP side of the lookalike image search.
//!
//! Picks an accelerator, fetches the ViT-B/32 weights into a local cache file and
//! loads them with candle together with the matching image/text preprocessing.
pub mod config;
pub mod device;
pub mod download;
pub mod error;
pub mod local;
pub mod preprocess;

pub use device::{select_accelerator, Accelerator, AcceleratorProbe, CudaProbe, DevicePreference};
pub use error::ModelLoadError;
pub use local::{ClipHandle, ClipLoader, ClipVariant, LoadRequest, ModelLoader};
