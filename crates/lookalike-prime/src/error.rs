use std::path::PathBuf;

use lookalike_embed::ModelLoadError;

#[derive(Debug, thiserror::Error)]
pub enum PrimeError {
    #[error("File operation {operation} failed for {}: {source}", path.display())]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model load failed: {0}")]
    ModelLoad(#[from] ModelLoadError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl PrimeError {
    /// The model hub could not be reached or refused the download.
    pub fn is_network(&self) -> bool {
        matches!(self, PrimeError::ModelLoad(e) if e.is_network())
    }

    pub(crate) fn filesystem(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        PrimeError::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }
}
