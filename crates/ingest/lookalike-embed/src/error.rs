use candle_core::Error as CandleError;
use hf_hub::api::sync::ApiError as HubError;
use tokenizers::Error as TokenizerError;

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("Model {name} not found; available models = {available:?}")]
    UnknownModel {
        name: String,
        available: Vec<&'static str>,
    },

    #[error("Requested accelerator is not usable: {reason}")]
    DeviceUnavailable { reason: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of {url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    Checksum {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Downloaded artifact from {url} is empty")]
    EmptyArtifact { url: String },

    #[error("I/O operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tensor operation failed: {0}")]
    Tensor(#[from] CandleError),

    #[error("Tokenizer initialization failed: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("Hub download failed: {0}")]
    Hub(#[from] HubError),
}

impl ModelLoadError {
    /// True when the failure came from talking to the network rather than local state.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ModelLoadError::Request { .. }
                | ModelLoadError::HttpStatus { .. }
                | ModelLoadError::Hub(_)
        )
    }
}
