use serde::{Deserialize, Serialize};

pub const DEFAULT_HUB_ENDPOINT: &str = "https://huggingface.co";
pub const DEFAULT_CLIP_REPO: &str = "openai/clip-vit-base-patch32";
// `main` of the openai repo only ships pytorch weights; the safetensors live on this PR ref.
pub const DEFAULT_CLIP_REVISION: &str = "refs/pr/15";

/// Where the CLIP weights and tokenizer are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModelSource {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_revision")]
    pub revision: String,
    #[serde(default = "default_weights_file")]
    pub weights_file: String,
    #[serde(default = "default_tokenizer_file")]
    pub tokenizer_file: String,
    /// Hex-encoded SHA-256 of the weights. Skips verification when unset.
    #[serde(default)]
    pub sha256: Option<String>,
}

impl Default for ModelSource {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            repo: default_repo(),
            revision: default_revision(),
            weights_file: default_weights_file(),
            tokenizer_file: default_tokenizer_file(),
            sha256: None,
        }
    }
}

impl ModelSource {
    pub fn weights_url(&self) -> String {
        crate::download::hub_url(&self.endpoint, &self.repo, &self.revision, &self.weights_file)
    }
}

fn default_endpoint() -> String {
    DEFAULT_HUB_ENDPOINT.to_string()
}

fn default_repo() -> String {
    DEFAULT_CLIP_REPO.to_string()
}

fn default_revision() -> String {
    DEFAULT_CLIP_REVISION.to_string()
}

fn default_weights_file() -> String {
    "model.safetensors".to_string()
}

fn default_tokenizer_file() -> String {
    "tokenizer.json".to_string()
}
