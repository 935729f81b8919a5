//! Fetching model artifacts onto local disk.
//!
//! Bytes are staged in a temp file beside the destination and only renamed into
//! place once the download is complete and verified, so a failed fetch never
//! leaves a truncated artifact at the destination path.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};

use crate::error::ModelLoadError;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// Build the resolve URL for a file in a hub repository.
pub fn hub_url(endpoint: &str, repo: &str, revision: &str, file: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    let revision = revision.replace('/', "%2F");
    format!("{endpoint}/{repo}/resolve/{revision}/{file}")
}

/// Blocking client without a request timeout; weight files are hundreds of megabytes.
pub fn download_client() -> Result<Client, ModelLoadError> {
    Client::builder()
        .timeout(None::<Duration>)
        .user_agent(concat!("lookalike-embed/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| ModelLoadError::Request {
            url: String::new(),
            source,
        })
}

pub fn fetch_to(
    client: &Client,
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
) -> Result<ArtifactInfo, ModelLoadError> {
    tracing::info!(%url, dest = %dest.display(), "downloading model artifact");
    let response = client
        .get(url)
        .send()
        .map_err(|source| ModelLoadError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ModelLoadError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    let info = write_verified(response, url, dest, expected_sha256)?;
    tracing::info!(bytes = info.bytes, sha256 = %info.sha256, "artifact stored");
    Ok(info)
}

/// Stream `reader` into `dest`, hashing as it goes.
pub fn write_verified(
    mut reader: impl Read,
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
) -> Result<ArtifactInfo, ModelLoadError> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut bytes = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        staged.write_all(&buf[..n])?;
        bytes += n as u64;
    }

    if bytes == 0 {
        return Err(ModelLoadError::EmptyArtifact {
            url: url.to_string(),
        });
    }

    let actual = format!("{:x}", hasher.finalize());
    if let Some(expected) = expected_sha256 {
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(ModelLoadError::Checksum {
                url: url.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
    }

    staged.flush()?;
    staged.as_file().sync_all()?;
    staged.persist(dest).map_err(|e| e.error)?;

    Ok(ArtifactInfo {
        path: dest.to_path_buf(),
        bytes,
        sha256: actual,
    })
}
