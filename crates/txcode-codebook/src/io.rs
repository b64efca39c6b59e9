use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use txcode_core::{ErrorInfo, LabeledTensor, TxError};

use crate::codebook::Codebook;

/// Failure while reading or writing a codebook resource.
///
/// I/O, HTTP and JSON failures are carried unchanged from the underlying
/// library; only validation of the fetched content is reported as a
/// [`TxError`].
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Local file access failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The HTTP request failed or returned a non-success status.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The resource is not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The JSON does not describe a valid codebook.
    #[error(transparent)]
    Codebook(#[from] TxError),
}

/// Returns whether `location` is syntactically an HTTP(S) URL.
pub fn is_url(location: &str) -> bool {
    reqwest::Url::parse(location)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

fn read_text(location: &str) -> Result<String, ResourceError> {
    if is_url(location) {
        log::info!("fetching codebook from {location}");
        let response = reqwest::blocking::get(location)?.error_for_status()?;
        Ok(response.text()?)
    } else {
        log::debug!("reading codebook from {location}");
        Ok(fs::read_to_string(location)?)
    }
}

impl Codebook {
    /// Loads a codebook from a local JSON file or an HTTP(S) URL.
    pub fn from_json(
        location: &str,
        n_rounds: Option<usize>,
        n_channels: Option<usize>,
    ) -> Result<Self, ResourceError> {
        let text = read_text(location)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        Ok(Self::from_json_value(value, n_rounds, n_channels)?)
    }

    /// Serializes the codebook to the sparse JSON schema.
    pub fn to_json(&self) -> Result<String, TxError> {
        serde_json::to_string_pretty(&self.to_code_array())
            .map_err(|err| TxError::Serde(ErrorInfo::new("json-serialize", err.to_string())))
    }

    /// Writes the sparse JSON schema to `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ResourceError> {
        let json = serde_json::to_string(&self.to_code_array())?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableCodebook {
    genes: Vec<String>,
    codes: LabeledTensor,
}

/// Serializes a codebook into a dense binary snapshot.
pub fn to_bytes(codebook: &Codebook) -> Result<Vec<u8>, TxError> {
    let payload = SerializableCodebook {
        genes: codebook.genes().to_vec(),
        codes: codebook.codes().clone(),
    };
    bincode::serialize(&payload)
        .map_err(|err| TxError::Serde(ErrorInfo::new("bincode-serialize", err.to_string())))
}

/// Restores a codebook from a binary snapshot, re-checking its invariants.
pub fn from_bytes(bytes: &[u8]) -> Result<Codebook, TxError> {
    let payload: SerializableCodebook = bincode::deserialize(bytes)
        .map_err(|err| TxError::Serde(ErrorInfo::new("bincode-deserialize", err.to_string())))?;
    Codebook::from_parts(payload.genes, payload.codes)
}
