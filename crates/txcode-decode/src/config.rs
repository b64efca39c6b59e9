//! Pipeline configuration: trace building followed by decoding.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use txcode_codebook::Codebook;
use txcode_core::{ErrorInfo, TxError};
use txcode_traces::{IntensityTable, SpotFindingResults, TraceBuilder, TraceBuildingStrategy};

use crate::decoder::{Decoder, DecodingStrategy};

fn serde_error(code: &str, err: impl ToString) -> TxError {
    TxError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Trace building and decoding strategies for one decoding run.
///
/// ```yaml
/// traces:
///   strategy: nearest_neighbor
///   anchor_round: 0
///   search_radius: 2.5
/// decoder:
///   method: metric
///   max_distance: 0.5
///   min_intensity: 0.1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// How detections become traces.
    pub traces: TraceBuildingStrategy,
    /// How traces become gene labels.
    pub decoder: DecodingStrategy,
}

impl DecodeConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TxError> {
        serde_yaml::from_str(yaml).map_err(|err| serde_error("yaml-deserialize", err))
    }

    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, TxError> {
        serde_json::from_str(json).map_err(|err| serde_error("json-deserialize", err))
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> Result<String, TxError> {
        serde_yaml::to_string(self).map_err(|err| serde_error("yaml-serialize", err))
    }

    /// Loads a configuration file; `.json` files are read as JSON, anything
    /// else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TxError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| {
            TxError::Serde(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        let is_json = path.extension().map_or(false, |ext| ext == "json");
        log::debug!("loading decode config from {}", path.display());
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Builds traces from `spots` and decodes them against `codebook`.
    pub fn run(
        &self,
        codebook: &Codebook,
        spots: &SpotFindingResults,
    ) -> Result<IntensityTable, TxError> {
        let table = self.traces.build(spots)?;
        let decoded = self.decoder.decode(codebook, table)?;
        log::info!(
            "decoded {} of {} features against {} genes",
            decoded.n_decoded(),
            decoded.n_features(),
            codebook.n_genes()
        );
        Ok(decoded)
    }
}
