//! Per-feature intensity traces with optional decoded columns.

use serde::{Deserialize, Serialize};
use txcode_core::{ErrorInfo, LabeledTensor, TxError, NO_GENE};

use crate::spots::Spot;

/// Features × channels × rounds intensities plus per-feature columns.
///
/// `attributes[f]` is the detection that seeded feature `f`. Decoders attach
/// `gene_names` and `distances`; both, when present, hold one entry per
/// feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableParts", into = "TableParts")]
pub struct IntensityTable {
    attributes: Vec<Spot>,
    intensities: LabeledTensor,
    gene_names: Option<Vec<String>>,
    distances: Option<Vec<f64>>,
}

// JSON has no infinity, so an unreachable distance travels as `null`.
#[derive(Debug, Serialize, Deserialize)]
struct TableParts {
    attributes: Vec<Spot>,
    intensities: LabeledTensor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gene_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distances: Option<Vec<Option<f64>>>,
}

impl TryFrom<TableParts> for IntensityTable {
    type Error = TxError;

    fn try_from(parts: TableParts) -> Result<Self, Self::Error> {
        let mut table = IntensityTable::new(parts.attributes, parts.intensities)?;
        if let Some(genes) = parts.gene_names {
            table.set_gene_names(genes)?;
        }
        if let Some(distances) = parts.distances {
            let distances = distances
                .into_iter()
                .map(|d| d.unwrap_or(f64::INFINITY))
                .collect();
            table.set_distances(distances)?;
        }
        Ok(table)
    }
}

impl From<IntensityTable> for TableParts {
    fn from(table: IntensityTable) -> Self {
        Self {
            attributes: table.attributes,
            intensities: table.intensities,
            gene_names: table.gene_names,
            distances: table.distances.map(|distances| {
                distances
                    .into_iter()
                    .map(|d| d.is_finite().then_some(d))
                    .collect()
            }),
        }
    }
}

fn column_error(column: &str, expected: usize, actual: usize) -> TxError {
    TxError::Decode(
        ErrorInfo::new("column-length-mismatch", "column needs one entry per feature")
            .with_context("column", column)
            .with_context("expected", expected)
            .with_context("actual", actual),
    )
}

impl IntensityTable {
    /// Pairs feature attributes with their intensity tensor.
    pub fn new(attributes: Vec<Spot>, intensities: LabeledTensor) -> Result<Self, TxError> {
        if attributes.len() != intensities.n_features() {
            let info = ErrorInfo::new(
                "feature-count-mismatch",
                "one attribute row per intensity feature required",
            )
            .with_context("attributes", attributes.len())
            .with_context("features", intensities.n_features());
            return Err(TxError::Trace(info));
        }
        Ok(Self {
            attributes,
            intensities,
            gene_names: None,
            distances: None,
        })
    }

    /// Zero intensities for `attributes` over the given labels.
    pub fn zeros(
        attributes: Vec<Spot>,
        ch_labels: &[usize],
        round_labels: &[usize],
    ) -> Result<Self, TxError> {
        let intensities =
            LabeledTensor::zeros(attributes.len(), ch_labels.to_vec(), round_labels.to_vec())?;
        Self::new(attributes, intensities)
    }

    /// Writes one labeled intensity cell.
    pub fn set_intensity(
        &mut self,
        feature: usize,
        round: usize,
        channel: usize,
        value: f64,
    ) -> Result<(), TxError> {
        self.intensities.set_labeled(feature, round, channel, value)
    }

    /// Reads one labeled intensity cell.
    pub fn intensity(&self, feature: usize, round: usize, channel: usize) -> Result<f64, TxError> {
        self.intensities.get_labeled(feature, round, channel)
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.attributes.len()
    }

    /// Seeding detections, one per feature.
    pub fn attributes(&self) -> &[Spot] {
        &self.attributes
    }

    /// The `(features, channels, rounds)` tensor.
    pub fn intensities(&self) -> &LabeledTensor {
        &self.intensities
    }

    /// Decoded gene labels, if attached.
    pub fn gene_names(&self) -> Option<&[String]> {
        self.gene_names.as_deref()
    }

    /// Decoded distances, if attached.
    pub fn distances(&self) -> Option<&[f64]> {
        self.distances.as_deref()
    }

    /// Attaches the `gene_name` column, replacing any previous one.
    pub fn set_gene_names(&mut self, genes: Vec<String>) -> Result<(), TxError> {
        if genes.len() != self.n_features() {
            return Err(column_error("gene_name", self.n_features(), genes.len()));
        }
        self.gene_names = Some(genes);
        Ok(())
    }

    /// Attaches the `distance` column, replacing any previous one.
    pub fn set_distances(&mut self, distances: Vec<f64>) -> Result<(), TxError> {
        if distances.len() != self.n_features() {
            return Err(column_error("distance", self.n_features(), distances.len()));
        }
        self.distances = Some(distances);
        Ok(())
    }

    /// Number of features carrying a real gene label.
    pub fn n_decoded(&self) -> usize {
        self.gene_names
            .as_ref()
            .map_or(0, |genes| genes.iter().filter(|g| *g != NO_GENE).count())
    }

    /// Serializes the table, decoded columns included.
    pub fn to_json(&self) -> Result<String, TxError> {
        serde_json::to_string(self)
            .map_err(|err| TxError::Serde(ErrorInfo::new("json-serialize", err.to_string())))
    }

    /// Restores a table written by [`IntensityTable::to_json`].
    pub fn from_json(json: &str) -> Result<Self, TxError> {
        serde_json::from_str(json)
            .map_err(|err| TxError::Serde(ErrorInfo::new("json-deserialize", err.to_string())))
    }
}
