use serde::{Deserialize, Serialize};
use txcode_codebook::Codebook;
use txcode_core::{ErrorInfo, Metric, NormOrder, TxError};
use txcode_traces::IntensityTable;

use crate::metric::MetricDecoder;
use crate::per_round_max::PerRoundMaxDecoder;

/// Assigns a gene label to every feature of an intensity table.
///
/// The table is moved in and returned with decoded columns attached.
pub trait Decoder {
    /// Decodes `table` against `codebook`.
    fn decode(&self, codebook: &Codebook, table: IntensityTable)
        -> Result<IntensityTable, TxError>;
}

/// Configurable choice of decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum DecodingStrategy {
    /// Normalized nearest-code search.
    Metric(MetricDecoder),
    /// Exact agreement of the brightest channel in every round.
    PerRoundMax(PerRoundMaxDecoder),
}

impl Default for DecodingStrategy {
    fn default() -> Self {
        Self::Metric(MetricDecoder::default())
    }
}

impl Decoder for DecodingStrategy {
    fn decode(
        &self,
        codebook: &Codebook,
        table: IntensityTable,
    ) -> Result<IntensityTable, TxError> {
        match self {
            Self::Metric(decoder) => decoder.decode(codebook, table),
            Self::PerRoundMax(decoder) => decoder.decode(codebook, table),
        }
    }
}

/// Fails unless traces and codes share channel and round labels.
pub(crate) fn check_labels(codebook: &Codebook, table: &IntensityTable) -> Result<(), TxError> {
    let codes = codebook.codes();
    let traces = table.intensities();
    if codes.same_labels(traces) {
        return Ok(());
    }
    let info = ErrorInfo::new(
        "label-mismatch",
        "intensity table and codebook disagree on channel or round labels",
    )
    .with_context("codebook_channels", format!("{:?}", codes.channel_labels()))
    .with_context("codebook_rounds", format!("{:?}", codes.round_labels()))
    .with_context("table_channels", format!("{:?}", traces.channel_labels()))
    .with_context("table_rounds", format!("{:?}", traces.round_labels()))
    .with_hint("build the codebook with the same number of rounds and channels as the traces");
    Err(TxError::Decode(info))
}

/// Decoding entry points on [`Codebook`] itself.
pub trait CodebookDecode {
    /// Nearest normalized code per feature; see [`MetricDecoder`].
    fn metric_decode(
        &self,
        traces: IntensityTable,
        max_distance: f64,
        min_intensity: f64,
        norm_order: NormOrder,
        metric: Metric,
    ) -> Result<IntensityTable, TxError>;

    /// Per-round brightest-channel agreement with last-match tie-break; see
    /// [`PerRoundMaxDecoder`].
    fn decode_per_hyb_max(&self, traces: IntensityTable) -> Result<IntensityTable, TxError>;
}

impl CodebookDecode for Codebook {
    fn metric_decode(
        &self,
        traces: IntensityTable,
        max_distance: f64,
        min_intensity: f64,
        norm_order: NormOrder,
        metric: Metric,
    ) -> Result<IntensityTable, TxError> {
        let decoder = MetricDecoder {
            max_distance,
            min_intensity,
            norm_order,
            metric,
        };
        decoder.decode(self, traces)
    }

    fn decode_per_hyb_max(&self, traces: IntensityTable) -> Result<IntensityTable, TxError> {
        PerRoundMaxDecoder::default().decode(self, traces)
    }
}
