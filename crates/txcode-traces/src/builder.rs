use serde::{Deserialize, Serialize};
use txcode_core::TxError;

use crate::exact::ExactMatchBuilder;
use crate::intensity_table::IntensityTable;
use crate::nearest::NearestNeighborBuilder;
use crate::spots::SpotFindingResults;

/// Turns per-`(round, channel)` detections into per-feature traces.
pub trait TraceBuilder {
    /// Builds the intensity table for `spots`.
    fn build(&self, spots: &SpotFindingResults) -> Result<IntensityTable, TxError>;
}

/// Configurable choice of trace building strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum TraceBuildingStrategy {
    /// Detections are already aligned across rounds and channels.
    ExactMatch,
    /// Link detections to anchor-round spots by spatial proximity.
    NearestNeighbor(NearestNeighborBuilder),
}

impl Default for TraceBuildingStrategy {
    fn default() -> Self {
        Self::ExactMatch
    }
}

impl TraceBuilder for TraceBuildingStrategy {
    fn build(&self, spots: &SpotFindingResults) -> Result<IntensityTable, TxError> {
        match self {
            Self::ExactMatch => ExactMatchBuilder.build(spots),
            Self::NearestNeighbor(builder) => builder.build(spots),
        }
    }
}

/// Builds traces with the selected strategy.
pub fn build_traces(
    spots: &SpotFindingResults,
    strategy: &TraceBuildingStrategy,
) -> Result<IntensityTable, TxError> {
    strategy.build(spots)
}
