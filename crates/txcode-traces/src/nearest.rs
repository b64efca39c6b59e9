use serde::{Deserialize, Serialize};
use txcode_core::{ErrorInfo, TxError};

use crate::builder::TraceBuilder;
use crate::intensity_table::IntensityTable;
use crate::kdtree::SpotTree;
use crate::spots::{Spot, SpotFindingResults};

/// Links detections across rounds to the spots of an anchor round.
///
/// Every anchor-round spot seeds one feature. For each other round the
/// nearest detection (any channel) within `search_radius` pixels is written
/// into the feature at that detection's channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearestNeighborBuilder {
    /// Round whose spots seed features.
    pub anchor_round: usize,
    /// Inclusive matching radius in pixels.
    pub search_radius: f64,
}

impl Default for NearestNeighborBuilder {
    fn default() -> Self {
        Self {
            anchor_round: 1,
            search_radius: 3.0,
        }
    }
}

struct RoundSpots {
    round: usize,
    spots: Vec<(usize, Spot)>,
}

fn merge_by_round(results: &SpotFindingResults) -> Vec<RoundSpots> {
    results
        .round_labels()
        .iter()
        .map(|&round| {
            let spots = results
                .iter()
                .filter(|((r, _), _)| *r == round)
                .flat_map(|((_, channel), table)| {
                    table.spots().iter().map(move |spot| (*channel, *spot))
                })
                .collect();
            RoundSpots { round, spots }
        })
        .collect()
}

impl NearestNeighborBuilder {
    /// Builder with an explicit anchor round and radius.
    pub fn new(anchor_round: usize, search_radius: f64) -> Self {
        Self {
            anchor_round,
            search_radius,
        }
    }

    fn validate(&self, results: &SpotFindingResults) -> Result<(), TxError> {
        if self.search_radius.is_nan() || self.search_radius < 0.0 {
            let info = ErrorInfo::new("invalid-search-radius", "search radius must be non-negative")
                .with_context("search_radius", self.search_radius);
            return Err(TxError::Trace(info));
        }
        for ((round, channel), table) in results.iter() {
            if let Some(idx) = table
                .spots()
                .iter()
                .position(|spot| !spot.position().iter().all(|v| v.is_finite()))
            {
                let info = ErrorInfo::new(
                    "non-finite-coordinate",
                    "spot coordinates must be finite for spatial matching",
                )
                .with_context("round", round)
                .with_context("channel", channel)
                .with_context("spot", idx);
                return Err(TxError::Trace(info));
            }
        }
        if !results.round_labels().contains(&self.anchor_round) {
            let info = ErrorInfo::new("anchor-round-missing", "anchor round has no detections")
                .with_context("anchor_round", self.anchor_round)
                .with_hint("choose one of the rounds present in the spot finding results");
            return Err(TxError::Trace(info));
        }
        Ok(())
    }
}

impl TraceBuilder for NearestNeighborBuilder {
    fn build(&self, results: &SpotFindingResults) -> Result<IntensityTable, TxError> {
        self.validate(results)?;
        let rounds = merge_by_round(results);
        let anchors: Vec<(usize, Spot)> = rounds
            .iter()
            .find(|r| r.round == self.anchor_round)
            .map(|r| r.spots.clone())
            .unwrap_or_default();

        let attributes = anchors.iter().map(|(_, spot)| *spot).collect();
        let mut table =
            IntensityTable::zeros(attributes, results.ch_labels(), results.round_labels())?;
        for (feature, (channel, spot)) in anchors.iter().enumerate() {
            table.set_intensity(feature, self.anchor_round, *channel, spot.intensity)?;
        }

        for round in rounds.iter().filter(|r| r.round != self.anchor_round) {
            let positions: Vec<[f64; 3]> = round.spots.iter().map(|(_, s)| s.position()).collect();
            let tree = SpotTree::<3>::build(&positions);
            let mut claimed = vec![false; round.spots.len()];
            for (feature, (_, anchor)) in anchors.iter().enumerate() {
                let Some(hit) = tree.nearest_within(&anchor.position(), self.search_radius) else {
                    continue;
                };
                let (channel, spot) = round.spots[hit.index];
                table.set_intensity(feature, round.round, channel, spot.intensity)?;
                claimed[hit.index] = true;
            }
            let orphans = claimed.iter().filter(|c| !**c).count();
            if orphans > 0 {
                log::debug!(
                    "round {}: {orphans} of {} detections matched no anchor spot",
                    round.round,
                    round.spots.len()
                );
            }
        }

        log::debug!(
            "nearest-neighbor traces: {} features anchored on round {} from {} detections",
            table.n_features(),
            self.anchor_round,
            results.total_spots()
        );
        Ok(table)
    }
}
