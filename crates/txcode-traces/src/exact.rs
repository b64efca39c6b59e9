use txcode_core::{ErrorInfo, TxError};

use crate::builder::TraceBuilder;
use crate::intensity_table::IntensityTable;
use crate::spots::SpotFindingResults;

/// Builds one feature per spot of the first `(round, channel)` table and reads
/// every other table at the same position.
///
/// All tables must list the same spots in the same order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactMatchBuilder;

fn trace_error(info: ErrorInfo) -> TxError {
    TxError::Trace(info)
}

impl TraceBuilder for ExactMatchBuilder {
    fn build(&self, spots: &SpotFindingResults) -> Result<IntensityTable, TxError> {
        let (Some(&round0), Some(&ch0)) = (spots.round_labels().first(), spots.ch_labels().first())
        else {
            let info = ErrorInfo::new("empty-results", "spot finding results declare no labels");
            return Err(trace_error(info));
        };
        let reference = spots.get(round0, ch0)?.spots();

        let mut table = IntensityTable::zeros(
            reference.to_vec(),
            spots.ch_labels(),
            spots.round_labels(),
        )?;

        for &round in spots.round_labels() {
            for &channel in spots.ch_labels() {
                let detections = spots.get(round, channel)?.spots();
                if detections.len() != reference.len() {
                    let info = ErrorInfo::new(
                        "detection-count-mismatch",
                        "every table must hold as many spots as the reference",
                    )
                    .with_context("round", round)
                    .with_context("channel", channel)
                    .with_context("expected", reference.len())
                    .with_context("actual", detections.len());
                    return Err(trace_error(info));
                }
                for (feature, (spot, anchor)) in detections.iter().zip(reference).enumerate() {
                    if !spot.same_position(anchor) {
                        let info = ErrorInfo::new(
                            "detection-misaligned",
                            "spot coordinates differ from the reference",
                        )
                        .with_context("round", round)
                        .with_context("channel", channel)
                        .with_context("feature", feature);
                        return Err(trace_error(info));
                    }
                    table.set_intensity(feature, round, channel, spot.intensity)?;
                }
            }
        }

        log::debug!(
            "exact-match traces: {} features over {} rounds x {} channels ({} detections)",
            table.n_features(),
            spots.round_labels().len(),
            spots.ch_labels().len(),
            spots.total_spots()
        );
        Ok(table)
    }
}
