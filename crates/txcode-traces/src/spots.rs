//! Detected spot tables and the per-`(round, channel)` result container.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use txcode_core::{ErrorInfo, TxError};

/// A single detected spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    /// Column coordinate in pixels.
    pub x: f64,
    /// Row coordinate in pixels.
    pub y: f64,
    /// Focal plane coordinate.
    #[serde(default)]
    pub z: f64,
    /// Estimated spot radius in pixels.
    #[serde(default)]
    pub radius: f64,
    /// Measured intensity.
    pub intensity: f64,
}

impl Spot {
    /// Creates a spot in the `z = 0` plane with unit radius.
    pub fn new(x: f64, y: f64, intensity: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            radius: 1.0,
            intensity,
        }
    }

    /// Returns a copy placed at focal plane `z`.
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Position as `[x, y, z]`.
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns whether both spots sit at identical coordinates.
    pub fn same_position(&self, other: &Spot) -> bool {
        self.position() == other.position()
    }
}

/// Ordered table of spots detected in one `(round, channel)` image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotAttributes {
    spots: Vec<Spot>,
}

impl SpotAttributes {
    /// Wraps a list of spots.
    pub fn new(spots: Vec<Spot>) -> Self {
        Self { spots }
    }

    /// Number of spots.
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Spots in detection order.
    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    /// Intensity column.
    pub fn intensities(&self) -> impl Iterator<Item = f64> + '_ {
        self.spots.iter().map(|s| s.intensity)
    }
}

impl From<Vec<Spot>> for SpotAttributes {
    fn from(spots: Vec<Spot>) -> Self {
        Self::new(spots)
    }
}

fn trace_error(info: ErrorInfo) -> TxError {
    TxError::Trace(info)
}

/// Spot tables keyed by `(round, channel)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpotFindingResults {
    round_labels: Vec<usize>,
    ch_labels: Vec<usize>,
    tables: BTreeMap<(usize, usize), SpotAttributes>,
}

impl SpotFindingResults {
    /// Creates an empty container for the declared rounds and channels.
    ///
    /// Labels are stored sorted and must be unique.
    pub fn new(round_labels: Vec<usize>, ch_labels: Vec<usize>) -> Result<Self, TxError> {
        Ok(Self {
            round_labels: sorted_unique(round_labels, "round")?,
            ch_labels: sorted_unique(ch_labels, "channel")?,
            tables: BTreeMap::new(),
        })
    }

    /// Builds a container whose labels are the ones observed in `tables`.
    pub fn from_tables(
        tables: impl IntoIterator<Item = ((usize, usize), SpotAttributes)>,
    ) -> Self {
        let tables: BTreeMap<_, _> = tables.into_iter().collect();
        let rounds: BTreeSet<usize> = tables.keys().map(|(r, _)| *r).collect();
        let channels: BTreeSet<usize> = tables.keys().map(|(_, c)| *c).collect();
        Self {
            round_labels: rounds.into_iter().collect(),
            ch_labels: channels.into_iter().collect(),
            tables,
        }
    }

    /// Stores the table for `(round, channel)`, replacing any previous one.
    pub fn insert(
        &mut self,
        round: usize,
        channel: usize,
        spots: impl Into<SpotAttributes>,
    ) -> Result<(), TxError> {
        if !self.round_labels.contains(&round) || !self.ch_labels.contains(&channel) {
            let info = ErrorInfo::new("undeclared-label", "round or channel was not declared")
                .with_context("round", round)
                .with_context("channel", channel);
            return Err(trace_error(info));
        }
        self.tables.insert((round, channel), spots.into());
        Ok(())
    }

    /// Looks up the table for `(round, channel)`.
    pub fn get(&self, round: usize, channel: usize) -> Result<&SpotAttributes, TxError> {
        self.tables.get(&(round, channel)).ok_or_else(|| {
            trace_error(
                ErrorInfo::new("table-missing", "no spot table for round and channel")
                    .with_context("round", round)
                    .with_context("channel", channel),
            )
        })
    }

    /// Iterates over `((round, channel), table)` in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&(usize, usize), &SpotAttributes)> {
        self.tables.iter()
    }

    /// `(round, channel)` keys present.
    pub fn keys(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.tables.keys().copied()
    }

    /// Sorted round labels.
    pub fn round_labels(&self) -> &[usize] {
        &self.round_labels
    }

    /// Sorted channel labels.
    pub fn ch_labels(&self) -> &[usize] {
        &self.ch_labels
    }

    /// Total number of detections across all tables.
    pub fn total_spots(&self) -> usize {
        self.tables.values().map(SpotAttributes::len).sum()
    }
}

fn sorted_unique(mut labels: Vec<usize>, axis: &str) -> Result<Vec<usize>, TxError> {
    let before = labels.len();
    labels.sort_unstable();
    labels.dedup();
    if labels.len() != before {
        let info = ErrorInfo::new("duplicate-label", "axis labels must be unique")
            .with_context("axis", axis);
        return Err(trace_error(info));
    }
    Ok(labels)
}
