//! Dense `(feature, channel, round)` tensor with explicit axis labels.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, TxError};

/// Dense tensor of shape `(features, channels, rounds)` with labeled axes.
///
/// Each feature is stored as a contiguous channel-major slice: the cell for
/// channel position `c` and round position `r` lives at offset
/// `c * n_rounds + r` inside the feature. That flattened slice is the vector
/// used for normalization and nearest-code search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TensorParts", into = "TensorParts")]
pub struct LabeledTensor {
    data: Vec<f64>,
    n_features: usize,
    channels: Vec<usize>,
    rounds: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TensorParts {
    n_features: usize,
    channels: Vec<usize>,
    rounds: Vec<usize>,
    data: Vec<f64>,
}

impl TryFrom<TensorParts> for LabeledTensor {
    type Error = TxError;

    fn try_from(parts: TensorParts) -> Result<Self, Self::Error> {
        LabeledTensor::from_data(parts.n_features, parts.channels, parts.rounds, parts.data)
    }
}

impl From<LabeledTensor> for TensorParts {
    fn from(tensor: LabeledTensor) -> Self {
        Self {
            n_features: tensor.n_features,
            channels: tensor.channels,
            rounds: tensor.rounds,
            data: tensor.data,
        }
    }
}

fn check_unique(labels: &[usize], axis: &str) -> Result<(), TxError> {
    let mut seen = BTreeSet::new();
    for &label in labels {
        if !seen.insert(label) {
            let info = ErrorInfo::new("duplicate-label", "axis labels must be unique")
                .with_context("axis", axis)
                .with_context("label", label);
            return Err(TxError::Tensor(info));
        }
    }
    Ok(())
}

impl LabeledTensor {
    /// Creates an all-zero tensor with the provided labels.
    pub fn zeros(
        n_features: usize,
        channels: Vec<usize>,
        rounds: Vec<usize>,
    ) -> Result<Self, TxError> {
        let len = n_features * channels.len() * rounds.len();
        Self::from_data(n_features, channels, rounds, vec![0.0; len])
    }

    /// Creates a zero tensor whose labels are `0..n_channels` and `0..n_rounds`.
    pub fn zeros_indexed(n_features: usize, n_channels: usize, n_rounds: usize) -> Self {
        Self {
            data: vec![0.0; n_features * n_channels * n_rounds],
            n_features,
            channels: (0..n_channels).collect(),
            rounds: (0..n_rounds).collect(),
        }
    }

    /// Wraps an existing channel-major buffer.
    pub fn from_data(
        n_features: usize,
        channels: Vec<usize>,
        rounds: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self, TxError> {
        check_unique(&channels, "channel")?;
        check_unique(&rounds, "round")?;
        let expected = n_features * channels.len() * rounds.len();
        if data.len() != expected {
            let info = ErrorInfo::new("shape-mismatch", "buffer length does not match tensor shape")
                .with_context("expected", expected)
                .with_context("actual", data.len());
            return Err(TxError::Tensor(info));
        }
        Ok(Self {
            data,
            n_features,
            channels,
            rounds,
        })
    }

    /// Returns `(features, channels, rounds)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_features, self.channels.len(), self.rounds.len())
    }

    /// Number of features along the leading axis.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of channels.
    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of rounds.
    pub fn n_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Length of a flattened feature, `channels * rounds`.
    pub fn code_length(&self) -> usize {
        self.channels.len() * self.rounds.len()
    }

    /// Channel labels in storage order.
    pub fn channel_labels(&self) -> &[usize] {
        &self.channels
    }

    /// Round labels in storage order.
    pub fn round_labels(&self) -> &[usize] {
        &self.rounds
    }

    /// Returns whether both tensors use identical channel and round labels.
    pub fn same_labels(&self, other: &LabeledTensor) -> bool {
        self.channels == other.channels && self.rounds == other.rounds
    }

    /// Position of a channel label.
    pub fn channel_position(&self, label: usize) -> Option<usize> {
        self.channels.iter().position(|&c| c == label)
    }

    /// Position of a round label.
    pub fn round_position(&self, label: usize) -> Option<usize> {
        self.rounds.iter().position(|&r| r == label)
    }

    fn offset(&self, feature: usize, channel: usize, round: usize) -> usize {
        (feature * self.channels.len() + channel) * self.rounds.len() + round
    }

    /// Reads a cell by position. Panics when a position is out of range.
    pub fn get(&self, feature: usize, channel: usize, round: usize) -> f64 {
        self.data[self.offset(feature, channel, round)]
    }

    /// Writes a cell by position. Panics when a position is out of range.
    pub fn set(&mut self, feature: usize, channel: usize, round: usize, value: f64) {
        let offset = self.offset(feature, channel, round);
        self.data[offset] = value;
    }

    /// Writes a cell addressed by round and channel labels.
    pub fn set_labeled(
        &mut self,
        feature: usize,
        round: usize,
        channel: usize,
        value: f64,
    ) -> Result<(), TxError> {
        let (c, r) = self.positions(round, channel)?;
        if feature >= self.n_features {
            let info = ErrorInfo::new("feature-out-of-range", "feature index outside tensor")
                .with_context("feature", feature)
                .with_context("n_features", self.n_features);
            return Err(TxError::Tensor(info));
        }
        self.set(feature, c, r, value);
        Ok(())
    }

    /// Reads a cell addressed by round and channel labels.
    pub fn get_labeled(&self, feature: usize, round: usize, channel: usize) -> Result<f64, TxError> {
        let (c, r) = self.positions(round, channel)?;
        if feature >= self.n_features {
            let info = ErrorInfo::new("feature-out-of-range", "feature index outside tensor")
                .with_context("feature", feature)
                .with_context("n_features", self.n_features);
            return Err(TxError::Tensor(info));
        }
        Ok(self.get(feature, c, r))
    }

    fn positions(&self, round: usize, channel: usize) -> Result<(usize, usize), TxError> {
        let c = self.channel_position(channel).ok_or_else(|| {
            TxError::Tensor(
                ErrorInfo::new("unknown-label", "channel label not present in tensor")
                    .with_context("channel", channel),
            )
        })?;
        let r = self.round_position(round).ok_or_else(|| {
            TxError::Tensor(
                ErrorInfo::new("unknown-label", "round label not present in tensor")
                    .with_context("round", round),
            )
        })?;
        Ok((c, r))
    }

    /// Flattened `(channel, round)` vector of one feature.
    pub fn feature(&self, feature: usize) -> &[f64] {
        let len = self.code_length();
        &self.data[feature * len..(feature + 1) * len]
    }

    /// Mutable flattened vector of one feature.
    pub fn feature_mut(&mut self, feature: usize) -> &mut [f64] {
        let len = self.code_length();
        &mut self.data[feature * len..(feature + 1) * len]
    }

    /// Iterates over all flattened features in order.
    pub fn features(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.n_features).map(move |f| self.feature(f))
    }

    /// Raw channel-major buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// For every round, the channel position holding the largest value of a
    /// feature. Ties resolve to the lowest channel position.
    pub fn argmax_channels(&self, feature: usize) -> Vec<usize> {
        let values = self.feature(feature);
        let n_rounds = self.rounds.len();
        (0..n_rounds)
            .map(|r| {
                let mut best = 0;
                let mut best_value = f64::NEG_INFINITY;
                for c in 0..self.channels.len() {
                    let v = values[c * n_rounds + r];
                    if v > best_value {
                        best = c;
                        best_value = v;
                    }
                }
                best
            })
            .collect()
    }
}
