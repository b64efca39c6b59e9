//! L-p normalization of flattened features.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, TxError};
use crate::tensor::LabeledTensor;

/// Vector norm applied to flattened features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NormOrder {
    /// Sum of absolute values.
    L1,
    /// Euclidean norm.
    #[default]
    L2,
    /// General `(Σ|x|^p)^(1/p)` norm.
    Lp {
        /// Exponent, strictly positive and finite.
        p: f64,
    },
    /// Largest absolute value.
    Max,
}

impl NormOrder {
    /// Builds the order matching an integer `ord` argument (`1`, `2`, ...).
    pub fn from_order(order: u32) -> Result<Self, TxError> {
        match order {
            0 => Err(invalid_order(0.0)),
            1 => Ok(NormOrder::L1),
            2 => Ok(NormOrder::L2),
            p => Ok(NormOrder::Lp { p: f64::from(p) }),
        }
    }

    fn validate(&self) -> Result<(), TxError> {
        match *self {
            NormOrder::Lp { p } if !(p.is_finite() && p > 0.0) => Err(invalid_order(p)),
            _ => Ok(()),
        }
    }

    /// Computes the norm of `values`.
    pub fn norm(&self, values: &[f64]) -> f64 {
        match *self {
            NormOrder::L1 => values.iter().map(|v| v.abs()).sum(),
            NormOrder::L2 => values.iter().map(|v| v * v).sum::<f64>().sqrt(),
            NormOrder::Lp { p } => values
                .iter()
                .map(|v| v.abs().powf(p))
                .sum::<f64>()
                .powf(1.0 / p),
            NormOrder::Max => values.iter().fold(0.0, |acc, v| acc.max(v.abs())),
        }
    }
}

fn invalid_order(p: f64) -> TxError {
    TxError::Tensor(
        ErrorInfo::new("invalid-norm-order", "norm order must be positive and finite")
            .with_context("p", p),
    )
}

/// Value written into every cell of an all-zero feature of length `n`.
///
/// The missing signal is spread evenly: it is the norm of the uniform vector
/// `(1/n, ..., 1/n)` divided by `n`.
pub fn partitioned_intensity(n: usize, order: NormOrder) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let uniform = vec![1.0 / n as f64; n];
    order.norm(&uniform) / n as f64
}

/// Normalizes every feature of `tensor` to unit length under `order`.
///
/// Returns the normalized tensor and the pre-normalization norm of each
/// feature. Features whose norm is zero are filled with
/// [`partitioned_intensity`] instead of NaN.
pub fn normalize_features(
    tensor: &LabeledTensor,
    order: NormOrder,
) -> Result<(LabeledTensor, Vec<f64>), TxError> {
    order.validate()?;
    let fill = partitioned_intensity(tensor.code_length(), order);
    let mut normalized = tensor.clone();
    let mut norms = Vec::with_capacity(tensor.n_features());
    for f in 0..tensor.n_features() {
        let norm = order.norm(tensor.feature(f));
        let values = normalized.feature_mut(f);
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        } else {
            values.iter_mut().for_each(|v| *v = fill);
        }
        norms.push(norm);
    }
    Ok((normalized, norms))
}
