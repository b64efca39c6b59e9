use serde::{Deserialize, Serialize};
use txcode_codebook::Codebook;
use txcode_core::{normalize_features, ErrorInfo, LabeledTensor, Metric, NormOrder, TxError, NO_GENE};
use txcode_traces::IntensityTable;

use crate::decoder::{check_labels, Decoder};

/// Nearest code returned by [`CodeIndex::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeMatch {
    /// Position of the code in codebook order.
    pub index: usize,
    /// Distance from the query under the index metric.
    pub distance: f64,
}

/// Exhaustive k = 1 search over a set of flattened codes.
///
/// Equidistant codes resolve to the lowest index.
#[derive(Debug, Clone)]
pub struct CodeIndex<'a> {
    codes: &'a LabeledTensor,
    metric: Metric,
}

impl<'a> CodeIndex<'a> {
    /// Indexes every feature of `codes`.
    pub fn new(codes: &'a LabeledTensor, metric: Metric) -> Self {
        Self { codes, metric }
    }

    /// Closest code to `query`, or `None` when the index is empty.
    pub fn nearest(&self, query: &[f64]) -> Option<CodeMatch> {
        let mut best: Option<CodeMatch> = None;
        for (index, code) in self.codes.features().enumerate() {
            let distance = self.metric.distance(query, code);
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(CodeMatch { index, distance });
            }
        }
        best
    }
}

/// Decodes features to the nearest normalized code.
///
/// Features whose pre-normalization norm is below `min_intensity`, or whose
/// nearest code is further than `max_distance`, are labeled `"None"`. The
/// distance column is filled for every feature, masked or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricDecoder {
    /// Largest accepted distance to the nearest code.
    pub max_distance: f64,
    /// Smallest accepted feature norm before normalization.
    pub min_intensity: f64,
    /// Norm applied to codes and traces.
    pub norm_order: NormOrder,
    /// Metric of the nearest-code search.
    pub metric: Metric,
}

impl Default for MetricDecoder {
    fn default() -> Self {
        Self {
            max_distance: f64::INFINITY,
            min_intensity: 0.0,
            norm_order: NormOrder::L2,
            metric: Metric::Euclidean,
        }
    }
}

impl MetricDecoder {
    /// Euclidean decoder over L2-normalized vectors with the given thresholds.
    pub fn new(max_distance: f64, min_intensity: f64) -> Self {
        Self {
            max_distance,
            min_intensity,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), TxError> {
        if !self.metric.is_valid() {
            let info = ErrorInfo::new("invalid-metric", "minkowski exponent must be at least 1")
                .with_context("metric", format!("{:?}", self.metric));
            return Err(TxError::Decode(info));
        }
        for (name, value) in [
            ("max_distance", self.max_distance),
            ("min_intensity", self.min_intensity),
        ] {
            if value.is_nan() {
                let info = ErrorInfo::new("invalid-threshold", "decode thresholds must be numbers")
                    .with_context("threshold", name);
                return Err(TxError::Decode(info));
            }
        }
        Ok(())
    }
}

impl Decoder for MetricDecoder {
    fn decode(
        &self,
        codebook: &Codebook,
        mut table: IntensityTable,
    ) -> Result<IntensityTable, TxError> {
        self.validate()?;
        check_labels(codebook, &table)?;

        let (codes, _) = codebook.normalized(self.norm_order)?;
        let (traces, norms) = normalize_features(table.intensities(), self.norm_order)?;
        let index = CodeIndex::new(&codes, self.metric);

        let mut genes = Vec::with_capacity(traces.n_features());
        let mut distances = Vec::with_capacity(traces.n_features());
        let (mut dim, mut distant) = (0usize, 0usize);
        for (feature, norm) in traces.features().zip(&norms) {
            let nearest = index.nearest(feature);
            let distance = nearest.map_or(f64::INFINITY, |m| m.distance);
            let too_dim = *norm < self.min_intensity;
            let too_far = distance > self.max_distance;
            dim += usize::from(too_dim);
            distant += usize::from(too_far);
            let gene = match nearest {
                Some(m) if !too_dim && !too_far => codebook.genes()[m.index].clone(),
                _ => NO_GENE.to_string(),
            };
            genes.push(gene);
            distances.push(distance);
        }

        log::debug!(
            "metric decode: {} features, {dim} below min_intensity, {distant} beyond max_distance",
            genes.len()
        );
        table.set_gene_names(genes)?;
        table.set_distances(distances)?;
        Ok(table)
    }
}
