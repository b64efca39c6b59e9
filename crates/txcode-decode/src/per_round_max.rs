use serde::{Deserialize, Serialize};
use txcode_codebook::Codebook;
use txcode_core::{TxError, NO_GENE};
use txcode_traces::IntensityTable;

use crate::decoder::{check_labels, Decoder};

/// Which code wins when several codes share a feature's per-round pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchTieBreak {
    /// Earliest code in codebook order.
    First,
    /// Latest code in codebook order.
    #[default]
    Last,
}

/// Labels a feature with the code whose brightest channel agrees with the
/// feature's brightest channel in every round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerRoundMaxDecoder {
    /// Resolution of concurrent matches.
    pub tie_break: MatchTieBreak,
}

impl PerRoundMaxDecoder {
    /// Decoder with an explicit tie-break.
    pub fn new(tie_break: MatchTieBreak) -> Self {
        Self { tie_break }
    }
}

impl Decoder for PerRoundMaxDecoder {
    fn decode(
        &self,
        codebook: &Codebook,
        mut table: IntensityTable,
    ) -> Result<IntensityTable, TxError> {
        check_labels(codebook, &table)?;

        let codes = codebook.codes();
        let code_patterns: Vec<Vec<usize>> =
            (0..codes.n_features()).map(|g| codes.argmax_channels(g)).collect();

        let traces = table.intensities();
        let genes: Vec<String> = (0..traces.n_features())
            .map(|feature| {
                let pattern = traces.argmax_channels(feature);
                let mut matches = code_patterns.iter().enumerate().filter(|(_, p)| **p == pattern);
                let hit = match self.tie_break {
                    MatchTieBreak::First => matches.next(),
                    MatchTieBreak::Last => matches.last(),
                };
                hit.map_or_else(|| NO_GENE.to_string(), |(g, _)| codebook.genes()[g].clone())
            })
            .collect();

        let decoded = genes.iter().filter(|g| *g != NO_GENE).count();
        log::debug!("per-round-max decode: {decoded} of {} features matched", genes.len());
        table.set_gene_names(genes)?;
        Ok(table)
    }
}
