use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use txcode_core::{
    axis_name, normalize_features, Axis, ErrorInfo, LabeledTensor, NormOrder, TxError,
};

use crate::hash;
use crate::record::{CodeRecord, CodewordEntry, CODEWORD, GENE, VALUE};

/// Immutable tensor of expected codes, shape `(genes, channels, rounds)`.
#[derive(Clone, PartialEq)]
pub struct Codebook {
    genes: Vec<String>,
    codes: LabeledTensor,
}

impl fmt::Debug for Codebook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codebook")
            .field("genes", &self.genes)
            .field("n_channels", &self.n_channels())
            .field("n_rounds", &self.n_rounds())
            .finish_non_exhaustive()
    }
}

fn codebook_error(info: ErrorInfo) -> TxError {
    TxError::Codebook(info)
}

fn check_dimension(
    dimension: &str,
    max_index: Option<usize>,
    declared: Option<usize>,
) -> Result<usize, TxError> {
    let required = max_index.map_or(0, |idx| idx + 1);
    match declared {
        None => Ok(required.max(1)),
        Some(declared) if required > declared => {
            let info = ErrorInfo::new(
                format!("{dimension}-out-of-range"),
                format!("codeword requires a {dimension} index beyond the declared size"),
            )
            .with_context("dimension", dimension)
            .with_context("required", required)
            .with_context("declared", declared);
            Err(codebook_error(info))
        }
        Some(declared) => Ok(declared),
    }
}

fn check_codeword_cells(record: usize, cells: &[Value]) -> Result<(), TxError> {
    let fields = [axis_name(Axis::Round), axis_name(Axis::Channel), VALUE];
    for (cell_idx, cell) in cells.iter().enumerate() {
        let missing: Vec<&str> = fields
            .into_iter()
            .filter(|field| cell.get(*field).is_none())
            .collect();
        if !missing.is_empty() {
            let info = ErrorInfo::new(
                "codeword-entry-incomplete",
                "each codeword entry needs a round, a channel and a value",
            )
            .with_context("record", record)
            .with_context("entry", cell_idx)
            .with_context("missing", missing.join(","));
            return Err(codebook_error(info));
        }
    }
    Ok(())
}

impl Codebook {
    /// Builds a codebook from typed records.
    ///
    /// Missing dimensions are inferred as the largest index observed plus
    /// one (at least one). A declared dimension smaller than that fails with
    /// `round-out-of-range` or `channel-out-of-range`.
    pub fn from_code_array(
        records: &[CodeRecord],
        n_rounds: Option<usize>,
        n_channels: Option<usize>,
    ) -> Result<Self, TxError> {
        let entries = records.iter().flat_map(|record| &record.codeword);
        let max_round = entries.clone().map(|entry| entry.r).max();
        let max_channel = entries.map(|entry| entry.c).max();
        let n_rounds = check_dimension("round", max_round, n_rounds)?;
        let n_channels = check_dimension("channel", max_channel, n_channels)?;

        let genes: Vec<String> = records.iter().map(|r| r.gene_name.clone()).collect();
        let mut codes = LabeledTensor::zeros_indexed(records.len(), n_channels, n_rounds);
        for (g, record) in records.iter().enumerate() {
            for entry in &record.codeword {
                codes.set(g, entry.c, entry.r, entry.v);
            }
        }

        let codebook = Self::from_parts(genes, codes)?;
        log::debug!(
            "built codebook with {} genes over {} rounds x {} channels",
            codebook.n_genes(),
            n_rounds,
            n_channels
        );
        Ok(codebook)
    }

    /// Builds a codebook from untyped JSON, validating the record structure.
    pub fn from_json_value(
        value: Value,
        n_rounds: Option<usize>,
        n_channels: Option<usize>,
    ) -> Result<Self, TxError> {
        let Value::Array(entries) = value else {
            return Err(codebook_error(ErrorInfo::new(
                "codebook-not-array",
                "codebook must be an array of code records",
            )));
        };

        let mut records = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.into_iter().enumerate() {
            let Value::Object(map) = &entry else {
                let info = ErrorInfo::new(
                    "record-not-object",
                    "codebook must be an array of dictionary codes",
                )
                .with_context("record", idx)
                .with_context("found", entry.to_string());
                return Err(codebook_error(info));
            };
            let missing: Vec<&str> = [CODEWORD, GENE]
                .into_iter()
                .filter(|field| !map.contains_key(*field))
                .collect();
            if !missing.is_empty() {
                let info = ErrorInfo::new(
                    "missing-fields",
                    format!("each codebook record must contain {CODEWORD} and {GENE}"),
                )
                .with_context("record", idx)
                .with_context("missing", missing.join(","));
                return Err(codebook_error(info));
            }
            if let Some(Value::Array(cells)) = map.get(CODEWORD) {
                check_codeword_cells(idx, cells)?;
            }
            let record: CodeRecord = serde_json::from_value(entry).map_err(|err| {
                TxError::Serde(
                    ErrorInfo::new("record-malformed", err.to_string()).with_context("record", idx),
                )
            })?;
            records.push(record);
        }
        Self::from_code_array(&records, n_rounds, n_channels)
    }

    /// Parses a JSON document in the codebook schema.
    pub fn from_json_str(
        json: &str,
        n_rounds: Option<usize>,
        n_channels: Option<usize>,
    ) -> Result<Self, TxError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|err| TxError::Serde(ErrorInfo::new("json-deserialize", err.to_string())))?;
        Self::from_json_value(value, n_rounds, n_channels)
    }

    /// Wraps gene labels and a code tensor after validating the invariants.
    pub fn from_parts(genes: Vec<String>, codes: LabeledTensor) -> Result<Self, TxError> {
        if genes.len() != codes.n_features() {
            let info = ErrorInfo::new("gene-count-mismatch", "one gene label per code required")
                .with_context("genes", genes.len())
                .with_context("codes", codes.n_features());
            return Err(codebook_error(info));
        }
        let mut seen = BTreeMap::new();
        for (idx, gene) in genes.iter().enumerate() {
            if let Some(first) = seen.insert(gene.as_str(), idx) {
                let info = ErrorInfo::new("duplicate-gene", "gene labels must be unique")
                    .with_context("gene", gene)
                    .with_context("first_record", first)
                    .with_context("record", idx);
                return Err(codebook_error(info));
            }
        }
        for (idx, code) in codes.features().enumerate() {
            if let Some(value) = code.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
                let info = ErrorInfo::new(
                    "invalid-code-value",
                    "code values must be finite and non-negative",
                )
                .with_context("gene", &genes[idx])
                .with_context("value", value);
                return Err(codebook_error(info));
            }
        }
        Ok(Self { genes, codes })
    }

    /// Gene labels in code order.
    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    /// The underlying `(genes, channels, rounds)` tensor.
    pub fn codes(&self) -> &LabeledTensor {
        &self.codes
    }

    /// Number of genes.
    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    /// Number of rounds.
    pub fn n_rounds(&self) -> usize {
        self.codes.n_rounds()
    }

    /// Number of channels.
    pub fn n_channels(&self) -> usize {
        self.codes.n_channels()
    }

    /// Length of every code, `channels * rounds`.
    pub fn code_length(&self) -> usize {
        self.codes.code_length()
    }

    /// Position of a gene in code order.
    pub fn gene_index(&self, gene: &str) -> Option<usize> {
        self.genes.iter().position(|g| g == gene)
    }

    /// Flattened channel-major code of a gene.
    pub fn code(&self, gene: &str) -> Option<&[f64]> {
        self.gene_index(gene).map(|idx| self.codes.feature(idx))
    }

    /// Expected value of a gene at `(round, channel)`.
    pub fn value(&self, gene: &str, round: usize, channel: usize) -> Option<f64> {
        let idx = self.gene_index(gene)?;
        self.codes.get_labeled(idx, round, channel).ok()
    }

    /// Emits the sparse record form: non-zero cells only, channel-major.
    pub fn to_code_array(&self) -> Vec<CodeRecord> {
        let channels = self.codes.channel_labels();
        let rounds = self.codes.round_labels();
        self.genes
            .iter()
            .enumerate()
            .map(|(g, gene)| {
                let mut codeword = Vec::new();
                for (c, &channel) in channels.iter().enumerate() {
                    for (r, &round) in rounds.iter().enumerate() {
                        let v = self.codes.get(g, c, r);
                        if v != 0.0 {
                            codeword.push(CodewordEntry::new(round, channel, v));
                        }
                    }
                }
                CodeRecord::new(gene.clone(), codeword)
            })
            .collect()
    }

    /// Codes scaled to unit `order`-norm, with the pre-normalization norms.
    pub fn normalized(&self, order: NormOrder) -> Result<(LabeledTensor, Vec<f64>), TxError> {
        normalize_features(&self.codes, order)
    }

    /// Computes the canonical structural hash of the codebook.
    pub fn canonical_hash(&self) -> String {
        hash::canonical_codebook_hash(self)
    }
}
