use std::collections::BTreeSet;

use rand::{Rng, RngCore};
use txcode_core::{ErrorInfo, RngHandle, TxError};
use uuid::Builder;

use crate::codebook::Codebook;
use crate::record::{CodeRecord, CodewordEntry};

const MAX_PREALLOCATED_CODES: usize = 1 << 16;

/// Number of distinct one-hot codes over `n_channels` channels and
/// `n_rounds` rounds, saturating at `usize::MAX`.
pub fn one_hot_capacity(n_rounds: usize, n_channels: usize) -> usize {
    let mut capacity = 1usize;
    for _ in 0..n_rounds {
        capacity = capacity.saturating_mul(n_channels);
        if capacity == 0 || capacity == usize::MAX {
            break;
        }
    }
    capacity
}

/// Generates a random gene identifier from the injected RNG.
pub fn random_gene_name(rng: &mut RngHandle) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    Builder::from_random_bytes(bytes).into_uuid().to_string()
}

/// Generates `n_codes` distinct codes with exactly one active channel per
/// round, drawn uniformly from `rng`.
///
/// Candidates are rejection sampled until enough distinct codes are found.
/// Requests beyond `n_channels ^ n_rounds` distinct codes fail with
/// `capacity-exceeded` before any sampling happens.
pub fn synthetic_one_hot_codebook(
    n_rounds: usize,
    n_channels: usize,
    n_codes: usize,
    gene_names: Option<Vec<String>>,
    rng: &mut RngHandle,
) -> Result<Codebook, TxError> {
    if n_codes > 0 && (n_rounds == 0 || n_channels == 0) {
        let info = ErrorInfo::new("empty-dimension", "one-hot codes need rounds and channels")
            .with_context("n_rounds", n_rounds)
            .with_context("n_channels", n_channels);
        return Err(TxError::Codebook(info));
    }
    let capacity = one_hot_capacity(n_rounds, n_channels);
    if n_codes > capacity {
        let info = ErrorInfo::new(
            "capacity-exceeded",
            "more distinct one-hot codes requested than can exist",
        )
        .with_context("n_codes", n_codes)
        .with_context("capacity", capacity)
        .with_hint("increase rounds or channels, or request fewer codes");
        return Err(TxError::Rng(info));
    }
    if let Some(names) = &gene_names {
        if names.len() != n_codes {
            let info = ErrorInfo::new(
                "gene-count-mismatch",
                "number of gene names must equal the number of codes",
            )
            .with_context("gene_names", names.len())
            .with_context("n_codes", n_codes);
            return Err(TxError::Codebook(info));
        }
    }

    let mut seen = BTreeSet::new();
    // saturated capacities admit requests far larger than memory
    let mut codes = Vec::with_capacity(n_codes.min(MAX_PREALLOCATED_CODES));
    let mut draws = 0usize;
    while codes.len() < n_codes {
        let candidate: Vec<usize> = (0..n_rounds).map(|_| rng.gen_range(0..n_channels)).collect();
        draws += 1;
        if seen.insert(candidate.clone()) {
            codes.push(candidate);
        }
    }
    log::debug!("drew {draws} candidates for {n_codes} one-hot codes");

    let gene_names = match gene_names {
        Some(names) => names,
        None => (0..n_codes).map(|_| random_gene_name(rng)).collect(),
    };

    let records: Vec<CodeRecord> = codes
        .into_iter()
        .zip(gene_names)
        .map(|(code, gene)| {
            let codeword = code
                .into_iter()
                .enumerate()
                .map(|(r, c)| CodewordEntry::new(r, c, 1.0))
                .collect();
            CodeRecord::new(gene, codeword)
        })
        .collect();

    Codebook::from_code_array(&records, Some(n_rounds), Some(n_channels))
}
