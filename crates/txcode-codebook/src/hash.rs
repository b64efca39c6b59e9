use sha2::{Digest, Sha256};

use crate::codebook::Codebook;

fn update_labels(hasher: &mut Sha256, labels: &[usize]) {
    hasher.update((labels.len() as u64).to_le_bytes());
    for &label in labels {
        hasher.update((label as u64).to_le_bytes());
    }
}

/// Computes the canonical structural hash for a codebook.
///
/// Gene order, axis labels and the exact bit pattern of every value
/// contribute, so two codebooks hash equal iff they decode identically.
pub fn canonical_codebook_hash(codebook: &Codebook) -> String {
    let mut hasher = Sha256::new();
    let codes = codebook.codes();
    hasher.update((codebook.n_genes() as u64).to_le_bytes());
    update_labels(&mut hasher, codes.channel_labels());
    update_labels(&mut hasher, codes.round_labels());

    for gene in codebook.genes() {
        hasher.update((gene.len() as u64).to_le_bytes());
        hasher.update(gene.as_bytes());
    }
    for value in codes.as_slice() {
        // -0.0 and 0.0 are the same code cell
        let value = if *value == 0.0 { 0.0f64 } else { *value };
        hasher.update(value.to_bits().to_le_bytes());
    }

    let digest = hasher.finalize();
    digest
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<String>()
}
