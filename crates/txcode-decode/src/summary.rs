use std::collections::BTreeMap;

use txcode_core::NO_GENE;
use txcode_traces::IntensityTable;

/// Number of features per decoded gene, sorted by gene label.
///
/// The `"None"` sentinel is counted only when `include_unassigned` is set.
/// Undecoded tables yield an empty map.
pub fn gene_counts(table: &IntensityTable, include_unassigned: bool) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for gene in table.gene_names().unwrap_or_default() {
        if gene == NO_GENE && !include_unassigned {
            continue;
        }
        *counts.entry(gene.clone()).or_insert(0) += 1;
    }
    counts
}
