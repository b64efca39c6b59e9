use serde::{Deserialize, Serialize};

/// Name of the codeword field in a codebook record.
pub const CODEWORD: &str = "codeword";
/// Name of the gene field in a codebook record.
pub const GENE: &str = "gene_name";
/// Name of the value field in a codeword entry.
pub const VALUE: &str = "v";

/// One non-zero cell of a codeword.
///
/// Field names are the axis short names (`axis_name`) plus [`VALUE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodewordEntry {
    /// Zero-based round index.
    pub r: usize,
    /// Zero-based channel index.
    pub c: usize,
    /// Expected intensity.
    pub v: f64,
}

impl CodewordEntry {
    /// Creates an entry for round `r`, channel `c` with value `v`.
    pub fn new(r: usize, c: usize, v: f64) -> Self {
        Self { r, c, v }
    }
}

/// A gene label with its sparse codeword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeRecord {
    /// Cells of the code; omitted cells are zero.
    pub codeword: Vec<CodewordEntry>,
    /// Gene encoded by the codeword.
    pub gene_name: String,
}

impl CodeRecord {
    /// Creates a record from a gene label and its entries.
    pub fn new(gene_name: impl Into<String>, codeword: Vec<CodewordEntry>) -> Self {
        Self {
            codeword,
            gene_name: gene_name.into(),
        }
    }
}
