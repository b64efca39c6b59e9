#![deny(missing_docs)]
#![doc = "Codebook model: construction, validation, serialization and synthetic generation."]

/// Codebook type and its validating constructors.
pub mod codebook;
/// Canonical hashing of codebooks.
pub mod hash;
/// JSON, URL and binary input/output.
pub mod io;
/// SpaceTx codebook record schema.
pub mod record;
/// Seeded synthetic one-hot codebooks.
pub mod synthetic;

pub use codebook::Codebook;
pub use hash::canonical_codebook_hash;
pub use io::{from_bytes, is_url, to_bytes, ResourceError};
pub use record::{CodeRecord, CodewordEntry};
pub use synthetic::{one_hot_capacity, random_gene_name, synthetic_one_hot_codebook};
pub use txcode_core::{normalize_features, NormOrder};
