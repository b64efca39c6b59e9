#![deny(missing_docs)]
#![doc = "Decoding of intensity traces against a codebook, plus the configured end-to-end pipeline."]

pub mod config;
mod decoder;
/// Normalized nearest-code decoding.
pub mod metric;
/// Per-round brightest-channel decoding.
pub mod per_round_max;
mod summary;

pub use config::DecodeConfig;
pub use decoder::{CodebookDecode, Decoder, DecodingStrategy};
pub use metric::{CodeIndex, CodeMatch, MetricDecoder};
pub use per_round_max::{MatchTieBreak, PerRoundMaxDecoder};
pub use summary::gene_counts;
