#![deny(missing_docs)]
#![doc = "Core tensor, error and randomness types shared by the txcode crates."]

pub mod axes;
pub mod errors;
pub mod metric;
pub mod normalize;
pub mod rng;
pub mod tensor;

pub use axes::{axis_name, Axis, NO_GENE};
pub use errors::{ErrorInfo, TxError};
pub use metric::Metric;
pub use normalize::{normalize_features, partitioned_intensity, NormOrder};
pub use rng::{derive_substream_seed, RngHandle};
pub use tensor::LabeledTensor;
